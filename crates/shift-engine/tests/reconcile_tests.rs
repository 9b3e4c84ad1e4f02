//! Tests for applying, removing, and regenerating derived OFF markers.

use chrono::{NaiveDate, NaiveTime};
use shift_engine::time::parse_time;
use shift_engine::{
    DayKey, MemoryStore, OffRule, Reconciler, ScheduleWeek, ScheduleWeekStore, Shift, ShiftOrigin,
    ShiftType, TimeDetail, WeekId, WorkerWeek,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

const COMPANY: &str = "pool";

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn t(s: &str) -> NaiveTime {
    parse_time(s).unwrap()
}

fn week_id(s: &str) -> WeekId {
    WeekId::containing(COMPANY, date(s))
}

fn request(id: &str) -> ShiftOrigin {
    ShiftOrigin::Request(id.to_string())
}

fn week(store: &MemoryStore, s: &str) -> ScheduleWeek {
    store.get_week(&week_id(s)).unwrap().expect("week must exist")
}

fn draft_with(s: &str, worker: &str, day: DayKey, shifts: Vec<Shift>) -> ScheduleWeek {
    let mut week = ScheduleWeek::draft(COMPANY, date(s));
    let mut days = WorkerWeek::new();
    days.insert(day, Some(shifts));
    week.shifts.insert(worker.to_string(), days);
    week
}

fn rule(id: &str, day: DayKey, window: Option<(&str, &str)>) -> OffRule {
    OffRule {
        id: id.to_string(),
        day,
        all_day: window.is_none(),
        start_time: window.map(|(s, _)| t(s)),
        end_time: window.map(|(_, e)| t(e)),
    }
}

// ── apply_range ─────────────────────────────────────────────────────────────

#[test]
fn apply_range_spans_weeks_and_creates_drafts() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, COMPANY);

    // Fri 2026-06-12 through Mon 2026-06-15 touches two weeks.
    let report = reconciler.apply_range(
        date("2026-06-12"),
        date("2026-06-15"),
        "ana",
        &TimeDetail::AllDay,
        &request("r1"),
    );

    assert_eq!(report.days_written, 4);
    assert!(report.is_complete());

    let first = week(&store, "2026-06-07");
    assert!(!first.is_published);
    assert_eq!(first.week_of, date("2026-06-07"));
    for day in [DayKey::Fri, DayKey::Sat] {
        let shifts = first.worker_day("ana", day);
        assert_eq!(shifts.len(), 1);
        assert!(shifts[0].is_request_marker_for("r1"));
        assert!(shifts[0].is_all_day_off());
    }
    assert!(first.worker_day("ana", DayKey::Thu).is_empty());

    let second = week(&store, "2026-06-14");
    assert_eq!(second.worker_day("ana", DayKey::Sun).len(), 1);
    assert_eq!(second.worker_day("ana", DayKey::Mon).len(), 1);
}

#[test]
fn apply_range_twice_adds_no_duplicates() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, COMPANY);
    let detail = TimeDetail::AllDay;

    reconciler.apply_range(date("2026-06-08"), date("2026-06-10"), "ana", &detail, &request("r1"));
    let before = store.snapshot().unwrap();
    let report =
        reconciler.apply_range(date("2026-06-08"), date("2026-06-10"), "ana", &detail, &request("r1"));

    assert_eq!(report.days_written, 0);
    assert_eq!(report.days_unchanged, 3);
    assert_eq!(store.snapshot().unwrap(), before);
}

#[test]
fn distinct_requests_each_own_a_marker() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, COMPANY);

    reconciler.apply_range(date("2026-06-08"), date("2026-06-08"), "ana", &TimeDetail::AllDay, &request("r1"));
    reconciler.apply_range(date("2026-06-08"), date("2026-06-08"), "ana", &TimeDetail::AllDay, &request("r2"));

    let shifts = week(&store, "2026-06-08").worker_day("ana", DayKey::Mon).to_vec();
    assert_eq!(shifts.len(), 2);
}

#[test]
fn partial_day_marker_keeps_its_window() {
    let store = MemoryStore::new();
    let detail = TimeDetail::Window {
        start: t("12:00"),
        end: t("16:00"),
    };
    Reconciler::new(&store, COMPANY).apply_range(
        date("2026-06-09"),
        date("2026-06-09"),
        "ana",
        &detail,
        &request("r1"),
    );

    let shifts = week(&store, "2026-06-09").worker_day("ana", DayKey::Tue).to_vec();
    assert_eq!(shifts[0].kind, ShiftType::Off);
    assert_eq!(shifts[0].start, Some(t("12:00")));
    assert_eq!(shifts[0].end, Some(t("16:00")));
}

#[test]
fn apply_range_appends_to_existing_shifts() {
    let store = MemoryStore::new();
    store
        .put_week(draft_with(
            "2026-06-07",
            "ana",
            DayKey::Wed,
            vec![Shift::timed(ShiftType::Guard, t("09:00"), t("12:00"))],
        ))
        .unwrap();

    Reconciler::new(&store, COMPANY).apply_range(
        date("2026-06-10"),
        date("2026-06-10"),
        "ana",
        &TimeDetail::AllDay,
        &request("r1"),
    );

    let shifts = week(&store, "2026-06-07").worker_day("ana", DayKey::Wed).to_vec();
    assert_eq!(shifts.len(), 2);
    assert_eq!(shifts[0].kind, ShiftType::Guard);
    assert!(shifts[1].is_request_marker());
}

#[test]
fn published_week_is_never_touched_by_apply() {
    let store = MemoryStore::new();
    let mut published = draft_with(
        "2026-06-07",
        "ana",
        DayKey::Mon,
        vec![Shift::timed(ShiftType::Guard, t("09:00"), t("17:00"))],
    );
    published.is_published = true;
    store.put_week(published).unwrap();
    let before = week(&store, "2026-06-07");

    let report = Reconciler::new(&store, COMPANY).apply_range(
        date("2026-06-07"),
        date("2026-06-15"),
        "ana",
        &TimeDetail::AllDay,
        &request("r1"),
    );

    assert_eq!(week(&store, "2026-06-07"), before);
    assert_eq!(report.days_skipped_published, 7);
    assert_eq!(report.days_written, 2);
    assert!(report.is_complete());
}

#[test]
fn failing_week_does_not_abort_the_range() {
    let store = MemoryStore::new();
    store.fail_writes_to(&week_id("2026-06-07")).unwrap();

    let report = Reconciler::new(&store, COMPANY).apply_range(
        date("2026-06-12"),
        date("2026-06-15"),
        "ana",
        &TimeDetail::AllDay,
        &request("r1"),
    );

    assert_eq!(report.days_failed, 2);
    assert_eq!(report.days_written, 2);
    assert!(!report.is_complete());
    assert_eq!(week(&store, "2026-06-14").worker_day("ana", DayKey::Mon).len(), 1);
}

// ── remove_range ────────────────────────────────────────────────────────────

#[test]
fn remove_range_keeps_manual_off_time() {
    let store = MemoryStore::new();
    store
        .put_week(draft_with(
            "2026-06-07",
            "ana",
            DayKey::Mon,
            vec![Shift::all_day(ShiftType::Off)],
        ))
        .unwrap();
    let reconciler = Reconciler::new(&store, COMPANY);
    reconciler.apply_range(date("2026-06-08"), date("2026-06-09"), "ana", &TimeDetail::AllDay, &request("r1"));

    let report = reconciler.remove_range(date("2026-06-08"), date("2026-06-09"), "ana", |s| {
        s.is_request_marker_for("r1")
    });

    assert_eq!(report.days_written, 2);
    let after = week(&store, "2026-06-07");
    assert_eq!(after.worker_day("ana", DayKey::Mon), &[Shift::all_day(ShiftType::Off)]);
    // Emptied days are stored as null rather than as empty arrays.
    assert_eq!(after.shifts["ana"].get(&DayKey::Tue), Some(&None));
}

#[test]
fn remove_range_only_drops_the_matching_request() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, COMPANY);
    reconciler.apply_range(date("2026-06-08"), date("2026-06-08"), "ana", &TimeDetail::AllDay, &request("r1"));
    reconciler.apply_range(date("2026-06-08"), date("2026-06-08"), "ana", &TimeDetail::AllDay, &request("r2"));

    reconciler.remove_range(date("2026-06-08"), date("2026-06-08"), "ana", |s| {
        s.is_request_marker_for("r1")
    });

    let shifts = week(&store, "2026-06-08").worker_day("ana", DayKey::Mon).to_vec();
    assert_eq!(shifts.len(), 1);
    assert!(shifts[0].is_request_marker_for("r2"));
}

#[test]
fn remove_range_skips_published_and_missing_weeks() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, COMPANY);
    reconciler.apply_range(date("2026-06-08"), date("2026-06-08"), "ana", &TimeDetail::AllDay, &request("r1"));
    store.publish(&week_id("2026-06-08")).unwrap();
    let before = week(&store, "2026-06-08");

    let report = reconciler.remove_range(date("2026-06-08"), date("2026-06-15"), "ana", |s| {
        s.is_request_marker()
    });

    assert_eq!(week(&store, "2026-06-08"), before);
    assert_eq!(report.days_skipped_published, 6);
    assert_eq!(report.days_unchanged, 2);
    assert!(store.get_week(&week_id("2026-06-15")).unwrap().is_none());
}

// ── regenerate_rules ────────────────────────────────────────────────────────

#[test]
fn regenerate_replaces_stale_rule_markers() {
    let store = MemoryStore::new();
    store.put_week(ScheduleWeek::draft(COMPANY, date("2026-06-07"))).unwrap();
    let reconciler = Reconciler::new(&store, COMPANY);
    let today = date("2026-06-08");

    reconciler
        .regenerate_rules("ana", &[rule("w", DayKey::Wed, Some(("09:00", "12:00")))], today)
        .unwrap();
    reconciler
        .regenerate_rules("ana", &[rule("w", DayKey::Wed, Some(("13:00", "17:00")))], today)
        .unwrap();

    let shifts = week(&store, "2026-06-07").worker_day("ana", DayKey::Wed).to_vec();
    assert_eq!(shifts.len(), 1);
    assert!(shifts[0].is_rule_marker());
    assert_eq!(shifts[0].start, Some(t("13:00")));
}

#[test]
fn regenerate_twice_is_stable() {
    let store = MemoryStore::new();
    store.put_week(ScheduleWeek::draft(COMPANY, date("2026-06-07"))).unwrap();
    store.put_week(ScheduleWeek::draft(COMPANY, date("2026-06-14"))).unwrap();
    let reconciler = Reconciler::new(&store, COMPANY);
    let rules = [
        rule("a", DayKey::Mon, None),
        rule("b", DayKey::Mon, Some(("17:00", "20:00"))),
        rule("c", DayKey::Fri, None),
    ];

    reconciler.regenerate_rules("ana", &rules, date("2026-06-07")).unwrap();
    let first = store.snapshot().unwrap();
    let report = reconciler.regenerate_rules("ana", &rules, date("2026-06-07")).unwrap();

    assert_eq!(store.snapshot().unwrap(), first);
    assert_eq!(report.days_written, 0);
    assert_eq!(week(&store, "2026-06-14").worker_day("ana", DayKey::Mon).len(), 2);
}

#[test]
fn regenerate_drops_markers_of_deleted_rules() {
    let store = MemoryStore::new();
    store
        .put_week(draft_with(
            "2026-06-07",
            "ana",
            DayKey::Thu,
            vec![Shift::timed(ShiftType::Guard, t("09:00"), t("12:00"))],
        ))
        .unwrap();
    let reconciler = Reconciler::new(&store, COMPANY);

    reconciler
        .regenerate_rules("ana", &[rule("x", DayKey::Thu, None), rule("y", DayKey::Sat, None)], date("2026-06-07"))
        .unwrap();
    reconciler.regenerate_rules("ana", &[], date("2026-06-07")).unwrap();

    let after = week(&store, "2026-06-07");
    assert_eq!(after.worker_day("ana", DayKey::Thu).len(), 1);
    assert_eq!(after.worker_day("ana", DayKey::Thu)[0].kind, ShiftType::Guard);
    assert_eq!(after.shifts["ana"].get(&DayKey::Sat), Some(&None));
}

#[test]
fn regenerate_leaves_past_and_published_weeks_alone() {
    let store = MemoryStore::new();
    store.put_week(ScheduleWeek::draft(COMPANY, date("2026-05-31"))).unwrap();
    store.put_week(ScheduleWeek::draft(COMPANY, date("2026-06-07"))).unwrap();
    store.put_week(ScheduleWeek::draft(COMPANY, date("2026-06-14"))).unwrap();
    store.publish(&week_id("2026-06-07")).unwrap();

    let report = Reconciler::new(&store, COMPANY)
        .regenerate_rules("ana", &[rule("r", DayKey::Tue, None)], date("2026-06-10"))
        .unwrap();

    assert_eq!(report.days_skipped_published, 7);
    assert!(week(&store, "2026-05-31").shifts.is_empty());
    assert!(week(&store, "2026-06-07").shifts.is_empty());
    assert_eq!(week(&store, "2026-06-14").worker_day("ana", DayKey::Tue).len(), 1);
}

#[test]
fn regenerate_rejects_malformed_rules_before_writing() {
    let store = MemoryStore::new();
    store.put_week(ScheduleWeek::draft(COMPANY, date("2026-06-07"))).unwrap();

    let bad = rule("bad", DayKey::Mon, Some(("15:00", "09:00")));
    let result = Reconciler::new(&store, COMPANY).regenerate_rules("ana", &[bad], date("2026-06-07"));

    assert!(result.is_err());
    assert!(week(&store, "2026-06-07").shifts.is_empty());
}

#[test]
fn regenerate_keeps_request_markers() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, COMPANY);
    reconciler.apply_range(date("2026-06-08"), date("2026-06-08"), "ana", &TimeDetail::AllDay, &request("r1"));

    reconciler
        .regenerate_rules("ana", &[rule("m", DayKey::Mon, None)], date("2026-06-08"))
        .unwrap();

    let shifts = week(&store, "2026-06-08").worker_day("ana", DayKey::Mon).to_vec();
    assert_eq!(shifts.len(), 2);
    assert!(shifts[0].is_request_marker_for("r1"));
    assert_eq!(shifts[1].origin, ShiftOrigin::Rule("m".to_string()));
}

// ── MemoryStore ─────────────────────────────────────────────────────────────

#[test]
fn loaded_snapshot_anchors_weeks_on_sunday() {
    // Wednesday anchor, as a hand-edited state file might carry.
    let store = MemoryStore::from_snapshot(shift_engine::StoreSnapshot {
        weeks: vec![draft_with("2026-06-10", "ana", DayKey::Mon, vec![])],
        ..Default::default()
    });

    let loaded = week(&store, "2026-06-10");
    assert_eq!(loaded.week_of, date("2026-06-07"));
    assert_eq!(
        WeekId::containing(loaded.company_id.clone(), loaded.week_of),
        week_id("2026-06-10")
    );
    assert_eq!(store.snapshot().unwrap().weeks[0].week_of, date("2026-06-07"));
}
