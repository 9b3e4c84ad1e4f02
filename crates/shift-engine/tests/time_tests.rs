//! Tests for interval merging and the unpaid-break deduction.

use chrono::NaiveTime;
use shift_engine::time::{merge_intervals, parse_time, worked_hours, BreakPolicy, Interval};
use shift_engine::{Shift, ShiftType};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn t(s: &str) -> NaiveTime {
    parse_time(s).unwrap()
}

fn guard(start: &str, end: &str) -> Shift {
    Shift::timed(ShiftType::Guard, t(start), t(end))
}

fn interval(start: &str, end: &str) -> Interval {
    Interval::new(t(start), t(end))
}

fn assert_hours(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} hours, got {}",
        expected,
        actual
    );
}

// ── merge_intervals ─────────────────────────────────────────────────────────

#[test]
fn overlapping_intervals_merge() {
    let merged = merge_intervals(&[interval("12:00", "16:00"), interval("09:00", "13:00")]);
    assert_eq!(merged, vec![interval("09:00", "16:00")]);
}

#[test]
fn touching_intervals_do_not_merge() {
    let merged = merge_intervals(&[interval("09:00", "13:00"), interval("13:00", "18:30")]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0], interval("09:00", "13:00"));
    assert_eq!(merged[1], interval("13:00", "18:30"));
}

#[test]
fn contained_interval_is_absorbed() {
    let merged = merge_intervals(&[interval("09:00", "17:00"), interval("10:00", "11:00")]);
    assert_eq!(merged, vec![interval("09:00", "17:00")]);
}

#[test]
fn merge_output_is_sorted() {
    let merged = merge_intervals(&[
        interval("15:00", "16:00"),
        interval("08:00", "09:00"),
        interval("11:00", "12:00"),
    ]);
    let starts: Vec<u32> = merged.iter().map(|i| i.start).collect();
    assert_eq!(starts, vec![8 * 60, 11 * 60, 15 * 60]);
}

#[test]
fn merge_empty_is_empty() {
    assert!(merge_intervals(&[]).is_empty());
}

// ── worked_hours ────────────────────────────────────────────────────────────

#[test]
fn empty_day_is_zero() {
    assert_hours(worked_hours(&[], false), 0.0);
}

#[test]
fn leading_all_day_off_is_zero() {
    let shifts = vec![Shift::all_day(ShiftType::Off), guard("09:00", "17:00")];
    assert_hours(worked_hours(&shifts, false), 0.0);
}

#[test]
fn adult_split_shift_over_threshold_loses_half_hour() {
    // 09:00-13:00 + 13:00-18:30 = 9.5h; 1.5h over 8h → 9.0h.
    let shifts = vec![guard("09:00", "13:00"), guard("13:00", "18:30")];
    assert_hours(worked_hours(&shifts, false), 9.0);
}

#[test]
fn minor_just_over_threshold_is_clamped() {
    // 09:00-14:20 = 5h20m; 20 min over 5h → clamped to 5.0h.
    let shifts = vec![guard("09:00", "14:20")];
    assert_hours(worked_hours(&shifts, true), 5.0);
}

#[test]
fn adult_at_threshold_is_untouched() {
    assert_hours(worked_hours(&[guard("09:00", "17:00")], false), 8.0);
}

#[test]
fn exactly_half_hour_over_is_clamped() {
    assert_hours(worked_hours(&[guard("09:00", "17:30")], false), 8.0);
}

#[test]
fn overlapping_shifts_count_once() {
    let shifts = vec![guard("09:00", "12:00"), guard("11:00", "13:00")];
    assert_hours(worked_hours(&shifts, false), 4.0);
}

#[test]
fn untimed_entries_are_ignored() {
    let shifts = vec![guard("09:00", "11:00"), Shift::all_day(ShiftType::SwimMeet)];
    assert_hours(worked_hours(&shifts, false), 2.0);
}

#[test]
fn custom_policy_changes_thresholds() {
    let policy = BreakPolicy {
        adult_threshold_hours: 6,
        minor_threshold_hours: 4,
        break_minutes: 60,
    };
    // 7h adult: 1h over 6h, break is 60 min → clamped to 6h.
    assert_hours(policy.worked_hours(&[guard("09:00", "16:00")], false), 6.0);
    // 6h minor: 2h over 4h → 5h.
    assert_hours(policy.worked_hours(&[guard("09:00", "15:00")], true), 5.0);
}
