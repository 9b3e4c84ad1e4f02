//! Time-off reconciliation: keep derived OFF markers on schedule weeks in line
//! with the requests and rules that own them.
//!
//! Every pass is best-effort per worker-day. A store failure on one day is
//! logged and counted, and processing moves on to the next day; nothing is
//! rolled back. Published weeks are never written by any pass here.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::{days_inclusive, sunday_of_week, WeekId};
use crate::error::Result;
use crate::model::{DayKey, OffRule, ScheduleWeek, Shift, ShiftOrigin, TimeDetail, WeekShifts, WorkerWeek};
use crate::store::ScheduleWeekStore;

/// What a reconciliation pass did, counted in worker-days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub days_written: usize,
    pub days_unchanged: usize,
    pub days_skipped_published: usize,
    pub days_failed: usize,
}

impl ReconcileReport {
    /// No day failed. Published-week skips do not count against completeness.
    pub fn is_complete(&self) -> bool {
        self.days_failed == 0
    }

    pub fn merge(&mut self, other: ReconcileReport) {
        self.days_written += other.days_written;
        self.days_unchanged += other.days_unchanged;
        self.days_skipped_published += other.days_skipped_published;
        self.days_failed += other.days_failed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayOutcome {
    Written,
    Unchanged,
    SkippedPublished,
}

/// Applies and removes derived OFF markers for one company.
pub struct Reconciler<'a, S: ScheduleWeekStore + ?Sized> {
    store: &'a S,
    company_id: &'a str,
}

impl<'a, S: ScheduleWeekStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S, company_id: &'a str) -> Self {
        Self { store, company_id }
    }

    /// Add an OFF marker owned by `origin` to every day from `start` to `end`.
    ///
    /// Missing weeks are created as empty drafts. Request markers are added at
    /// most once per worker-day; applying the same request twice is a no-op.
    pub fn apply_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        worker_id: &str,
        detail: &TimeDetail,
        origin: &ShiftOrigin,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for date in days_inclusive(start, end) {
            let outcome = self.apply_day(date, worker_id, detail, origin);
            self.record(&mut report, date, worker_id, outcome);
        }
        info!(
            company_id = self.company_id,
            worker_id,
            %start,
            %end,
            written = report.days_written,
            skipped_published = report.days_skipped_published,
            failed = report.days_failed,
            "applied time-off range"
        );
        report
    }

    /// Drop every shift matching `predicate` from the worker's days in range.
    ///
    /// A worker-day left empty is stored as null. Weeks that do not exist are
    /// left alone.
    pub fn remove_range<P>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        worker_id: &str,
        predicate: P,
    ) -> ReconcileReport
    where
        P: Fn(&Shift) -> bool,
    {
        let mut report = ReconcileReport::default();
        for date in days_inclusive(start, end) {
            let outcome = self.remove_day(date, worker_id, &predicate);
            self.record(&mut report, date, worker_id, outcome);
        }
        info!(
            company_id = self.company_id,
            worker_id,
            %start,
            %end,
            written = report.days_written,
            skipped_published = report.days_skipped_published,
            failed = report.days_failed,
            "removed time-off range"
        );
        report
    }

    /// Rebuild the worker's rule markers on every draft week from the week
    /// containing `today` onward.
    ///
    /// All existing rule markers for the worker are discarded and rebuilt from
    /// `rules`, so an edited or deleted rule never leaves a stale marker behind.
    /// Fails only if a rule is malformed or the week listing cannot be read;
    /// per-week write failures are logged and counted.
    pub fn regenerate_rules(
        &self,
        worker_id: &str,
        rules: &[OffRule],
        today: NaiveDate,
    ) -> Result<ReconcileReport> {
        let built: Vec<(DayKey, Shift)> = rules
            .iter()
            .map(|rule| -> Result<(DayKey, Shift)> {
                let detail = rule.time_detail()?;
                Ok((rule.day, Shift::off_marker(&detail, ShiftOrigin::Rule(rule.id.clone()))))
            })
            .collect::<Result<_>>()?;

        let weeks = self
            .store
            .weeks_from(self.company_id, sunday_of_week(today))?;

        let mut report = ReconcileReport::default();
        for week in &weeks {
            report.merge(self.regenerate_week(week, worker_id, &built));
        }
        info!(
            company_id = self.company_id,
            worker_id,
            rules = rules.len(),
            weeks = weeks.len(),
            written = report.days_written,
            failed = report.days_failed,
            "regenerated rule markers"
        );
        Ok(report)
    }

    fn apply_day(
        &self,
        date: NaiveDate,
        worker_id: &str,
        detail: &TimeDetail,
        origin: &ShiftOrigin,
    ) -> Result<DayOutcome> {
        let id = WeekId::containing(self.company_id, date);
        let week = self.store.create_week_if_absent(&id, WeekShifts::new())?;
        if week.is_published {
            debug!(week_id = %id, "week is published; not applying");
            return Ok(DayOutcome::SkippedPublished);
        }

        let day = DayKey::of(date);
        let existing = week.worker_day(worker_id, day);
        if matches!(origin, ShiftOrigin::Request(_))
            && existing.iter().any(|s| s.is_request_marker() && s.origin == *origin)
        {
            return Ok(DayOutcome::Unchanged);
        }

        let mut updated = existing.to_vec();
        updated.push(Shift::off_marker(detail, origin.clone()));
        self.store
            .patch_shifts(&id, &worker_day_patch(worker_id, day, Some(updated)))?;
        Ok(DayOutcome::Written)
    }

    fn remove_day<P>(&self, date: NaiveDate, worker_id: &str, predicate: &P) -> Result<DayOutcome>
    where
        P: Fn(&Shift) -> bool,
    {
        let id = WeekId::containing(self.company_id, date);
        let Some(week) = self.store.get_week(&id)? else {
            return Ok(DayOutcome::Unchanged);
        };
        if week.is_published {
            debug!(week_id = %id, "week is published; not removing");
            return Ok(DayOutcome::SkippedPublished);
        }

        let day = DayKey::of(date);
        let existing = week.worker_day(worker_id, day);
        if !existing.iter().any(predicate) {
            return Ok(DayOutcome::Unchanged);
        }

        let kept: Vec<Shift> = existing.iter().filter(|&s| !predicate(s)).cloned().collect();
        let slot = if kept.is_empty() { None } else { Some(kept) };
        self.store
            .patch_shifts(&id, &worker_day_patch(worker_id, day, slot))?;
        Ok(DayOutcome::Written)
    }

    fn regenerate_week(
        &self,
        week: &ScheduleWeek,
        worker_id: &str,
        built: &[(DayKey, Shift)],
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let id = WeekId::containing(week.company_id.clone(), week.week_of);
        if week.is_published {
            debug!(week_id = %id, "week is published; not regenerating rules");
            report.days_skipped_published = DayKey::ALL.len();
            return report;
        }

        let current = week.shifts.get(worker_id);
        let mut patch = WorkerWeek::new();
        for day in DayKey::ALL {
            let existing = current
                .and_then(|w| w.get(&day))
                .and_then(|slot| slot.as_deref());
            let mut rebuilt: Vec<Shift> = existing
                .unwrap_or(&[])
                .iter()
                .filter(|s| !s.is_rule_marker())
                .cloned()
                .collect();
            rebuilt.extend(
                built
                    .iter()
                    .filter(|(rule_day, _)| *rule_day == day)
                    .map(|(_, marker)| marker.clone()),
            );

            let unchanged = match existing {
                Some(shifts) => shifts == rebuilt.as_slice(),
                None => rebuilt.is_empty(),
            };
            if unchanged {
                report.days_unchanged += 1;
                continue;
            }
            let slot = if rebuilt.is_empty() { None } else { Some(rebuilt) };
            patch.insert(day, slot);
        }

        if patch.is_empty() {
            return report;
        }
        let changed = patch.len();
        let mut shifts = WeekShifts::new();
        shifts.insert(worker_id.to_string(), patch);
        match self.store.patch_shifts(&id, &shifts) {
            Ok(()) => report.days_written += changed,
            Err(e) => {
                warn!(week_id = %id, worker_id, error = %e, "rule regeneration write failed; week skipped");
                report.days_failed += changed;
            }
        }
        report
    }

    fn record(
        &self,
        report: &mut ReconcileReport,
        date: NaiveDate,
        worker_id: &str,
        outcome: Result<DayOutcome>,
    ) {
        match outcome {
            Ok(DayOutcome::Written) => report.days_written += 1,
            Ok(DayOutcome::Unchanged) => report.days_unchanged += 1,
            Ok(DayOutcome::SkippedPublished) => report.days_skipped_published += 1,
            Err(e) => {
                warn!(
                    week_id = %WeekId::containing(self.company_id, date),
                    worker_id,
                    %date,
                    error = %e,
                    "reconciliation failed for day; continuing"
                );
                report.days_failed += 1;
            }
        }
    }
}

fn worker_day_patch(worker_id: &str, day: DayKey, slot: Option<Vec<Shift>>) -> WeekShifts {
    let mut days = WorkerWeek::new();
    days.insert(day, slot);
    let mut patch = WeekShifts::new();
    patch.insert(worker_id.to_string(), days);
    patch
}
