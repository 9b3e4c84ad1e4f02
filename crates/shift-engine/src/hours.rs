//! Daily and weekly worked-hours totals.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{DayKey, Shift, WeekShifts, Worker, WorkerId, WorkerWeek};
use crate::time::BreakPolicy;

/// Hours for one worker-day. OFF and SWIM_MEET entries are ignored.
pub fn daily_hours(day_shifts: &[Shift], is_minor: bool) -> f64 {
    daily_hours_with(&BreakPolicy::default(), day_shifts, is_minor)
}

/// Sum of [`daily_hours`] over all seven days.
pub fn weekly_hours(worker_week: &WorkerWeek, is_minor: bool) -> f64 {
    weekly_hours_with(&BreakPolicy::default(), worker_week, is_minor)
}

pub fn daily_hours_with(policy: &BreakPolicy, day_shifts: &[Shift], is_minor: bool) -> f64 {
    let work: Vec<Shift> = day_shifts
        .iter()
        .filter(|s| s.kind.is_work())
        .cloned()
        .collect();
    policy.worked_hours(&work, is_minor)
}

pub fn weekly_hours_with(policy: &BreakPolicy, worker_week: &WorkerWeek, is_minor: bool) -> f64 {
    DayKey::ALL
        .into_iter()
        .filter_map(|day| worker_week.get(&day).and_then(|slot| slot.as_deref()))
        .map(|shifts| daily_hours_with(policy, shifts, is_minor))
        .sum()
}

/// One worker's totals for a schedule week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerHours {
    pub uid: WorkerId,
    pub is_minor: bool,
    pub daily: BTreeMap<DayKey, f64>,
    pub weekly: f64,
    /// Weekly total exceeds the review threshold.
    pub overtime: bool,
}

/// Totals for every worker present in `week`, sorted by uid.
///
/// Minor status comes from `roster`; workers missing from it are treated as
/// adults.
pub fn week_summary(
    week: &WeekShifts,
    roster: &[Worker],
    policy: &BreakPolicy,
    overtime_threshold_hours: f64,
) -> Vec<WorkerHours> {
    let minors: HashMap<&str, bool> = roster
        .iter()
        .map(|w| (w.uid.as_str(), w.is_minor))
        .collect();

    week.iter()
        .map(|(uid, worker_week)| {
            let is_minor = minors.get(uid.as_str()).copied().unwrap_or(false);
            let daily: BTreeMap<DayKey, f64> = DayKey::ALL
                .into_iter()
                .map(|day| {
                    let shifts = worker_week
                        .get(&day)
                        .and_then(|slot| slot.as_deref())
                        .unwrap_or(&[]);
                    (day, daily_hours_with(policy, shifts, is_minor))
                })
                .collect();
            let weekly: f64 = daily.values().sum();
            WorkerHours {
                uid: uid.clone(),
                is_minor,
                daily,
                weekly,
                overtime: is_overtime(weekly, overtime_threshold_hours),
            }
        })
        .collect()
}

pub fn is_overtime(weekly_hours: f64, threshold_hours: f64) -> bool {
    weekly_hours > threshold_hours
}
