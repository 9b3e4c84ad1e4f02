//! Per-day staffing counts at opening and closing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::CoreHours;
use crate::model::{DayKey, ShiftType, WeekShifts};

/// How many workers of one shift kind cover opening and closing on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaffingCount {
    pub opening: usize,
    pub closing: usize,
}

/// `"3"` when opening and closing match, `"3-2"` otherwise.
impl fmt::Display for StaffingCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.opening == self.closing {
            write!(f, "{}", self.opening)
        } else {
            write!(f, "{}-{}", self.opening, self.closing)
        }
    }
}

/// Count, for every day of the week, the workers whose `kind` shifts cover
/// opening and closing.
///
/// A worker counts at most once per side per day, even with several shifts of
/// the same kind. An all-day shift counts toward both sides.
pub fn staffing_counts(
    week: &WeekShifts,
    kind: ShiftType,
    core_hours: &CoreHours,
) -> BTreeMap<DayKey, StaffingCount> {
    DayKey::ALL
        .into_iter()
        .map(|day| {
            let mut count = StaffingCount::default();
            for worker_week in week.values() {
                let Some(Some(shifts)) = worker_week.get(&day) else {
                    continue;
                };
                let categories: Vec<_> = shifts
                    .iter()
                    .filter(|s| s.kind == kind)
                    .map(|s| core_hours.categorize(s))
                    .collect();
                if categories.iter().any(|c| c.covers_opening()) {
                    count.opening += 1;
                }
                if categories.iter().any(|c| c.covers_closing()) {
                    count.closing += 1;
                }
            }
            (day, count)
        })
        .collect()
}

/// [`staffing_counts`] rendered as display strings, against the default marks.
pub fn daily_counts(week: &WeekShifts, kind: ShiftType) -> BTreeMap<DayKey, String> {
    staffing_counts(week, kind, &CoreHours::default())
        .into_iter()
        .map(|(day, count)| (day, count.to_string()))
        .collect()
}
