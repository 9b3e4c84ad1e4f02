//! Interval arithmetic over shift times.
//!
//! Shift times are wall-clock `NaiveTime`s within a single day. Everything here
//! works in whole minutes since midnight so the break rules compare exactly,
//! without floating point drift at the threshold boundaries.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::Shift;

/// A half-open span of minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: minutes_since_midnight(start),
            end: minutes_since_midnight(end),
        }
    }

    /// Length in minutes. Intervals that do not move forward have none.
    pub fn minutes(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

pub fn minutes_since_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Parse `"HH:MM"` (or `"HH:MM:SS"`) into a `NaiveTime`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|e| EngineError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Merge overlapping intervals.
///
/// Intervals are sorted by start; the next interval merges into the running one
/// only when it starts strictly before the running end. Touching endpoints
/// (09:00-13:00 and 13:00-18:30) stay separate.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.to_vec();
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if interval.start < last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Total merged minutes covered by the timed entries in `shifts`.
pub fn merged_minutes(shifts: &[Shift]) -> u32 {
    let intervals: Vec<Interval> = shifts
        .iter()
        .filter_map(|s| match (s.start, s.end) {
            (Some(start), Some(end)) => Some(Interval::new(start, end)),
            _ => None,
        })
        .collect();

    merge_intervals(&intervals).iter().map(Interval::minutes).sum()
}

/// Unpaid-break rules applied to a worker-day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreakPolicy {
    pub adult_threshold_hours: u32,
    pub minor_threshold_hours: u32,
    pub break_minutes: u32,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            adult_threshold_hours: 8,
            minor_threshold_hours: 5,
            break_minutes: 30,
        }
    }
}

impl BreakPolicy {
    pub fn threshold_minutes(&self, is_minor: bool) -> u32 {
        let hours = if is_minor {
            self.minor_threshold_hours
        } else {
            self.adult_threshold_hours
        };
        hours * 60
    }

    /// Apply the break deduction to a merged total.
    ///
    /// Past the threshold a break is owed. It is taken out of the excess first,
    /// so paid time never drops below the threshold itself.
    pub fn paid_minutes(&self, total: u32, is_minor: bool) -> u32 {
        let threshold = self.threshold_minutes(is_minor);
        if total <= threshold {
            total
        } else if total - threshold <= self.break_minutes {
            threshold
        } else {
            total - self.break_minutes
        }
    }

    /// Worked hours for one worker-day after merging and the break deduction.
    pub fn worked_hours(&self, shifts: &[Shift], is_minor: bool) -> f64 {
        match shifts.first() {
            None => return 0.0,
            Some(first) if first.is_all_day_off() => return 0.0,
            Some(_) => {}
        }

        let total = merged_minutes(shifts);
        self.paid_minutes(total, is_minor) as f64 / 60.0
    }
}

/// Worked hours under the default break policy (8h adults, 5h minors, 30 min).
pub fn worked_hours(shifts: &[Shift], is_minor: bool) -> f64 {
    BreakPolicy::default().worked_hours(shifts, is_minor)
}

/// Serde helpers for `"HH:MM"` times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            t: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|s| crate::time::parse_time(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
