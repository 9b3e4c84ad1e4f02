//! Classify shifts against the core opening and closing marks.
//!
//! A shift that starts by the opening mark covers opening; one that ends at or
//! after the closing mark covers closing. The same classification drives both
//! display highlighting and the staffing counts in [`crate::staffing`].

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::model::{Shift, ShiftType};
use crate::time::hhmm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftCategory {
    AllDay,
    Opening,
    Closing,
    Midday,
    None,
}

impl ShiftCategory {
    pub fn covers_opening(self) -> bool {
        matches!(self, ShiftCategory::Opening | ShiftCategory::AllDay)
    }

    pub fn covers_closing(self) -> bool {
        matches!(self, ShiftCategory::Closing | ShiftCategory::AllDay)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftCategory::AllDay => "ALL_DAY",
            ShiftCategory::Opening => "OPENING",
            ShiftCategory::Closing => "CLOSING",
            ShiftCategory::Midday => "MIDDAY",
            ShiftCategory::None => "NONE",
        }
    }
}

const OPENING_MARK: NaiveTime = match NaiveTime::from_hms_opt(13, 0, 0) {
    Some(t) => t,
    None => panic!("invalid opening mark"),
};

const CLOSING_MARK: NaiveTime = match NaiveTime::from_hms_opt(18, 0, 0) {
    Some(t) => t,
    None => panic!("invalid closing mark"),
};

/// The fixed reference marks a shift is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreHours {
    #[serde(with = "hhmm")]
    pub opening: NaiveTime,
    #[serde(with = "hhmm")]
    pub closing: NaiveTime,
}

impl Default for CoreHours {
    fn default() -> Self {
        Self {
            opening: OPENING_MARK,
            closing: CLOSING_MARK,
        }
    }
}

impl CoreHours {
    pub fn categorize(&self, shift: &Shift) -> ShiftCategory {
        let (Some(start), Some(end)) = (shift.start, shift.end) else {
            return ShiftCategory::None;
        };

        let is_opening = start <= self.opening;
        let is_closing = end >= self.closing;
        match (is_opening, is_closing) {
            (true, true) => ShiftCategory::AllDay,
            (true, false) => ShiftCategory::Opening,
            (false, true) => ShiftCategory::Closing,
            (false, false) => ShiftCategory::Midday,
        }
    }

    /// Category used for display. Lesson shifts are never highlighted.
    pub fn highlight(&self, shift: &Shift) -> Option<ShiftCategory> {
        if shift.kind == ShiftType::Lessons {
            return None;
        }
        match self.categorize(shift) {
            ShiftCategory::None => None,
            category => Some(category),
        }
    }
}

/// Categorize against the default 13:00 / 18:00 marks.
pub fn categorize(shift: &Shift) -> ShiftCategory {
    CoreHours::default().categorize(shift)
}
