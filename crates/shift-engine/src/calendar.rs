//! Week anchoring and document addressing.
//!
//! Every schedule week is anchored on its Sunday. Two callers that start from
//! any date inside the same week must land on the same [`WeekId`], so the id is
//! always computed from [`sunday_of_week`] and never from the caller's date.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::model::DayKey;

/// The Sunday on or before `date`.
pub fn sunday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(DayKey::of(date).offset())
}

/// The calendar date of `day` within the week anchored on `week_of`.
pub fn date_in_week(week_of: NaiveDate, day: DayKey) -> NaiveDate {
    sunday_of_week(week_of) + Duration::days(day.offset())
}

/// Every date from `start` to `end`, both inclusive. Empty when `end < start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Today's date in the company's timezone.
pub fn local_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Address of one company's schedule week: `{companyId}_{YYYY-MM-DD}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekId {
    company_id: String,
    week_of: NaiveDate,
}

impl WeekId {
    /// The week containing `date`, whatever day of the week it is.
    pub fn containing(company_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            company_id: company_id.into(),
            week_of: sunday_of_week(date),
        }
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn week_of(&self) -> NaiveDate {
        self.week_of
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.company_id, self.week_of.format("%Y-%m-%d"))
    }
}
