//! Schedule data model: shifts, schedule weeks, time-off requests, and rules.
//!
//! A company's schedule is a tree: `company → week → worker → day → [Shift]`.
//! Each level is an explicit typed map so day keys and shift types are checked
//! at compile time rather than carried around as strings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::time::hhmm;

pub type WorkerId = String;

/// One day of a worker's week. `None` is an explicitly cleared day.
pub type WorkerWeek = BTreeMap<DayKey, Option<Vec<Shift>>>;

/// The `shifts` field of a schedule week, keyed by worker uid.
pub type WeekShifts = BTreeMap<WorkerId, WorkerWeek>;

// ---------------------------------------------------------------------------
// Day keys
// ---------------------------------------------------------------------------

/// Day of a Sunday-anchored schedule week. Ordering follows the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayKey {
    pub const ALL: [DayKey; 7] = [
        DayKey::Sun,
        DayKey::Mon,
        DayKey::Tue,
        DayKey::Wed,
        DayKey::Thu,
        DayKey::Fri,
        DayKey::Sat,
    ];

    /// The day key a calendar date falls on.
    pub fn of(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    /// Days since the Sunday that anchors the week.
    pub fn offset(self) -> i64 {
        self.weekday().num_days_from_sunday() as i64
    }

    pub fn weekday(self) -> Weekday {
        match self {
            DayKey::Sun => Weekday::Sun,
            DayKey::Mon => Weekday::Mon,
            DayKey::Tue => Weekday::Tue,
            DayKey::Wed => Weekday::Wed,
            DayKey::Thu => Weekday::Thu,
            DayKey::Fri => Weekday::Fri,
            DayKey::Sat => Weekday::Sat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayKey::Sun => "sun",
            DayKey::Mon => "mon",
            DayKey::Tue => "tue",
            DayKey::Wed => "wed",
            DayKey::Thu => "thu",
            DayKey::Fri => "fri",
            DayKey::Sat => "sat",
        }
    }
}

impl From<Weekday> for DayKey {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayKey::Sun,
            Weekday::Mon => DayKey::Mon,
            Weekday::Tue => DayKey::Tue,
            Weekday::Wed => DayKey::Wed,
            Weekday::Thu => DayKey::Thu,
            Weekday::Fri => DayKey::Fri,
            Weekday::Sat => DayKey::Sat,
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        DayKey::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::Validation(format!("unknown day key '{}'", s)))
    }
}

// ---------------------------------------------------------------------------
// Shifts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftType {
    Guard,
    Manager,
    Front,
    Lessons,
    Camp,
    Off,
    SwimMeet,
}

impl ShiftType {
    /// OFF and SWIM_MEET entries are not paid work and may be all-day.
    pub fn is_work(self) -> bool {
        !matches!(self, ShiftType::Off | ShiftType::SwimMeet)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShiftType::Guard => "GUARD",
            ShiftType::Manager => "MANAGER",
            ShiftType::Front => "FRONT",
            ShiftType::Lessons => "LESSONS",
            ShiftType::Camp => "CAMP",
            ShiftType::Off => "OFF",
            ShiftType::SwimMeet => "SWIM_MEET",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "GUARD" => Ok(ShiftType::Guard),
            "MANAGER" => Ok(ShiftType::Manager),
            "FRONT" => Ok(ShiftType::Front),
            "LESSONS" => Ok(ShiftType::Lessons),
            "CAMP" => Ok(ShiftType::Camp),
            "OFF" => Ok(ShiftType::Off),
            "SWIM_MEET" => Ok(ShiftType::SwimMeet),
            _ => Err(EngineError::Validation(format!("unknown shift type '{}'", s))),
        }
    }
}

/// Which entity created a shift marker.
///
/// Request- and rule-derived OFF markers carry the owning id so they can be
/// removed later without touching OFF time a manager entered by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftOrigin {
    #[default]
    Manual,
    Request(String),
    Rule(String),
}

impl ShiftOrigin {
    pub fn is_manual(&self) -> bool {
        matches!(self, ShiftOrigin::Manual)
    }
}

/// One entry in a worker-day's shift list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(rename = "type")]
    pub kind: ShiftType,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub end: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "ShiftOrigin::is_manual")]
    pub origin: ShiftOrigin,
}

impl Shift {
    pub fn timed(kind: ShiftType, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            kind,
            start: Some(start),
            end: Some(end),
            origin: ShiftOrigin::Manual,
        }
    }

    pub fn all_day(kind: ShiftType) -> Self {
        Self {
            kind,
            start: None,
            end: None,
            origin: ShiftOrigin::Manual,
        }
    }

    /// Build the OFF marker a reconciliation pass writes for `detail`.
    pub fn off_marker(detail: &TimeDetail, origin: ShiftOrigin) -> Self {
        let (start, end) = detail.window();
        Self {
            kind: ShiftType::Off,
            start,
            end,
            origin,
        }
    }

    pub fn is_all_day_off(&self) -> bool {
        self.kind == ShiftType::Off && (self.start.is_none() || self.end.is_none())
    }

    /// Tag family of request-derived OFF markers.
    pub fn is_request_marker(&self) -> bool {
        self.kind == ShiftType::Off && matches!(self.origin, ShiftOrigin::Request(_))
    }

    pub fn is_request_marker_for(&self, request_id: &str) -> bool {
        self.kind == ShiftType::Off
            && matches!(&self.origin, ShiftOrigin::Request(id) if id == request_id)
    }

    /// Tag family of rule-derived OFF markers.
    pub fn is_rule_marker(&self) -> bool {
        self.kind == ShiftType::Off && matches!(self.origin, ShiftOrigin::Rule(_))
    }
}

/// The time part of a time-off request or rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDetail {
    AllDay,
    Window { start: NaiveTime, end: NaiveTime },
}

impl TimeDetail {
    pub fn is_all_day(&self) -> bool {
        matches!(self, TimeDetail::AllDay)
    }

    fn window(&self) -> (Option<NaiveTime>, Option<NaiveTime>) {
        match *self {
            TimeDetail::AllDay => (None, None),
            TimeDetail::Window { start, end } => (Some(start), Some(end)),
        }
    }

    /// Build from the loose `isAllDay + startTime? + endTime?` document shape.
    pub fn from_parts(
        all_day: bool,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<Self> {
        if all_day {
            return Ok(TimeDetail::AllDay);
        }
        match (start, end) {
            (Some(start), Some(end)) if start < end => Ok(TimeDetail::Window { start, end }),
            (Some(start), Some(end)) => Err(EngineError::Validation(format!(
                "start time {} must be before end time {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ))),
            _ => Err(EngineError::Validation(
                "a partial-day entry needs both a start and an end time".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule weeks
// ---------------------------------------------------------------------------

/// One company's schedule for one Sunday-anchored week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWeek {
    pub company_id: String,
    pub week_of: NaiveDate,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub shifts: WeekShifts,
}

impl ScheduleWeek {
    pub fn draft(company_id: impl Into<String>, week_of: NaiveDate) -> Self {
        Self {
            company_id: company_id.into(),
            week_of,
            is_published: false,
            shifts: WeekShifts::new(),
        }
    }

    /// The shift list of one worker-day, empty when absent or cleared.
    pub fn worker_day(&self, worker_id: &str, day: DayKey) -> &[Shift] {
        self.shifts
            .get(worker_id)
            .and_then(|week| week.get(&day))
            .and_then(|slot| slot.as_deref())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Workers and rules
// ---------------------------------------------------------------------------

/// A recurring weekly time-off pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffRule {
    pub id: String,
    pub day: DayKey,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub end_time: Option<NaiveTime>,
}

impl OffRule {
    pub fn time_detail(&self) -> Result<TimeDetail> {
        TimeDetail::from_parts(self.all_day, self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub uid: WorkerId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub title: String,
    /// Years of service.
    #[serde(default)]
    pub yos: u32,
    #[serde(default)]
    pub is_minor: bool,
    #[serde(default)]
    pub off_rules: Vec<OffRule>,
}

// ---------------------------------------------------------------------------
// Time-off requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
    Retracted,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
            RequestStatus::Retracted => "retracted",
        })
    }
}

/// The data a worker supplies when asking for time off.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffRequest {
    pub worker_id: WorkerId,
    pub company_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffRequest {
    pub id: String,
    pub worker_id: WorkerId,
    pub company_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hhmm::option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub is_auto_approved: bool,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denied_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denied_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retracted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retracted_by: Option<String>,
}

impl OffRequest {
    pub fn time_detail(&self) -> Result<TimeDetail> {
        TimeDetail::from_parts(self.is_all_day, self.start_time, self.end_time)
    }

    /// Drop every approval, denial, and retraction stamp.
    pub(crate) fn clear_resolution(&mut self) {
        self.is_auto_approved = false;
        self.approved_at = None;
        self.approved_by = None;
        self.denied_at = None;
        self.denied_by = None;
        self.retracted_at = None;
        self.retracted_by = None;
    }
}
