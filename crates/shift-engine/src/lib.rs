//! # shift-engine
//!
//! Scheduling computation and time-off reconciliation for weekly staff
//! schedules.
//!
//! The query side is pure: worked hours, shift classification, and staffing
//! counts are functions over a schedule-week snapshot. The mutation side keeps
//! request- and rule-derived OFF markers consistent across schedule weeks
//! without ever writing to a published week.
//!
//! ## Modules
//!
//! - [`time`]: interval merging and the unpaid-break deduction
//! - [`classify`]: opening / closing / all-day / midday classification
//! - [`staffing`]: per-day opening and closing headcounts by shift kind
//! - [`hours`]: daily and weekly worked-hours totals, overtime flags
//! - [`calendar`]: Sunday week anchoring and [`WeekId`] addressing
//! - [`store`]: store traits consumed from the document store, plus [`MemoryStore`]
//! - [`reconcile`]: apply / remove / regenerate derived OFF markers
//! - [`lifecycle`]: time-off request state machine and rule editor
//! - [`model`]: shifts, schedule weeks, requests, rules, workers
//! - [`config`]: engine configuration
//! - [`error`]: error types

pub mod calendar;
pub mod classify;
pub mod config;
pub mod error;
pub mod hours;
pub mod lifecycle;
pub mod model;
pub mod reconcile;
pub mod staffing;
pub mod store;
pub mod time;

pub use calendar::{sunday_of_week, WeekId};
pub use classify::{categorize, CoreHours, ShiftCategory};
pub use config::EngineConfig;
pub use error::EngineError;
pub use hours::{daily_hours, week_summary, weekly_hours, WorkerHours};
pub use lifecycle::{TimeOff, Transition, SYSTEM_APPROVER};
pub use model::{
    DayKey, NewOffRequest, OffRequest, OffRule, RequestStatus, ScheduleWeek, Shift, ShiftOrigin,
    ShiftType, TimeDetail, WeekShifts, Worker, WorkerWeek,
};
pub use reconcile::{ReconcileReport, Reconciler};
pub use staffing::{daily_counts, staffing_counts, StaffingCount};
pub use store::{MemoryStore, OffRequestStore, ScheduleWeekStore, StoreSnapshot, WorkerStore};
pub use time::{merge_intervals, worked_hours, BreakPolicy, Interval};
