//! Time-off request lifecycle and the recurring-rule editor.
//!
//! ```text
//!   submit ──► pending ──approve──► approved ──retract──► retracted
//!     │           │                  ▲    │
//!     │           └──deny──► denied ─┘    └──deny──► denied
//!     └── (start ≥ advance notice) ──► approved by "system"
//! ```
//!
//! Each transition writes the request document first and surfaces any failure
//! to the caller. Schedule reconciliation that follows is best-effort per day
//! and reported through [`ReconcileReport`], never as an error.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use crate::calendar::local_today;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::{NewOffRequest, OffRequest, OffRule, RequestStatus, ShiftOrigin, TimeDetail};
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::store::{OffRequestStore, ScheduleWeekStore, WorkerStore};

/// Approver recorded on requests approved at submission time.
pub const SYSTEM_APPROVER: &str = "system";

/// The request as stored after a transition, and what reconciliation did.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub request: OffRequest,
    pub report: ReconcileReport,
}

/// Mutation entry points for time-off requests and rules.
pub struct TimeOff<'a, S: ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S> TimeOff<'a, S>
where
    S: ScheduleWeekStore + OffRequestStore + WorkerStore + ?Sized,
{
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Record a new request.
    ///
    /// A request whose start date is at least the advance-notice window away
    /// from today is approved on the spot and its markers applied.
    pub fn submit_request(&self, new: &NewOffRequest, now: DateTime<Utc>) -> Result<Transition> {
        let mut request = validate_submission(new, now)?;

        let today = local_today(now, self.config.timezone);
        let notice_cutoff = Duration::try_days(self.config.advance_notice_days)
            .and_then(|notice| today.checked_add_signed(notice))
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "advance notice of {} days is out of range",
                    self.config.advance_notice_days
                ))
            })?;
        if request.start_date >= notice_cutoff {
            request.status = RequestStatus::Approved;
            request.is_auto_approved = true;
            request.approved_at = Some(now);
            request.approved_by = Some(SYSTEM_APPROVER.to_string());
        }

        request.id = self.store.add_request(&request)?;
        info!(
            request_id = %request.id,
            worker_id = %request.worker_id,
            status = %request.status,
            "time-off request submitted"
        );

        let report = if request.status == RequestStatus::Approved {
            self.apply(&request)?
        } else {
            ReconcileReport::default()
        };
        Ok(Transition { request, report })
    }

    /// Approve a pending or previously denied request.
    pub fn approve(&self, request_id: &str, approver: &str, now: DateTime<Utc>) -> Result<Transition> {
        let mut request = self.load(request_id)?;
        if !matches!(request.status, RequestStatus::Pending | RequestStatus::Denied) {
            return Err(EngineError::InvalidTransition {
                from: request.status,
                action: "approve",
            });
        }

        request.clear_resolution();
        request.status = RequestStatus::Approved;
        request.approved_at = Some(now);
        request.approved_by = Some(approver.to_string());
        self.store.put_request(&request)?;
        info!(request_id, approver, "time-off request approved");

        let report = self.apply(&request)?;
        Ok(Transition { request, report })
    }

    /// Deny a pending or approved request.
    ///
    /// Denying an approved request removes its markers from every draft week
    /// in range; callers should confirm that with the manager first.
    pub fn deny(&self, request_id: &str, manager: &str, now: DateTime<Utc>) -> Result<Transition> {
        let mut request = self.load(request_id)?;
        let report = match request.status {
            RequestStatus::Pending => ReconcileReport::default(),
            RequestStatus::Approved => self.remove(&request),
            from => {
                return Err(EngineError::InvalidTransition {
                    from,
                    action: "deny",
                })
            }
        };

        request.clear_resolution();
        request.status = RequestStatus::Denied;
        request.denied_at = Some(now);
        request.denied_by = Some(manager.to_string());
        self.store.put_request(&request)?;
        info!(request_id, manager, "time-off request denied");

        Ok(Transition { request, report })
    }

    /// Withdraw an approved request. Only the requesting worker may retract.
    pub fn retract(&self, request_id: &str, worker_uid: &str, now: DateTime<Utc>) -> Result<Transition> {
        let mut request = self.load(request_id)?;
        if request.status != RequestStatus::Approved {
            return Err(EngineError::InvalidTransition {
                from: request.status,
                action: "retract",
            });
        }
        if request.worker_id != worker_uid {
            return Err(EngineError::Forbidden(format!(
                "request {} belongs to another worker",
                request_id
            )));
        }

        let report = self.remove(&request);
        request.clear_resolution();
        request.status = RequestStatus::Retracted;
        request.retracted_at = Some(now);
        request.retracted_by = Some(worker_uid.to_string());
        self.store.put_request(&request)?;
        info!(request_id, worker_uid, "time-off request retracted");

        Ok(Transition { request, report })
    }

    /// Replace a worker's recurring rules and rebuild their markers on every
    /// draft week from the current week onward.
    pub fn save_rules(
        &self,
        company_id: &str,
        worker_id: &str,
        rules: &[OffRule],
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        validate_rules(rules)?;
        if self.store.get_worker(worker_id)?.is_none() {
            return Err(EngineError::NotFound(format!("worker {}", worker_id)));
        }

        self.store.set_off_rules(worker_id, rules)?;
        info!(worker_id, rules = rules.len(), "off rules saved");

        let today = local_today(now, self.config.timezone);
        Reconciler::new(self.store, company_id).regenerate_rules(worker_id, rules, today)
    }

    fn load(&self, request_id: &str) -> Result<OffRequest> {
        self.store
            .get_request(request_id)?
            .ok_or_else(|| EngineError::NotFound(format!("request {}", request_id)))
    }

    fn apply(&self, request: &OffRequest) -> Result<ReconcileReport> {
        let detail = request.time_detail()?;
        Ok(Reconciler::new(self.store, &request.company_id).apply_range(
            request.start_date,
            request.end_date,
            &request.worker_id,
            &detail,
            &ShiftOrigin::Request(request.id.clone()),
        ))
    }

    fn remove(&self, request: &OffRequest) -> ReconcileReport {
        Reconciler::new(self.store, &request.company_id).remove_range(
            request.start_date,
            request.end_date,
            &request.worker_id,
            |shift| shift.is_request_marker_for(&request.id),
        )
    }
}

fn validate_submission(new: &NewOffRequest, now: DateTime<Utc>) -> Result<OffRequest> {
    if new.worker_id.trim().is_empty() {
        return Err(EngineError::Validation("worker is required".to_string()));
    }
    if new.company_id.trim().is_empty() {
        return Err(EngineError::Validation("company is required".to_string()));
    }
    let start_date = new
        .start_date
        .ok_or_else(|| EngineError::Validation("start date is required".to_string()))?;
    let end_date = new
        .end_date
        .ok_or_else(|| EngineError::Validation("end date is required".to_string()))?;
    if end_date < start_date {
        return Err(EngineError::Validation(format!(
            "end date {} is before start date {}",
            end_date, start_date
        )));
    }

    let detail = TimeDetail::from_parts(new.is_all_day, new.start_time, new.end_time)?;
    let (start_time, end_time) = match detail {
        TimeDetail::AllDay => (None, None),
        TimeDetail::Window { start, end } => (Some(start), Some(end)),
    };

    Ok(OffRequest {
        id: String::new(),
        worker_id: new.worker_id.clone(),
        company_id: new.company_id.clone(),
        start_date,
        end_date,
        is_all_day: detail.is_all_day(),
        start_time,
        end_time,
        reason: new.reason.clone(),
        status: RequestStatus::Pending,
        is_auto_approved: false,
        requested_at: now,
        approved_at: None,
        approved_by: None,
        denied_at: None,
        denied_by: None,
        retracted_at: None,
        retracted_by: None,
    })
}

fn validate_rules(rules: &[OffRule]) -> Result<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if rule.id.trim().is_empty() {
            return Err(EngineError::Validation("rule id is required".to_string()));
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(EngineError::Validation(format!("duplicate rule id '{}'", rule.id)));
        }
        rule.time_detail()?;
    }
    Ok(())
}
