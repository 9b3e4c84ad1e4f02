//! Store interfaces consumed from the external document store, plus an
//! in-memory implementation.
//!
//! The engine never assumes a global lock. Each trait method is one independent
//! document operation; `patch_shifts` merges at the worker-day level so writers
//! touching different worker-days never clobber each other.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::WeekId;
use crate::error::{EngineError, Result};
use crate::model::{OffRequest, OffRule, ScheduleWeek, WeekShifts, Worker};

/// Schedule-week documents, addressed by [`WeekId`].
pub trait ScheduleWeekStore {
    fn get_week(&self, id: &WeekId) -> Result<Option<ScheduleWeek>>;

    /// Return the existing week, or create a draft seeded with `initial`.
    fn create_week_if_absent(&self, id: &WeekId, initial: WeekShifts) -> Result<ScheduleWeek>;

    /// Merge `patch` into the week's `shifts`.
    ///
    /// Every worker-day present in the patch replaces the stored one (a `None`
    /// slot stores an explicit null). Worker-days absent from the patch are left
    /// untouched.
    fn patch_shifts(&self, id: &WeekId, patch: &WeekShifts) -> Result<()>;

    /// All weeks of `company_id` anchored on or after `from`, oldest first.
    fn weeks_from(&self, company_id: &str, from: NaiveDate) -> Result<Vec<ScheduleWeek>>;
}

/// Time-off request documents.
pub trait OffRequestStore {
    /// Persist a new request and return the id the store assigned to it.
    fn add_request(&self, request: &OffRequest) -> Result<String>;

    fn get_request(&self, id: &str) -> Result<Option<OffRequest>>;

    /// Overwrite an existing request document.
    fn put_request(&self, request: &OffRequest) -> Result<()>;
}

/// Worker documents.
pub trait WorkerStore {
    fn get_worker(&self, uid: &str) -> Result<Option<Worker>>;

    fn set_off_rules(&self, uid: &str, rules: &[OffRule]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub weeks: Vec<ScheduleWeek>,
    pub requests: Vec<OffRequest>,
    pub workers: Vec<Worker>,
}

#[derive(Debug, Default)]
struct State {
    weeks: BTreeMap<WeekId, ScheduleWeek>,
    requests: BTreeMap<String, OffRequest>,
    workers: BTreeMap<String, Worker>,
    failing_weeks: HashSet<WeekId>,
    failing_requests: bool,
}

/// A thread-safe in-memory store implementing every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let state = State {
            weeks: snapshot
                .weeks
                .into_iter()
                .map(|mut w| {
                    let id = WeekId::containing(w.company_id.clone(), w.week_of);
                    w.week_of = id.week_of();
                    (id, w)
                })
                .collect(),
            requests: snapshot
                .requests
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
            workers: snapshot
                .workers
                .into_iter()
                .map(|w| (w.uid.clone(), w))
                .collect(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let state = self.lock()?;
        Ok(StoreSnapshot {
            weeks: state.weeks.values().cloned().collect(),
            requests: state.requests.values().cloned().collect(),
            workers: state.workers.values().cloned().collect(),
        })
    }

    /// Insert or replace a whole week. The anchor is normalized to Sunday.
    pub fn put_week(&self, mut week: ScheduleWeek) -> Result<()> {
        let id = WeekId::containing(week.company_id.clone(), week.week_of);
        week.week_of = id.week_of();
        self.lock()?.weeks.insert(id, week);
        Ok(())
    }

    pub fn put_worker(&self, worker: Worker) -> Result<()> {
        self.lock()?.workers.insert(worker.uid.clone(), worker);
        Ok(())
    }

    pub fn publish(&self, id: &WeekId) -> Result<()> {
        self.set_published(id, true)
    }

    pub fn unpublish(&self, id: &WeekId) -> Result<()> {
        self.set_published(id, false)
    }

    /// Make every later write to `id` fail, as an unreachable store would.
    pub fn fail_writes_to(&self, id: &WeekId) -> Result<()> {
        self.lock()?.failing_weeks.insert(id.clone());
        Ok(())
    }

    /// Make request document writes fail (or succeed again).
    pub fn set_request_writes_failing(&self, failing: bool) -> Result<()> {
        self.lock()?.failing_requests = failing;
        Ok(())
    }

    fn set_published(&self, id: &WeekId, published: bool) -> Result<()> {
        let mut state = self.lock()?;
        let week = state
            .weeks
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(format!("schedule week {}", id)))?;
        week.is_published = published;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| EngineError::StoreRead("memory store lock poisoned".to_string()))
    }
}

impl ScheduleWeekStore for MemoryStore {
    fn get_week(&self, id: &WeekId) -> Result<Option<ScheduleWeek>> {
        Ok(self.lock()?.weeks.get(id).cloned())
    }

    fn create_week_if_absent(&self, id: &WeekId, initial: WeekShifts) -> Result<ScheduleWeek> {
        let mut state = self.lock()?;
        if let Some(existing) = state.weeks.get(id) {
            return Ok(existing.clone());
        }
        if state.failing_weeks.contains(id) {
            return Err(EngineError::StoreWrite(format!("cannot create {}", id)));
        }
        let mut week = ScheduleWeek::draft(id.company_id(), id.week_of());
        week.shifts = initial;
        state.weeks.insert(id.clone(), week.clone());
        Ok(week)
    }

    fn patch_shifts(&self, id: &WeekId, patch: &WeekShifts) -> Result<()> {
        let mut state = self.lock()?;
        if state.failing_weeks.contains(id) {
            return Err(EngineError::StoreWrite(format!("cannot patch {}", id)));
        }
        let week = state
            .weeks
            .get_mut(id)
            .ok_or_else(|| EngineError::StoreWrite(format!("no such document {}", id)))?;
        for (worker_id, days) in patch {
            let stored = week.shifts.entry(worker_id.clone()).or_default();
            for (day, slot) in days {
                stored.insert(*day, slot.clone());
            }
        }
        Ok(())
    }

    fn weeks_from(&self, company_id: &str, from: NaiveDate) -> Result<Vec<ScheduleWeek>> {
        Ok(self
            .lock()?
            .weeks
            .iter()
            .filter(|(id, _)| id.company_id() == company_id && id.week_of() >= from)
            .map(|(_, week)| week.clone())
            .collect())
    }
}

impl OffRequestStore for MemoryStore {
    fn add_request(&self, request: &OffRequest) -> Result<String> {
        let mut state = self.lock()?;
        if state.failing_requests {
            return Err(EngineError::StoreWrite("cannot add request".to_string()));
        }
        let mut n = state.requests.len() + 1;
        let id = loop {
            let candidate = format!("req-{}", n);
            if !state.requests.contains_key(&candidate) {
                break candidate;
            }
            n += 1;
        };
        let mut stored = request.clone();
        stored.id = id.clone();
        state.requests.insert(id.clone(), stored);
        Ok(id)
    }

    fn get_request(&self, id: &str) -> Result<Option<OffRequest>> {
        Ok(self.lock()?.requests.get(id).cloned())
    }

    fn put_request(&self, request: &OffRequest) -> Result<()> {
        let mut state = self.lock()?;
        if state.failing_requests {
            return Err(EngineError::StoreWrite(format!(
                "cannot update request {}",
                request.id
            )));
        }
        if !state.requests.contains_key(&request.id) {
            return Err(EngineError::NotFound(format!("request {}", request.id)));
        }
        state.requests.insert(request.id.clone(), request.clone());
        Ok(())
    }
}

impl WorkerStore for MemoryStore {
    fn get_worker(&self, uid: &str) -> Result<Option<Worker>> {
        Ok(self.lock()?.workers.get(uid).cloned())
    }

    fn set_off_rules(&self, uid: &str, rules: &[OffRule]) -> Result<()> {
        let mut state = self.lock()?;
        let worker = state
            .workers
            .get_mut(uid)
            .ok_or_else(|| EngineError::NotFound(format!("worker {}", uid)))?;
        worker.off_rules = rules.to_vec();
        Ok(())
    }
}
