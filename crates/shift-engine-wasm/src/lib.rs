//! WASM bindings for shift-engine.
//!
//! Exposes the read-only schedule queries to the JavaScript UI layer via
//! `wasm-bindgen`. Schedule data crosses the boundary as JSON strings in the
//! same camelCase document shape the store persists.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p shift-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/shift-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/shift_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use shift_engine::hours::{daily_hours_with, weekly_hours_with};
use shift_engine::{BreakPolicy, CoreHours, Shift, ShiftType, WeekId, WeekShifts, Worker, WorkerWeek};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| js_err(&format!("Invalid {} JSON", what), e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_err("Serialization error", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Worked hours for one worker-day.
///
/// `shifts_json` is a JSON array of shift objects
/// (`{type, start?, end?, origin?}`). OFF and SWIM_MEET entries are ignored.
#[wasm_bindgen(js_name = "dailyHours")]
pub fn daily_hours(shifts_json: &str, is_minor: bool) -> Result<f64, JsValue> {
    let shifts: Vec<Shift> = parse_json(shifts_json, "shifts")?;
    Ok(daily_hours_with(&BreakPolicy::default(), &shifts, is_minor))
}

/// Worked hours for one worker's week.
///
/// `worker_week_json` maps day keys (`"sun"`..`"sat"`) to shift arrays or null.
#[wasm_bindgen(js_name = "weeklyHours")]
pub fn weekly_hours(worker_week_json: &str, is_minor: bool) -> Result<f64, JsValue> {
    let week: WorkerWeek = parse_json(worker_week_json, "worker week")?;
    Ok(weekly_hours_with(&BreakPolicy::default(), &week, is_minor))
}

/// Classify a single shift: `"ALL_DAY"`, `"OPENING"`, `"CLOSING"`, `"MIDDAY"`,
/// or `"NONE"`.
#[wasm_bindgen(js_name = "categorize")]
pub fn categorize(shift_json: &str) -> Result<String, JsValue> {
    let shift: Shift = parse_json(shift_json, "shift")?;
    Ok(CoreHours::default().categorize(&shift).as_str().to_string())
}

/// Category used for highlighting, or `undefined` when the shift is not
/// highlighted (untimed entries and lesson shifts).
#[wasm_bindgen(js_name = "highlight")]
pub fn highlight(shift_json: &str) -> Result<Option<String>, JsValue> {
    let shift: Shift = parse_json(shift_json, "shift")?;
    Ok(CoreHours::default()
        .highlight(&shift)
        .map(|c| c.as_str().to_string()))
}

/// Staffing counts for one shift kind across the week.
///
/// `week_shifts_json` is the `shifts` field of a schedule week. Returns a JSON
/// object mapping each day key to `"N"` or `"OPEN-CLOSE"`.
#[wasm_bindgen(js_name = "dailyCounts")]
pub fn daily_counts(week_shifts_json: &str, kind: &str) -> Result<String, JsValue> {
    let week: WeekShifts = parse_json(week_shifts_json, "week shifts")?;
    let kind: ShiftType = kind.parse().map_err(|e| js_err("Invalid shift kind", e))?;
    to_json(&shift_engine::daily_counts(&week, kind))
}

/// Per-worker daily and weekly totals with overtime flags.
///
/// `roster_json` is a JSON array of worker objects; only `uid` and `isMinor`
/// are consulted. Returns a JSON array sorted by uid.
#[wasm_bindgen(js_name = "weekSummary")]
pub fn week_summary(
    week_shifts_json: &str,
    roster_json: &str,
    overtime_threshold_hours: f64,
) -> Result<String, JsValue> {
    let week: WeekShifts = parse_json(week_shifts_json, "week shifts")?;
    let roster: Vec<Worker> = parse_json(roster_json, "roster")?;

    let summary = shift_engine::week_summary(
        &week,
        &roster,
        &BreakPolicy::default(),
        overtime_threshold_hours,
    );
    to_json(&summary)
}

/// Document id of the schedule week containing `date` (`YYYY-MM-DD`).
#[wasm_bindgen(js_name = "weekId")]
pub fn week_id(company_id: &str, date: &str) -> Result<String, JsValue> {
    let date: NaiveDate = date
        .parse()
        .map_err(|e| js_err(&format!("Invalid date '{}'", date), e))?;
    Ok(WeekId::containing(company_id, date).to_string())
}
