//! Plain-text rendering for terminal output.

use std::collections::BTreeMap;
use std::fmt::Write;

use shift_engine::{DayKey, ShiftType, StaffingCount, WorkerHours};

/// One row per worker: daily hours, weekly total, and an overtime marker.
pub fn hours_table(summary: &[WorkerHours]) -> String {
    let width = summary
        .iter()
        .map(|h| h.uid.len())
        .max()
        .unwrap_or(0)
        .max("worker".len());

    let mut out = String::new();
    let _ = write!(out, "{:<width$}", "worker");
    for day in DayKey::ALL {
        let _ = write!(out, " {:>5}", day.as_str());
    }
    let _ = writeln!(out, " {:>6}", "week");

    for hours in summary {
        let _ = write!(out, "{:<width$}", hours.uid);
        for day in DayKey::ALL {
            let value = hours.daily.get(&day).copied().unwrap_or(0.0);
            let _ = write!(out, " {:>5}", format_hours(value));
        }
        let _ = write!(out, " {:>6}", format_hours(hours.weekly));
        if hours.overtime {
            out.push_str("  OT");
        }
        out.push('\n');
    }
    out
}

/// `GUARD sun=2 mon=2-1 ...`
pub fn counts_line(kind: ShiftType, counts: &BTreeMap<DayKey, StaffingCount>) -> String {
    let cells: Vec<String> = counts
        .iter()
        .map(|(day, count)| format!("{}={}", day, count))
        .collect();
    format!("{} {}\n", kind, cells.join(" "))
}

fn format_hours(hours: f64) -> String {
    if hours == 0.0 {
        "-".to_string()
    } else {
        format!("{:.2}", hours)
    }
}
