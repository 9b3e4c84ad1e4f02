//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! valid configuration.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::classify::CoreHours;
use crate::error::Result;
use crate::time::BreakPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// The company's local timezone. Decides what "today" and "this week" mean.
    pub timezone: Tz,
    /// Requests starting at least this many days out are approved on submission.
    pub advance_notice_days: i64,
    pub core_hours: CoreHours,
    pub breaks: BreakPolicy,
    /// Weekly hours above this are flagged for review. Nothing is enforced.
    pub overtime_threshold_hours: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            advance_notice_days: 14,
            core_hours: CoreHours::default(),
            breaks: BreakPolicy::default(),
            overtime_threshold_hours: 40.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = EngineConfig::from_json(
            r#"{"timezone":"America/Chicago","coreHours":{"opening":"12:00"},"breaks":{"breakMinutes":45}}"#,
        )
        .unwrap();
        assert_eq!(config.timezone, chrono_tz::America::Chicago);
        assert_eq!(config.core_hours.opening.format("%H:%M").to_string(), "12:00");
        assert_eq!(config.core_hours.closing.format("%H:%M").to_string(), "18:00");
        assert_eq!(config.breaks.break_minutes, 45);
        assert_eq!(config.breaks.adult_threshold_hours, 8);
        assert_eq!(config.advance_notice_days, 14);
    }
}
