//! Per-hub task settings.
//!
//! [`TaskSettings`] is resolved by the surrounding settings API and handed
//! to every scheduling function explicitly. The engine never mutates it.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Read-only settings snapshot consumed by the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSettings {
    /// Reminder lead time when a task has no override
    #[serde(default = "default_reminder_minutes")]
    pub default_reminder_minutes: u32,
    /// Create a follow-up after completing a call or meeting
    #[serde(default)]
    pub auto_follow_up_enabled: bool,
    #[serde(default = "default_working_hours_start", with = "hhmm")]
    pub working_hours_start: NaiveTime,
    #[serde(default = "default_working_hours_end", with = "hhmm")]
    pub working_hours_end: NaiveTime,
}

fn default_reminder_minutes() -> u32 {
    30
}
fn default_working_hours_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}
fn default_working_hours_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            default_reminder_minutes: default_reminder_minutes(),
            auto_follow_up_enabled: false,
            working_hours_start: default_working_hours_start(),
            working_hours_end: default_working_hours_end(),
        }
    }
}

impl TaskSettings {
    pub fn with_auto_follow_up(mut self, enabled: bool) -> Self {
        self.auto_follow_up_enabled = enabled;
        self
    }

    pub fn with_working_hours(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.working_hours_start = start;
        self.working_hours_end = end;
        self
    }

    pub fn with_default_reminder_minutes(mut self, minutes: u32) -> Self {
        self.default_reminder_minutes = minutes;
        self
    }

    /// Working hours must describe a non-empty span within one day.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.working_hours_start >= self.working_hours_end {
            return Err(ConfigError::InvalidValue {
                key: "tasks.working_hours_end".to_string(),
                message: format!(
                    "working hours end ({}) must be after start ({})",
                    self.working_hours_end.format("%H:%M"),
                    self.working_hours_start.format("%H:%M")
                ),
            });
        }
        Ok(())
    }
}

/// `"HH:MM"` on the wire; `"HH:MM:SS"` is accepted on input.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| format!("invalid time of day '{raw}' (expected HH:MM)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = TaskSettings::default();
        assert_eq!(settings.default_reminder_minutes, 30);
        assert!(!settings.auto_follow_up_enabled);
        assert_eq!(settings.working_hours_start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(settings.working_hours_end, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_times_serialize_as_hhmm() {
        let json = serde_json::to_value(TaskSettings::default()).unwrap();
        assert_eq!(json["working_hours_start"], "09:00");
        assert_eq!(json["working_hours_end"], "18:00");
    }

    #[test]
    fn test_accepts_seconds_on_input() {
        let settings: TaskSettings = serde_json::from_str(
            r#"{"working_hours_start": "08:30:00", "working_hours_end": "17:00"}"#,
        )
        .unwrap();
        assert_eq!(settings.working_hours_start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(settings.default_reminder_minutes, 30);
    }

    #[test]
    fn test_rejects_garbage_time() {
        let result: Result<TaskSettings, _> =
            serde_json::from_str(r#"{"working_hours_start": "nine"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_hours() {
        let settings = TaskSettings::default().with_working_hours(
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
