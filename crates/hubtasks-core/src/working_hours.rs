//! Working-hours clamp for generated due dates.
//!
//! Only timestamps the engine generates (next occurrences, follow-ups) are
//! clamped. A `due_at` entered by a user is never moved.

use chrono::{DateTime, Utc};

use crate::settings::TaskSettings;

/// Move `timestamp` into the configured working hours.
///
/// - before start: start of the same day
/// - at or after end: start of the next day
/// - otherwise unchanged
///
/// A timestamp on the last representable day is returned as is.
pub fn clamp(timestamp: DateTime<Utc>, settings: &TaskSettings) -> DateTime<Utc> {
    if is_within(timestamp, settings) {
        return timestamp;
    }

    let date = timestamp.date_naive();
    let day = if timestamp.time() < settings.working_hours_start {
        Some(date)
    } else {
        date.succ_opt()
    };

    day.map_or(timestamp, |day| {
        day.and_time(settings.working_hours_start).and_utc()
    })
}

/// Whether `timestamp` already falls inside working hours.
pub fn is_within(timestamp: DateTime<Utc>, settings: &TaskSettings) -> bool {
    let time = timestamp.time();
    time >= settings.working_hours_start && time < settings.working_hours_end
}
