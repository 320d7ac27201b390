//! Reminder timing.
//!
//! A reminder fires once per `due_at`, somewhere in the window
//! `[due_at - lead time, due_at)`. After the deadline a task is overdue,
//! which is a separate signal and never a reminder.
//!
//! Nothing here mutates the task: after dispatching, the caller records
//! `reminder_fired_at = now`.

use chrono::{DateTime, Duration, Utc};

use crate::settings::TaskSettings;
use crate::task::Task;

/// Lead time in minutes, the task override winning over the settings default.
pub fn lead_minutes(task: &Task, settings: &TaskSettings) -> u32 {
    task.reminder_minutes_before
        .unwrap_or(settings.default_reminder_minutes)
}

/// When the reminder for the current `due_at` becomes due.
pub fn reminder_fire_time(task: &Task, settings: &TaskSettings) -> Option<DateTime<Utc>> {
    let due = task.due_at?;
    due.checked_sub_signed(Duration::minutes(lead_minutes(task, settings) as i64))
}

/// Whether a reminder should be dispatched at `now`.
pub fn due_reminder(task: &Task, settings: &TaskSettings, now: DateTime<Utc>) -> bool {
    let (Some(fire_at), Some(due)) = (reminder_fire_time(task, settings), task.due_at) else {
        return false;
    };

    if now < fire_at || now >= due {
        return false;
    }

    // A fire recorded before the current window belongs to an older due_at
    match task.reminder_fired_at {
        Some(fired) => fired < fire_at,
        None => true,
    }
}
