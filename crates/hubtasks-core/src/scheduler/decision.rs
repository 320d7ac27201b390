//! What a scheduler tick decided for one task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Actions proposed for a task; the caller carries them out.
///
/// Generated tasks should be persisted in the same transaction as the
/// status change that triggered them, together with [`apply_to`] on the
/// source task, so a retried tick cannot create them twice.
///
/// [`apply_to`]: ScheduleDecision::apply_to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDecision {
    /// Dispatch the reminder for the current due date
    pub fire_reminder: bool,
    /// Task is open and past its due date (informational)
    pub overdue: bool,
    /// Next occurrence of a recurring task
    pub new_occurrence: Option<Task>,
    /// Follow-up for a completed call or meeting
    pub new_follow_up: Option<Task>,
}

impl ScheduleDecision {
    /// Nothing to dispatch or persist.
    pub fn is_empty(&self) -> bool {
        !self.fire_reminder && self.new_occurrence.is_none() && self.new_follow_up.is_none()
    }

    /// Record the decision on the source task once it has been carried out.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }
        if self.fire_reminder {
            task.reminder_fired_at = Some(now);
        }
        if let Some(occurrence) = &self.new_occurrence {
            task.next_occurrence_id = Some(occurrence.id.clone());
        }
        if let Some(follow_up) = &self.new_follow_up {
            task.follow_up_id = Some(follow_up.id.clone());
        }
        task.updated_at = now;
    }
}
