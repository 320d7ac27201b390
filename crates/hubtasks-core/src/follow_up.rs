//! Automatic follow-ups after calls and meetings.
//!
//! When a call or meeting is completed and the hub has auto follow-up
//! enabled, a pending `follow_up` task is proposed a fixed offset later,
//! inside working hours, linked to the same customer, lead and assignee.

use chrono::{DateTime, Duration, Utc};

use crate::settings::TaskSettings;
use crate::task::{Priority, Task, TaskStatus, TaskType};
use crate::working_hours;

/// Days between completing a call/meeting and its follow-up.
pub const DEFAULT_FOLLOW_UP_OFFSET_DAYS: u32 = 3;

/// Builds follow-up tasks for completed calls and meetings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpPolicy {
    offset: Duration,
}

impl Default for FollowUpPolicy {
    fn default() -> Self {
        Self::with_offset_days(DEFAULT_FOLLOW_UP_OFFSET_DAYS)
    }
}

impl FollowUpPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset_days(days: u32) -> Self {
        Self {
            offset: Duration::days(days as i64),
        }
    }

    /// Current offset
    pub fn offset(&self) -> Duration {
        self.offset
    }

    /// Whether completing `task` warrants a follow-up at all.
    ///
    /// False once the caller has recorded a follow-up for this completion.
    pub fn applies_to(&self, task: &Task, settings: &TaskSettings) -> bool {
        settings.auto_follow_up_enabled
            && task.task_type.spawns_follow_up()
            && task.status == TaskStatus::Completed
            && task.follow_up_id.is_none()
    }

    /// Propose the follow-up for a just-completed call or meeting.
    pub fn build_follow_up(
        &self,
        task: &Task,
        settings: &TaskSettings,
        now: DateTime<Utc>,
    ) -> Option<Task> {
        if !self.applies_to(task, settings) {
            return None;
        }

        let due_at = working_hours::clamp(now.checked_add_signed(self.offset)?, settings);
        let completed_at = task.completed_at.unwrap_or(now);

        let priority = match task.priority {
            Priority::Urgent => Priority::High,
            _ => Priority::Medium,
        };

        let mut follow_up = Task::new(format!("Follow-up: {}", task.title), TaskType::FollowUp)
            .with_id(follow_up_id(task, completed_at))
            .with_priority(priority)
            .with_due_at(due_at)
            .with_reminder_minutes(settings.default_reminder_minutes);
        follow_up.assignee_id = task.assignee_id.clone();
        follow_up.customer_id = task.customer_id.clone();
        follow_up.lead_id = task.lead_id.clone();
        follow_up.created_at = now;
        follow_up.updated_at = now;

        Some(follow_up)
    }
}

/// Stable per completion event, so a retried tick proposes the same id.
fn follow_up_id(task: &Task, completed_at: DateTime<Utc>) -> String {
    format!("{}-follow-up-{}", task.id, completed_at.timestamp())
}
