//! Task records: calls, meetings, emails, follow-ups and plain tasks.
//!
//! A [`Task`] is a value owned by the caller's persistence layer. The
//! scheduling engine only reads it and proposes new tasks; the helpers here
//! ([`Task::transition_to`], [`Task::reschedule`]) are what callers use to
//! apply lifecycle changes while keeping the reminder invariant intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TransitionError;
use crate::recurrence::RecurrenceRule;

/// Kind of work item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Task,
    Call,
    Meeting,
    Email,
    FollowUp,
}

impl TaskType {
    /// Calls and meetings are the only kinds that can spawn a follow-up.
    pub fn spawns_follow_up(&self) -> bool {
        matches!(self, TaskType::Call | TaskType::Meeting)
    }
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Task
    }
}

/// Task lifecycle status.
///
/// ```text
///   PENDING ──────> IN_PROGRESS ──────> COMPLETED
///     │  │                │                 │
///     │  └──────────────────────────────────┤ (quick complete)
///     │                   │                 │
///     └─────────┬─────────┘                 │
///               v                           │
///           CANCELLED                       │
///               │                           │
///               └────── reopen ─────> PENDING <┘
/// ```
///
/// Completed and cancelled are terminal for one occurrence; a recurring
/// task continues as a new pending task rather than being revived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        self.valid_transitions().contains(to)
    }

    /// Get valid next states for this state.
    pub fn valid_transitions(&self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Pending => &[
                TaskStatus::InProgress,
                TaskStatus::Completed,
                TaskStatus::Cancelled,
            ],
            TaskStatus::InProgress => &[TaskStatus::Completed, TaskStatus::Cancelled],
            // Reopen
            TaskStatus::Completed | TaskStatus::Cancelled => &[TaskStatus::Pending],
        }
    }

    /// Pending or in progress.
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Display priority. Has no effect on scheduling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Sort key for list views (lower = more urgent).
    pub fn sort_order(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

fn first_occurrence() -> u32 {
    1
}

/// A task, call, meeting, email or follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier
    pub id: String,
    /// Task title
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Deadline; required for reminders and recurrence
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Null means non-recurring
    #[serde(default)]
    pub recurrence_rule: Option<RecurrenceRule>,
    /// 1-based position within the recurrence series
    #[serde(default = "first_occurrence")]
    pub occurrence_index: u32,
    /// Id of the first task in the series (None for that task itself)
    #[serde(default)]
    pub series_id: Option<String>,
    /// Overrides `TaskSettings::default_reminder_minutes`
    #[serde(default)]
    pub reminder_minutes_before: Option<u32>,
    /// Last reminder dispatch for the current `due_at`
    #[serde(default)]
    pub reminder_fired_at: Option<DateTime<Utc>>,
    /// Follow-up generated from this task's completion
    #[serde(default)]
    pub follow_up_id: Option<String>,
    /// Occurrence generated from this task's completion
    #[serde(default)]
    pub next_occurrence_id: Option<String>,
    /// Duration for calls and meetings
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Outcome of a call or meeting
    #[serde(default)]
    pub result: String,
    /// Location for meetings
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub lead_id: Option<String>,
    /// Unix epoch when absent from the input
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task with default values.
    pub fn new(title: impl Into<String>, task_type: TaskType) -> Self {
        let now = Utc::now();
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            task_type,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            due_at: None,
            completed_at: None,
            recurrence_rule: None,
            occurrence_index: 1,
            series_id: None,
            reminder_minutes_before: None,
            reminder_fired_at: None,
            follow_up_id: None,
            next_occurrence_id: None,
            duration_minutes: None,
            result: String::new(),
            location: String::new(),
            assignee_id: None,
            customer_id: None,
            lead_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence_rule = Some(rule);
        self
    }

    pub fn with_reminder_minutes(mut self, minutes: u32) -> Self {
        self.reminder_minutes_before = Some(minutes);
        self
    }

    /// Transition to a new status.
    ///
    /// Completing stamps `completed_at`; reopening clears it.
    pub fn transition_to(
        &mut self,
        new_status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(&new_status) {
            return Err(TransitionError {
                from: self.status,
                to: new_status,
            });
        }

        match new_status {
            TaskStatus::Completed => self.completed_at = Some(now),
            TaskStatus::Pending => self.completed_at = None,
            TaskStatus::InProgress | TaskStatus::Cancelled => {}
        }

        self.status = new_status;
        self.updated_at = now;
        Ok(())
    }

    /// Move the deadline. A changed deadline invalidates the last reminder.
    pub fn reschedule(&mut self, due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        if self.due_at != due_at {
            self.due_at = due_at;
            self.reminder_fired_at = None;
            self.updated_at = now;
        }
    }

    /// Past due and still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_at {
            Some(due) => self.status.is_open() && now > due,
            None => false,
        }
    }

    /// Due on the same calendar date (UTC) as `now`.
    pub fn is_due_today(&self, now: DateTime<Utc>) -> bool {
        self.due_at
            .map(|due| due.date_naive() == now.date_naive())
            .unwrap_or(false)
    }

    /// Id shared by every occurrence of this task's recurrence series.
    pub fn series_root(&self) -> &str {
        self.series_id.as_deref().unwrap_or(&self.id)
    }
}
