//! Per-tick scheduling decisions for tasks.
//!
//! An external loop calls [`TaskScheduler::evaluate`] once per task per
//! tick. The scheduler combines:
//! - recurrence: the next occurrence when a recurring task is completed
//! - follow-ups: a follow-up task when a call/meeting is completed
//! - reminders: whether the reminder for the current due date is due
//! - working hours: clamping of every generated due date
//!
//! It never mutates the task. The returned [`ScheduleDecision`] is carried
//! out and persisted by the caller.

mod decision;

pub use decision::ScheduleDecision;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{InvalidRuleError, Result, TransitionError};
use crate::follow_up::{FollowUpPolicy, DEFAULT_FOLLOW_UP_OFFSET_DAYS};
use crate::reminder;
use crate::settings::TaskSettings;
use crate::task::{Task, TaskStatus};
use crate::working_hours;

/// What prompted this evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Periodic tick with no status change
    Tick,
    /// The task's status changed from `from` to its current status this tick
    Transitioned { from: TaskStatus },
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Days between completing a call/meeting and its follow-up
    #[serde(default = "default_follow_up_offset_days")]
    pub follow_up_offset_days: u32,
    /// Cancelling a recurring task also produces its next occurrence
    #[serde(default)]
    pub recur_on_cancel: bool,
}

fn default_follow_up_offset_days() -> u32 {
    DEFAULT_FOLLOW_UP_OFFSET_DAYS
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            follow_up_offset_days: default_follow_up_offset_days(),
            recur_on_cancel: false,
        }
    }
}

/// Stateless decision engine for task reminders, recurrence and follow-ups.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    config: SchedulerConfig,
    follow_up: FollowUpPolicy,
}

impl TaskScheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            follow_up: FollowUpPolicy::with_offset_days(config.follow_up_offset_days),
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Decide what should happen for `task` at `now`.
    ///
    /// # Errors
    /// - [`InvalidRuleError`] (as `CoreError::InvalidRule`) when the task's
    ///   recurrence rule is malformed and a next occurrence is needed
    /// - [`TransitionError`] when `trigger` reports a status change the
    ///   lifecycle does not allow
    pub fn evaluate(
        &self,
        task: &Task,
        settings: &TaskSettings,
        now: DateTime<Utc>,
        trigger: Trigger,
    ) -> Result<ScheduleDecision> {
        let mut decision = ScheduleDecision::default();

        if let Trigger::Transitioned { from } = trigger {
            if !from.can_transition_to(&task.status) {
                return Err(TransitionError {
                    from,
                    to: task.status,
                }
                .into());
            }

            if self.continues_series(task.status) {
                decision.new_occurrence = self.next_occurrence(task, settings, now)?;
            }

            if task.status == TaskStatus::Completed {
                decision.new_follow_up = self.follow_up.build_follow_up(task, settings, now);
            }
        }

        if task.status.is_open() {
            decision.fire_reminder = reminder::due_reminder(task, settings, now);
            decision.overdue = task.is_overdue(now);
        }

        if let Some(occurrence) = &decision.new_occurrence {
            info!(
                task_id = %task.id,
                occurrence_id = %occurrence.id,
                due_at = ?occurrence.due_at,
                "proposing next occurrence"
            );
        }
        if let Some(follow_up) = &decision.new_follow_up {
            info!(
                task_id = %task.id,
                follow_up_id = %follow_up.id,
                due_at = ?follow_up.due_at,
                "proposing follow-up"
            );
        }
        debug!(
            task_id = %task.id,
            status = %task.status,
            ?trigger,
            fire_reminder = decision.fire_reminder,
            overdue = decision.overdue,
            "evaluated task"
        );

        Ok(decision)
    }

    /// Whether entering `status` moves a recurring task to its next occurrence.
    fn continues_series(&self, status: TaskStatus) -> bool {
        match status {
            TaskStatus::Completed => true,
            TaskStatus::Cancelled => self.config.recur_on_cancel,
            TaskStatus::Pending | TaskStatus::InProgress => false,
        }
    }

    /// Build the next pending occurrence of a recurring task, if any.
    fn next_occurrence(
        &self,
        task: &Task,
        settings: &TaskSettings,
        now: DateTime<Utc>,
    ) -> std::result::Result<Option<Task>, InvalidRuleError> {
        let (Some(rule), Some(due_at)) = (&task.recurrence_rule, task.due_at) else {
            return Ok(None);
        };
        if task.next_occurrence_id.is_some() {
            return Ok(None);
        }

        let next = match rule.next_occurrence(due_at, task.occurrence_index) {
            Ok(Some(next)) => next,
            Ok(None) => {
                debug!(task_id = %task.id, "recurrence exhausted");
                return Ok(None);
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "invalid recurrence rule");
                return Err(e);
            }
        };

        let index = task.occurrence_index.saturating_add(1);
        let mut occurrence = task.clone();
        occurrence.id = format!("{}-occurrence-{}", task.series_root(), index);
        occurrence.series_id = Some(task.series_root().to_string());
        occurrence.occurrence_index = index;
        occurrence.status = TaskStatus::Pending;
        occurrence.due_at = Some(working_hours::clamp(next, settings));
        occurrence.completed_at = None;
        occurrence.reminder_fired_at = None;
        occurrence.follow_up_id = None;
        occurrence.next_occurrence_id = None;
        occurrence.result.clear();
        occurrence.created_at = now;
        occurrence.updated_at = now;

        Ok(Some(occurrence))
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::recurrence::{Frequency, RecurrenceRule};
    use crate::task::TaskType;
    use chrono::{NaiveTime, TimeZone};

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, m, 0).unwrap()
    }

    fn settings() -> TaskSettings {
        TaskSettings::default()
            .with_auto_follow_up(true)
            .with_working_hours(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            )
    }

    fn completed(mut task: Task, from: TaskStatus, now: DateTime<Utc>) -> (Task, Trigger) {
        task.status = from;
        task.transition_to(TaskStatus::Completed, now).unwrap();
        (task, Trigger::Transitioned { from })
    }

    #[test]
    fn test_tick_on_plain_task_is_empty() {
        let task = Task::new("Write notes", TaskType::Task).with_due_at(at(12, 9, 0));
        let decision = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 9, 0), Trigger::Tick)
            .unwrap();
        assert!(decision.is_empty());
        assert!(!decision.overdue);
    }

    #[test]
    fn test_tick_fires_reminder() {
        let task = Task::new("Call", TaskType::Call)
            .with_due_at(at(10, 9, 0))
            .with_reminder_minutes(30);
        let decision = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 8, 35), Trigger::Tick)
            .unwrap();
        assert!(decision.fire_reminder);
        assert!(decision.new_occurrence.is_none());
        assert!(decision.new_follow_up.is_none());
    }

    #[test]
    fn test_overdue_reported_without_reminder() {
        let task = Task::new("Call", TaskType::Call).with_due_at(at(10, 9, 0));
        let decision = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 9, 5), Trigger::Tick)
            .unwrap();
        assert!(!decision.fire_reminder);
        assert!(decision.overdue);
    }

    #[test]
    fn test_completion_produces_next_occurrence() {
        let task = Task::new("Standup", TaskType::Meeting)
            .with_id("standup")
            .with_due_at(at(10, 9, 30))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 1));
        let (task, trigger) = completed(task, TaskStatus::InProgress, at(10, 9, 45));

        let decision = TaskScheduler::new()
            .evaluate(&task, &settings().with_auto_follow_up(false), at(10, 9, 45), trigger)
            .unwrap();

        let occurrence = decision.new_occurrence.unwrap();
        assert_eq!(occurrence.id, "standup-occurrence-2");
        assert_eq!(occurrence.series_id.as_deref(), Some("standup"));
        assert_eq!(occurrence.occurrence_index, 2);
        assert_eq!(occurrence.status, TaskStatus::Pending);
        assert_eq!(occurrence.due_at, Some(at(11, 9, 30)));
        assert!(occurrence.completed_at.is_none());
        assert!(occurrence.reminder_fired_at.is_none());
        assert_eq!(occurrence.recurrence_rule, task.recurrence_rule);
        assert!(decision.new_follow_up.is_none());
        assert!(!decision.fire_reminder);
    }

    #[test]
    fn test_occurrence_due_date_is_clamped() {
        let task = Task::new("Evening check", TaskType::Task)
            .with_due_at(at(10, 19, 0))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 1));
        let (task, trigger) = completed(task, TaskStatus::Pending, at(10, 19, 5));

        let decision = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 19, 5), trigger)
            .unwrap();
        assert_eq!(decision.new_occurrence.unwrap().due_at, Some(at(12, 9, 0)));
    }

    #[test]
    fn test_later_occurrences_keep_series_root() {
        let mut task = Task::new("Standup", TaskType::Task)
            .with_id("standup-occurrence-4")
            .with_due_at(at(13, 9, 30))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 1));
        task.series_id = Some("standup".to_string());
        task.occurrence_index = 4;
        let (task, trigger) = completed(task, TaskStatus::Pending, at(13, 10, 0));

        let occurrence = TaskScheduler::new()
            .evaluate(&task, &settings(), at(13, 10, 0), trigger)
            .unwrap()
            .new_occurrence
            .unwrap();
        assert_eq!(occurrence.id, "standup-occurrence-5");
        assert_eq!(occurrence.series_id.as_deref(), Some("standup"));
    }

    #[test]
    fn test_cancel_does_not_recur_by_default() {
        let mut task = Task::new("Standup", TaskType::Task)
            .with_due_at(at(10, 9, 30))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 1));
        task.transition_to(TaskStatus::Cancelled, at(10, 9, 0)).unwrap();
        let trigger = Trigger::Transitioned {
            from: TaskStatus::Pending,
        };

        let decision = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 9, 0), trigger)
            .unwrap();
        assert!(decision.is_empty());

        let scheduler = TaskScheduler::with_config(SchedulerConfig {
            recur_on_cancel: true,
            ..Default::default()
        });
        let decision = scheduler
            .evaluate(&task, &settings(), at(10, 9, 0), trigger)
            .unwrap();
        assert_eq!(decision.new_occurrence.unwrap().due_at, Some(at(11, 9, 30)));
    }

    #[test]
    fn test_recurrence_without_due_date_is_nothing_to_schedule() {
        let task = Task::new("Undated", TaskType::Task)
            .with_recurrence(RecurrenceRule::new(Frequency::Weekly, 1));
        let (task, trigger) = completed(task, TaskStatus::Pending, at(10, 9, 0));
        let decision = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 9, 0), trigger)
            .unwrap();
        assert!(decision.new_occurrence.is_none());
    }

    #[test]
    fn test_invalid_rule_propagates() {
        let task = Task::new("Broken", TaskType::Task)
            .with_due_at(at(10, 9, 0))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 0));
        let (task, trigger) = completed(task, TaskStatus::Pending, at(10, 9, 0));
        let err = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 9, 0), trigger)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidRule(InvalidRuleError::NonPositiveInterval(0))
        ));
    }

    #[test]
    fn test_invalid_rule_ignored_on_plain_tick() {
        let task = Task::new("Broken", TaskType::Task)
            .with_due_at(at(10, 9, 0))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 0));
        assert!(TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 8, 0), Trigger::Tick)
            .is_ok());
    }

    #[test]
    fn test_illegal_transition_is_rejected() {
        let mut task = Task::new("Call", TaskType::Call);
        task.status = TaskStatus::Completed;
        let err = TaskScheduler::new()
            .evaluate(
                &task,
                &settings(),
                at(10, 9, 0),
                Trigger::Transitioned {
                    from: TaskStatus::Cancelled,
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Transition(_)));
    }

    #[test]
    fn test_completed_call_gets_follow_up() {
        let task = Task::new("Intro call", TaskType::Call).with_id("call-1");
        let (task, trigger) = completed(task, TaskStatus::InProgress, at(10, 10, 0));
        let decision = TaskScheduler::new()
            .evaluate(&task, &settings(), at(10, 10, 0), trigger)
            .unwrap();
        let follow_up = decision.new_follow_up.unwrap();
        assert_eq!(follow_up.due_at, Some(at(13, 10, 0)));
        assert!(decision.new_occurrence.is_none());
    }

    #[test]
    fn test_follow_up_offset_from_config() {
        let task = Task::new("Intro call", TaskType::Call);
        let (task, trigger) = completed(task, TaskStatus::Pending, at(10, 10, 0));
        let scheduler = TaskScheduler::with_config(SchedulerConfig {
            follow_up_offset_days: 7,
            ..Default::default()
        });
        let follow_up = scheduler
            .evaluate(&task, &settings(), at(10, 10, 0), trigger)
            .unwrap()
            .new_follow_up
            .unwrap();
        assert_eq!(follow_up.due_at, Some(at(17, 10, 0)));
    }

    #[test]
    fn test_recorded_occurrence_is_not_proposed_again() {
        let task = Task::new("Standup", TaskType::Task)
            .with_due_at(at(10, 9, 30))
            .with_recurrence(RecurrenceRule::new(Frequency::Daily, 1));
        let (mut task, trigger) = completed(task, TaskStatus::Pending, at(10, 9, 45));
        let scheduler = TaskScheduler::new();

        let decision = scheduler
            .evaluate(&task, &settings(), at(10, 9, 45), trigger)
            .unwrap();
        assert!(decision.new_occurrence.is_some());

        decision.apply_to(&mut task, at(10, 9, 45));
        let retry = scheduler
            .evaluate(&task, &settings(), at(10, 9, 45), trigger)
            .unwrap();
        assert!(retry.new_occurrence.is_none());
    }

    #[test]
    fn test_same_inputs_same_decision() {
        let task = Task::new("Review", TaskType::Meeting)
            .with_due_at(at(10, 9, 0))
            .with_recurrence(RecurrenceRule::new(Frequency::Weekly, 1));
        let (task, trigger) = completed(task, TaskStatus::InProgress, at(10, 9, 30));
        let scheduler = TaskScheduler::new();

        let a = scheduler
            .evaluate(&task, &settings(), at(10, 9, 30), trigger)
            .unwrap();
        let b = scheduler
            .evaluate(&task, &settings(), at(10, 9, 30), trigger)
            .unwrap();
        assert_eq!(a, b);
    }
}
