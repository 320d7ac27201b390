//! # hubtasks Core Library
//!
//! Scheduling engine for customer-facing tasks: calls, meetings, emails,
//! follow-ups and plain tasks. It decides *when* and *whether* something
//! should happen and leaves doing it to the caller.
//!
//! ## Architecture
//!
//! - **Recurrence**: validated recurrence rules and next-occurrence arithmetic
//! - **Reminders**: fire-time computation and once-per-deadline firing
//! - **Working hours**: clamping of generated due dates
//! - **Follow-ups**: automatic follow-up tasks after calls and meetings
//! - **Scheduler**: the per-tick decision function combining all of the above
//! - **Storage**: TOML-based configuration
//!
//! Every function is pure and synchronous: tasks and settings are passed in
//! as snapshots, `now` is injected, and generated tasks are returned as a
//! [`ScheduleDecision`] for the caller to persist.
//!
//! ## Key Components
//!
//! - [`TaskScheduler`]: per-tick decision engine
//! - [`RecurrenceRule`]: recurrence specification
//! - [`TaskSettings`]: per-hub settings snapshot
//! - [`Config`]: configuration file management

pub mod error;
pub mod follow_up;
pub mod recurrence;
pub mod reminder;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod task;
pub mod working_hours;

pub use error::{ConfigError, CoreError, InvalidRuleError, TransitionError};
pub use follow_up::FollowUpPolicy;
pub use recurrence::{Frequency, RecurrenceRule};
pub use scheduler::{ScheduleDecision, SchedulerConfig, TaskScheduler, Trigger};
pub use settings::TaskSettings;
pub use storage::Config;
pub use task::{Priority, Task, TaskStatus, TaskType};
