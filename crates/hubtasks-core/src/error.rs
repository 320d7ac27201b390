//! Core error types for hubtasks-core.
//!
//! This module defines the error hierarchy using thiserror. The scheduling
//! functions themselves are total over well-formed input; errors only arise
//! from malformed recurrence rules, illegal lifecycle transitions and the
//! configuration file.

use std::path::PathBuf;
use thiserror::Error;

use crate::recurrence::Frequency;
use crate::task::TaskStatus;

/// Core error type for hubtasks-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed recurrence rule
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(#[from] InvalidRuleError),

    /// Illegal task lifecycle transition
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raised when a recurrence rule cannot be used for date arithmetic.
///
/// Always propagated to the caller unmodified; a rule is never silently
/// corrected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRuleError {
    /// Interval must be at least 1
    #[error("interval must be a positive integer, got {0}")]
    NonPositiveInterval(i64),

    /// Count, when present, must be at least 1
    #[error("count must be a positive integer, got {0}")]
    NonPositiveCount(i64),

    /// Unrecognized frequency name
    #[error("unknown frequency '{0}' (expected daily, weekly or monthly)")]
    UnknownFrequency(String),

    /// Unrecognized weekday name in by_weekday
    #[error("unknown weekday '{0}'")]
    UnknownWeekday(String),

    /// by_weekday only applies to weekly rules
    #[error("by_weekday is only valid for weekly rules, not {0}")]
    WeekdaysRequireWeekly(Frequency),

    /// Rule document could not be parsed at all
    #[error("malformed rule: {0}")]
    Malformed(String),
}

/// Error returned when an invalid status transition is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid status transition: {from} → {to}")]
pub struct TransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine where the configuration lives
    #[error("Cannot resolve configuration directory: {0}")]
    NoDataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
