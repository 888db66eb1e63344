//! Error types for handoff-engine operations.

use chrono::Weekday;
use thiserror::Error;

use crate::schedule::TimeField;

#[derive(Error, Debug)]
pub enum HandoffError {
    /// A wall-clock string was rejected by the strict parser.
    #[error("Invalid wall-clock time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    /// A strict parse failure located inside a weekly schedule.
    #[error("Invalid {field} time on {day}: '{input}' ({reason})")]
    InvalidScheduleTime {
        day: Weekday,
        field: TimeField,
        input: String,
        reason: String,
    },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A user record lacks a field the accepted-handoff payload needs.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HandoffError>;
