//! Reminder error types.

use health_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReminderError {
    /// The reminder day or time could not be parsed.
    #[error("Invalid reminder schedule: {0}")]
    InvalidSchedule(String),

    #[error("Failed to send reminder: {0}")]
    Send(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ReminderError>;
