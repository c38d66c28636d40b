//! Triage error types.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    /// No non-blank symptom was supplied.
    #[error("Invalid symptoms provided")]
    InvalidSymptoms,

    #[error("Insight lookup failed: {0}")]
    Lookup(String),

    #[error("Insight lookup timed out after {0:?}")]
    LookupTimeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TriageError {
    /// True for failures of the external lookup, as opposed to bad input.
    pub fn is_lookup_failure(&self) -> bool {
        !matches!(self, TriageError::InvalidSymptoms)
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
