//! Assessment error types.

use health_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Only complete questionnaires are persisted.
    #[error("Assessment incomplete: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
