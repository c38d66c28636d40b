//! Route handlers grouped by resource.

pub mod assessments;
pub mod devices;
pub mod health;
pub mod metrics;
pub mod profiles;
pub mod reminders;
pub mod triage;
pub mod vitals;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path or body identifier, rejecting malformed values with 400.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid ID format: {raw}")))
}
