//! API error types with HTTP response mapping.

use assessment::AssessmentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devices::DeviceError;
use health_store::StoreError;
use reminders::ReminderError;
use triage::TriageError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    Store(StoreError),
    Assessment(AssessmentError),
    Device(DeviceError),
    Triage(TriageError),
    Reminder(ReminderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Assessment(err) => assessment_error_to_response(err),
            ApiError::Device(err) => device_error_to_response(err),
            ApiError::Triage(err) => triage_error_to_response(err),
            ApiError::Reminder(err) => reminder_error_to_response(err),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::InvalidRecord(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn assessment_error_to_response(err: AssessmentError) -> (StatusCode, String) {
    match err {
        AssessmentError::Incomplete { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        AssessmentError::Store(err) => store_error_to_response(err),
        AssessmentError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn device_error_to_response(err: DeviceError) -> (StatusCode, String) {
    match err {
        DeviceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        DeviceError::NotConnected(_) => (StatusCode::CONFLICT, err.to_string()),
        DeviceError::Store(err) => store_error_to_response(err),
    }
}

fn triage_error_to_response(err: TriageError) -> (StatusCode, String) {
    match &err {
        TriageError::InvalidSymptoms => (StatusCode::BAD_REQUEST, err.to_string()),
        TriageError::LookupTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, err.to_string()),
        TriageError::Lookup(_) | TriageError::Http(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

fn reminder_error_to_response(err: ReminderError) -> (StatusCode, String) {
    match err {
        ReminderError::InvalidSchedule(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        ReminderError::Store(err) => store_error_to_response(err),
        ReminderError::Send(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        ApiError::Assessment(err)
    }
}

impl From<DeviceError> for ApiError {
    fn from(err: DeviceError) -> Self {
        ApiError::Device(err)
    }
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        ApiError::Triage(err)
    }
}

impl From<ReminderError> for ApiError {
    fn from(err: ReminderError) -> Self {
        ApiError::Reminder(err)
    }
}
