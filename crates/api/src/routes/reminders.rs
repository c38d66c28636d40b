//! Reminder settings and manual reminder runs.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::UserId;
use health_store::{HealthStore, NotificationSetting};
use reminders::ReminderRunSummary;
use serde::Deserialize;

use super::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub phone_number: Option<String>,
    pub assessment_reminders: Option<bool>,
    pub reminder_day: Option<String>,
    pub reminder_time: Option<String>,
}

/// POST /users/{user_id}/notification-settings: enrolls a user in reminders.
#[tracing::instrument(skip(state, req))]
pub async fn create_settings<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<SettingsRequest>,
) -> Result<(StatusCode, Json<NotificationSetting>), ApiError> {
    let user_id: UserId = parse_id(&user_id)?;

    let mut setting = NotificationSetting::new(user_id, req.phone_number);
    if let Some(enabled) = req.assessment_reminders {
        setting.assessment_reminders = enabled;
    }
    if let Some(day) = req.reminder_day {
        setting.reminder_day = day;
    }
    if let Some(time) = req.reminder_time {
        setting.reminder_time = time;
    }

    let saved = state.reminders.enroll(setting, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// POST /reminders/run: sends every reminder that is due now.
#[tracing::instrument(skip(state))]
pub async fn run<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ReminderRunSummary>, ApiError> {
    Ok(Json(state.reminders.run(Utc::now()).await?))
}
