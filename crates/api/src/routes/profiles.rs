//! Health profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use health_store::{FamilyHistoryEntry, HealthProfile, HealthStore, ProfileRepository};
use serde::Deserialize;

use super::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub diagnoses: Vec<String>,
    #[serde(default)]
    pub family_history: Vec<FamilyHistoryEntry>,
}

/// PUT /users/{user_id}/profile: creates or replaces the profile.
#[tracing::instrument(skip(state, req))]
pub async fn upsert<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> Result<Json<HealthProfile>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    let profile = HealthProfile {
        user_id,
        age: req.age,
        weight: req.weight,
        height: req.height,
        diagnoses: req.diagnoses,
        family_history: req.family_history,
    };
    profile.validate()?;

    state.store.upsert_profile(profile.clone()).await?;
    metrics::counter!("health_profiles_saved_total").increment(1);
    tracing::info!("Health profile saved");
    Ok(Json(profile))
}

/// GET /users/{user_id}/profile
#[tracing::instrument(skip(state))]
pub async fn get<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<HealthProfile>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    state
        .store
        .get_profile(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Profile not found for user: {user_id}")))
}
