//! Symptom analysis and chat endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use health_store::HealthStore;
use serde::Deserialize;
use triage::{ChatResponse, SymptomReport, TriageError};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SymptomRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /symptom-analysis: classifies symptoms and gathers insights.
///
/// A body without a symptom list is rejected as invalid symptoms. An
/// unreachable lookup degrades to the safety message instead of failing.
#[tracing::instrument(skip(state, payload))]
pub async fn analyze<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<SymptomRequest>, JsonRejection>,
) -> Result<Json<SymptomReport>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected symptom payload");
        TriageError::InvalidSymptoms
    })?;

    let report = state.analyzer.analyze_with_fallback(&req.symptoms).await?;
    Ok(Json(report))
}

/// POST /chat: replies to a free-text symptom description.
#[tracing::instrument(skip(state, req))]
pub async fn chat<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = triage::respond(&state.analyzer, &req.message).await?;
    Ok(Json(response))
}
