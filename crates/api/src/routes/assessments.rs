//! Assessment endpoints.

use std::sync::Arc;

use assessment::{AnswerSet, AssessmentResult, Question, SubmittedAssessment};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::UserId;
use health_store::{AssessmentRecord, HealthStore};
use serde::Deserialize;

use super::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub answers: AnswerSet,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub user_id: String,
    pub answers: AnswerSet,
}

/// GET /assessments/questions: the question bank.
pub async fn questions<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<Question>> {
    Json(state.assessments.questions().to_vec())
}

/// POST /assessments/evaluate: scores answers without storing them.
#[tracing::instrument(skip(state, req))]
pub async fn evaluate<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<EvaluateRequest>,
) -> Json<AssessmentResult> {
    Json(state.assessments.evaluate(&req.answers))
}

/// POST /assessments: scores and stores a completed questionnaire.
#[tracing::instrument(skip(state, req), fields(user_id = %req.user_id))]
pub async fn submit<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmittedAssessment>), ApiError> {
    let user_id: UserId = parse_id(&req.user_id)?;
    let submitted = state.assessments.submit(user_id, &req.answers).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

/// GET /users/{user_id}/assessments: a user's stored assessments.
#[tracing::instrument(skip(state))]
pub async fn history<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<AssessmentRecord>>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    Ok(Json(state.assessments.history(user_id).await?))
}
