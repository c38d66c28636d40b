//! Metric sample queries.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{MetricType, UserId};
use health_store::{HealthStore, MetricQuery, MetricSample, MetricStore, MetricStoreExt, SortOrder};
use serde::Deserialize;

use super::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct VitalsParams {
    pub metric_type: Option<String>,
    pub limit: Option<usize>,
    pub order: Option<String>,
}

impl VitalsParams {
    fn into_query(self, user_id: UserId) -> Result<MetricQuery, ApiError> {
        let mut query = MetricQuery::for_user(user_id).limit(self.limit.unwrap_or(DEFAULT_LIMIT));

        if let Some(raw) = self.metric_type {
            let metric_type: MetricType = raw
                .parse()
                .map_err(|e: common::ParseKindError| ApiError::BadRequest(e.to_string()))?;
            query = query.metric_type(metric_type);
        }

        let order = match self.order.as_deref() {
            None | Some("desc") => SortOrder::Descending,
            Some("asc") => SortOrder::Ascending,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "Invalid order: {other} (expected asc or desc)"
                )));
            }
        };
        Ok(query.order(order))
    }
}

/// GET /users/{user_id}/vitals: samples, newest first unless `order=asc`.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    Query(params): Query<VitalsParams>,
) -> Result<Json<Vec<MetricSample>>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    let samples = state.store.query_samples(params.into_query(user_id)?).await?;
    Ok(Json(samples))
}

/// GET /users/{user_id}/vitals/latest: the newest sample of each metric type.
#[tracing::instrument(skip(state))]
pub async fn latest<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<BTreeMap<MetricType, MetricSample>>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    Ok(Json(state.store.latest_by_type(user_id).await?))
}

/// GET /users/{user_id}/vitals/series: every sample grouped by metric type, oldest first.
#[tracing::instrument(skip(state))]
pub async fn series<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<BTreeMap<MetricType, Vec<MetricSample>>>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    Ok(Json(state.store.series_by_type(user_id).await?))
}
