//! Device connection and monitoring endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{DeviceId, DeviceKind, UserId};
use health_store::{Device, HealthStore};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub user_id: String,
    pub device_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub connected: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MonitoringResponse {
    pub device_id: DeviceId,
    pub monitoring: bool,
    /// False when the request left the loop state unchanged.
    pub changed: bool,
}

/// POST /devices: connects a new device.
#[tracing::instrument(skip(state, req), fields(device_type = %req.device_type))]
pub async fn connect<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<ConnectRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let user_id: UserId = parse_id(&req.user_id)?;
    let kind: DeviceKind = req
        .device_type
        .parse()
        .map_err(|e: common::ParseKindError| ApiError::BadRequest(e.to_string()))?;

    let device = state.devices.connect(user_id, kind).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// GET /users/{user_id}/devices: a user's devices.
#[tracing::instrument(skip(state))]
pub async fn list<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let user_id: UserId = parse_id(&user_id)?;
    let devices = state
        .devices
        .devices_for_user(user_id, params.connected)
        .await?;
    Ok(Json(devices))
}

/// POST /devices/{id}/disconnect: stops monitoring and marks the device disconnected.
#[tracing::instrument(skip(state))]
pub async fn disconnect<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    Ok(Json(state.devices.disconnect(device_id).await?))
}

/// POST /devices/{id}/reconnect
#[tracing::instrument(skip(state))]
pub async fn reconnect<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    Ok(Json(state.devices.reconnect(device_id).await?))
}

/// POST /devices/{id}/monitoring/start
#[tracing::instrument(skip(state))]
pub async fn start_monitoring<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MonitoringResponse>, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    let changed = state.devices.start_monitoring(device_id).await?;
    Ok(Json(MonitoringResponse {
        device_id,
        monitoring: true,
        changed,
    }))
}

/// POST /devices/{id}/monitoring/stop: a no-op for devices that are not monitored.
#[tracing::instrument(skip(state))]
pub async fn stop_monitoring<S: HealthStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MonitoringResponse>, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    let changed = state.devices.stop_monitoring(device_id).await;
    Ok(Json(MonitoringResponse {
        device_id,
        monitoring: false,
        changed,
    }))
}
