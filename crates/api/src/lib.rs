//! HTTP API server for the vitals services.
//!
//! Exposes assessments, device monitoring, symptom triage and reminders
//! over REST, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use health_store::HealthStore;
use metrics_exporter_prometheus::PrometheusHandle;
use reminders::LoggingSender;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use triage::{HttpInsightLookup, TriageError};

pub use config::Config;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: HealthStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/symptom-analysis", post(routes::triage::analyze::<S>))
        .route("/chat", post(routes::triage::chat::<S>))
        .route("/assessments/questions", get(routes::assessments::questions::<S>))
        .route("/assessments/evaluate", post(routes::assessments::evaluate::<S>))
        .route("/assessments", post(routes::assessments::submit::<S>))
        .route(
            "/users/{user_id}/assessments",
            get(routes::assessments::history::<S>),
        )
        .route("/devices", post(routes::devices::connect::<S>))
        .route("/users/{user_id}/devices", get(routes::devices::list::<S>))
        .route(
            "/devices/{id}/disconnect",
            post(routes::devices::disconnect::<S>),
        )
        .route("/devices/{id}/reconnect", post(routes::devices::reconnect::<S>))
        .route(
            "/devices/{id}/monitoring/start",
            post(routes::devices::start_monitoring::<S>),
        )
        .route(
            "/devices/{id}/monitoring/stop",
            post(routes::devices::stop_monitoring::<S>),
        )
        .route("/users/{user_id}/vitals", get(routes::vitals::list::<S>))
        .route(
            "/users/{user_id}/vitals/latest",
            get(routes::vitals::latest::<S>),
        )
        .route(
            "/users/{user_id}/vitals/series",
            get(routes::vitals::series::<S>),
        )
        .route(
            "/users/{user_id}/profile",
            put(routes::profiles::upsert::<S>).get(routes::profiles::get::<S>),
        )
        .route(
            "/users/{user_id}/notification-settings",
            post(routes::reminders::create_settings::<S>),
        )
        .route("/reminders/run", post(routes::reminders::run::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with the HTTP insight lookup and the
/// logging reminder sender.
pub fn create_default_state<S: HealthStore + 'static>(
    store: S,
    config: &Config,
) -> Result<Arc<AppState<S>>, TriageError> {
    let lookup = HttpInsightLookup::new(config.insight_lookup_url.clone(), config.insight_timeout)?;
    Ok(Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(lookup),
        Arc::new(LoggingSender),
        config,
    )))
}
