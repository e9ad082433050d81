//! # pgbr-api: HTTP Service for pg-backup-receiver
//!
//! Receives PostgreSQL base backups and WAL segments pushed by backup agents
//! (e.g. an `archive_command` running `curl -T`) and stores them through
//! [`pgbr_core::ArtifactStore`].
//!
//! ## API Surface
//!
//! | Method | Path                             | Operation            |
//! |--------|----------------------------------|----------------------|
//! | PUT    | `/base_backup/{instance}?date=`  | Store base backup    |
//! | GET    | `/base_backup/{instance}`        | List base backups    |
//! | PUT    | `/wal_segment/{instance}/{name}` | Store WAL segment    |
//! | GET    | `/wal_segment/{instance}`        | List WAL segments    |
//! | GET    | `/health/liveness`               | Liveness probe       |
//! | GET    | `/health/readiness`              | Storage root check   |
//! | GET    | `/metrics`                       | Prometheus scrape    |
//!
//! ## Status Codes
//!
//! Stores answer `201 Created` with `Location: ./<name>`. Invalid names and
//! timestamps are `400`, an already-stored artifact is `409`, and storage
//! failures are an opaque `500` (details go to the log).
//!
//! ## Crate Policy
//!
//! - No storage logic in route handlers; they validate, delegate and map.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full application router.
///
/// Artifact uploads are streamed to disk, so the default request body limit
/// is lifted on the artifact routes.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::base_backup::router())
        .merge(routes::wal_segment::router())
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut probes = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if state.metrics.is_some() {
        probes = probes.route("/metrics", get(prometheus_metrics));
    }

    Router::new().merge(probes.with_state(state)).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 while the storage root is an accessible directory.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::debug!(error = %e, "storage root health check failed");
        AppError::ServiceUnavailable("storage root is not accessible".to_string())
    })?;
    Ok("ready")
}

/// GET /metrics: Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
