//! # WAL Segment Routes
//!
//! - `PUT /wal_segment/{instance}/{name}`: store a WAL segment
//!   (body: `application/octet-stream`).
//! - `GET /wal_segment/{instance}`: WAL segment names, newest first.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, put};
use axum::{Json, Router};
use pgbr_core::{ArtifactKind, InstanceName, SegmentName, StoredArtifact};

use super::{body_reader, created};
use crate::error::AppError;
use crate::state::AppState;

/// Build the WAL segment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wal_segment/{instance}", get(list_wal_segments))
        .route("/wal_segment/{instance}/{name}", put(store_wal_segment))
}

async fn store_wal_segment(
    State(state): State<AppState>,
    Path((instance, name)): Path<(String, String)>,
    body: Body,
) -> Result<Response, AppError> {
    let outcome = put_wal_segment(&state, instance, name, body).await;
    created(ArtifactKind::WalSegment, outcome)
}

async fn put_wal_segment(
    state: &AppState,
    instance: String,
    name: String,
    body: Body,
) -> Result<StoredArtifact, AppError> {
    // Instance first: a request with two bad names reports the instance.
    let instance = InstanceName::parse(instance)?;
    let segment = SegmentName::parse(name)?;

    Ok(state
        .store
        .store_wal_segment(&instance, &segment, body_reader(body))
        .await?)
}

async fn list_wal_segments(
    State(state): State<AppState>,
    Path(instance): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let instance = InstanceName::parse(instance)?;
    Ok(Json(state.store.list_wal_segments(&instance).await?))
}
