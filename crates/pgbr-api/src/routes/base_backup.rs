//! # Base Backup Routes
//!
//! - `PUT /base_backup/{instance}?date=<rfc3339>`: store a base backup
//!   (body: `application/octet-stream`) under its truncated timestamp.
//! - `GET /base_backup/{instance}`: base backup names, newest first.

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::put;
use axum::{Json, Router};
use pgbr_core::{ArtifactKind, BackupTimestamp, InstanceName, StoredArtifact};
use serde::Deserialize;

use super::{body_reader, created};
use crate::error::AppError;
use crate::state::AppState;

/// Build the base backup router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/base_backup/{instance}",
        put(store_base_backup).get(list_base_backups),
    )
}

/// Query string of a base backup upload.
#[derive(Debug, Deserialize)]
pub struct StoreBaseBackupQuery {
    /// When the backup was taken, RFC 3339 with offset.
    pub date: String,
}

async fn store_base_backup(
    State(state): State<AppState>,
    Path(instance): Path<String>,
    query: Result<Query<StoreBaseBackupQuery>, QueryRejection>,
    body: Body,
) -> Result<Response, AppError> {
    let outcome = put_base_backup(&state, instance, query, body).await;
    created(ArtifactKind::BaseBackup, outcome)
}

async fn put_base_backup(
    state: &AppState,
    instance: String,
    query: Result<Query<StoreBaseBackupQuery>, QueryRejection>,
    body: Body,
) -> Result<StoredArtifact, AppError> {
    let instance = InstanceName::parse(instance)?;
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let taken_at = BackupTimestamp::parse(&query.date)?;

    Ok(state
        .store
        .store_base_backup(&instance, taken_at, body_reader(body))
        .await?)
}

async fn list_base_backups(
    State(state): State<AppState>,
    Path(instance): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let instance = InstanceName::parse(instance)?;
    Ok(Json(state.store.list_base_backups(&instance).await?))
}
