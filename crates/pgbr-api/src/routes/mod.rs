//! # Route Modules
//!
//! One module per artifact kind. Each store handler validates names before
//! anything touches the storage root, streams the request body straight
//! into the storage manager, and answers `201 Created` with a relative
//! `Location` naming the stored artifact.

pub mod base_backup;
pub mod wal_segment;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::TryStreamExt;
use pgbr_core::{ArtifactKind, StoredArtifact};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::error::AppError;
use crate::metrics;

/// Adapt a request body into the byte stream the storage manager consumes.
///
/// Dropping the reader releases the body; a client disconnect surfaces as an
/// I/O error from the copy.
pub(crate) fn body_reader(body: Body) -> impl AsyncRead + Unpin {
    StreamReader::new(body.into_data_stream().map_err(std::io::Error::other))
}

/// Turn a store outcome into a response, counting it either way.
pub(crate) fn created(
    kind: ArtifactKind,
    outcome: Result<StoredArtifact, AppError>,
) -> Result<Response, AppError> {
    match outcome {
        Ok(artifact) => {
            metrics::record_stored(&artifact);
            let location = format!("./{}", artifact.name);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(artifact),
            )
                .into_response())
        }
        Err(err) => {
            metrics::record_rejected(kind, &err);
            Err(err)
        }
    }
}
