//! # Prometheus Metrics
//!
//! Store outcomes are counted through the `metrics` facade. When the server
//! runs with metrics enabled a Prometheus recorder is installed at startup
//! and rendered at `GET /metrics`; otherwise the counters are no-ops.

use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use pgbr_core::{ArtifactKind, StoredArtifact};

use crate::error::AppError;

const STORED_TOTAL: &str = "pgbr_artifacts_stored_total";
const BYTES_TOTAL: &str = "pgbr_artifact_bytes_total";
const REJECTIONS_TOTAL: &str = "pgbr_store_rejections_total";

/// Install the global Prometheus recorder and describe the counters.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_counter!(STORED_TOTAL, "Artifacts stored, by kind");
    describe_counter!(BYTES_TOTAL, Unit::Bytes, "Artifact bytes written, by kind");
    describe_counter!(
        REJECTIONS_TOTAL,
        "Store requests that did not produce an artifact, by kind and reason"
    );
    Ok(handle)
}

/// Count a successful store.
pub fn record_stored(artifact: &StoredArtifact) {
    let kind = artifact.kind.as_str();
    counter!(STORED_TOTAL, "kind" => kind).increment(1);
    counter!(BYTES_TOTAL, "kind" => kind).increment(artifact.size);
}

/// Count a failed store.
pub fn record_rejected(kind: ArtifactKind, err: &AppError) {
    let reason = match err {
        AppError::BadRequest(_) => "invalid_request",
        AppError::Conflict(_) => "duplicate",
        AppError::Internal(_) | AppError::ServiceUnavailable(_) => "storage_failure",
    };
    counter!(REJECTIONS_TOTAL, "kind" => kind.as_str(), "reason" => reason).increment(1);
}
