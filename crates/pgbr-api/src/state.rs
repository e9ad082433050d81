//! # Application State
//!
//! Shared state for the Axum application. The storage root is fixed when
//! the [`ArtifactStore`] is opened at startup; handlers only ever see it
//! through this read-only state.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use pgbr_core::ArtifactStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The backup storage manager.
    pub store: Arc<ArtifactStore>,
    /// Prometheus renderer, present when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around an opened store, with metrics disabled.
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store: Arc::new(store),
            metrics: None,
        }
    }

    /// Attach the Prometheus renderer served at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("root", &self.store.root())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}
