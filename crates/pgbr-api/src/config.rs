//! # Server Configuration
//!
//! Command-line flags with environment fallbacks, parsed once at startup
//! into an immutable [`ServerConfig`].

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// pg-backup-receiver: stores PostgreSQL base backups and WAL segments
/// pushed over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "pgbr", version, about)]
pub struct ServerConfig {
    /// Root directory for stored artifacts. Must already exist.
    #[arg(long, env = "PGBR_BACKUP_PATH")]
    pub backup_path: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "PGBR_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Log output format.
    #[arg(long, env = "PGBR_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Do not install the Prometheus recorder or serve `/metrics`.
    #[arg(long, env = "PGBR_NO_METRICS")]
    pub no_metrics: bool,
}

/// Log line format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

impl ServerConfig {
    /// Install the global tracing subscriber. `RUST_LOG` overrides the
    /// default `info` filter.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        match self.log_format {
            LogFormat::Text => builder.init(),
            LogFormat::Json => builder.json().init(),
        }
    }
}
