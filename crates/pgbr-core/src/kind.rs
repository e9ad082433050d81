//! Artifact kinds and the storage subdirectory each one maps to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two kinds of artifact a backup agent can push.
///
/// The kind is chosen by the operation invoked, never supplied by the caller
/// as free text, and selects the subdirectory below the instance directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A full point-in-time copy of an instance.
    BaseBackup,
    /// One segment of the write-ahead log.
    WalSegment,
}

impl ArtifactKind {
    /// All kinds, in a stable order.
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::BaseBackup, ArtifactKind::WalSegment];

    /// Directory name under `<root>/<instance>/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::BaseBackup => "base_backup",
            Self::WalSegment => "wal_segment",
        }
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        self.dir_name()
    }

    /// Human-readable noun used in client-facing messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::BaseBackup => "base backup",
            Self::WalSegment => "WAL segment",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
