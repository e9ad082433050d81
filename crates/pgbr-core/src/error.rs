//! # Error Types
//!
//! One error enum for every storage manager operation. Callers classify
//! failures with [`StoreError::is_client_error`]: client errors are safe to
//! echo back, everything else carries paths and OS diagnostics that belong
//! in logs only.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::kind::ArtifactKind;
use crate::name::NameError;
use crate::temporal::TimestampError;

/// Result type for storage manager operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Filesystem step that failed, recorded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    /// Creating the per-instance storage directory.
    CreateDir,
    /// Checking whether an artifact already exists.
    Probe,
    /// Creating the staging file.
    Stage,
    /// Copying the inbound stream into the staging file.
    Copy,
    /// Flushing the staging file to disk.
    Sync,
    /// Restricting permission bits.
    Permissions,
    /// Moving the staging file to its final name.
    Publish,
    /// Reading a storage directory.
    List,
    /// Inspecting the storage root.
    Root,
}

impl StorageOp {
    fn describe(self) -> &'static str {
        match self {
            Self::CreateDir => "create storage directory",
            Self::Probe => "probe artifact",
            Self::Stage => "create staging file",
            Self::Copy => "copy artifact stream",
            Self::Sync => "sync artifact",
            Self::Permissions => "set artifact permissions",
            Self::Publish => "publish artifact",
            Self::List => "list storage directory",
            Self::Root => "access storage root",
        }
    }
}

impl std::fmt::Display for StorageOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Errors produced by the backup storage manager.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An instance or WAL segment name failed the safe-name grammar.
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// A base backup timestamp could not be parsed.
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),

    /// An artifact with this name is already stored.
    #[error("{} with the given name already exists: {name}", .kind.describe())]
    Duplicate {
        /// Kind of the rejected artifact.
        kind: ArtifactKind,
        /// Name that is already taken.
        name: String,
    },

    /// Any I/O failure while touching the storage substrate.
    #[error("failed to {op} at {}: {source}", .path.display())]
    Storage {
        /// The step that failed.
        op: StorageOp,
        /// Path being operated on.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The configured storage root is unusable. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn storage(op: StorageOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            op,
            path: path.into(),
            source,
        }
    }

    /// Returns true if the caller sent something that cannot be stored.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidName(_) | Self::InvalidTimestamp(_) | Self::Duplicate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::InstanceName;

    #[test]
    fn classification() {
        let name_err: StoreError = InstanceName::parse("../etc").unwrap_err().into();
        assert!(name_err.is_client_error());

        let dup = StoreError::Duplicate {
            kind: ArtifactKind::WalSegment,
            name: "000000010000000000000001".into(),
        };
        assert!(dup.is_client_error());

        let io = StoreError::storage(
            StorageOp::Copy,
            "/srv/backup/x",
            io::Error::other("disk full"),
        );
        assert!(!io.is_client_error());
        assert!(!StoreError::Config("gone".into()).is_client_error());
    }

    #[test]
    fn duplicate_message_names_the_kind() {
        let err = StoreError::Duplicate {
            kind: ArtifactKind::BaseBackup,
            name: "2023-01-01T00:00:00Z".into(),
        };
        assert_eq!(
            err.to_string(),
            "base backup with the given name already exists: 2023-01-01T00:00:00Z"
        );
    }

    #[test]
    fn storage_message_has_context() {
        let err = StoreError::storage(
            StorageOp::CreateDir,
            "/srv/backup/db1/base_backup",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("create storage directory"));
        assert!(msg.contains("/srv/backup/db1/base_backup"));
        assert!(msg.contains("denied"));
    }
}
