//! # Artifact Store
//!
//! Filesystem-backed vault for backup artifacts:
//!
//! ```text
//! <root>/<instance>/base_backup/<timestamp>
//! <root>/<instance>/wal_segment/<segment name>
//! ```
//!
//! Directories are created on demand with mode `rwxr-x---`; artifacts are
//! published with mode `rw-r-----` and never modified afterwards. All
//! coordination between concurrent writers, in this process or in another
//! process sharing the root, is delegated to the filesystem: recursive
//! directory creation tolerates a concurrent creator, and publishing uses an
//! atomic rename-without-replace.

mod lister;
mod writer;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncRead;
use tracing::instrument;

use crate::error::{StorageOp, StoreError, StoreResult};
use crate::kind::ArtifactKind;
use crate::name::{InstanceName, SegmentName};
use crate::temporal::BackupTimestamp;

#[cfg(unix)]
pub use writer::ARTIFACT_FILE_MODE;

/// Permission bits of a storage directory: `rwxr-x---`.
#[cfg(unix)]
pub const STORAGE_DIR_MODE: u32 = 0o750;

/// Outcome of a successful store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    /// Owning instance.
    pub instance: InstanceName,
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Final artifact name within its storage directory.
    pub name: String,
    /// Bytes written.
    pub size: u64,
}

/// Backup storage manager rooted at one directory.
///
/// Holds no mutable state; cloning or sharing it behind an `Arc` is free of
/// coordination concerns.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// [`StoreError::Config`] if `root` does not exist or is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        match std::fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(StoreError::Config(format!(
                "backup path {:?} is not a directory",
                root
            ))),
            Err(e) => Err(StoreError::Config(format!(
                "backup path {:?} does not exist or is not accessible: {e}",
                root
            ))),
        }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `<root>/<instance>/<kind>`, creating it and any missing
    /// parents with [`STORAGE_DIR_MODE`]. An existing directory is success.
    ///
    /// Creation is not transactional: if `<kind>` cannot be created, a
    /// freshly created `<instance>` directory stays behind. It is empty and
    /// carries the same mode, and the next call for that instance reuses it.
    #[instrument(skip(self), fields(instance = %instance, kind = %kind))]
    pub async fn storage_dir(
        &self,
        instance: &InstanceName,
        kind: ArtifactKind,
    ) -> StoreResult<PathBuf> {
        let dir = self.root.join(instance.as_str()).join(kind.dir_name());

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(STORAGE_DIR_MODE);
        builder
            .create(&dir)
            .await
            .map_err(|e| StoreError::storage(StorageOp::CreateDir, &dir, e))?;

        Ok(dir)
    }

    /// Store a base backup under its truncated, canonical timestamp.
    pub async fn store_base_backup<R>(
        &self,
        instance: &InstanceName,
        taken_at: BackupTimestamp,
        reader: R,
    ) -> StoreResult<StoredArtifact>
    where
        R: AsyncRead + Unpin,
    {
        let name = taken_at.to_artifact_name();
        self.store(instance, ArtifactKind::BaseBackup, name, reader)
            .await
    }

    /// Store a WAL segment under its caller-assigned name.
    pub async fn store_wal_segment<R>(
        &self,
        instance: &InstanceName,
        segment: &SegmentName,
        reader: R,
    ) -> StoreResult<StoredArtifact>
    where
        R: AsyncRead + Unpin,
    {
        self.store(
            instance,
            ArtifactKind::WalSegment,
            segment.as_str().to_string(),
            reader,
        )
        .await
    }

    /// `name` must be a single safe path segment; the public wrappers
    /// guarantee it by construction.
    #[instrument(skip(self, reader), fields(instance = %instance, kind = %kind))]
    async fn store<R>(
        &self,
        instance: &InstanceName,
        kind: ArtifactKind,
        name: String,
        mut reader: R,
    ) -> StoreResult<StoredArtifact>
    where
        R: AsyncRead + Unpin,
    {
        let dir = self.storage_dir(instance, kind).await?;
        match writer::write_new(&dir, kind, &name, &mut reader).await {
            Ok(size) => {
                tracing::info!(name = %name, size, "artifact stored");
                Ok(StoredArtifact {
                    instance: instance.clone(),
                    kind,
                    name,
                    size,
                })
            }
            Err(err @ StoreError::Duplicate { .. }) => {
                tracing::warn!(name = %name, "rejected duplicate artifact");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Artifact names of one kind for `instance`, newest first.
    ///
    /// Creates the storage directory when it does not exist yet, so a
    /// never-written instance lists as empty.
    #[instrument(skip(self), fields(instance = %instance, kind = %kind))]
    pub async fn list(
        &self,
        instance: &InstanceName,
        kind: ArtifactKind,
    ) -> StoreResult<Vec<String>> {
        let dir = self.storage_dir(instance, kind).await?;
        lister::list_names(&dir).await
    }

    /// Base backup names for `instance`, newest first.
    pub async fn list_base_backups(&self, instance: &InstanceName) -> StoreResult<Vec<String>> {
        self.list(instance, ArtifactKind::BaseBackup).await
    }

    /// WAL segment names for `instance`, newest first.
    pub async fn list_wal_segments(&self, instance: &InstanceName) -> StoreResult<Vec<String>> {
        self.list(instance, ArtifactKind::WalSegment).await
    }

    /// Verify the storage root is still an accessible directory.
    pub async fn health_check(&self) -> StoreResult<()> {
        let meta = fs::metadata(&self.root)
            .await
            .map_err(|e| StoreError::storage(StorageOp::Root, &self.root, e))?;
        if !meta.is_dir() {
            return Err(StoreError::storage(
                StorageOp::Root,
                &self.root,
                std::io::Error::other("storage root is not a directory"),
            ));
        }
        Ok(())
    }
}
