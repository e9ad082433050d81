//! Exactly-once artifact writes.
//!
//! The stream is staged in a hidden file next to its final location and then
//! published with a no-clobber rename. The publish step is the authoritative
//! uniqueness check: of any number of concurrent writers for one name, exactly
//! one publish succeeds and the rest observe `AlreadyExists`. The staging file
//! is a [`tempfile::NamedTempFile`], so it is removed on every early return and
//! when the enclosing future is dropped mid-copy.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncRead;
use tokio::task::JoinError;

use crate::error::{StorageOp, StoreError, StoreResult};
use crate::kind::ArtifactKind;

/// Prefix of in-flight staging files. Never a valid artifact name.
pub(crate) const STAGING_PREFIX: &str = ".pgbr-tmp.";

/// Permission bits of a published artifact: `rw-r-----`.
#[cfg(unix)]
pub const ARTIFACT_FILE_MODE: u32 = 0o640;

/// Write `reader` to `dir/name`, refusing to replace an existing artifact.
///
/// Returns the number of bytes written. The reader is not polled at all when
/// the name is already taken.
pub(crate) async fn write_new<R>(
    dir: &Path,
    kind: ArtifactKind,
    name: &str,
    reader: &mut R,
) -> StoreResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let target = dir.join(name);
    let duplicate = || StoreError::Duplicate {
        kind,
        name: name.to_string(),
    };

    match fs::symlink_metadata(&target).await {
        Ok(_) => return Err(duplicate()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(StoreError::storage(StorageOp::Probe, &target, e)),
    }

    let staging_dir = dir.to_path_buf();
    let staged = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&staging_dir)
    })
    .await
    .map_err(|e| StoreError::storage(StorageOp::Stage, dir, join_failed(e)))?
    .map_err(|e| StoreError::storage(StorageOp::Stage, dir, e))?;

    let size = copy_into(&staged, reader).await?;
    restrict_permissions(staged.path()).await?;

    let publish_to = target.clone();
    let published = tokio::task::spawn_blocking(move || staged.persist_noclobber(&publish_to))
        .await
        .map_err(|e| StoreError::storage(StorageOp::Publish, &target, join_failed(e)))?;

    match published {
        Ok(_) => Ok(size),
        // The rejected staging file is dropped (and unlinked) with `err`.
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Err(duplicate()),
        Err(err) => Err(StoreError::storage(StorageOp::Publish, &target, err.error)),
    }
}

async fn copy_into<R>(staged: &NamedTempFile, reader: &mut R) -> StoreResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let handle = staged
        .as_file()
        .try_clone()
        .map_err(|e| StoreError::storage(StorageOp::Stage, staged.path(), e))?;
    let mut file = fs::File::from_std(handle);

    let size = tokio::io::copy(reader, &mut file)
        .await
        .map_err(|e| StoreError::storage(StorageOp::Copy, staged.path(), e))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::storage(StorageOp::Sync, staged.path(), e))?;
    Ok(size)
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> StoreResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(ARTIFACT_FILE_MODE))
        .await
        .map_err(|e| StoreError::storage(StorageOp::Permissions, path, e))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> StoreResult<()> {
    Ok(())
}

fn join_failed(err: JoinError) -> io::Error {
    io::Error::other(format!("blocking task failed: {err}"))
}
