//! Newest-first listing of a storage directory.

use std::path::Path;

use tokio::fs;

use super::writer::STAGING_PREFIX;
use crate::error::{StorageOp, StoreError, StoreResult};

/// Names of the non-directory entries of `dir`, in descending byte order.
///
/// Staging files of in-flight writes are skipped. No isolation from
/// concurrent writers is attempted.
pub(crate) async fn list_names(dir: &Path) -> StoreResult<Vec<String>> {
    let list_err = |e: std::io::Error| StoreError::storage(StorageOp::List, dir, e);

    let mut entries = fs::read_dir(dir).await.map_err(list_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(STAGING_PREFIX) {
            continue;
        }
        let file_type = entry.file_type().await.map_err(list_err)?;
        if file_type.is_dir() {
            continue;
        }
        // Symlinked directories count as directories.
        if file_type.is_symlink() {
            if let Ok(meta) = fs::metadata(entry.path()).await {
                if meta.is_dir() {
                    continue;
                }
            }
        }
        names.push(name);
    }

    names.sort_unstable_by(|a, b| b.cmp(a));
    Ok(names)
}
