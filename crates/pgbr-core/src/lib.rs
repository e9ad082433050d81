//! # pgbr-core: Backup Storage Manager
//!
//! Persists PostgreSQL backup artifacts pushed by backup agents into a
//! filesystem hierarchy organized per database instance:
//!
//! ```text
//! <root>/<instance>/base_backup/<timestamp>
//! <root>/<instance>/wal_segment/<segment name>
//! ```
//!
//! ## Guarantees
//!
//! 1. **Safe names.** Instance and WAL segment names are validated newtypes
//!    ([`InstanceName`], [`SegmentName`]); nothing reaches the filesystem
//!    before the grammar `^[A-Za-z0-9_-][A-Za-z0-9_.-]*$` accepts it.
//!
//! 2. **Write once.** An artifact name is published at most once per
//!    storage directory, even under concurrent stores from several
//!    processes. A second store fails with [`StoreError::Duplicate`] and the
//!    first artifact's bytes are untouched.
//!
//! 3. **No partial artifacts.** Streams are staged under a hidden name and
//!    published atomically; an interrupted or failed write leaves no file
//!    under the final name.
//!
//! 4. **Permission discipline.** Directories `rwxr-x---`, files `rw-r-----`.
//!
//! 5. **Newest first.** Listings are sorted in descending byte order, which
//!    is reverse-chronological for canonical timestamps and WAL names.
//!
//! ## Crate Policy
//!
//! - No HTTP types; the boundary layer lives in `pgbr-api`.
//! - No in-memory shared mutable state.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod kind;
pub mod name;
pub mod store;
pub mod temporal;

pub use error::{StorageOp, StoreError, StoreResult};
pub use kind::ArtifactKind;
pub use name::{is_valid_name, InstanceName, NameError, NameKind, SegmentName};
pub use store::{ArtifactStore, StoredArtifact};
pub use temporal::{BackupTimestamp, TimestampError};
