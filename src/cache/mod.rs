//! Expiring media cache.
//!
//! Remote media is fetched once, stored under a collision-free local name,
//! and tracked in a JSON index alongside the files. Entries expire after a
//! TTL counted from the first fetch or the latest request, and a cleanup
//! pass deletes expired and orphaned files.

pub mod cleanup;
pub mod entry;
pub mod filename;
pub mod index;
pub mod media_cache;
pub mod persistence;
pub mod registry;
pub mod time;

pub use cleanup::{is_expired, CleanupReport, DeleteFailure, Reconciler};
pub use entry::{
    normalize_remote_key, CacheMethod, Entry, FileRef, FileStatus, Flag, PersistedEntry,
};
pub use index::CacheIndex;
pub use media_cache::{CacheStats, MediaCache};
pub use persistence::{
    IndexDocument, IndexPersistence, SaveOutcome, DEFAULT_INDEX_FILENAME, FORMAT_VERSION,
};
pub use registry::CacheRegistry;
