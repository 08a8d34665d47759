//! Storage backends for cached media and the index file.
//!
//! The cache only needs a small capability set over opaque file names
//! relative to a storage root. [`LocalStorage`] keeps everything in one
//! directory on the local filesystem; other backends (object storage, an
//! in-memory store for tests) only need to implement [`Storage`].

pub mod local;

pub use local::LocalStorage;

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Capability set the cache requires from a storage backend.
///
/// Names are flat file names within the storage root. The backend knows
/// nothing about entries, expiry or the index format.
pub trait Storage {
    /// Whether a file with this name exists.
    fn exists(&self, name: &str) -> bool;

    /// Size of the named file in bytes.
    fn size(&self, name: &str) -> Result<u64>;

    /// Read the full contents of the named file.
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Write `bytes` under `name`, replacing any existing file.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Delete the named file. Returns `false` if it did not exist.
    fn delete(&self, name: &str) -> Result<bool>;

    /// Names of all files currently in the storage root.
    fn list(&self) -> Result<BTreeSet<String>>;

    /// Human-readable location of a name, used in error messages.
    fn location(&self, name: &str) -> PathBuf;
}
