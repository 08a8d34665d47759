//! Index document persistence.
//!
//! The index lives in a single JSON document in the storage root. Saving
//! merges the in-memory index into the last persisted media map, so entries
//! that were loaded from disk but never materialized survive untouched.
//! A save whose media, public URL and format version match what is already
//! on disk is skipped entirely, keeping the file's modification time
//! meaningful.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::entry::PersistedEntry;
use super::index::CacheIndex;
use super::time;
use crate::error::{MediaCacheError, Result};
use crate::storage::Storage;

/// Default name of the index document.
pub const DEFAULT_INDEX_FILENAME: &str = "_media-cache.json";

/// Format version written into new documents.
pub const FORMAT_VERSION: &str = "1.0";

/// The on-disk index document.
///
/// Written through [`serde_json::Value`], whose objects keep keys sorted,
/// so carried-through unknown entry fields sort with the known ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    #[serde(default)]
    pub format_version: String,

    #[serde(default)]
    pub last_cleanup: Option<String>,

    #[serde(default)]
    pub last_write: Option<String>,

    pub media: BTreeMap<String, PersistedEntry>,

    #[serde(rename = "publicURL", default)]
    pub public_url: String,
}

/// Document-level values supplied by the cache on save.
#[derive(Debug, Clone, Default)]
pub struct IndexMetadata {
    pub public_url: String,
    pub last_cleanup: Option<DateTime<Utc>>,
}

/// What a save actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The document was written; `bytes` is its size on disk.
    Written { bytes: u64 },
    /// Nothing changed since the last write.
    Unchanged,
}

/// Read and parse the index document named `filename`.
pub fn load(storage: &dyn Storage, filename: &str) -> Result<IndexDocument> {
    let path = storage.location(filename);
    let raw = storage.read(filename).map_err(|e| MediaCacheError::CorruptIndex {
        path: path.clone(),
        message: format!("{:#}", e),
    })?;

    if raw.is_empty() {
        return Err(MediaCacheError::EmptyFile { path });
    }

    serde_json::from_slice(&raw).map_err(|e| MediaCacheError::CorruptIndex {
        path,
        message: e.to_string(),
    })
}

/// Tracks the persisted state of one index document.
#[derive(Debug, Clone)]
pub struct IndexPersistence {
    filename: String,
    persisted: Option<IndexDocument>,
    size_bytes: u64,
    /// Keys deleted from the cache but still present in `persisted`.
    dropped: BTreeSet<String>,
}

impl IndexPersistence {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            persisted: None,
            size_bytes: 0,
            dropped: BTreeSet::new(),
        }
    }

    /// Name of the index document within the storage root.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The last document loaded or written.
    pub fn document(&self) -> Option<&IndexDocument> {
        self.persisted.as_ref()
    }

    /// Persisted form of an entry in the last document, if present.
    pub fn persisted_entry(&self, remote_key: &str) -> Option<&PersistedEntry> {
        if self.dropped.contains(remote_key) {
            return None;
        }
        self.persisted.as_ref()?.media.get(remote_key)
    }

    /// Remote keys in the last document, minus dropped ones.
    pub fn persisted_keys(&self) -> Vec<String> {
        self.persisted
            .as_ref()
            .map(|doc| {
                doc.media
                    .keys()
                    .filter(|key| !self.dropped.contains(*key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Leave `remote_key` out of the next save even though it is no longer
    /// in the index. An entry re-added to the index under the same key
    /// still wins.
    pub fn drop_entry(&mut self, remote_key: &str) {
        self.dropped.insert(remote_key.to_string());
    }

    /// Size of the index file after the last load or write.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// `lastCleanup` of the last document, if it parses.
    pub fn last_cleanup(&self) -> Option<DateTime<Utc>> {
        let value = self.persisted.as_ref()?.last_cleanup.as_deref()?;
        time::parse(value).ok()
    }

    /// Load the document from storage, replacing any previous state.
    pub fn load(&mut self, storage: &dyn Storage) -> Result<&IndexDocument> {
        let document = load(storage, &self.filename)?;

        if document.format_version != FORMAT_VERSION {
            tracing::info!(
                found = %document.format_version,
                current = FORMAT_VERSION,
                "index format differs; it will be rewritten on the next save"
            );
        }

        self.size_bytes = storage.size(&self.filename).unwrap_or(0);
        tracing::debug!(
            file = %self.filename,
            entries = document.media.len(),
            bytes = self.size_bytes,
            "loaded cache index"
        );

        self.dropped.clear();
        Ok(self.persisted.insert(document))
    }

    /// Forget the loaded document so the next save starts from the index
    /// alone.
    pub fn reset(&mut self) {
        self.persisted = None;
        self.size_bytes = 0;
        self.dropped.clear();
    }

    /// Persist `index` if it differs from what is on disk.
    pub fn save(
        &mut self,
        index: &CacheIndex,
        metadata: &IndexMetadata,
        storage: &dyn Storage,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome> {
        let media = self.candidate_media(index);

        if let Some(previous) = &self.persisted {
            if storage.exists(&self.filename)
                && previous.format_version == FORMAT_VERSION
                && previous.public_url == metadata.public_url
                && previous.media == media
            {
                tracing::debug!(file = %self.filename, "cache index unchanged, skipping write");
                return Ok(SaveOutcome::Unchanged);
            }
        }

        let document = IndexDocument {
            format_version: FORMAT_VERSION.to_string(),
            last_cleanup: metadata.last_cleanup.map(time::format),
            last_write: Some(time::format(now)),
            media,
            public_url: metadata.public_url.clone(),
        };

        let json = serde_json::to_value(&document)
            .and_then(|value| serde_json::to_string_pretty(&value))
            .map_err(|e| MediaCacheError::write_failed(&self.filename, e))?;
        storage
            .write(&self.filename, json.as_bytes())
            .map_err(|e| MediaCacheError::write_failed(&self.filename, format!("{:#}", e)))?;

        let bytes = storage
            .size(&self.filename)
            .map_err(|e| MediaCacheError::write_failed(&self.filename, format!("{:#}", e)))?;
        if bytes == 0 {
            return Err(MediaCacheError::write_failed(
                &self.filename,
                "written index has no size",
            ));
        }

        tracing::info!(
            file = %self.filename,
            entries = document.media.len(),
            bytes,
            "wrote cache index"
        );

        self.size_bytes = bytes;
        self.persisted = Some(document);
        self.dropped.clear();
        Ok(SaveOutcome::Written { bytes })
    }

    /// The media map a save would write: the last persisted map with every
    /// indexed entry applied on top.
    fn candidate_media(&self, index: &CacheIndex) -> BTreeMap<String, PersistedEntry> {
        let mut media = self
            .persisted
            .as_ref()
            .map(|doc| doc.media.clone())
            .unwrap_or_default();

        for key in &self.dropped {
            media.remove(key);
        }

        for entry in index.iter() {
            match entry.to_persisted() {
                Some(persisted) => {
                    media.insert(entry.remote_key().to_string(), persisted);
                }
                None => {
                    media.remove(entry.remote_key());
                }
            }
        }

        media
    }
}
