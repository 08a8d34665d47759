//! Cache entry types and remote key normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::time;
use crate::error::{MediaCacheError, Result};

/// From which point in time an entry's TTL is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMethod {
    /// TTL counts from the first fetch; the timestamp never moves.
    #[default]
    First,
    /// TTL is refreshed every time the entry's public URL is requested.
    Request,
}

impl CacheMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMethod::First => "first",
            CacheMethod::Request => "request",
        }
    }
}

impl fmt::Display for CacheMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheMethod {
    type Err = MediaCacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(CacheMethod::First),
            "request" => Ok(CacheMethod::Request),
            other => Err(MediaCacheError::invalid_config(format!(
                "cache method must be 'first' or 'request', got '{}'",
                other
            ))),
        }
    }
}

/// Lifecycle of the bytes behind an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileStatus {
    /// Not (or no longer) present in storage.
    Unwritten,
    /// Present in storage.
    #[default]
    Written,
    /// Deleted by the cache.
    Removed,
}

/// Reference to the stored bytes of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
    pub status: FileStatus,
}

impl FileRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes: 0,
            status: FileStatus::Unwritten,
        }
    }
}

/// Flags that can be toggled on an indexed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Cached,
    Expired,
    Removed,
    Permanent,
}

/// One cache record.
///
/// The remote key is fixed at construction. `cached`, `expired` and
/// `removed` are recomputed by every cleanup pass and are never persisted;
/// `permanent` is.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    remote_key: String,
    fetch_url: String,
    file: FileRef,
    timestamp: DateTime<Utc>,
    ttl_minutes: u64,
    cache_method: CacheMethod,
    permanent: bool,
    cached: bool,
    expired: bool,
    removed: bool,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Entry {
    /// Create a fresh entry for `url`, timestamped now.
    ///
    /// The local filename defaults to the URL's basename.
    pub fn new(url: &str, ttl_minutes: u64, cache_method: CacheMethod) -> Result<Self> {
        let remote_key = normalize_remote_key(url)?;
        let filename = url_basename(url).unwrap_or_default();

        Ok(Self {
            remote_key,
            fetch_url: url.trim().to_string(),
            file: FileRef::new(filename),
            timestamp: time::now(),
            ttl_minutes,
            cache_method,
            permanent: false,
            cached: false,
            expired: false,
            removed: false,
            extra: serde_json::Map::new(),
        })
    }

    /// Rebuild an entry from its persisted form.
    ///
    /// The result is marked cached; its other transient flags start cleared.
    pub fn from_persisted(remote_key: &str, persisted: &PersistedEntry) -> Result<Self> {
        let timestamp = time::parse(&persisted.timestamp_utc).map_err(|e| {
            MediaCacheError::Other(anyhow::anyhow!(
                "invalid timestamp '{}' for {}: {}",
                persisted.timestamp_utc,
                remote_key,
                e
            ))
        })?;

        Ok(Self {
            remote_key: remote_key.to_string(),
            fetch_url: persisted
                .fetch_url
                .clone()
                .unwrap_or_else(|| remote_key.to_string()),
            file: FileRef {
                name: persisted.file.filename.clone(),
                size_bytes: persisted.file.size_bytes.unwrap_or(0),
                status: FileStatus::Written,
            },
            timestamp,
            ttl_minutes: persisted.ttl_minutes,
            cache_method: persisted.cache_method,
            permanent: persisted.permanent,
            cached: true,
            expired: false,
            removed: false,
            extra: persisted.extra.clone(),
        })
    }

    /// The persisted form of this entry, or `None` if it must be left out
    /// of the index document.
    pub fn to_persisted(&self) -> Option<PersistedEntry> {
        if !self.cached && !self.permanent {
            return None;
        }
        if self.removed || self.file.status == FileStatus::Removed {
            return None;
        }

        Some(PersistedEntry {
            cache_method: self.cache_method,
            fetch_url: Some(self.fetch_url.clone()),
            file: PersistedFile {
                filename: self.file.name.clone(),
                size_bytes: (self.file.size_bytes > 0).then_some(self.file.size_bytes),
            },
            permanent: self.permanent,
            timestamp_utc: time::format(self.timestamp),
            ttl_minutes: self.ttl_minutes,
            extra: self.extra.clone(),
        })
    }

    /// Set the local filename.
    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.file.name = name.into();
        self
    }

    /// Set the creation timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the permanent flag.
    pub fn with_permanent(mut self, permanent: bool) -> Self {
        self.permanent = permanent;
        self
    }

    pub fn remote_key(&self) -> &str {
        &self.remote_key
    }

    pub fn fetch_url(&self) -> &str {
        &self.fetch_url
    }

    pub fn file(&self) -> &FileRef {
        &self.file
    }

    pub fn filename(&self) -> &str {
        &self.file.name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn ttl_minutes(&self) -> u64 {
        self.ttl_minutes
    }

    pub fn cache_method(&self) -> CacheMethod {
        self.cache_method
    }

    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::Cached => self.cached,
            Flag::Expired => self.expired,
            Flag::Removed => self.removed,
            Flag::Permanent => self.permanent,
        }
    }

    pub(crate) fn set_flag(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Cached => self.cached = value,
            Flag::Expired => self.expired = value,
            Flag::Removed => self.removed = value,
            Flag::Permanent => {
                self.permanent = value;
                if value {
                    self.expired = false;
                }
            }
        }
    }

    /// Restart the TTL window at `now`.
    pub(crate) fn refresh_timestamp(&mut self, now: DateTime<Utc>) {
        self.timestamp = now;
        self.expired = false;
    }

    pub(crate) fn set_file_status(&mut self, status: FileStatus) {
        self.file.status = status;
        if status == FileStatus::Removed {
            self.file.size_bytes = 0;
        }
    }

    pub(crate) fn mark_written(&mut self, size_bytes: u64) {
        self.file.size_bytes = size_bytes;
        self.file.status = FileStatus::Written;
    }
}

/// An entry as stored in the index document.
///
/// Unknown fields are preserved for newer format versions. Key order in
/// the written document is handled by persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEntry {
    pub cache_method: CacheMethod,

    #[serde(rename = "fetchURL", default, skip_serializing_if = "Option::is_none")]
    pub fetch_url: Option<String>,

    pub file: PersistedFile,

    #[serde(default)]
    pub permanent: bool,

    #[serde(rename = "timestampUTC")]
    pub timestamp_utc: String,

    pub ttl_minutes: u64,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFile {
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Normalize a URL into its remote key: lowercase host and path, with
/// scheme, port, query and fragment dropped.
pub fn normalize_remote_key(url: &str) -> Result<String> {
    let parsed = parse_url(url)?;
    let host = parsed.host_str().ok_or_else(|| MediaCacheError::InvalidUrl {
        url: url.to_string(),
        message: "URL has no host".to_string(),
    })?;

    Ok(format!("{}{}", host, parsed.path()).to_lowercase())
}

/// Last non-empty path segment of a URL, if any.
pub fn url_basename(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed
        .path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .map(String::from)
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url.trim()).map_err(|e| MediaCacheError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })
}
