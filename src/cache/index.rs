//! In-memory index of cache entries.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::entry::{Entry, FileStatus, Flag};

/// Mapping of remote key to [`Entry`], always ordered by key.
///
/// The index owns every entry. Callers read through shared references or
/// clones and change state only through the described mutations below.
#[derive(Debug, Clone, Default)]
pub struct CacheIndex {
    entries: BTreeMap<String, Entry>,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry by its remote key.
    ///
    /// Returns the entry that was replaced, if any.
    pub fn upsert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.remote_key().to_string(), entry)
    }

    pub fn lookup(&self, remote_key: &str) -> Option<&Entry> {
        self.entries.get(remote_key)
    }

    pub fn contains(&self, remote_key: &str) -> bool {
        self.entries.contains_key(remote_key)
    }

    pub fn remove(&mut self, remote_key: &str) -> Option<Entry> {
        self.entries.remove(remote_key)
    }

    /// Entries in key order, reflecting the index at the time of the call.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Remote keys of every entry stored under `filename`.
    pub fn find_by_filename(&self, filename: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.filename() == filename)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Set a flag on an entry. Returns `false` if the key is unknown.
    pub fn set_flag(&mut self, remote_key: &str, flag: Flag, value: bool) -> bool {
        match self.entries.get_mut(remote_key) {
            Some(entry) => {
                entry.set_flag(flag, value);
                true
            }
            None => false,
        }
    }

    /// Restart an entry's TTL window. Returns `false` if the key is unknown.
    pub fn refresh_timestamp(&mut self, remote_key: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get_mut(remote_key) {
            Some(entry) => {
                entry.refresh_timestamp(now);
                true
            }
            None => false,
        }
    }

    /// Record the storage state of an entry's file.
    pub fn set_file_status(&mut self, remote_key: &str, status: FileStatus) -> bool {
        match self.entries.get_mut(remote_key) {
            Some(entry) => {
                entry.set_file_status(status);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
