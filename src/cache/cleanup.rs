//! Expiration policy and storage reconciliation.

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::entry::{Entry, FileStatus, Flag};
use super::index::CacheIndex;
use crate::error::Result;
use crate::storage::Storage;

/// Whether `entry` is past its TTL at `now`.
///
/// Permanent entries never expire. Age is counted in whole minutes, a
/// negative age (timestamp in the future) never expires, and an entry whose
/// age equals its TTL is still fresh.
pub fn is_expired(entry: &Entry, now: DateTime<Utc>) -> bool {
    if entry.is_permanent() {
        return false;
    }

    let age_minutes = now.signed_duration_since(entry.timestamp()).num_minutes();
    if age_minutes < 0 {
        return false;
    }

    age_minutes as u64 > entry.ttl_minutes()
}

/// A file the cleanup pass could not delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub name: String,
    pub message: String,
}

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files deleted from storage.
    pub deleted: Vec<String>,
    /// Files that should have been deleted but could not be.
    pub failed: Vec<DeleteFailure>,
    /// Entries found past their TTL.
    pub expired: usize,
    /// Entries whose backing file was missing.
    pub missing: usize,
    /// Remote keys dropped from the index because their file was deleted.
    pub removed: Vec<String>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Brings an index into agreement with the files actually in storage.
pub struct Reconciler<'a> {
    storage: &'a dyn Storage,
    index_filename: &'a str,
}

impl<'a> Reconciler<'a> {
    pub fn new(storage: &'a dyn Storage, index_filename: &'a str) -> Self {
        Self {
            storage,
            index_filename,
        }
    }

    /// Recompute `removed` and `expired` for every entry.
    ///
    /// Returns the names of files that should stay in storage.
    pub fn refresh_flags(
        &self,
        index: &mut CacheIndex,
        now: DateTime<Utc>,
        report: &mut CleanupReport,
    ) -> BTreeSet<String> {
        let decisions: Vec<(String, String, bool, bool)> = index
            .iter()
            .map(|entry| {
                let missing = !self.storage.exists(entry.filename());
                (
                    entry.remote_key().to_string(),
                    entry.filename().to_string(),
                    missing,
                    is_expired(entry, now),
                )
            })
            .collect();

        let mut expected = BTreeSet::new();
        expected.insert(self.index_filename.to_string());

        for (key, filename, missing, expired) in decisions {
            index.set_flag(&key, Flag::Removed, missing);
            index.set_flag(&key, Flag::Expired, expired);

            if missing {
                report.missing += 1;
                if index.lookup(&key).map(|e| e.file().status) == Some(FileStatus::Written) {
                    index.set_file_status(&key, FileStatus::Unwritten);
                }
            }
            if expired {
                report.expired += 1;
            }
            if !missing && !expired {
                expected.insert(filename);
            }
        }

        expected
    }

    /// Run a full pass: refresh flags, then delete every stored file that
    /// no remaining entry accounts for.
    ///
    /// Entries pointing at a deleted file leave the index. A failed delete
    /// is logged and recorded, its entries stay, and the pass carries on.
    pub fn run(&self, index: &mut CacheIndex, now: DateTime<Utc>) -> Result<CleanupReport> {
        let mut report = CleanupReport::default();
        let expected = self.refresh_flags(index, now, &mut report);

        let stored = self
            .storage
            .list()
            .context("Failed to list cached files")?;

        for name in stored.difference(&expected) {
            match self.storage.delete(name) {
                Ok(_) => {
                    tracing::debug!(file = %name, "removed stale cache file");
                    for key in index.find_by_filename(name) {
                        index.remove(&key);
                        report.removed.push(key);
                    }
                    report.deleted.push(name.clone());
                }
                Err(e) => {
                    tracing::warn!(file = %name, error = %format!("{:#}", e), "failed to remove cache file");
                    report.failed.push(DeleteFailure {
                        name: name.clone(),
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            expired = report.expired,
            missing = report.missing,
            removed = report.removed.len(),
            "cache cleanup finished"
        );

        Ok(report)
    }
}
