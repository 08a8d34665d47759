//! The cache facade.
//!
//! [`MediaCache`] ties the index, its persisted document, the storage
//! backend and the fetcher together behind get-or-fetch semantics. Entries
//! in the loaded document are materialized into the index lazily, the first
//! time they are looked up, or all at once before a cleanup pass.

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::cleanup::{is_expired, CleanupReport, Reconciler};
use super::entry::{normalize_remote_key, Entry, FileStatus, Flag};
use super::filename;
use super::index::CacheIndex;
use super::persistence::{IndexMetadata, IndexPersistence, SaveOutcome};
use super::time;
use crate::config::MediaCacheConfig;
use crate::error::{MediaCacheError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::storage::{LocalStorage, Storage};

/// Summary of a cache instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries known to the cache, loaded or not.
    pub entries: usize,
    /// Entries currently materialized in memory.
    pub materialized: usize,
    /// Size of the index file in bytes.
    pub index_size_bytes: u64,
    pub last_write: Option<String>,
    pub last_cleanup: Option<DateTime<Utc>>,
}

/// A TTL-based cache of remote media.
pub struct MediaCache {
    config: MediaCacheConfig,
    storage: Box<dyn Storage>,
    fetcher: Box<dyn Fetcher>,
    index: CacheIndex,
    persistence: IndexPersistence,
    last_cleanup: Option<DateTime<Utc>>,
    closed: bool,
}

impl MediaCache {
    /// Open a cache on the local filesystem, fetching over HTTP.
    pub fn open(config: MediaCacheConfig) -> Result<Self> {
        config.validate()?;

        let storage = LocalStorage::open(&config.local_path)?;
        let fetcher = HttpFetcher::with_options(
            config.user_agent.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )?;

        Self::with_backends(config, Box::new(storage), Box::new(fetcher))
    }

    /// Open a cache over the given storage and fetcher.
    ///
    /// Loads the index document if it exists and creates it otherwise. A
    /// document that cannot be read is an error; it is never silently
    /// replaced by an empty index.
    pub fn with_backends(
        config: MediaCacheConfig,
        storage: Box<dyn Storage>,
        fetcher: Box<dyn Fetcher>,
    ) -> Result<Self> {
        config.validate()?;

        let persistence = IndexPersistence::new(config.index_filename.clone());
        let mut cache = Self {
            config,
            storage,
            fetcher,
            index: CacheIndex::new(),
            persistence,
            last_cleanup: None,
            closed: false,
        };
        cache.instantiate()?;
        Ok(cache)
    }

    fn instantiate(&mut self) -> Result<()> {
        if self.storage.exists(self.persistence.filename()) {
            self.persistence.load(self.storage.as_ref())?;
            self.last_cleanup = self.persistence.last_cleanup();
        } else {
            tracing::info!(
                file = %self.storage.location(self.persistence.filename()).display(),
                "creating new cache index"
            );
            self.save()?;
        }
        Ok(())
    }

    pub fn config(&self) -> &MediaCacheConfig {
        &self.config
    }

    /// Change the default TTL for new entries.
    pub fn set_ttl_minutes(&mut self, ttl_minutes: i64) -> Result<()> {
        self.config.set_ttl_minutes(ttl_minutes)
    }

    /// Change the default cache method for new entries.
    pub fn set_cache_method(&mut self, method: &str) -> Result<()> {
        self.config.set_cache_method(method)
    }

    pub fn set_write_every_change(&mut self, enabled: bool) {
        self.config.write_every_change = enabled;
    }

    pub fn set_cleanup_on_shutdown(&mut self, enabled: bool) {
        self.config.cleanup_on_shutdown = enabled;
    }

    /// Return the cached entry for `url`, fetching it if needed.
    ///
    /// An existing entry that is not marked removed and whose file is still
    /// in storage is returned as is, without a fetch. A removed entry is
    /// never a hit, even when another entry has since written a file under
    /// the same name. Otherwise the media is fetched and written under a
    /// collision-free name built from the URL basename plus the optional
    /// prefix and suffix. If the fetch or write fails the index is left
    /// untouched.
    pub fn get_or_fetch(
        &mut self,
        url: &str,
        prefix: Option<&str>,
        suffix: Option<&str>,
    ) -> Result<Entry> {
        let remote_key = normalize_remote_key(url)?;
        self.materialize(&remote_key)?;

        if let Some(existing) = self.index.lookup(&remote_key) {
            let live = !existing.is_removed() && existing.file().status != FileStatus::Removed;
            if live && self.storage.exists(existing.filename()) {
                tracing::debug!(key = %remote_key, file = %existing.filename(), "cache hit");
                return Ok(existing.clone());
            }
            tracing::debug!(key = %remote_key, file = %existing.filename(), "cached file gone, refetching");
        }

        let desired = filename::desired_filename(url, &remote_key, prefix, suffix);
        let name = filename::resolve(&desired, self.storage.as_ref());

        let mut entry = Entry::new(url, self.config.ttl_minutes, self.config.cache_method)?
            .with_filename(name.clone());

        let bytes = self
            .fetcher
            .fetch(url)
            .map_err(|e| MediaCacheError::FetchFailed {
                url: url.to_string(),
                message: format!("{:#}", e),
            })?;

        self.storage
            .write(&name, &bytes)
            .map_err(|e| MediaCacheError::write_failed(&name, format!("{:#}", e)))?;
        let size = self
            .storage
            .size(&name)
            .map_err(|e| MediaCacheError::write_failed(&name, format!("{:#}", e)))?;
        if size == 0 {
            return Err(MediaCacheError::write_failed(&name, "written file has no size"));
        }

        entry.mark_written(size);
        entry.set_flag(Flag::Cached, true);
        tracing::info!(key = %remote_key, file = %name, bytes = size, "cached remote media");

        self.index.upsert(entry.clone());
        self.changed()?;

        Ok(entry)
    }

    /// Look up the entry for `url` without fetching.
    pub fn find(&mut self, url: &str) -> Result<Option<Entry>> {
        let remote_key = normalize_remote_key(url)?;
        self.materialize(&remote_key)?;
        Ok(self.index.lookup(&remote_key).cloned())
    }

    /// Public URL of a cached entry.
    ///
    /// Under [`CacheMethod::Request`](super::CacheMethod::Request) this counts
    /// as an access: the indexed entry's timestamp is reset to now and its
    /// expired flag cleared.
    pub fn public_url(&mut self, entry: &Entry) -> Result<String> {
        let remote_key = entry.remote_key();
        self.materialize(remote_key)?;

        let filename = match self.index.lookup(remote_key) {
            Some(indexed) => {
                let filename = indexed.filename().to_string();
                if indexed.cache_method() == super::CacheMethod::Request {
                    self.index.refresh_timestamp(remote_key, time::now());
                    self.changed()?;
                }
                filename
            }
            None => entry.filename().to_string(),
        };

        Ok(join_public_url(&self.config.public_url_base, &filename))
    }

    /// Pin or unpin an entry. Returns `false` if the URL is not cached.
    pub fn set_permanent(&mut self, url: &str, permanent: bool) -> Result<bool> {
        let remote_key = normalize_remote_key(url)?;
        self.materialize(&remote_key)?;

        if !self.index.set_flag(&remote_key, Flag::Permanent, permanent) {
            return Ok(false);
        }
        self.changed()?;
        Ok(true)
    }

    /// Entries currently materialized in memory, in key order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.index.iter()
    }

    /// Materialize every entry of the loaded document into the index.
    pub fn load_all(&mut self) -> Result<()> {
        for key in self.persistence.persisted_keys() {
            self.materialize(&key)?;
        }
        Ok(())
    }

    /// Reconcile the index with storage, deleting expired and orphaned
    /// files. Entries whose file was deleted are forgotten. Delete failures
    /// are reported, not returned as errors.
    pub fn cleanup(&mut self) -> Result<CleanupReport> {
        self.load_all()?;

        let now = time::now();
        let report = Reconciler::new(self.storage.as_ref(), self.persistence.filename())
            .run(&mut self.index, now)?;
        for key in &report.removed {
            self.persistence.drop_entry(key);
        }
        self.last_cleanup = Some(now);

        self.changed()?;
        Ok(report)
    }

    /// Write the index if it changed since the last write.
    pub fn flush(&mut self) -> Result<SaveOutcome> {
        self.save()
    }

    /// Drop all in-memory state and re-read the index file.
    pub fn reload(&mut self) -> Result<()> {
        self.index.clear();
        self.persistence.reset();
        self.last_cleanup = None;
        self.instantiate()
    }

    pub fn last_cleanup(&self) -> Option<DateTime<Utc>> {
        self.last_cleanup
    }

    pub fn index_filename(&self) -> &str {
        self.persistence.filename()
    }

    pub fn stats(&self) -> CacheStats {
        let mut keys = self.persistence.persisted_keys();
        keys.extend(self.index.keys().map(String::from));
        keys.sort();
        keys.dedup();

        CacheStats {
            entries: keys.len(),
            materialized: self.index.len(),
            index_size_bytes: self.persistence.size_bytes(),
            last_write: self
                .persistence
                .document()
                .and_then(|doc| doc.last_write.clone()),
            last_cleanup: self.last_cleanup,
        }
    }

    /// Shut the cache down: optional cleanup, then a final flush.
    pub fn close(mut self) -> Result<()> {
        let result = self.shutdown();
        self.closed = true;
        result
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.config.cleanup_on_shutdown {
            self.cleanup()?;
        }
        self.save()?;
        Ok(())
    }

    /// Bring one persisted entry into the index, computing its flags.
    fn materialize(&mut self, remote_key: &str) -> Result<()> {
        if self.index.contains(remote_key) {
            return Ok(());
        }
        let Some(persisted) = self.persistence.persisted_entry(remote_key) else {
            return Ok(());
        };

        let mut entry = Entry::from_persisted(remote_key, persisted).map_err(|e| {
            MediaCacheError::CorruptIndex {
                path: self.storage.location(self.persistence.filename()),
                message: e.to_string(),
            }
        })?;

        entry.set_flag(Flag::Removed, !self.storage.exists(entry.filename()));
        entry.set_flag(Flag::Expired, is_expired(&entry, time::now()));

        self.index.upsert(entry);
        Ok(())
    }

    fn changed(&mut self) -> Result<()> {
        if self.config.write_every_change {
            self.save()?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<SaveOutcome> {
        let metadata = IndexMetadata {
            public_url: self.config.public_url_base.clone(),
            last_cleanup: self.last_cleanup,
        };
        self.persistence
            .save(&self.index, &metadata, self.storage.as_ref(), time::now())
    }
}

impl Drop for MediaCache {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "failed to flush media cache on drop");
        }
    }
}

fn join_public_url(base: &str, filename: &str) -> String {
    if base.is_empty() {
        return filename.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheMethod;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Serves canned bodies and counts requests per URL.
    #[derive(Clone, Default)]
    struct StubFetcher {
        bodies: Rc<RefCell<HashMap<String, Vec<u8>>>>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl StubFetcher {
        fn serve(&self, url: &str, body: &[u8]) {
            self.bodies.borrow_mut().insert(url.to_string(), body.to_vec());
        }

        fn calls(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
            self.calls.borrow_mut().push(url.to_string());
            self.bodies
                .borrow()
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("HTTP 404 fetching {}", url))
        }
    }

    fn open(temp: &TempDir, config: MediaCacheConfig, fetcher: &StubFetcher) -> MediaCache {
        let storage = LocalStorage::open(temp.path()).unwrap();
        MediaCache::with_backends(config, Box::new(storage), Box::new(fetcher.clone())).unwrap()
    }

    fn config(temp: &TempDir) -> MediaCacheConfig {
        MediaCacheConfig::new(temp.path()).with_public_url_base("https://cdn.example.com/media/")
    }

    #[test]
    fn open_creates_index_file() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        let cache = open(&temp, config(&temp), &fetcher);

        assert!(temp.path().join("_media-cache.json").is_file());
        assert!(cache.stats().index_size_bytes > 0);
    }

    #[test]
    fn open_fails_on_corrupt_index() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("_media-cache.json"), "not json").unwrap();
        let storage = LocalStorage::open(temp.path()).unwrap();

        let result = MediaCache::with_backends(
            config(&temp),
            Box::new(storage),
            Box::new(StubFetcher::default()),
        );

        assert!(matches!(result, Err(MediaCacheError::CorruptIndex { .. })));
    }

    #[test]
    fn open_fails_on_empty_index() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("_media-cache.json"), "").unwrap();
        let storage = LocalStorage::open(temp.path()).unwrap();

        let result = MediaCache::with_backends(
            config(&temp),
            Box::new(storage),
            Box::new(StubFetcher::default()),
        );

        assert!(matches!(result, Err(MediaCacheError::EmptyFile { .. })));
    }

    #[test]
    fn second_request_is_a_hit() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        let mut cache = open(&temp, config(&temp), &fetcher);

        let first = cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();
        let second = cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(first.filename(), second.filename());
        assert_eq!(first.timestamp(), second.timestamp());
        assert!(first.is_cached());
        assert_eq!(first.file().size_bytes, 5);
        assert_eq!(fs::read(temp.path().join("a.jpg")).unwrap(), b"image");
    }

    #[test]
    fn missing_file_is_refetched() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        let mut cache = open(&temp, config(&temp), &fetcher);

        cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();
        fs::remove_file(temp.path().join("a.jpg")).unwrap();
        let again = cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(again.filename(), "a.jpg");
        assert!(temp.path().join("a.jpg").is_file());
    }

    #[test]
    fn fetch_failure_leaves_index_untouched() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        let mut cache = open(&temp, config(&temp), &fetcher);

        let err = cache
            .get_or_fetch("https://example.com/missing.jpg", None, None)
            .unwrap_err();

        assert!(matches!(err, MediaCacheError::FetchFailed { .. }));
        assert!(cache.find("https://example.com/missing.jpg").unwrap().is_none());
        assert!(!temp.path().join("missing.jpg").exists());
    }

    #[test]
    fn same_basename_gets_versioned() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        let urls = [
            "https://example.com/01/copy-test.jpg?match=cluny",
            "https://example.com/02/copy-test.jpg?match=lucy",
            "https://example.com/03/copy-test.jpg?match=cannes",
        ];
        for url in urls {
            fetcher.serve(url, url.as_bytes());
        }
        let mut cache = open(&temp, config(&temp), &fetcher);

        let names: Vec<String> = urls
            .iter()
            .map(|url| cache.get_or_fetch(url, None, None).unwrap().filename().to_string())
            .collect();

        assert_eq!(names, vec!["copy-test.jpg", "copy-test-v01.jpg", "copy-test-v02.jpg"]);
    }

    #[test]
    fn prefix_and_suffix_shape_filename() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/chapel.jpg", b"chapel");
        let mut cache = open(&temp, config(&temp), &fetcher);

        let entry = cache
            .get_or_fetch("https://example.com/chapel.jpg", Some("prefix"), Some("suffix"))
            .unwrap();

        assert_eq!(entry.filename(), "prefix-chapel-suffix.jpg");
    }

    #[test]
    fn public_url_in_first_mode_does_not_touch_timestamp() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        let mut cache = open(&temp, config(&temp), &fetcher);

        let entry = cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();
        let url = cache.public_url(&entry).unwrap();

        assert_eq!(url, "https://cdn.example.com/media/a.jpg");
        let indexed = cache.find("https://example.com/a.jpg").unwrap().unwrap();
        assert_eq!(indexed.timestamp(), entry.timestamp());
    }

    #[test]
    fn public_url_in_request_mode_refreshes_timestamp() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        let cfg = config(&temp).with_cache_method(CacheMethod::Request);
        let mut cache = open(&temp, cfg, &fetcher);
        cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();

        // Age the entry on disk, then reload so the stale timestamp is in memory.
        cache.flush().unwrap();
        let index_path = temp.path().join("_media-cache.json");
        let json = fs::read_to_string(&index_path).unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        doc["media"]["example.com/a.jpg"]["timestampUTC"] = "2001-01-01T00:00:00Z".into();
        fs::write(&index_path, serde_json::to_string(&doc).unwrap()).unwrap();
        cache.reload().unwrap();

        let stale = cache.find("https://example.com/a.jpg").unwrap().unwrap();
        assert!(stale.is_expired());

        let before = Utc::now();
        cache.public_url(&stale).unwrap();
        let refreshed = cache.find("https://example.com/a.jpg").unwrap().unwrap();

        assert!(!refreshed.is_expired());
        assert!((refreshed.timestamp() - before).num_seconds().abs() <= 2);
    }

    #[test]
    fn write_every_change_persists_immediately() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        let cfg = config(&temp).with_write_every_change(true);
        let mut cache = open(&temp, cfg, &fetcher);

        cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();

        let json = fs::read_to_string(temp.path().join("_media-cache.json")).unwrap();
        assert!(json.contains("example.com/a.jpg"));
    }

    #[test]
    fn batched_mode_waits_for_flush() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        let mut cache = open(&temp, config(&temp), &fetcher);

        cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();
        let json = fs::read_to_string(temp.path().join("_media-cache.json")).unwrap();
        assert!(!json.contains("example.com/a.jpg"));

        assert!(matches!(cache.flush().unwrap(), SaveOutcome::Written { .. }));
        assert_eq!(cache.flush().unwrap(), SaveOutcome::Unchanged);
    }

    #[test]
    fn entries_survive_reopen_without_refetch() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        {
            let mut cache = open(&temp, config(&temp), &fetcher);
            cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();
            cache.close().unwrap();
        }

        let mut cache = open(&temp, config(&temp), &fetcher);
        assert_eq!(cache.stats().materialized, 0);
        assert_eq!(cache.stats().entries, 1);

        let entry = cache.get_or_fetch("HTTPS://EXAMPLE.COM/a.jpg?v=2", None, None).unwrap();
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(entry.filename(), "a.jpg");
    }

    #[test]
    fn drop_flushes_pending_changes() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        {
            let mut cache = open(&temp, config(&temp), &fetcher);
            cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();
        }

        let json = fs::read_to_string(temp.path().join("_media-cache.json")).unwrap();
        assert!(json.contains("example.com/a.jpg"));
    }

    #[test]
    fn cleanup_removes_orphans_and_expired_entries() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/fresh.jpg", b"fresh");
        let mut cache = open(&temp, config(&temp), &fetcher);
        cache.get_or_fetch("https://example.com/fresh.jpg", None, None).unwrap();
        fs::write(temp.path().join("extra-file.jpg"), b"extra").unwrap();

        let report = cache.cleanup().unwrap();
        cache.flush().unwrap();

        assert_eq!(report.deleted, vec!["extra-file.jpg"]);
        assert!(temp.path().join("fresh.jpg").is_file());
        assert!(!temp.path().join("extra-file.jpg").exists());
        assert!(cache.last_cleanup().is_some());
    }

    #[test]
    fn expired_media_is_removed_from_disk_and_index() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/old.jpg", b"old");
        let mut cache = open(&temp, config(&temp), &fetcher);
        cache.get_or_fetch("https://example.com/old.jpg", None, None).unwrap();
        cache.flush().unwrap();

        let index_path = temp.path().join("_media-cache.json");
        let json = fs::read_to_string(&index_path).unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        doc["media"]["example.com/old.jpg"]["timestampUTC"] = "2001-01-01T00:00:00Z".into();
        fs::write(&index_path, serde_json::to_string(&doc).unwrap()).unwrap();
        cache.reload().unwrap();

        let report = cache.cleanup().unwrap();
        assert_eq!(report.removed, vec!["example.com/old.jpg"]);
        assert!(cache.find("https://example.com/old.jpg").unwrap().is_none());
        assert_eq!(cache.stats().entries, 0);
        cache.flush().unwrap();

        assert!(!temp.path().join("old.jpg").exists());
        let json = fs::read_to_string(&index_path).unwrap();
        assert!(!json.contains("example.com/old.jpg"));
        cache.reload().unwrap();
        assert!(cache.find("https://example.com/old.jpg").unwrap().is_none());
    }

    #[test]
    fn deleted_entry_is_not_a_hit_after_its_name_is_reused() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://a.example/a.jpg", b"from a");
        fetcher.serve("https://b.example/a.jpg", b"from b");
        let mut cache = open(&temp, config(&temp).with_ttl_minutes(0), &fetcher);
        cache.get_or_fetch("https://a.example/a.jpg", None, None).unwrap();
        cache.flush().unwrap();

        let index_path = temp.path().join("_media-cache.json");
        let json = fs::read_to_string(&index_path).unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        doc["media"]["a.example/a.jpg"]["timestampUTC"] = "2001-01-01T00:00:00Z".into();
        fs::write(&index_path, serde_json::to_string(&doc).unwrap()).unwrap();
        cache.reload().unwrap();
        cache.cleanup().unwrap();

        let b = cache.get_or_fetch("https://b.example/a.jpg", None, None).unwrap();
        assert_eq!(b.filename(), "a.jpg");

        let a = cache.get_or_fetch("https://a.example/a.jpg", None, None).unwrap();

        assert_eq!(fetcher.calls(), 3);
        assert_eq!(a.filename(), "a-v01.jpg");
        assert!(!a.is_removed());
        assert_eq!(fs::read(temp.path().join(a.filename())).unwrap(), b"from a");
        assert_eq!(fs::read(temp.path().join("a.jpg")).unwrap(), b"from b");
    }

    #[test]
    fn entry_marked_removed_is_refetched_when_its_name_reappears() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://a.example/a.jpg", b"from a");
        fetcher.serve("https://b.example/a.jpg", b"from b");
        let mut cache = open(&temp, config(&temp), &fetcher);
        cache.get_or_fetch("https://a.example/a.jpg", None, None).unwrap();
        fs::remove_file(temp.path().join("a.jpg")).unwrap();
        cache.cleanup().unwrap();
        assert!(cache.find("https://a.example/a.jpg").unwrap().unwrap().is_removed());

        cache.get_or_fetch("https://b.example/a.jpg", None, None).unwrap();
        let a = cache.get_or_fetch("https://a.example/a.jpg", None, None).unwrap();

        assert_eq!(fetcher.calls(), 3);
        assert_eq!(a.filename(), "a-v01.jpg");
        assert_eq!(fs::read(temp.path().join("a-v01.jpg")).unwrap(), b"from a");
    }

    #[test]
    fn set_permanent_pins_entry() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        fetcher.serve("https://example.com/a.jpg", b"image");
        let mut cache = open(&temp, config(&temp).with_ttl_minutes(0), &fetcher);
        cache.get_or_fetch("https://example.com/a.jpg", None, None).unwrap();

        assert!(cache.set_permanent("https://example.com/a.jpg", true).unwrap());
        assert!(!cache.set_permanent("https://example.com/other.jpg", true).unwrap());
        assert!(cache.find("https://example.com/a.jpg").unwrap().unwrap().is_permanent());
    }

    #[test]
    fn invalid_url_is_rejected() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        let mut cache = open(&temp, config(&temp), &fetcher);

        let err = cache.get_or_fetch("not a url", None, None).unwrap_err();

        assert!(matches!(err, MediaCacheError::InvalidUrl { .. }));
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn invalid_setters_keep_previous_values() {
        let temp = TempDir::new().unwrap();
        let fetcher = StubFetcher::default();
        let mut cache = open(&temp, config(&temp).with_ttl_minutes(15), &fetcher);

        assert!(cache.set_ttl_minutes(-1).is_err());
        assert!(cache.set_cache_method("later").is_err());

        assert_eq!(cache.config().ttl_minutes, 15);
        assert_eq!(cache.config().cache_method, CacheMethod::First);
    }

    #[test]
    fn join_public_url_handles_slashes() {
        assert_eq!(join_public_url("https://cdn/m/", "a.jpg"), "https://cdn/m/a.jpg");
        assert_eq!(join_public_url("https://cdn/m", "a.jpg"), "https://cdn/m/a.jpg");
        assert_eq!(join_public_url("", "a.jpg"), "a.jpg");
    }
}
