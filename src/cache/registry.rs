//! Named cache instances.
//!
//! A [`CacheRegistry`] hands out one [`MediaCache`] per name. The first
//! request for a name builds the instance from the supplied config; later
//! requests return that same instance and ignore their config.
//!
//! # Example
//!
//! ```no_run
//! use expiring_media_cache::cache::CacheRegistry;
//! use expiring_media_cache::config::MediaCacheConfig;
//!
//! let mut registry = CacheRegistry::new();
//! let cache = registry
//!     .instance("default", MediaCacheConfig::new("/var/cache/media"))
//!     .unwrap();
//! let entry = cache.get_or_fetch("https://example.com/photo.jpg", None, None).unwrap();
//! println!("{}", cache.public_url(&entry).unwrap());
//! ```

use std::collections::hash_map::Entry as Slot;
use std::collections::HashMap;

use super::media_cache::MediaCache;
use crate::config::MediaCacheConfig;
use crate::error::{MediaCacheError, Result};

/// Name used when callers do not pick one.
pub const DEFAULT_NAME: &str = "default";

/// Owns cache instances by name.
#[derive(Default)]
pub struct CacheRegistry {
    instances: HashMap<String, MediaCache>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the instance called `name`, opening it from `config` if it
    /// does not exist yet.
    pub fn instance(&mut self, name: &str, config: MediaCacheConfig) -> Result<&mut MediaCache> {
        self.instance_with(name, || MediaCache::open(config))
    }

    /// Like [`instance`](Self::instance), with a custom constructor. `build`
    /// only runs when the name is not registered. A failed build registers
    /// nothing.
    pub fn instance_with<F>(&mut self, name: &str, build: F) -> Result<&mut MediaCache>
    where
        F: FnOnce() -> Result<MediaCache>,
    {
        match self.instances.entry(name.to_string()) {
            Slot::Occupied(slot) => Ok(slot.into_mut()),
            Slot::Vacant(slot) => {
                tracing::debug!(name, "opening cache instance");
                Ok(slot.insert(build()?))
            }
        }
    }

    pub fn get(&mut self, name: &str) -> Option<&mut MediaCache> {
        self.instances.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.instances.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Close every instance. All instances are closed even if some fail;
    /// the failures are returned together.
    pub fn shutdown(self) -> Result<()> {
        let mut failures = Vec::new();

        for (name, cache) in self.instances {
            if let Err(e) = cache.close() {
                tracing::warn!(name = %name, error = %e, "failed to close cache instance");
                failures.push(format!("{}: {}", name, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            failures.sort();
            Err(MediaCacheError::Other(anyhow::anyhow!(
                "Failed to close {} cache instance(s): {}",
                failures.len(),
                failures.join("; ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn same_name_returns_same_instance() {
        let temp = TempDir::new().unwrap();
        let mut registry = CacheRegistry::new();

        registry
            .instance(DEFAULT_NAME, MediaCacheConfig::new(temp.path()).with_ttl_minutes(5))
            .unwrap();
        let again = registry
            .instance(DEFAULT_NAME, MediaCacheConfig::new(temp.path()).with_ttl_minutes(99))
            .unwrap();

        assert_eq!(again.config().ttl_minutes, 5);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn different_names_are_independent() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let mut registry = CacheRegistry::new();

        registry.instance("avatars", MediaCacheConfig::new(a.path())).unwrap();
        registry.instance("posters", MediaCacheConfig::new(b.path())).unwrap();

        assert_eq!(registry.names(), vec!["avatars", "posters"]);
        assert!(a.path().join("_media-cache.json").is_file());
        assert!(b.path().join("_media-cache.json").is_file());
    }

    #[test]
    fn builder_runs_only_once() {
        let temp = TempDir::new().unwrap();
        let mut registry = CacheRegistry::new();
        let mut builds = 0;

        for _ in 0..3 {
            registry
                .instance_with("default", || {
                    builds += 1;
                    MediaCache::open(MediaCacheConfig::new(temp.path()))
                })
                .unwrap();
        }

        assert_eq!(builds, 1);
    }

    #[test]
    fn failed_build_registers_nothing() {
        let mut registry = CacheRegistry::new();

        let result = registry.instance_with("broken", || {
            Err(MediaCacheError::invalid_config("no storage"))
        });

        assert!(result.is_err());
        assert!(!registry.contains("broken"));
        assert!(registry.is_empty());
    }

    #[test]
    fn shutdown_closes_all_instances() {
        let temp = TempDir::new().unwrap();
        let mut registry = CacheRegistry::new();
        registry.instance("default", MediaCacheConfig::new(temp.path())).unwrap();

        registry.shutdown().unwrap();

        assert!(temp.path().join("_media-cache.json").is_file());
    }
}
