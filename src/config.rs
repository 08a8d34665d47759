//! Cache configuration.
//!
//! A [`MediaCacheConfig`] can be built in code or loaded from a YAML file:
//!
//! ```yaml
//! local_path: /var/cache/media
//! public_url_base: https://cdn.example.com/media/
//! ttl_minutes: 1440
//! cache_method: request
//! write_every_change: true
//! ```
//!
//! Every field is optional in the file; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{CacheMethod, DEFAULT_INDEX_FILENAME};
use crate::error::{MediaCacheError, Result};
use crate::fetch::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Default TTL: seven days.
pub const DEFAULT_TTL_MINUTES: u64 = 7 * 24 * 60;

/// Settings for one cache instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaCacheConfig {
    /// Directory holding cached media and the index file. Created on open.
    pub local_path: PathBuf,

    /// Base URL under which `local_path` is publicly served.
    pub public_url_base: String,

    /// Minutes before an entry expires.
    pub ttl_minutes: u64,

    /// Whether TTL counts from the first fetch or the latest request.
    pub cache_method: CacheMethod,

    /// Save the index after every change instead of only on flush/close.
    pub write_every_change: bool,

    /// Run a cleanup pass when the cache is closed.
    pub cleanup_on_shutdown: bool,

    /// Name of the index document inside `local_path`.
    pub index_filename: String,

    /// User agent sent when fetching media.
    pub user_agent: String,

    /// Fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for MediaCacheConfig {
    fn default() -> Self {
        Self {
            local_path: PathBuf::from("media-cache"),
            public_url_base: String::new(),
            ttl_minutes: DEFAULT_TTL_MINUTES,
            cache_method: CacheMethod::First,
            write_every_change: false,
            cleanup_on_shutdown: false,
            index_filename: DEFAULT_INDEX_FILENAME.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl MediaCacheConfig {
    /// Defaults with the given cache directory.
    pub fn new(local_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            ..Self::default()
        }
    }

    /// Load and validate a YAML config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            MediaCacheError::invalid_config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_public_url_base(mut self, base: impl Into<String>) -> Self {
        self.public_url_base = base.into();
        self
    }

    pub fn with_ttl_minutes(mut self, ttl_minutes: u64) -> Self {
        self.ttl_minutes = ttl_minutes;
        self
    }

    pub fn with_cache_method(mut self, cache_method: CacheMethod) -> Self {
        self.cache_method = cache_method;
        self
    }

    pub fn with_write_every_change(mut self, enabled: bool) -> Self {
        self.write_every_change = enabled;
        self
    }

    pub fn with_cleanup_on_shutdown(mut self, enabled: bool) -> Self {
        self.cleanup_on_shutdown = enabled;
        self
    }

    /// Set the TTL, rejecting negative values without changing state.
    pub fn set_ttl_minutes(&mut self, ttl_minutes: i64) -> Result<()> {
        let ttl = u64::try_from(ttl_minutes).map_err(|_| {
            MediaCacheError::invalid_config(format!(
                "ttl_minutes must not be negative, got {}",
                ttl_minutes
            ))
        })?;
        self.ttl_minutes = ttl;
        Ok(())
    }

    /// Set the cache method from its name, rejecting unknown values
    /// without changing state.
    pub fn set_cache_method(&mut self, method: &str) -> Result<()> {
        self.cache_method = method.parse()?;
        Ok(())
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.local_path.as_os_str().is_empty() {
            return Err(MediaCacheError::invalid_config("local_path must not be empty"));
        }
        if self.index_filename.is_empty()
            || self.index_filename.contains(['/', '\\'])
            || self.index_filename == "."
            || self.index_filename == ".."
        {
            return Err(MediaCacheError::invalid_config(format!(
                "index_filename must be a plain file name, got '{}'",
                self.index_filename
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(MediaCacheError::invalid_config(
                "fetch_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}
