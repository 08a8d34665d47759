//! Expiring media cache.
//!
//! Fetches remote media once, keeps it on local disk under a collision-free
//! name, and tracks every file in a JSON index next to it. Entries expire
//! after a TTL and are removed by cleanup passes.
//!
//! # Modules
//!
//! - [`cache`] - Entries, the index, persistence, cleanup and the [`MediaCache`] facade
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Cache configuration and YAML loading
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Remote media fetching
//! - [`storage`] - Storage backends
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```no_run
//! use expiring_media_cache::{MediaCache, MediaCacheConfig};
//!
//! let config = MediaCacheConfig::new("/var/cache/media")
//!     .with_public_url_base("https://cdn.example.com/media");
//! let mut cache = MediaCache::open(config).unwrap();
//!
//! let entry = cache
//!     .get_or_fetch("https://example.com/photos/chapel.jpg", None, None)
//!     .unwrap();
//! assert_eq!(entry.filename(), "chapel.jpg");
//! println!("{}", cache.public_url(&entry).unwrap());
//!
//! cache.close().unwrap();
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod storage;
pub mod ui;

pub use cache::{CacheRegistry, MediaCache};
pub use config::MediaCacheConfig;
pub use error::{MediaCacheError, Result};
