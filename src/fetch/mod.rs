//! Fetching remote media.
//!
//! The cache treats fetching as a capability: given a URL, return the raw
//! bytes or fail. [`HttpFetcher`] is the production implementation.

pub mod http;

pub use http::HttpFetcher;

use anyhow::Result;

/// Retrieves the bytes behind a remote URL.
pub trait Fetcher {
    /// Fetch the full body of `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
