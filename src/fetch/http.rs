//! HTTP media fetching.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::redirect::Policy;
use std::time::Duration;

use super::Fetcher;

/// Default user agent sent with media requests.
pub const DEFAULT_USER_AGENT: &str = concat!("expiring-media-cache/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_REDIRECTS: usize = 100;

const MEDIA_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,video/*,*/*;q=0.8";

/// Fetches media over HTTP/HTTPS.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with the default user agent and timeout.
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP fetcher with a custom user agent and timeout.
    pub fn with_options(user_agent: impl Into<String>, timeout: Duration) -> Result<Self> {
        let user_agent = user_agent.into();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_ACCEPT));

        let client = Client::builder()
            .user_agent(user_agent.clone())
            .default_headers(headers)
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            timeout,
            user_agent,
        })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the configured user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "fetching remote media");

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let body = response
            .bytes()
            .with_context(|| format!("Failed to read body of {}", url))?;

        if body.is_empty() {
            bail!("Empty response body from {}", url);
        }

        Ok(body.to_vec())
    }
}
