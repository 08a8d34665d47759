//! Error types for media cache operations.
//!
//! This module defines [`MediaCacheError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each variant names the stage that failed (load, fetch, write, config)
//!   so callers can decide whether to retry, clear the cache, or propagate
//! - Storage and fetch adapters return `anyhow::Error`; the cache maps them
//!   into a typed variant at the stage boundary
//! - Failures while deleting orphans during cleanup are never surfaced here;
//!   they are collected in the cleanup report instead

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for media cache operations.
#[derive(Debug, Error)]
pub enum MediaCacheError {
    /// The index file exists but is not a valid index document.
    #[error("Corrupt cache index at {path}: {message}")]
    CorruptIndex { path: PathBuf, message: String },

    /// The index file exists but is zero bytes long.
    #[error("Cache index at {path} is empty")]
    EmptyFile { path: PathBuf },

    /// The remote media could not be fetched.
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// Writing to storage failed, or the written file has an implausible size.
    #[error("Failed to write {name}: {message}")]
    WriteFailed { name: String, message: String },

    /// A configuration value was rejected.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The URL cannot be turned into a remote key.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MediaCacheError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn write_failed(name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::WriteFailed {
            name: name.into(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for media cache operations.
pub type Result<T> = std::result::Result<T, MediaCacheError>;
