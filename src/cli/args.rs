//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Local TTL cache for remote media.
#[derive(Debug, Parser)]
#[command(name = "media-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Cache directory (overrides the config file)
    #[arg(short, long, global = true, env = "MEDIA_CACHE_PATH")]
    pub path: Option<PathBuf>,

    /// Base URL the cache directory is served under
    #[arg(long, global = true, env = "MEDIA_CACHE_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// TTL in minutes for newly cached entries
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub ttl: Option<i64>,

    /// Whether TTL counts from the first fetch or the latest request
    #[arg(long, global = true, value_name = "first|request")]
    pub method: Option<String>,

    /// Only print results, no status lines
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch a URL into the cache (or reuse it) and print its public URL
    Fetch(FetchArgs),

    /// List cached entries
    List(ListArgs),

    /// Delete expired and orphaned files
    Cleanup,

    /// Show cache statistics
    Stats,

    /// Print the public URL of an already cached entry
    Url(UrlArgs),
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Remote media URL
    pub url: String,

    /// Prefix for the local filename
    #[arg(long)]
    pub prefix: Option<String>,

    /// Suffix for the local filename, before the extension
    #[arg(long)]
    pub suffix: Option<String>,

    /// Never expire this entry
    #[arg(long)]
    pub permanent: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `url` command.
#[derive(Debug, Clone, Args)]
pub struct UrlArgs {
    /// Remote media URL
    pub url: String,
}
