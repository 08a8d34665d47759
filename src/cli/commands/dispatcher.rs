//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for resolving config and routing subcommands

use crate::cache::MediaCache;
use crate::cli::args::{Cli, Commands};
use crate::config::MediaCacheConfig;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command against an open cache.
    fn execute(&self, cache: &mut MediaCache, ui: &mut dyn UserInterface)
        -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Resolves the effective config and dispatches CLI commands.
pub struct CommandDispatcher {
    config: MediaCacheConfig,
}

impl CommandDispatcher {
    pub fn new(config: MediaCacheConfig) -> Self {
        Self { config }
    }

    /// Build the effective config from global flags.
    ///
    /// Values come from the config file if one is given, then flags (and
    /// their environment fallbacks) override them.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => MediaCacheConfig::from_yaml_file(path)?,
            None => MediaCacheConfig::default(),
        };

        if let Some(path) = &cli.path {
            config.local_path = path.clone();
        }
        if let Some(base) = &cli.public_url {
            config.public_url_base = base.clone();
        }
        if let Some(ttl) = cli.ttl {
            config.set_ttl_minutes(ttl)?;
        }
        if let Some(method) = &cli.method {
            config.set_cache_method(method)?;
        }

        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MediaCacheConfig {
        &self.config
    }

    /// Open the cache, run the subcommand, and close the cache.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut cache = MediaCache::open(self.config.clone())?;
        let result = Self::run(&cli.command, &mut cache, ui);
        let closed = cache.close();

        let result = result?;
        closed?;
        Ok(result)
    }

    /// Route a subcommand to its implementation.
    pub fn run(
        command: &Commands,
        cache: &mut MediaCache,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        match command {
            Commands::Fetch(args) => super::fetch::FetchCommand::new(args.clone()).execute(cache, ui),
            Commands::List(args) => super::list::ListCommand::new(args.clone()).execute(cache, ui),
            Commands::Cleanup => super::cleanup::CleanupCommand.execute(cache, ui),
            Commands::Stats => super::stats::StatsCommand.execute(cache, ui),
            Commands::Url(args) => super::url::UrlCommand::new(args.clone()).execute(cache, ui),
        }
    }
}
