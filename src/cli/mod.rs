//! Command-line interface for the media cache.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FetchArgs, ListArgs, UrlArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
