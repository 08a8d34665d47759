//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and runs against an open
//! [`MediaCache`](crate::cache::MediaCache). [`CommandDispatcher`] resolves
//! the effective config, opens the cache, routes the subcommand, and closes
//! the cache so pending index changes are written.

pub mod cleanup;
pub mod dispatcher;
pub mod fetch;
pub mod list;
pub mod stats;
pub mod url;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
