//! `media-cache url` implementation.

use crate::cache::MediaCache;
use crate::cli::args::UrlArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Prints the public URL of a cached entry without fetching.
pub struct UrlCommand {
    args: UrlArgs,
}

impl UrlCommand {
    pub fn new(args: UrlArgs) -> Self {
        Self { args }
    }
}

impl Command for UrlCommand {
    fn execute(
        &self,
        cache: &mut MediaCache,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        match cache.find(&self.args.url)? {
            Some(entry) if !entry.is_removed() => {
                ui.message(&cache.public_url(&entry)?);
                Ok(CommandResult::success())
            }
            _ => {
                ui.error(&format!("{} is not cached", self.args.url));
                Ok(CommandResult::failure(1))
            }
        }
    }
}
