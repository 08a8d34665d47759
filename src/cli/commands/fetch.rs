//! `media-cache fetch` implementation.

use crate::cache::MediaCache;
use crate::cli::args::FetchArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Caches a URL and prints its public URL.
pub struct FetchCommand {
    args: FetchArgs,
}

impl FetchCommand {
    pub fn new(args: FetchArgs) -> Self {
        Self { args }
    }
}

impl Command for FetchCommand {
    fn execute(
        &self,
        cache: &mut MediaCache,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let mut entry = cache.get_or_fetch(
            &self.args.url,
            self.args.prefix.as_deref(),
            self.args.suffix.as_deref(),
        )?;

        if self.args.permanent && !entry.is_permanent() {
            cache.set_permanent(&self.args.url, true)?;
            if let Some(updated) = cache.find(&self.args.url)? {
                entry = updated;
            }
        }

        ui.success(&format!(
            "Cached {} as {} ({} bytes)",
            entry.fetch_url(),
            entry.filename(),
            entry.file().size_bytes
        ));
        ui.message(&cache.public_url(&entry)?);

        Ok(CommandResult::success())
    }
}
