//! `media-cache stats` implementation.

use crate::cache::MediaCache;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::list::EntryState;

/// Prints entry counts and index metadata.
pub struct StatsCommand;

impl Command for StatsCommand {
    fn execute(
        &self,
        cache: &mut MediaCache,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        cache.load_all()?;
        let stats = cache.stats();

        let mut fresh = 0;
        let mut expired = 0;
        let mut missing = 0;
        let mut permanent = 0;
        for entry in cache.entries() {
            match EntryState::of(entry) {
                EntryState::Fresh => fresh += 1,
                EntryState::Expired => expired += 1,
                EntryState::Missing => missing += 1,
                EntryState::Permanent => permanent += 1,
            }
        }

        let never = "never".to_string();
        let theme = ui.theme().clone();
        ui.message("Cache Statistics:");
        ui.message(&theme.format_field("Entries", &stats.entries.to_string()));
        ui.message(&theme.format_field("Fresh", &fresh.to_string()));
        ui.message(&theme.format_field("Expired", &expired.to_string()));
        ui.message(&theme.format_field("Missing", &missing.to_string()));
        ui.message(&theme.format_field("Permanent", &permanent.to_string()));
        ui.message(&theme.format_field(
            "Index size",
            &format!("{} bytes", stats.index_size_bytes),
        ));
        ui.message(&theme.format_field(
            "Last write",
            stats.last_write.as_ref().unwrap_or(&never),
        ));
        ui.message(&theme.format_field(
            "Last cleanup",
            &stats
                .last_cleanup
                .map(crate::cache::time::format)
                .unwrap_or(never),
        ));
        ui.message(&theme.format_field(
            "Location",
            &cache.config().local_path.display().to_string(),
        ));

        Ok(CommandResult::success())
    }
}
