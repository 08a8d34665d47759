//! `media-cache cleanup` implementation.

use crate::cache::MediaCache;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Runs a cleanup pass and persists the result.
pub struct CleanupCommand;

impl Command for CleanupCommand {
    fn execute(
        &self,
        cache: &mut MediaCache,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let report = cache.cleanup()?;
        cache.flush()?;

        for failure in &report.failed {
            ui.warning(&format!("Could not delete {}: {}", failure.name, failure.message));
        }

        ui.success(&format!(
            "Deleted {} file(s); {} expired, {} missing",
            report.deleted.len(),
            report.expired,
            report.missing
        ));

        Ok(if report.is_clean() {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}
