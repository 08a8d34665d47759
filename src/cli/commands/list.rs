//! `media-cache list` implementation.

use serde::Serialize;

use crate::cache::{Entry, MediaCache};
use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Lists every entry the cache knows about.
pub struct ListCommand {
    args: ListArgs,
}

impl ListCommand {
    pub fn new(args: ListArgs) -> Self {
        Self { args }
    }
}

/// State of an entry as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    Fresh,
    Expired,
    Missing,
    Permanent,
}

impl EntryState {
    pub fn of(entry: &Entry) -> Self {
        if entry.is_removed() {
            Self::Missing
        } else if entry.is_permanent() {
            Self::Permanent
        } else if entry.is_expired() {
            Self::Expired
        } else {
            Self::Fresh
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Expired => "expired",
            Self::Missing => "missing",
            Self::Permanent => "permanent",
        }
    }
}

#[derive(Debug, Serialize)]
struct ListedEntry<'a> {
    key: &'a str,
    url: &'a str,
    filename: &'a str,
    size_bytes: u64,
    timestamp: String,
    ttl_minutes: u64,
    cache_method: &'static str,
    state: EntryState,
}

impl<'a> From<&'a Entry> for ListedEntry<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            key: entry.remote_key(),
            url: entry.fetch_url(),
            filename: entry.filename(),
            size_bytes: entry.file().size_bytes,
            timestamp: crate::cache::time::format(entry.timestamp()),
            ttl_minutes: entry.ttl_minutes(),
            cache_method: entry.cache_method().as_str(),
            state: EntryState::of(entry),
        }
    }
}

impl Command for ListCommand {
    fn execute(
        &self,
        cache: &mut MediaCache,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        cache.load_all()?;
        let entries: Vec<ListedEntry> = cache.entries().map(ListedEntry::from).collect();

        if self.args.json {
            let output = serde_json::to_string_pretty(&entries)
                .map_err(|e| anyhow::anyhow!("Failed to serialize entries: {}", e))?;
            ui.message(&output);
            return Ok(CommandResult::success());
        }

        if entries.is_empty() {
            ui.message("Cache is empty");
            return Ok(CommandResult::success());
        }

        let theme = ui.theme().clone();
        for entry in &entries {
            let style = match entry.state {
                EntryState::Fresh => &theme.success,
                EntryState::Expired => &theme.warning,
                EntryState::Missing => &theme.error,
                EntryState::Permanent => &theme.info,
            };
            ui.message(&format!(
                "{} [{}] {}",
                entry.filename,
                style.apply_to(entry.state.label()),
                theme.dim.apply_to(entry.url)
            ));
        }
        ui.success(&format!("{} cached entries", entries.len()));

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaCacheConfig;
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn empty_cache_lists_nothing() {
        let temp = TempDir::new().unwrap();
        let mut cache = MediaCache::open(MediaCacheConfig::new(temp.path())).unwrap();
        let mut ui = MockUI::new();

        ListCommand::new(ListArgs::default())
            .execute(&mut cache, &mut ui)
            .unwrap();

        assert!(ui.has_message("Cache is empty"));
    }

    #[test]
    fn json_output_includes_state() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a.png");
            then.status(200).body("png");
        });
        let temp = TempDir::new().unwrap();
        let mut cache = MediaCache::open(MediaCacheConfig::new(temp.path())).unwrap();
        cache.get_or_fetch(&server.url("/a.png"), None, None).unwrap();
        let mut ui = MockUI::new();

        ListCommand::new(ListArgs { json: true })
            .execute(&mut cache, &mut ui)
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(parsed[0]["filename"], "a.png");
        assert_eq!(parsed[0]["state"], "fresh");
        assert_eq!(parsed[0]["size_bytes"], 3);
    }

    #[test]
    fn removed_file_is_listed_as_missing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a.png");
            then.status(200).body("png");
        });
        let temp = TempDir::new().unwrap();
        let config = MediaCacheConfig::new(temp.path()).with_write_every_change(true);
        let mut cache = MediaCache::open(config.clone()).unwrap();
        cache.get_or_fetch(&server.url("/a.png"), None, None).unwrap();
        cache.close().unwrap();
        std::fs::remove_file(temp.path().join("a.png")).unwrap();

        let mut cache = MediaCache::open(config).unwrap();
        let mut ui = MockUI::new();
        ListCommand::new(ListArgs::default())
            .execute(&mut cache, &mut ui)
            .unwrap();

        assert!(ui.has_message("a.png [missing]"));
    }
}
