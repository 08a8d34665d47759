//! Library integration tests.

use expiring_media_cache::cache::{CacheIndex, Entry, Flag};
use expiring_media_cache::fetch::Fetcher;
use expiring_media_cache::storage::{LocalStorage, Storage};
use expiring_media_cache::{MediaCache, MediaCacheConfig, MediaCacheError};
use tempfile::TempDir;

#[test]
fn error_types_are_public() {
    let err = MediaCacheError::FetchFailed {
        url: "https://example.com/a.jpg".into(),
        message: "HTTP 500".into(),
    };
    assert!(err.to_string().contains("https://example.com/a.jpg"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> expiring_media_cache::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use expiring_media_cache::cli::{Cli, Commands};

    let cli = Cli::parse_from(["media-cache", "list", "--json"]);

    if let Commands::List(args) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected List command");
    }
}

#[test]
fn index_is_usable_on_its_own() {
    let mut index = CacheIndex::new();
    let entry = Entry::new(
        "https://Example.com/Photos/A.jpg?x=1",
        60,
        Default::default(),
    )
    .unwrap();

    index.upsert(entry);

    assert!(index.contains("example.com/photos/a.jpg"));
    assert!(index.set_flag("example.com/photos/a.jpg", Flag::Permanent, true));
    assert!(index.lookup("example.com/photos/a.jpg").unwrap().is_permanent());
}

/// Fetcher that serves the same bytes for every URL.
struct Constant(&'static [u8]);

impl Fetcher for Constant {
    fn fetch(&self, _url: &str) -> anyhow::Result<Vec<u8>> {
        Ok(self.0.to_vec())
    }
}

#[test]
fn custom_backends_plug_into_the_facade() {
    let temp = TempDir::new().unwrap();
    let storage = LocalStorage::open(temp.path()).unwrap();
    let mut cache = MediaCache::with_backends(
        MediaCacheConfig::new(temp.path()),
        Box::new(storage),
        Box::new(Constant(b"bytes")),
    )
    .unwrap();

    let entry = cache
        .get_or_fetch("https://example.com/clip.mp4", None, Some("hd"))
        .unwrap();

    assert_eq!(entry.filename(), "clip-hd.mp4");
    let check = LocalStorage::open(temp.path()).unwrap();
    assert_eq!(check.read("clip-hd.mp4").unwrap(), b"bytes");
}
