//! Local filename derivation and collision resolution.
//!
//! A cached file is named after the basename of its URL, optionally wrapped
//! in a sanitized prefix and suffix. When that name is already taken the
//! resolver appends a two-digit version (`photo-v01.jpg`, `photo-v02.jpg`,
//! ...). An existing `-vNN` suffix is stripped before probing, so resolving
//! an already-versioned name never produces `photo-v01-v01.jpg`.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

use super::entry::url_basename;
use crate::storage::Storage;

static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<base>.*)-[vV](?P<version>\d+)$").unwrap());

/// Characters that never make it into a local filename.
const ILLEGAL_CHARS: &[char] = &[
    '?', '[', ']', '/', '\\', '=', '<', '>', ':', ';', ',', '\'', '"', '&', '$', '#', '*', '(',
    ')', '|', '~', '`', '!', '{', '}', '%', '+', '’', '«', '»', '”', '“', '\0',
];

/// Remove characters that are illegal in filenames and turn encoded or
/// literal spaces into hyphens.
pub fn sanitize(part: &str) -> String {
    let spaced = part.trim().replace("%20", "-").replace(['+', ' '], "-");

    let cleaned: String = spaced
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// Split a filename into stem and extension. Leading dots do not start an
/// extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Strip a trailing `-vNN` version marker from a stem, if present.
pub fn strip_version_suffix(stem: &str) -> &str {
    match VERSION_SUFFIX.captures(stem).and_then(|c| c.name("base")) {
        Some(base) => base.as_str(),
        None => stem,
    }
}

fn join_extension(stem: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem.to_string(),
    }
}

/// Placeholder name for URLs without a usable basename.
pub fn placeholder_name(remote_key: &str) -> String {
    let hash = Sha256::digest(remote_key.as_bytes());
    format!("media-{}", hex::encode(&hash[..6]))
}

/// Derive the desired local filename for a URL before collision checks.
pub fn desired_filename(
    url: &str,
    remote_key: &str,
    prefix: Option<&str>,
    suffix: Option<&str>,
) -> String {
    let base = url_basename(url)
        .map(|name| sanitize(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| placeholder_name(remote_key));

    let (stem, extension) = split_extension(&base);
    let mut stem = stem.to_string();

    if let Some(prefix) = prefix.map(sanitize).filter(|p| !p.is_empty()) {
        stem = format!("{}-{}", prefix, stem);
    }
    if let Some(suffix) = suffix.map(sanitize).filter(|s| !s.is_empty()) {
        stem = format!("{}-{}", stem, suffix);
    }

    join_extension(&stem, extension)
}

/// Return a name that does not exist in `storage`, starting from `desired`.
///
/// Best effort only: another writer may claim the name after this returns.
pub fn resolve(desired: &str, storage: &dyn Storage) -> String {
    if !storage.exists(desired) {
        return desired.to_string();
    }

    let (stem, extension) = split_extension(desired);
    let base = strip_version_suffix(stem);

    let mut version: u64 = 1;
    loop {
        let candidate = join_extension(&format!("{}-v{:02}", base, version), extension);
        if !storage.exists(&candidate) {
            tracing::debug!(desired, resolved = %candidate, "filename collision resolved");
            return candidate;
        }
        version += 1;
    }
}
