//! Local filesystem storage.

use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::Storage;

/// Stores files flat inside a single root directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Root directory for media and the index file.
    root: PathBuf,
}

impl LocalStorage {
    /// Open a storage root, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self { root: root.into() };
        storage.ensure_dir()?;
        Ok(storage)
    }

    /// Get the storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache directory {:?}", self.root))
    }

    /// Resolve a name to a path inside the root, refusing anything that
    /// would escape it.
    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0')
        {
            bail!("Invalid file name {:?}", name);
        }
        Ok(self.root.join(name))
    }
}

impl Storage for LocalStorage {
    fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn size(&self, name: &str) -> Result<u64> {
        let path = self.path_for(name)?;
        let meta =
            fs::metadata(&path).with_context(|| format!("Failed to stat {:?}", path))?;
        Ok(meta.len())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        fs::read(&path).with_context(|| format!("Failed to read {:?}", path))
    }

    /// Write using the write-to-temp-then-rename pattern so a crash never
    /// leaves a partially written file under the final name.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(name)?;
        self.ensure_dir()?;

        let temp_path = self.root.join(format!(".{}.tmp", name));
        fs::write(&temp_path, bytes)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to move {:?} into place", path))?;

        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Ok(false);
        }

        fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
        Ok(true)
    }

    fn list(&self) -> Result<BTreeSet<String>> {
        if !self.root.exists() {
            return Ok(BTreeSet::new());
        }

        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list {:?}", self.root))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }

        Ok(names)
    }

    fn location(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
