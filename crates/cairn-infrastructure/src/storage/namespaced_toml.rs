//! Atomic TOML file holding one table per namespace key.
//!
//! Several components can share a file without clobbering each other: each
//! reads and rewrites only its own top-level table.

use cairn_core::error::{CairnError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// A TOML file whose top-level tables are independent namespaces.
///
/// Writes go through a temporary file, fsync and rename, under an exclusive
/// `fs2` lock on a sibling `.lock` file.
#[derive(Debug, Clone)]
pub struct NamespacedTomlFile {
    path: PathBuf,
}

impl NamespacedTomlFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the value stored under `namespace`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Namespace present and valid
    /// - `Ok(None)`: File missing, empty, or namespace absent
    /// - `Err`: File unreadable or namespace does not match `T`
    pub fn load<T: DeserializeOwned>(&self, namespace: &str) -> Result<Option<T>> {
        let table = self.read_table()?;
        match table.get(namespace) {
            Some(value) => Ok(Some(value.clone().try_into()?)),
            None => Ok(None),
        }
    }

    /// Replaces the value under `namespace`, leaving other namespaces intact.
    pub fn store<T: Serialize>(&self, namespace: &str, value: &T) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;

        let mut table = self.read_table()?;
        table.insert(namespace.to_string(), toml::Value::try_from(value)?);
        self.write_atomic(&toml::to_string_pretty(&table)?)
    }

    /// Removes `namespace` from the file. Missing namespaces are ignored.
    pub fn remove(&self, namespace: &str) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;

        let mut table = self.read_table()?;
        if table.remove(namespace).is_some() {
            self.write_atomic(&toml::to_string_pretty(&table)?)?;
        }
        Ok(())
    }

    fn read_table(&self) -> Result<toml::Table> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(toml::Table::new());
        }
        Ok(toml::from_str::<toml::Table>(&content)?)
    }

    fn write_atomic(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| CairnError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| CairnError::io("Path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock held for the lifetime of the guard.
///
/// The `.lock` file stays on disk. Removing it after unlocking would let a
/// waiter lock the unlinked inode while a third process locks a new file.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        use fs2::FileExt;

        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        file.lock_exclusive()
            .map_err(|e| CairnError::io(format!("Failed to acquire lock: {}", e)))?;

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        use fs2::FileExt;

        let _ = self.file.unlock();
    }
}
