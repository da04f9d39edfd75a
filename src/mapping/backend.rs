// src/mapping/backend.rs
//! Key-value backends for the mapping store.

use crate::error::{PrepError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A string-to-string map that can be flushed to durable storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<&str>;
    fn insert(&mut self, key: String, value: String);
    fn remove(&mut self, key: &str) -> Option<String>;
    fn clear(&mut self);
    fn len(&self) -> usize;
    /// Entries in key order.
    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_>;

    /// # Errors
    /// Returns error if pending changes cannot be persisted.
    fn flush(&mut self) -> Result<()>;

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory backend. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// JSON-file backend. The whole map is loaded on open and rewritten on flush.
///
/// A store dropped with unflushed changes flushes itself; use [`FileStore::close`]
/// to see the error if that write fails. Two processes sharing one file will
/// overwrite each other.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl FileStore {
    /// Opens the store for `project` inside `dir` (`<dir>/<project>.json`).
    ///
    /// # Errors
    /// Returns error if an existing store file cannot be read or parsed.
    pub fn for_project(dir: &Path, project: &str) -> Result<Self> {
        Self::open(dir.join(format!("{project}.json")))
    }

    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(PrepError::io(&path))?;
            serde_json::from_str(&content).map_err(|e| PrepError::Store {
                path: path.clone(),
                reason: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes pending changes and releases the store.
    ///
    /// # Errors
    /// Returns error if the final write fails.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: String, value: String) {
        if self.entries.get(&key) != Some(&value) {
            self.entries.insert(key, value);
            self.mark_dirty();
        }
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.mark_dirty();
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let content = serde_json::to_string_pretty(&self.entries).map_err(|e| PrepError::Store {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        atomic_write(&self.path, &content)?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush mapping store");
        }
    }
}

fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(PrepError::io(parent))?;
    }
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).map_err(PrepError::io(&temp_path))?;
    fs::rename(&temp_path, path).map_err(PrepError::io(path))?;
    Ok(())
}
