// src/mapping/mod.rs
//! Persistent test case ID → Polarion work item ID mapping.
//!
//! Lookups hit the local store first and fall back to a Polarion query; a
//! single match is cached forever. Entries are never invalidated, only
//! replaced by `set` or rebuilt by a full `sync`.

pub mod backend;
pub mod polarion;
pub mod query;

pub use self::backend::{FileStore, KeyValueStore, MemoryStore};
pub use self::polarion::PolarionClient;
pub use self::query::{escape_query, lookup_query, TestCaseRecord, WorkItemSource, LOOKUP_FIELDS};

use crate::error::{Candidates, PrepError, Result};
use std::fmt;
use std::path::Path;

/// Entries added by one [`MappingStore::sync`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// `(key, work item ID)` in the order the service returned them.
    pub added: Vec<(String, String)>,
    /// Records with neither a test case ID nor a title.
    pub skipped: usize,
}

pub struct MappingStore<S, Q> {
    project: String,
    store: S,
    source: Q,
}

impl<S: KeyValueStore, Q: WorkItemSource> MappingStore<S, Q> {
    pub fn new(project: impl Into<String>, store: S, source: Q) -> Self {
        Self {
            project: project.into(),
            store,
            source,
        }
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the work item ID for `key`, querying Polarion on a cache miss.
    ///
    /// `Ok(None)` means Polarion has no such test case.
    ///
    /// # Errors
    /// Returns [`PrepError::AmbiguousTestCase`] if more than one work item
    /// matches, or the query error if Polarion cannot be reached.
    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        if let Some(id) = self.store.get(key) {
            tracing::debug!(key, id, "mapping cache hit");
            return Ok(Some(id.to_string()));
        }

        let mut matches = self
            .source
            .query(&lookup_query(key), LOOKUP_FIELDS, &self.project)?;

        match matches.len() {
            0 => {
                tracing::info!(key, project = %self.project, "test case does not exist in Polarion");
                Ok(None)
            }
            1 => {
                let id = matches.remove(0).work_item_id;
                self.store.insert(key.to_string(), id.clone());
                Ok(Some(id))
            }
            _ => Err(PrepError::AmbiguousTestCase {
                key: key.to_string(),
                candidates: Candidates(matches.into_iter().map(Into::into).collect()),
            }),
        }
    }

    /// Stores `value` under `key`, replacing any cached ID.
    pub fn set(&mut self, key: &str, value: impl fmt::Display) {
        self.store.insert(key.to_string(), value.to_string());
    }

    /// Removes `key`. Missing keys are ignored.
    pub fn delete(&mut self, key: &str) -> Option<String> {
        self.store.remove(key)
    }

    /// Adds every Polarion test case not yet in the store.
    ///
    /// Existing entries are left alone. With `full`, the store is emptied
    /// first so the result mirrors Polarion exactly.
    ///
    /// # Errors
    /// Returns the query error; the store is untouched in that case.
    pub fn sync(&mut self, full: bool) -> Result<SyncReport> {
        let records = self.source.query("", LOOKUP_FIELDS, &self.project)?;
        if full {
            tracing::info!(project = %self.project, dropped = self.store.len(), "clearing mapping store");
            self.store.clear();
        }

        let mut report = SyncReport::default();
        for record in records {
            let Some(key) = record.mapping_key() else {
                tracing::debug!(id = %record.work_item_id, "work item has no test case ID or title");
                report.skipped += 1;
                continue;
            };
            if self.store.contains_key(key) {
                continue;
            }
            tracing::info!(key, id = %record.work_item_id, "adding mapping");
            self.store.insert(key.to_string(), record.work_item_id.clone());
            report.added.push((key.to_string(), record.work_item_id.clone()));
        }
        Ok(report)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.store.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Flushes the backing store and releases it.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be written.
    pub fn close(mut self) -> Result<()> {
        self.store.flush()
    }
}

impl<S: KeyValueStore, Q> fmt::Display for MappingStore<S, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.store.iter()).finish()
    }
}

/// Opens the file store for `project` under `dir`, runs `f`, and always
/// flushes the store afterwards, whether `f` succeeded or not.
///
/// # Errors
/// Returns the error from `f` first, otherwise any error from opening or
/// flushing the store.
pub fn with_file_store<Q, T, F>(dir: &Path, project: &str, source: Q, f: F) -> Result<T>
where
    Q: WorkItemSource,
    F: FnOnce(&mut MappingStore<FileStore, Q>) -> Result<T>,
{
    let store = FileStore::for_project(dir, project)?;
    let mut mapping = MappingStore::new(project, store, source);
    let outcome = f(&mut mapping);
    let closed = mapping.close();
    let value = outcome?;
    closed?;
    Ok(value)
}
