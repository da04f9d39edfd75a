// src/mapping/query.rs
//! The remote side of the mapping store: work item queries and Lucene escaping.

use crate::error::{Candidate, Result};

/// Fields requested for every test case query.
pub const LOOKUP_FIELDS: &[&str] = &["testCaseID", "title"];

/// Lucene operators escaped as a unit.
const SPECIAL_PAIRS: &[&str] = &["&&", "||"];
const SPECIAL_CHARS: &[char] = &[
    '+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
];

/// A test case work item as returned by the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseRecord {
    pub work_item_id: String,
    pub test_case_id: Option<String>,
    pub title: Option<String>,
}

impl TestCaseRecord {
    /// The key this record is stored under: its test case ID, else its title.
    #[must_use]
    pub fn mapping_key(&self) -> Option<&str> {
        nonempty(&self.test_case_id).or_else(|| nonempty(&self.title))
    }
}

fn nonempty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl From<TestCaseRecord> for Candidate {
    fn from(r: TestCaseRecord) -> Self {
        Self {
            test_case_id: r.test_case_id,
            title: r.title,
            work_item_id: r.work_item_id,
        }
    }
}

/// Anything that can answer a free-text test case query for a project.
pub trait WorkItemSource {
    /// Runs `query` in `project`, returning only `fields` besides the work item ID.
    /// An empty query matches every test case.
    ///
    /// # Errors
    /// Returns error if the service cannot be reached or answers garbage.
    fn query(&self, query: &str, fields: &[&str], project: &str) -> Result<Vec<TestCaseRecord>>;
}

impl<T: WorkItemSource + ?Sized> WorkItemSource for &T {
    fn query(&self, query: &str, fields: &[&str], project: &str) -> Result<Vec<TestCaseRecord>> {
        (**self).query(query, fields, project)
    }
}

/// Escapes Lucene query syntax so `raw` is matched literally.
#[must_use]
pub fn escape_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        if let Some(pair) = SPECIAL_PAIRS.iter().find(|p| rest.starts_with(**p)) {
            out.push('\\');
            out.push_str(pair);
            rest = &rest[pair.len()..];
            continue;
        }
        if SPECIAL_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Query matching `key` by test case ID or by title.
#[must_use]
pub fn lookup_query(key: &str) -> String {
    let escaped = escape_query(key);
    format!("testCaseID:{escaped} OR title:{escaped}")
}
