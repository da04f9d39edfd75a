// src/error.rs
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid numeric value '{value}' for attribute '{key}' in {file}")]
    InvalidCounter {
        file: PathBuf,
        key: String,
        value: String,
    },

    #[error("No project marker directory found in path: {path}")]
    MissingProjectMarker { path: PathBuf },

    #[error("Found multiple test cases with testCaseID '{key}' in Polarion\n{candidates}")]
    AmbiguousTestCase { key: String, candidates: Candidates },

    #[error("Polarion query failed: {0}")]
    Remote(String),

    #[error("Mapping store {path} is unusable: {reason}")]
    Store { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;

/// One work item returned for an ambiguous lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub test_case_id: Option<String>,
    pub title: Option<String>,
    pub work_item_id: String,
}

/// Every work item that matched an ambiguous lookup, one per line when displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates(pub Vec<Candidate>);

impl Candidates {
    #[must_use]
    pub fn work_item_ids(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.work_item_id.as_str()).collect()
    }
}

impl fmt::Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            match (&c.test_case_id, &c.title) {
                (Some(id), _) => {
                    writeln!(f, "testCaseID: '{id}'; workItemID: '{}'", c.work_item_id)?;
                }
                (None, Some(title)) => {
                    writeln!(f, "title: '{title}'; workItemID: '{}'", c.work_item_id)?;
                }
                (None, None) => writeln!(f, "workItemID: '{}'", c.work_item_id)?,
            }
        }
        Ok(())
    }
}

impl PrepError {
    /// Attaches a path to an I/O failure.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { source, path }
    }
}

// Allow `?` on std::io::Error by converting to PrepError::Io with unknown path.
impl From<std::io::Error> for PrepError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

impl From<walkdir::Error> for PrepError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map_or_else(|| PathBuf::from("<unknown>"), PathBuf::from);
        match e.into_io_error() {
            Some(source) => Self::Io { source, path },
            None => Self::Io {
                source: std::io::Error::other("filesystem loop detected"),
                path,
            },
        }
    }
}

impl From<reqwest::Error> for PrepError {
    fn from(e: reqwest::Error) -> Self {
        Self::Remote(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_message_lists_every_candidate() {
        let err = PrepError::AmbiguousTestCase {
            key: "proj_Foo.bar".into(),
            candidates: Candidates(vec![
                Candidate {
                    test_case_id: Some("proj_Foo.bar".into()),
                    title: None,
                    work_item_id: "JDG-1".into(),
                },
                Candidate {
                    test_case_id: None,
                    title: Some("proj_Foo.bar".into()),
                    work_item_id: "JDG-2".into(),
                },
            ]),
        };
        let msg = err.to_string();
        assert!(msg.contains("testCaseID: 'proj_Foo.bar'; workItemID: 'JDG-1'"));
        assert!(msg.contains("title: 'proj_Foo.bar'; workItemID: 'JDG-2'"));
    }
}
