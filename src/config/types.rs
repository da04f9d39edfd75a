use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do with a result file whose path has no project marker directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingMarker {
    /// Abort the merge.
    #[default]
    Error,
    /// Use an empty namespace and keep going.
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_output_name")]
    pub output_name: String,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    /// Build-output directories that end a project path. Earlier entries win.
    #[serde(default = "default_project_markers")]
    pub project_markers: Vec<String>,
    #[serde(default = "default_delimiter")]
    pub namespace_delimiter: String,
    #[serde(default)]
    pub missing_marker: MissingMarker,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            output_name: default_output_name(),
            file_pattern: default_file_pattern(),
            project_markers: default_project_markers(),
            namespace_delimiter: default_delimiter(),
            missing_marker: MissingMarker::default(),
        }
    }
}

fn default_output_name() -> String { "ResultsForPolarion.xml".to_string() }
fn default_file_pattern() -> String { r"^TEST-.*\.xml$".to_string() }
fn default_delimiter() -> String { "_".to_string() }

fn default_project_markers() -> Vec<String> {
    vec!["target".into(), "test-output".into()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolarionConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PolarionConfig {
    fn default() -> Self {
        Self {
            url: None,
            project: None,
            token: None,
            store_dir: default_store_dir(),
            page_size: default_page_size(),
        }
    }
}

fn default_store_dir() -> PathBuf { PathBuf::from(".") }
const fn default_page_size() -> usize { 100 }

/// On-disk shape of `polarion-prep.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub polarion: PolarionConfig,
}
