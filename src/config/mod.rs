// src/config/mod.rs
pub mod types;

pub use self::types::{Config, MergeConfig, MissingMarker, PolarionConfig};

use crate::error::{PrepError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "polarion-prep.toml";

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `polarion-prep.toml` from the working directory, then applies
    /// environment overrides.
    ///
    /// # Errors
    /// Returns error if the file exists but is not valid TOML.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads a config file at `path`. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(PrepError::io(path))?;
            Self::parse_toml(&content)?
        } else {
            Self::new()
        };
        config.apply_env();
        Ok(config)
    }

    /// # Errors
    /// Returns error if `content` is not a valid config document.
    pub fn parse_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PrepError::Config(e.to_string()))
    }

    /// `POLARION_URL`, `POLARION_PROJECT` and `POLARION_TOKEN` win over file values.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let nonempty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = nonempty("POLARION_URL") {
            self.polarion.url = Some(url);
        }
        if let Some(project) = nonempty("POLARION_PROJECT") {
            self.polarion.project = Some(project);
        }
        if let Some(token) = nonempty("POLARION_TOKEN") {
            self.polarion.token = Some(token);
        }
    }
}

impl MergeConfig {
    /// Compiles the result-file pattern.
    ///
    /// # Errors
    /// Returns error if the pattern is not a valid regex.
    pub fn file_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&self.file_pattern)?)
    }

    /// # Errors
    /// Returns error if the pattern does not compile or no marker is configured.
    pub fn validate(&self) -> Result<()> {
        self.file_regex()?;
        if self.project_markers.iter().all(String::is_empty) {
            return Err(PrepError::Config(
                "merge.project_markers must name at least one directory".into(),
            ));
        }
        if self.output_name.is_empty() {
            return Err(PrepError::Config("merge.output_name is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_surefire_layout() {
        let c = Config::new();
        assert_eq!(c.merge.output_name, "ResultsForPolarion.xml");
        assert_eq!(c.merge.project_markers, vec!["target", "test-output"]);
        assert_eq!(c.merge.namespace_delimiter, "_");
        assert_eq!(c.merge.missing_marker, MissingMarker::Error);
        assert_eq!(c.polarion.page_size, 100);
        assert!(c.merge.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = Config::parse_toml("[merge]\nmissing_marker = \"empty\"\n").unwrap();
        assert_eq!(c.merge.missing_marker, MissingMarker::Empty);
        assert_eq!(c.merge.file_pattern, r"^TEST-.*\.xml$");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = Config::parse_toml("[merge\n").unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut c = Config::parse_toml("[polarion]\nproject = \"JDG\"\nurl = \"http://a\"\n").unwrap();
        c.apply_env_with(|k| match k {
            "POLARION_PROJECT" => Some("ISPN".into()),
            "POLARION_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(c.polarion.project.as_deref(), Some("ISPN"));
        assert_eq!(c.polarion.url.as_deref(), Some("http://a"));
    }

    #[test]
    fn bad_pattern_fails_validation() {
        let m = MergeConfig {
            file_pattern: "TEST-(".into(),
            ..MergeConfig::default()
        };
        assert!(m.validate().is_err());
    }
}
