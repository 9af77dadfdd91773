//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Shortest query accepted when nothing else is configured
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

/// TrackLite configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Branch this installation runs at
    pub branch: Option<String>,

    /// Minimum number of characters in a tracking query
    pub min_query_length: Option<usize>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/tracklite/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file(&global_path);
        }

        // 3. Project config (.tracklite/config.yaml)
        if let Some(project) = project {
            config.merge_file(&project.config_dir().join("config.yaml"));
        }

        // 4. Environment variables
        config.merge_env();

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tracklite")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge a YAML config file if it exists and parses
    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yml::from_str::<Config>(&contents) {
                Ok(other) => self.merge(other),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config"),
            },
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config"),
        }
    }

    fn merge_env(&mut self) {
        if let Ok(branch) = std::env::var("TRACKLITE_BRANCH") {
            self.branch = Some(branch);
        }
        if let Ok(len) = std::env::var("TRACKLITE_MIN_QUERY_LENGTH") {
            if let Ok(len) = len.trim().parse() {
                self.min_query_length = Some(len);
            }
        }
        if let Ok(format) = std::env::var("TRACKLITE_FORMAT") {
            self.default_format = Some(format);
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.branch.is_some() {
            self.branch = other.branch;
        }
        if other.min_query_length.is_some() {
            self.min_query_length = other.min_query_length;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Minimum query length, falling back to the built-in default
    pub fn min_query_length(&self) -> usize {
        self.min_query_length.unwrap_or(DEFAULT_MIN_QUERY_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = Config {
            branch: Some("Mumbai".to_string()),
            min_query_length: Some(3),
            default_format: None,
        };
        base.merge(Config {
            branch: None,
            min_query_length: Some(5),
            default_format: Some("json".to_string()),
        });
        assert_eq!(base.branch.as_deref(), Some("Mumbai"));
        assert_eq!(base.min_query_length(), 5);
        assert_eq!(base.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_default_min_query_length() {
        assert_eq!(Config::default().min_query_length(), DEFAULT_MIN_QUERY_LENGTH);
    }

    #[test]
    fn test_merge_file_reads_project_config() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "branch: Chennai\nmin_query_length: 4\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&path);
        assert_eq!(config.branch.as_deref(), Some("Chennai"));
        assert_eq!(config.min_query_length(), 4);
    }

    #[test]
    fn test_merge_file_ignores_garbage() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "min_query_length: [not, a, number]\n").unwrap();

        let mut config = Config::default();
        config.merge_file(&path);
        assert!(config.min_query_length.is_none());
    }
}
