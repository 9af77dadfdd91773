//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{RecordId, RecordPrefix};

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".tracklite";

/// Suffix of every record file
pub const RECORD_SUFFIX: &str = ".tl.yaml";

/// Represents a TrackLite project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .tracklite/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open the project at `--project` if given, otherwise discover it
    pub fn locate(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Force initialization even if .tracklite/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let project_dir = root.join(PROJECT_DIR);

        std::fs::create_dir_all(&project_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = project_dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        let gitignore = project_dir.join(".gitignore");
        if !gitignore.exists() {
            std::fs::write(&gitignore, "cache.db*\n")
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        for prefix in RecordPrefix::all() {
            std::fs::create_dir_all(root.join(Self::record_directory(*prefix)))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# TrackLite Project Configuration

# Branch name shown in the status dashboard
# branch: ""

# Minimum length of a tracking query (default: 3)
# min_query_length: 3

# Default output format (auto, yaml, tsv, json, csv)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .tracklite configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Get the path for a record file
    pub fn record_path(&self, id: &RecordId) -> PathBuf {
        self.root
            .join(Self::record_directory(id.prefix()))
            .join(format!("{}{}", id, RECORD_SUFFIX))
    }

    /// Get the directory (relative to the root) for a given record prefix
    pub fn record_directory(prefix: RecordPrefix) -> &'static str {
        match prefix {
            RecordPrefix::Rcpt => "receipts",
            RecordPrefix::Lab => "lab/tests",
            RecordPrefix::Rpt => "lab/reports",
            RecordPrefix::Invc => "billing/invoices",
        }
    }

    /// Iterate all record files of a given prefix
    pub fn iter_record_files(&self, prefix: RecordPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.root.join(Self::record_directory(prefix));
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(RECORD_SUFFIX))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a TrackLite project (searched from {searched_from:?}). Run 'tracklite init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("TrackLite project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.config_dir().join("config.yaml").exists());
        assert!(project.root().join("receipts").is_dir());
        assert!(project.root().join("lab/tests").is_dir());
        assert!(project.root().join("lab/reports").is_dir());
        assert!(project.root().join("billing/invoices").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("lab/tests/archive");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_record_path_uses_kind_directory() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = RecordId::new(RecordPrefix::Invc);
        let path = project.record_path(&id);
        assert!(path.starts_with(project.root().join("billing/invoices")));
        assert!(path.to_string_lossy().ends_with(".tl.yaml"));
    }
}
