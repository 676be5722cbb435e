//! Repository validation and per-project health checks.

use crate::core::config::Project;
use crate::core::error::{GoverError, Result};
use crate::core::git::GitCli;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Fail with `PathNotFound` or `NotARepository` unless `path` holds a working copy.
pub fn validate_repository(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(GoverError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.join(".git").exists() {
        return Err(GoverError::NotARepository {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub name: String,
    pub path: PathBuf,
    pub enabled: bool,
    pub path_exists: bool,
    pub is_directory: bool,
    pub is_repository: bool,
    /// Error of the `status --porcelain` probe, if it failed.
    pub git_error: Option<String>,
    pub tag_count: Option<usize>,
}

impl Diagnosis {
    pub fn git_ok(&self) -> bool {
        self.is_repository && self.git_error.is_none()
    }
}

/// Probe a project. A missing path or `.git` skips the git probes.
pub async fn diagnose(git: &GitCli, project: &Project) -> Diagnosis {
    let path = project.path.as_path();
    let mut diagnosis = Diagnosis {
        name: project.name.clone(),
        path: project.path.clone(),
        enabled: project.enabled,
        ..Diagnosis::default()
    };

    match std::fs::metadata(path) {
        Ok(metadata) => {
            diagnosis.path_exists = true;
            diagnosis.is_directory = metadata.is_dir();
        }
        Err(e) => {
            log::debug!("{} is not accessible: {e}", path.display());
            return diagnosis;
        }
    }

    diagnosis.is_repository = path.join(".git").exists();
    if !diagnosis.is_repository {
        return diagnosis;
    }

    if let Err(e) = git.run(path, &["status", "--porcelain"]).await {
        diagnosis.git_error = Some(e.to_string());
    }

    match git.run(path, &["tag", "-l"]).await {
        Ok(output) => diagnosis.tag_count = Some(output.split_whitespace().count()),
        Err(e) => log::debug!("Tag count failed for {}: {e}", path.display()),
    }

    diagnosis
}
