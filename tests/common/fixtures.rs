//! Test data generation utilities and predefined scenarios
//!
//! Provides repositories in specific states, project and configuration values
//! pointing at them, and fake git executables for failure scenarios.

#![allow(dead_code)]

use super::repository::*;
use gover::core::config::{AppConfig, EngineOptions, Project};
use gover::core::error::Result;
use std::path::{Path, PathBuf};

/// Scenario: tags `v1.0.0`, `v2.0.0`, `v1.5.3` on successive commits, HEAD
/// detached at `v2.0.0`
pub fn create_tagged_repo_detached_at_v2() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    for tag in ["v1.0.0", "v2.0.0", "v1.5.3"] {
        git_commit(&repo.path, &format!("Release {tag}"))?;
        git_annotated_tag(&repo.path, tag, &format!("release {tag}"))?;
    }
    repo.git(&["checkout", "-q", "--detach", "v2.0.0"])?;

    Ok(repo)
}

/// Scenario: an upstream repository with `main` and `feature`, and a clone of it
pub fn create_upstream_and_clone() -> Result<(TestRepo, TestRepo)> {
    let upstream = setup_test_repo_with_initial_commit()?;
    upstream.git(&["branch", "feature"])?;
    git_tag(&upstream.path, "v0.1.0")?;

    let clone = clone_repo(&upstream.path)?;
    Ok((upstream, clone))
}

pub fn project(name: &str, path: &Path) -> Project {
    Project {
        name: name.to_string(),
        path: path.to_path_buf(),
        description: format!("{name} service"),
        enabled: true,
    }
}

/// Engine options that never contact remotes
pub fn local_options() -> EngineOptions {
    EngineOptions {
        skip_fetch: true,
        ..EngineOptions::default()
    }
}

/// Writes a configuration file with `projects` and returns its path
pub fn write_config(dir: &Path, projects: Vec<Project>) -> Result<PathBuf> {
    let config = AppConfig {
        projects,
        engine: local_options(),
    };
    let file = dir.join("config.json");
    config.save(&file)?;
    Ok(file)
}

/// Fake git executables written as shell scripts
#[cfg(unix)]
pub mod fake_git {
    use gover::core::error::Result;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    pub const OWNERSHIP_ERROR: &str = "fatal: detected dubious ownership in repository at '$PWD'";

    fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
        let script = dir.join(name);
        fs::write(&script, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        Ok(script)
    }

    /// Refuses every call unless the trust-everything environment is present
    pub fn refusing_without_bypass(dir: &Path) -> Result<PathBuf> {
        let body = format!(
            r#"if [ "$GIT_CONFIG_VALUE_0" != "*" ]; then
  echo "{OWNERSHIP_ERROR}" >&2
  exit 128
fi
exec git "$@""#
        );
        write_script(dir, "git-needs-bypass", &body)
    }

    /// Refuses every repository call, records and fails every `config` call
    pub fn always_refusing(dir: &Path, log: &Path) -> Result<PathBuf> {
        let body = format!(
            r#"if [ "$1" = "config" ]; then
  echo "$* HOME=$HOME" >> "{log}"
  exit 1
fi
echo "{OWNERSHIP_ERROR}" >&2
exit 128"#,
            log = log.display()
        );
        write_script(dir, "git-always-refuses", &body)
    }

    /// Refuses repository calls until a `config --system` call succeeds
    pub fn trusted_after_system_config(dir: &Path, log: &Path) -> Result<PathBuf> {
        let marker = dir.join("system-trusted");
        let body = format!(
            r#"if [ "$1" = "config" ]; then
  echo "$*" >> "{log}"
  if [ "$2" = "--system" ]; then
    touch "{marker}"
    exit 0
  fi
  exit 1
fi
if [ ! -f "{marker}" ]; then
  echo "{OWNERSHIP_ERROR}" >&2
  exit 128
fi
exec git "$@""#,
            log = log.display(),
            marker = marker.display()
        );
        write_script(dir, "git-system-trust", &body)
    }

    /// Hangs on `fetch`, passes everything else to the real git
    pub fn slow_fetch(dir: &Path) -> Result<PathBuf> {
        let body = r#"if [ "$1" = "fetch" ]; then
  exec sleep 10
fi
exec git "$@""#;
        write_script(dir, "git-slow-fetch", body)
    }

    /// Records every invocation, then passes it to the real git
    pub fn recording(dir: &Path, log: &Path) -> Result<PathBuf> {
        let body = format!(
            r#"echo "$*" >> "{log}"
exec git "$@""#,
            log = log.display()
        );
        write_script(dir, "git-recording", &body)
    }
}
