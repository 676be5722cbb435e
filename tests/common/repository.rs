//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories with branches, tags and
//! remotes, driven through the real git executable.

#![allow(dead_code)]

use gover::core::error::{GoverError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test repository setup result containing both the temporary directory
/// and the repository path. The TempDir must be kept alive for the duration
/// of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    /// Get the repository path as a reference
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run git in this repository, failing on a non-zero exit
    pub fn git(&self, args: &[&str]) -> Result<String> {
        git(&self.path, args)
    }
}

/// Runs git with `args` in `dir` and returns trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GoverError::command_failed(args, output.status.code(), &stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets up a fresh git repository on branch `main`
///
/// Sets user name and email locally to avoid prompts during commits.
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "-q"])?;
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

/// Sets up a git repository with an initial commit on `main`
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    git_commit(&repo.path, "Initial commit")?;
    Ok(repo)
}

/// Creates an empty commit with the specified message
pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    git(repo_path, &["commit", "-q", "--allow-empty", "-m", message])?;
    Ok(())
}

/// Creates a lightweight tag at HEAD
pub fn git_tag(repo_path: &Path, tag: &str) -> Result<()> {
    git(repo_path, &["tag", tag])?;
    Ok(())
}

/// Creates an annotated tag at HEAD
pub fn git_annotated_tag(repo_path: &Path, tag: &str, message: &str) -> Result<()> {
    git(repo_path, &["tag", "-a", tag, "-m", message])?;
    Ok(())
}

/// Clones `source` into a new temporary directory
pub fn clone_repo(source: &Path) -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();
    let source = source.to_string_lossy().to_string();

    git(&repo_path, &["clone", "-q", source.as_str(), "."])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

/// Name of the branch or `HEAD` when detached
pub fn current_head(repo_path: &Path) -> Result<String> {
    git(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])
}
