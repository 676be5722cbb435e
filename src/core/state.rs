//! Snapshot data structures shared by the enumerator, the cache and the CLI.
//!
//! # Public API
//! - [`WorkingMode`]: How a repository's HEAD relates to branches and tags
//! - [`ModeState`]: A detected working mode with its current branch/tag names
//! - [`TagInfo`] / [`BranchInfo`]: One enumerated reference with display metadata
//! - [`ProjectSnapshot`]: Everything the listing view shows for one project
//!
//! All types serialize to JSON for `--json` output and the on-disk snapshot cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Placeholder for a creation/commit time that could not be resolved.
pub const UNKNOWN_TIME: &str = "unknown time";
/// Placeholder for a missing annotation or commit subject.
pub const NO_MESSAGE: &str = "no message";
/// Placeholder used for details skipped in fast mode.
pub const FAST_MODE_VALUE: &str = "N/A";
/// Message placeholder used for details skipped in fast mode.
pub const FAST_MODE_MESSAGE: &str = "fast mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingMode {
    Branch,
    Tag,
    Detached,
    #[default]
    Unknown,
}

impl WorkingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkingMode::Branch => "branch",
            WorkingMode::Tag => "tag",
            WorkingMode::Detached => "detached",
            WorkingMode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WorkingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of working-mode detection.
///
/// Built only through the constructors so that a branch state never carries a
/// tag name and a tag/detached state never carries a branch name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModeState {
    pub mode: WorkingMode,
    pub branch: String,
    pub tag: String,
}

impl ModeState {
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            mode: WorkingMode::Branch,
            branch: name.into(),
            tag: String::new(),
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            mode: WorkingMode::Tag,
            branch: String::new(),
            tag: name.into(),
        }
    }

    pub fn detached(nearest_tag: impl Into<String>) -> Self {
        Self {
            mode: WorkingMode::Detached,
            branch: String::new(),
            tag: nearest_tag.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether `tag` is the reference HEAD currently sits on (or near).
    pub fn is_current_tag(&self, tag: &str) -> bool {
        matches!(self.mode, WorkingMode::Tag | WorkingMode::Detached) && self.tag == tag
    }

    /// Whether `name` is the checked-out branch, counting `<remote>/<branch>`
    /// entries as matches for remote-tracking branches.
    pub fn is_current_branch(&self, name: &str, remote: bool) -> bool {
        if self.mode != WorkingMode::Branch || self.branch.is_empty() {
            return false;
        }
        name == self.branch || (remote && name.ends_with(&format!("/{}", self.branch)))
    }

    /// Short human-readable suffix such as `, current branch: main`.
    pub fn describe_current(&self) -> String {
        match self.mode {
            WorkingMode::Branch => format!(", current branch: {}", self.branch),
            WorkingMode::Tag => format!(", current tag: {}", self.tag),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: String,
    pub checked: bool,
    pub created_time: String,
    pub message: String,
    pub commit_hash: String,
    pub is_remote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub checked: bool,
    pub is_remote: bool,
    pub last_commit: String,
    pub commit_hash: String,
    pub commit_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    pub tags: Vec<TagInfo>,
    pub branches: Vec<BranchInfo>,
    pub current: bool,
    pub current_branch: String,
    pub current_tag: String,
    pub working_mode: WorkingMode,
}
