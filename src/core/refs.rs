//! Tag and branch enumeration.
//!
//! This module provides [`RefEnumerator`], which lists a repository's tags and
//! branches with a bounded count and per-item metadata.
//!
//! # Cost bounds
//! - Remote refreshes (`fetch --tags`, `fetch --all`) race a soft timeout. When
//!   the timeout wins, the fetch subprocess is killed and the listing proceeds
//!   with local references.
//! - At most [`MAX_TAGS`] tags and [`MAX_BRANCHES`] branches are returned.
//! - In fast mode the per-item detail queries are skipped and placeholders used.
//!
//! Failures of individual detail queries fall back to placeholder values; only a
//! failure to list references at all is reported as an error.

use crate::core::error::{GoverError, Result};
use crate::core::git::GitCli;
use crate::core::state::{
    BranchInfo, ModeState, TagInfo, FAST_MODE_MESSAGE, FAST_MODE_VALUE, NO_MESSAGE, UNKNOWN_TIME,
};
use crate::core::version::sort_descending;
use chrono::DateTime;
use std::path::Path;
use std::time::Duration;

pub const MAX_TAGS: usize = 20;
pub const MAX_BRANCHES: usize = 15;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);
const SUBJECT_LIMIT: usize = 50;
const SHORT_HASH_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationOptions {
    pub fast_mode: bool,
    pub skip_fetch: bool,
    pub fetch_timeout: Duration,
    pub max_tags: usize,
    pub max_branches: usize,
}

impl Default for EnumerationOptions {
    fn default() -> Self {
        Self {
            fast_mode: false,
            skip_fetch: false,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_tags: MAX_TAGS,
            max_branches: MAX_BRANCHES,
        }
    }
}

/// One entry of `git branch -a -v` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchLine {
    pub name: String,
    pub commit: String,
    pub remote: bool,
    pub head: bool,
}

pub struct RefEnumerator<'a> {
    git: &'a GitCli,
    options: EnumerationOptions,
}

impl<'a> RefEnumerator<'a> {
    pub fn new(git: &'a GitCli, options: EnumerationOptions) -> Self {
        Self { git, options }
    }

    /// List tags newest-first by version, marking the one HEAD is on.
    pub async fn list_tags(&self, path: &Path, state: &ModeState) -> Result<Vec<TagInfo>> {
        self.soft_fetch(path, &["fetch", "--tags"]).await;

        let output = self
            .git
            .run(path, &["tag", "-l", "--sort=-version:refname"])
            .await?;

        let names: Vec<&str> = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(self.options.max_tags)
            .collect();

        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let (created_time, message, commit_hash) = if self.options.fast_mode {
                (
                    FAST_MODE_VALUE.to_string(),
                    FAST_MODE_MESSAGE.to_string(),
                    FAST_MODE_VALUE.to_string(),
                )
            } else {
                self.tag_details(path, name).await
            };

            tags.push(TagInfo {
                name: name.to_string(),
                checked: state.is_current_tag(name),
                created_time,
                message,
                commit_hash,
                is_remote: false,
            });
        }

        sort_descending(&mut tags, |tag| tag.name.as_str());
        log::debug!("Found {} tags in {}", tags.len(), path.display());
        Ok(tags)
    }

    /// List local and remote-tracking branches in enumeration order.
    pub async fn list_branches(&self, path: &Path, state: &ModeState) -> Result<Vec<BranchInfo>> {
        self.soft_fetch(path, &["fetch", "--all"]).await;

        let output = self.git.run(path, &["branch", "-a", "-v"]).await?;

        let mut branches = Vec::new();
        for line in parse_branch_listing(&output)
            .into_iter()
            .take(self.options.max_branches)
        {
            let (commit_time, last_commit) = if self.options.fast_mode {
                (FAST_MODE_VALUE.to_string(), FAST_MODE_MESSAGE.to_string())
            } else {
                self.commit_details(path, &line.commit).await
            };

            branches.push(BranchInfo {
                checked: state.is_current_branch(&line.name, line.remote),
                name: line.name,
                is_remote: line.remote,
                last_commit,
                commit_hash: line.commit,
                commit_time,
            });
        }

        log::debug!("Found {} branches in {}", branches.len(), path.display());
        Ok(branches)
    }

    /// Run a remote refresh bounded by the soft timeout. Never fails.
    async fn soft_fetch(&self, path: &Path, args: &[&str]) {
        if self.options.skip_fetch {
            return;
        }

        let token = self.git.cancellation().child_token();
        let fetch = self.git.run_with_token(path, args, &token);

        match tokio::time::timeout(self.options.fetch_timeout, fetch).await {
            Ok(Ok(_)) => log::debug!("git {} finished for {}", args.join(" "), path.display()),
            Ok(Err(e)) => log::debug!("{e}; using local references"),
            Err(_) => {
                token.cancel();
                let timeout = GoverError::FetchTimeout {
                    args: args.join(" "),
                    timeout: self.options.fetch_timeout,
                };
                log::warn!("{timeout}; using local references for {}", path.display());
            }
        }
    }

    async fn tag_details(&self, path: &Path, tag: &str) -> (String, String, String) {
        let reference = format!("refs/tags/{tag}");
        let time_args = ["log", "-1", "--format=%ci", reference.as_str()];
        let message_args = ["tag", "-l", "--format=%(contents)", tag];
        let hash_args = ["rev-list", "-n", "1", reference.as_str()];
        let (time, message, hash) = tokio::join!(
            self.git.run(path, &time_args),
            self.git.run(path, &message_args),
            self.git.run(path, &hash_args),
        );

        let created_time = time
            .map_err(|e| log::debug!("Tag {tag} time lookup failed: {e}"))
            .ok()
            .and_then(|raw| format_commit_time(&raw))
            .unwrap_or_else(|| UNKNOWN_TIME.to_string());

        let message = message
            .map_err(|e| log::debug!("Tag {tag} message lookup failed: {e}"))
            .ok()
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| NO_MESSAGE.to_string());

        let commit_hash = hash
            .map_err(|e| log::debug!("Tag {tag} hash lookup failed: {e}"))
            .ok()
            .map(|full| short_hash(&full))
            .unwrap_or_default();

        (created_time, message, commit_hash)
    }

    async fn commit_details(&self, path: &Path, commit: &str) -> (String, String) {
        let time_args = ["log", "-1", "--format=%ci", commit];
        let subject_args = ["log", "-1", "--format=%s", commit];
        let (time, subject) = tokio::join!(
            self.git.run(path, &time_args),
            self.git.run(path, &subject_args),
        );

        let commit_time = time
            .ok()
            .and_then(|raw| format_commit_time(&raw))
            .unwrap_or_else(|| UNKNOWN_TIME.to_string());
        let last_commit = subject
            .map(|s| truncate_subject(&s))
            .unwrap_or_else(|_| NO_MESSAGE.to_string());

        (commit_time, last_commit)
    }
}

/// Parse `git branch -a -v` output.
///
/// `* ` marks the checked-out branch, `remotes/` is stripped (keeping the remote
/// alias), and symbolic `HEAD ->` pointers and detached-HEAD lines are skipped.
pub fn parse_branch_listing(output: &str) -> Vec<BranchLine> {
    let mut branches = Vec::new();

    for raw in output.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let (head, rest) = match line.strip_prefix("* ") {
            Some(rest) => (true, rest),
            // `+` marks a branch checked out in another worktree
            None => (false, line.strip_prefix("+ ").unwrap_or(line)),
        };
        let rest = rest.trim_start();

        // "(HEAD detached at v1.0.0)" / "(no branch)"
        if rest.starts_with('(') {
            continue;
        }

        let mut fields = rest.split_whitespace();
        let (Some(name), Some(commit)) = (fields.next(), fields.next()) else {
            continue;
        };
        if commit == "->" {
            continue;
        }

        let (name, remote) = match name.strip_prefix("remotes/") {
            Some(stripped) => (stripped, true),
            None => (name, false),
        };
        if remote && name.ends_with("/HEAD") {
            continue;
        }

        branches.push(BranchLine {
            name: name.to_string(),
            commit: commit.to_string(),
            remote,
            head,
        });
    }

    branches
}

/// Reformat git's `%ci` output (`2024-03-01 14:05:09 +0100`) as `2024-03-01 14:05`.
pub fn format_commit_time(raw: &str) -> Option<String> {
    DateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
}

/// Limit a commit subject to 50 characters, appending `...` when cut.
pub fn truncate_subject(subject: &str) -> String {
    if subject.chars().count() > SUBJECT_LIMIT {
        let cut: String = subject.chars().take(SUBJECT_LIMIT).collect();
        format!("{cut}...")
    } else {
        subject.to_string()
    }
}

fn short_hash(full: &str) -> String {
    if full.len() >= SHORT_HASH_LEN {
        full[..SHORT_HASH_LEN].to_string()
    } else {
        String::new()
    }
}
