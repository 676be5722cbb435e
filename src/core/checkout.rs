//! Tag and branch checkout.
//!
//! [`CheckoutExecutor`] only mutates the working copy. Invalidating and
//! rebuilding the cached snapshot afterwards is the engine's job.

use crate::core::error::{GoverError, Result};
use crate::core::git::GitCli;
use std::fmt;
use std::path::Path;

pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    Tag(String),
    Branch(String),
}

impl fmt::Display for CheckoutTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutTarget::Tag(name) => write!(f, "tag {name}"),
            CheckoutTarget::Branch(name) => write!(f, "branch {name}"),
        }
    }
}

pub struct CheckoutExecutor<'a> {
    git: &'a GitCli,
    skip_fetch: bool,
}

impl<'a> CheckoutExecutor<'a> {
    pub fn new(git: &'a GitCli, skip_fetch: bool) -> Self {
        Self { git, skip_fetch }
    }

    pub async fn checkout(&self, path: &Path, target: &CheckoutTarget) -> Result<()> {
        match target {
            CheckoutTarget::Tag(tag) => self.checkout_tag(path, tag).await,
            CheckoutTarget::Branch(branch) => self.checkout_branch(path, branch).await,
        }
    }

    /// Switch to `tag`, leaving HEAD detached.
    pub async fn checkout_tag(&self, path: &Path, tag: &str) -> Result<()> {
        self.fetch(path, &["fetch", "--tags"]).await?;

        let reference = format!("refs/tags/{tag}");
        self.git
            .run(path, &["checkout", "--detach", reference.as_str()])
            .await?;

        log::info!("Checked out tag {tag} in {}", path.display());
        Ok(())
    }

    /// Switch to `branch`, creating a tracking branch when there is no local one.
    ///
    /// `origin/feature` and `feature` both end up on the local `feature` branch.
    pub async fn checkout_branch(&self, path: &Path, branch: &str) -> Result<()> {
        self.fetch(path, &["fetch", "--all"]).await?;

        let remotes = self.remotes(path).await;
        let (remote, local) = split_remote_alias(branch, &remotes);
        let upstream = format!("{remote}/{local}");

        if self.local_branch_exists(path, &local).await? {
            self.git.run(path, &["checkout", local.as_str()]).await?;
            log::info!("Switched to existing branch {local} in {}", path.display());

            if !remotes.iter().any(|r| *r == remote) {
                log::debug!("No remote {remote} in {}, not fast-forwarding", path.display());
                return Ok(());
            }

            if let Err(e) = self
                .git
                .run(path, &["merge", "--ff-only", upstream.as_str()])
                .await
            {
                log::warn!(
                    "Switched to {local} but could not fast-forward from {upstream}: {e}"
                );
            }
        } else {
            self.git
                .run(path, &["checkout", "-b", local.as_str(), upstream.as_str()])
                .await?;
            log::info!("Created branch {local} tracking {upstream} in {}", path.display());
        }

        Ok(())
    }

    async fn fetch(&self, path: &Path, args: &[&str]) -> Result<()> {
        if self.skip_fetch {
            log::debug!("Skipping git {} for {}", args.join(" "), path.display());
            return Ok(());
        }
        self.git.run(path, args).await.map(|_| ())
    }

    async fn remotes(&self, path: &Path) -> Vec<String> {
        match self.git.run(path, &["remote"]).await {
            Ok(output) => output
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                log::debug!("Could not list remotes of {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    async fn local_branch_exists(&self, path: &Path, name: &str) -> Result<bool> {
        let reference = format!("refs/heads/{name}");
        match self
            .git
            .run(path, &["show-ref", "--verify", "--quiet", reference.as_str()])
            .await
        {
            Ok(_) => Ok(true),
            Err(GoverError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Split `origin/feature` into `("origin", "feature")` when `origin` is a known
/// remote. Names without a known remote prefix track [`DEFAULT_REMOTE`].
pub fn split_remote_alias(branch: &str, remotes: &[String]) -> (String, String) {
    if let Some((prefix, rest)) = branch.split_once('/') {
        if !rest.is_empty() && remotes.iter().any(|remote| remote == prefix) {
            return (prefix.to_string(), rest.to_string());
        }
    }
    (DEFAULT_REMOTE.to_string(), branch.to_string())
}
