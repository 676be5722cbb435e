//! External git invocation with ownership-conflict recovery.
//!
//! This module provides [`GitCli`], the only place that spawns the git binary.
//! Every call runs with the repository as working directory, captures stdout and
//! stderr, and returns trimmed stdout on success.
//!
//! # Ownership conflicts
//! git refuses to operate on a repository owned by another user ("dubious
//! ownership"), which is common when repositories are deployed by a different
//! account than the one running gover. When a call fails with that signature:
//!
//! 1. it is retried once with an environment that trusts every directory and
//!    ignores global/system config files;
//! 2. if that still fails, the [`TrustScope`] remediations are tried in order
//!    until one succeeds, then the original call is retried once more;
//! 3. if no remediation succeeds, the call fails with
//!    [`GoverError::PermissionDenied`] wrapping the last underlying error.
//!
//! # Cancellation
//! Each `GitCli` carries a [`CancellationToken`]. Cancelling it (or a child token
//! passed to [`GitCli::run_with_token`]) kills the running subprocess.

use crate::core::error::{GoverError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Where a repository path gets recorded as a `safe.directory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustScope {
    /// `git config --global`
    Global,
    /// `git config --system`
    System,
    /// `git config` inside the repository
    Local,
    /// `git config --global` with `HOME` pointed at the temp directory
    GlobalWithTempHome,
}

/// Remediations in the order they are attempted.
pub const DEFAULT_REMEDIATIONS: [TrustScope; 4] = [
    TrustScope::Global,
    TrustScope::System,
    TrustScope::Local,
    TrustScope::GlobalWithTempHome,
];

impl TrustScope {
    pub fn describe(&self) -> &'static str {
        match self {
            TrustScope::Global => "global safe.directory",
            TrustScope::System => "system safe.directory",
            TrustScope::Local => "repository safe.directory",
            TrustScope::GlobalWithTempHome => "global safe.directory with temporary HOME",
        }
    }

    fn config_args(&self) -> &'static [&'static str] {
        match self {
            TrustScope::Global | TrustScope::GlobalWithTempHome => {
                &["config", "--global", "--add", "safe.directory"]
            }
            TrustScope::System => &["config", "--system", "--add", "safe.directory"],
            TrustScope::Local => &["config", "--add", "safe.directory"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Invocation {
    Plain,
    TrustAll,
}

#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    remediations: Vec<TrustScope>,
    cancel: CancellationToken,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            remediations: DEFAULT_REMEDIATIONS.to_vec(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` as the parent of every subprocess this instance spawns.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Replace the ordered remediation list.
    pub fn with_remediations(mut self, remediations: Vec<TrustScope>) -> Self {
        self.remediations = remediations;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run git with `args` in `path`, returning trimmed stdout.
    pub async fn run(&self, path: &Path, args: &[&str]) -> Result<String> {
        let token = self.cancel.clone();
        self.run_with_token(path, args, &token).await
    }

    /// Like [`GitCli::run`] but killed when `token` is cancelled.
    pub async fn run_with_token(
        &self,
        path: &Path,
        args: &[&str],
        token: &CancellationToken,
    ) -> Result<String> {
        let first_error = match self.invoke(path, args, Invocation::Plain, token).await {
            Ok(output) => return Ok(output),
            Err(e) if e.is_ownership_conflict() => e,
            Err(e) => return Err(e),
        };

        log::debug!(
            "Ownership conflict for {}, retrying git {} with trusted environment",
            path.display(),
            args.join(" ")
        );

        let bypass_error = match self.invoke(path, args, Invocation::TrustAll, token).await {
            Ok(output) => {
                log::debug!("Trusted environment bypass succeeded for {}", path.display());
                return Ok(output);
            }
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => e,
        };
        log::debug!("Trusted environment bypass failed: {bypass_error}");

        if let Err(last) = self.remediate(path, token).await {
            if last.is_cancelled() {
                return Err(last);
            }
            log::warn!(
                "Could not mark {} as a trusted directory (first failure: {first_error})",
                path.display()
            );
            return Err(GoverError::permission_denied(path, last));
        }

        match self.invoke(path, args, Invocation::Plain, token).await {
            Ok(output) => Ok(output),
            Err(e) if e.is_ownership_conflict() => Err(GoverError::permission_denied(path, e)),
            Err(e) => Err(e),
        }
    }

    /// Try each remediation in order; returns the last error if all fail.
    async fn remediate(&self, path: &Path, token: &CancellationToken) -> Result<TrustScope> {
        let mut last_error = GoverError::invalid_request("no trust remediations configured");

        for scope in &self.remediations {
            match self.trust_directory(*scope, path, token).await {
                Ok(()) => {
                    log::info!("Marked {} as trusted via {}", path.display(), scope.describe());
                    return Ok(*scope);
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    log::debug!("{} failed for {}: {e}", scope.describe(), path.display());
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Record `path` as a `safe.directory` at the given scope.
    pub async fn trust_directory(
        &self,
        scope: TrustScope,
        path: &Path,
        token: &CancellationToken,
    ) -> Result<()> {
        let path_arg = path.to_string_lossy();
        let mut args: Vec<&str> = scope.config_args().to_vec();
        args.push(&path_arg);

        let mut cmd = self.command(&args);
        match scope {
            TrustScope::Local => {
                cmd.current_dir(path);
            }
            TrustScope::GlobalWithTempHome => {
                cmd.env("HOME", std::env::temp_dir());
            }
            TrustScope::Global | TrustScope::System => {}
        }

        self.execute(cmd, &args, token).await.map(|_| ())
    }

    async fn invoke(
        &self,
        path: &Path,
        args: &[&str],
        invocation: Invocation,
        token: &CancellationToken,
    ) -> Result<String> {
        let mut cmd = self.command(args);
        cmd.current_dir(path);

        if invocation == Invocation::TrustAll {
            for (key, value) in trust_all_env(std::env::var_os("HOME").is_some()) {
                cmd.env(key, value);
            }
        }

        self.execute(cmd, args, token).await
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn execute(
        &self,
        mut cmd: Command,
        args: &[&str],
        token: &CancellationToken,
    ) -> Result<String> {
        log::trace!("git {}", args.join(" "));

        // Dropping the output future kills the child (kill_on_drop).
        let output = tokio::select! {
            biased;
            _ = token.cancelled() => {
                return Err(GoverError::Cancelled { args: args.join(" ") });
            }
            output = cmd.output() => output.map_err(|source| GoverError::SpawnFailed {
                program: self.program.display().to_string(),
                source,
            })?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GoverError::command_failed(args, output.status.code(), &stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Environment overrides that make git trust every directory and skip
/// global/system configuration. `HOME` is only supplied when missing.
fn trust_all_env(has_home: bool) -> Vec<(&'static str, OsString)> {
    let mut env = vec![
        ("GIT_CONFIG_COUNT", OsString::from("1")),
        ("GIT_CONFIG_KEY_0", OsString::from("safe.directory")),
        ("GIT_CONFIG_VALUE_0", OsString::from("*")),
        ("GIT_CONFIG_GLOBAL", OsString::from("/dev/null")),
        ("GIT_CONFIG_SYSTEM", OsString::from("/dev/null")),
    ];
    if !has_home {
        env.push(("HOME", std::env::temp_dir().into_os_string()));
    }
    env
}
