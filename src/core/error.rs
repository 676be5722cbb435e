//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GoverError`] which covers every failure mode of the
//! repository state engine. It uses `thiserror` for ergonomic error definitions
//! and includes constructors for the errors that are built in more than one place.
//!
//! # Public API
//! - [`GoverError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GoverError>`
//!
//! # Error Categories
//! - **Repository**: missing path, missing `.git`, ownership conflicts
//! - **External commands**: non-zero exits, cancelled or timed-out invocations
//! - **Requests**: invalid checkout requests, unknown projects, failed checkouts
//! - **Configuration and cache files**: I/O and JSON errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Text git prints when it refuses a repository owned by another user.
pub const OWNERSHIP_CONFLICT_SIGNATURE: &str = "dubious ownership";

/// Domain-specific error types for gover
#[derive(Error, Debug)]
pub enum GoverError {
    // Repository errors
    #[error("Project path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Not a git repository (no .git directory): {path}")]
    NotARepository { path: PathBuf },

    #[error("Permission denied for repository '{path}', all trust remediations failed: {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: Box<GoverError>,
    },

    // External command errors
    #[error("git {args} failed{}: {stderr}", exit_suffix(.status))]
    CommandFailed {
        args: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("git {args} did not finish within {}s", .timeout.as_secs_f32())]
    FetchTimeout { args: String, timeout: Duration },

    #[error("git {args} was cancelled")]
    Cancelled { args: String },

    // Request errors
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Project {project} failed to switch to {target}: {source}")]
    CheckoutFailed {
        project: String,
        target: String,
        #[source]
        source: Box<GoverError>,
    },

    // Configuration errors
    #[error("Could not determine the configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read config file '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    // Cache errors
    #[error("Could not determine the cache directory")]
    CacheDirectoryNotFound,

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file '{path}': {source}")]
    CacheParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using GoverError
pub type Result<T> = std::result::Result<T, GoverError>;

fn exit_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (exit {code})"),
        None => String::new(),
    }
}

impl GoverError {
    /// Create an invalid request error with a specific message
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create the invalid request error reported for unknown or disabled projects
    pub fn unknown_project(name: &str) -> Self {
        Self::invalid_request(format!("project '{name}' does not exist or is not enabled"))
    }

    /// Create a permission denied error wrapping the last underlying failure
    pub fn permission_denied(path: impl Into<PathBuf>, source: GoverError) -> Self {
        Self::PermissionDenied {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Create a command failed error from the raw process result
    pub fn command_failed(args: &[&str], status: Option<i32>, stderr: &str) -> Self {
        Self::CommandFailed {
            args: args.join(" "),
            status,
            stderr: stderr.trim().to_string(),
        }
    }

    /// Create a checkout failed error for a project and a human-readable target
    pub fn checkout_failed(
        project: impl Into<String>,
        target: impl Into<String>,
        source: GoverError,
    ) -> Self {
        Self::CheckoutFailed {
            project: project.into(),
            target: target.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error carries git's ownership-conflict refusal
    pub fn is_ownership_conflict(&self) -> bool {
        match self {
            Self::CommandFailed { stderr, .. } => stderr.contains(OWNERSHIP_CONFLICT_SIGNATURE),
            Self::PermissionDenied { .. } => true,
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
