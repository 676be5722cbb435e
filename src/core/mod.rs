//! Core functionality for gover.
//!
//! This module provides the repository state engine: git invocation with
//! ownership-conflict recovery, version ordering, working-mode detection,
//! reference enumeration, the snapshot cache and checkouts.

pub mod cache;
pub mod checkout;
pub mod config;
pub mod diagnose;
pub mod dirs;
pub mod engine;
pub mod error;
pub mod git;
pub mod mode;
pub mod output;
pub mod refs;
pub mod state;
pub mod version;

// === Error handling ===
pub use error::{GoverError, Result};

// === Engine ===
// List, checkout and refresh operations over the configured projects
pub use engine::{CheckoutOutcome, CheckoutRequest, Engine, ProjectListing, RefreshSummary};

// === Configuration ===
pub use config::{AppConfig, EngineOptions, Project};

// === Git invocation ===
pub use git::{GitCli, TrustScope};

// === Snapshot types ===
pub use state::{BranchInfo, ModeState, ProjectSnapshot, TagInfo, WorkingMode};

// === Cache ===
pub use cache::{ProjectCache, SnapshotStore};

// === Version ordering ===
pub use version::{compare_versions, parse_version};

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{print_error, print_info, print_section_header, print_success, print_warning};
