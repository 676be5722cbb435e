//! Gover - a command-line front end for switching deployed git working copies
//! between tags and branches.
//!
//! This library provides the repository state engine behind the `gover` binary:
//! a resilient wrapper over the git executable, version-aware tag ordering,
//! working-mode detection, bounded tag/branch enumeration and a time-limited
//! snapshot cache refreshed in the background.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - [`Engine`] with the list, checkout and refresh operations
//! - Configuration types loaded from JSON
//! - Snapshot, tag and branch data types
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Configuration
    AppConfig,
    BranchInfo,
    CheckoutOutcome,
    CheckoutRequest,
    // Engine
    Engine,
    EngineOptions,
    // Git invocation
    GitCli,
    // Error handling
    GoverError,
    ModeState,
    Project,
    ProjectListing,
    // Snapshots
    ProjectSnapshot,
    RefreshSummary,
    Result,
    TagInfo,
    TrustScope,
    WorkingMode,
};
