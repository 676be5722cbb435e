//! Common assertion helpers for test output validation
//!
//! Provides predicates for validating gover command output and error messages.

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for the standard error prefix
pub fn has_error() -> impl Predicate<str> {
    predicates::str::contains("✕ Error:")
}

/// Creates a predicate that checks for an invalid request error
pub fn invalid_request() -> impl Predicate<str> {
    predicates::str::contains("Invalid request")
}

/// Creates a predicate that checks for the marker of a checked tag or branch
pub fn has_checked_ref(name: &str) -> impl Predicate<str> {
    predicates::str::is_match(format!(r"\* .*{}", regex::escape(name)))
        .expect("valid pattern")
}

/// Creates a predicate that checks for a reported working mode
pub fn has_mode(mode: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("mode: {mode}"))
}
