//! Numeric ordering of version-like tag names.
//!
//! Tags are compared by the runs of digits they contain, left to right, after
//! stripping a leading `v`/`V`. `v1.10.0` sorts above `v1.2.0`, `2` equals
//! `2.0.0`, and `rc-7` parses as `[7, 0, 0]`. Pre-release and build suffixes are
//! not treated specially.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is a valid regex"));

const MIN_COMPONENTS: usize = 3;

/// Parse a version string into its numeric components, padded to at least three.
pub fn parse_version(version: &str) -> Vec<u64> {
    let trimmed = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);

    let mut parts: Vec<u64> = DIGIT_RUN
        .find_iter(trimmed)
        // Runs too long for u64 saturate instead of being dropped.
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .collect();

    if parts.len() < MIN_COMPONENTS {
        parts.resize(MIN_COMPONENTS, 0);
    }
    parts
}

/// Compare two version strings component-wise, padding the shorter with zeros.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = parse_version(a);
    let right = parse_version(b);
    let len = left.len().max(right.len());

    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(0);
            let r = right.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Sort names newest-first. Names that compare equal keep their input order.
pub fn sort_descending<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| compare_versions(name(b), name(a)));
}
