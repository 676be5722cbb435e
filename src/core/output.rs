//! Unified output formatting utilities for consistent CLI presentation.
//!
//! This module provides standardized formatting functions for all gover output,
//! ensuring consistent colors, spacing, and message structure across commands.
//!
//! # Color scheme
//! - Red for errors, yellow for warnings, green for success
//! - Blue for names of projects and references, bright_black for secondary details

use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
///
/// # Colors
/// - "✕ Error:" in red
/// - Message in white
/// - Newlines before and after for spacing
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a success message with consistent styling
///
/// # Format
/// ```text
///
/// ✓ <message>
///
/// ```
///
/// # Colors
/// - Checkmark in green, message in white
/// - Newlines before and after for spacing
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

/// Formats and prints a warning message with consistent styling
///
/// # Format
/// ```text
/// ⚠ <message>
/// ```
///
/// # Colors
/// - Warning sign in yellow, message in white
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message.white());
}

/// Formats and prints an informational message with consistent styling
///
/// # Format
/// ```text
///
/// <message>
///
/// ```
///
/// # Colors
/// - Message in white
/// - Newlines before and after for spacing
pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header with consistent styling
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
///
/// # Colors
/// - Header in white
/// - Newlines before and after for spacing
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}
