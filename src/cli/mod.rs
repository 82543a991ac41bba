//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by
//! main.rs. The binary is a thin driver around the library: it diffs two
//! rendered HTML files and prints the change fragment.

mod diff;

pub use diff::{run_diff, DiffCommandConfig, DiffOutputFormat};

/// Exit codes for CLI commands.
pub mod exit_codes {
    /// No changes detected.
    pub const NO_CHANGES: i32 = 0;
    /// Changes detected.
    pub const CHANGES: i32 = 1;
    /// An error occurred.
    pub const ERROR: i32 = 2;
}
