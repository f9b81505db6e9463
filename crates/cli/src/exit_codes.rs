//! CLI Exit Code Registry
//!
//! Single source of truth for `dealmap` exit codes. Scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 2       | Universal  | CLI usage error (bad args, missing file) |
//! | 60-69   | run        | Reconciliation run codes                 |
//!
//! A reconciliation with partial coverage is still a success: unmatched
//! deals are reported in the stats, not through the exit code.

// =============================================================================
// Universal (0, 2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, unsupported input format.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Run (60-69)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 60;

/// Deal or company file could not be read or decoded.
pub const EXIT_INPUT: u8 = 61;

/// Result could not be serialized or written.
pub const EXIT_OUTPUT: u8 = 62;
