//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 60-69   | ageing           | Config, input and output failures        |
//!
//! Rows with unknown invoice dates never fail a run; they are counted in the
//! summary instead.
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, malformed `--reference-date`.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Ageing (60-69)
// =============================================================================

/// Config file unreadable, not valid TOML, or failed validation.
pub const EXIT_AGEING_INVALID_CONFIG: u8 = 60;

/// An input table could not be loaded (missing file or sheet, missing
/// column, unparsable amount).
pub const EXIT_AGEING_INPUT: u8 = 61;

/// An output file could not be written.
pub const EXIT_AGEING_OUTPUT: u8 = 62;
