//! CLI Exit Code Registry
//!
//! Single source of truth for `paudit` exit codes. Scripts that schedule
//! daily audits branch on these, so values never change once published.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, unreadable config path)       |
//! | 3    | Config failed to parse or validate                   |
//! | 4    | Input table could not be loaded or lacks a column    |
//! | 5    | Runtime failure (writing output, exports)            |
//! | 6    | Discrepancies found (`--fail-on-discrepancy` only)   |

use printaudit_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing config file.
pub const EXIT_USAGE: u8 = 2;

/// Config TOML did not parse, or a value failed validation.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// POS or printer file unreadable, unsupported, empty, or missing a column.
pub const EXIT_INPUT_LOAD: u8 = 4;

/// Output or export write failed.
pub const EXIT_RUNTIME: u8 = 5;

/// Unprinted, mismatched, or printed-only rows were found.
pub const EXIT_DISCREPANCIES: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG_INVALID,
        ReconError::EmptyTable { .. } | ReconError::MissingColumn { .. } => EXIT_INPUT_LOAD,
        ReconError::Export(_) => EXIT_RUNTIME,
    }
}
