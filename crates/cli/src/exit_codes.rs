//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad `--where` syntax, bad arguments)          |
//! | 3    | Unknown or duplicate column                               |
//! | 4    | Column not numeric                                        |
//! | 5    | Invalid range (`low > high`)                              |
//! | 6    | No tables found / no source carries the key column        |
//! | 7    | Empty intersection: no values under the current filters   |
//! | 8    | File load or save failure                                 |
//! | 9    | Settings file error                                       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`'s conversions

use sheetsift_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed `--where` clause.
/// clap uses the same code for its own parse failures.
pub const EXIT_USAGE: u8 = 2;

/// Referenced column is absent, or named twice in a projection.
pub const EXIT_COLUMN: u8 = 3;

/// Numeric filter on a column holding text or no values.
pub const EXIT_NOT_NUMERIC: u8 = 4;

/// Between filter with `low > high`.
pub const EXIT_RANGE: u8 = 5;

/// Nothing to combine: empty directory or no source carrying the key.
pub const EXIT_NO_SOURCES: u8 = 6;

/// `values` found nothing under the active filters.
pub const EXIT_EMPTY_INTERSECTION: u8 = 7;

/// A file could not be read, parsed or written.
pub const EXIT_FILE: u8 = 8;

/// The settings file could not be read or parsed.
pub const EXIT_SETTINGS: u8 = 9;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::UnknownColumn { .. } | ReconError::DuplicateColumn { .. } => EXIT_COLUMN,
        ReconError::NotNumeric { .. } => EXIT_NOT_NUMERIC,
        ReconError::InvalidRange { .. } => EXIT_RANGE,
        ReconError::NoValidSources { .. } | ReconError::NoTablesFound => EXIT_NO_SOURCES,
        ReconError::RowWidth { .. } => EXIT_ERROR,
    }
}
