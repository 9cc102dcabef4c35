//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, no sources given)         |
//! | 3    | Invalid input or run config                          |
//! | 4    | Source / match / config file could not be read       |
//! | 5    | Record store failure                                 |
//! | 6    | `assign`: derived name already taken, nothing stored |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use brandmap_io::StoreError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Blank path or title, empty source list, malformed run config.
pub const EXIT_INVALID_INPUT: u8 = 3;

/// A file named by the run could not be opened or read.
pub const EXIT_FILE_ACCESS: u8 = 4;

/// SQLite open / query / write failure.
pub const EXIT_STORE: u8 = 5;

/// `assign` derived a name that another record already holds.
pub const EXIT_ASSIGN_CONFLICT: u8 = 6;

/// Map a StoreError to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    if err.is_invalid_input() {
        EXIT_INVALID_INPUT
    } else if err.is_file_access() {
        EXIT_FILE_ACCESS
    } else {
        match err {
            StoreError::Sqlite(_) => EXIT_STORE,
            StoreError::Pipeline(_) => EXIT_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandmap_recon::ReconError;

    #[test]
    fn store_errors_map_to_codes() {
        let invalid = StoreError::Pipeline(ReconError::InvalidInput("x".into()));
        assert_eq!(store_exit_code(&invalid), EXIT_INVALID_INPUT);

        let config = StoreError::Pipeline(ReconError::ConfigParse("x".into()));
        assert_eq!(store_exit_code(&config), EXIT_INVALID_INPUT);

        let missing = StoreError::Pipeline(ReconError::file_access("a.csv", "not found"));
        assert_eq!(store_exit_code(&missing), EXIT_FILE_ACCESS);

        let db = StoreError::Sqlite("locked".into());
        assert_eq!(store_exit_code(&db), EXIT_STORE);

        let csv = StoreError::Pipeline(ReconError::Csv("bad".into()));
        assert_eq!(store_exit_code(&csv), EXIT_ERROR);
    }
}
