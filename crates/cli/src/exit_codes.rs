//! CLI Exit Code Registry
//!
//! Single source of truth for the exit codes of `parcours`.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad arguments)                      |
//! | 3    | Input source missing or unreadable               |
//! | 4    | Invalid merge config                             |
//! | 5    | Output artifact could not be written             |
//! | 6    | Merged dataset could not be parsed               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the relevant command

use parcours_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown field names.
pub const EXIT_USAGE: u8 = 2;

/// An input CSV (or the config file itself) is missing or unreadable.
/// Nothing is written.
pub const EXIT_SOURCE_UNAVAILABLE: u8 = 3;

/// Merge config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Writing the merged dataset or the unmatched report failed.
pub const EXIT_OUTPUT: u8 = 5;

/// A merged dataset given to a query command is not valid JSON.
pub const EXIT_MERGED_PARSE: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::SourceUnavailable { .. } | ReconError::Csv { .. } => EXIT_SOURCE_UNAVAILABLE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Output { .. } => EXIT_OUTPUT,
        ReconError::MergedParse { .. } => EXIT_MERGED_PARSE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn engine_errors_map_to_distinct_codes() {
        let missing = ReconError::SourceUnavailable {
            path: PathBuf::from("ecoles.csv"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(recon_exit_code(&missing), EXIT_SOURCE_UNAVAILABLE);
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::Output { path: PathBuf::from("o"), message: "x".into() }),
            EXIT_OUTPUT
        );
        assert_ne!(EXIT_SOURCE_UNAVAILABLE, EXIT_SUCCESS);
    }
}
