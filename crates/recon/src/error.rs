use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a merge run.
///
/// Data-shape problems (ragged rows, unparseable counts, colliding names) are
/// never reported here; they are absorbed by the reconciler.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Input file missing or unreadable.
    #[error("source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// CSV framing error (bad quoting, invalid UTF-8) while streaming a source.
    #[error("{}: CSV error: {message}", path.display())]
    Csv { path: PathBuf, message: String },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty path, bad delimiter, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Writing an output artifact failed.
    #[error("cannot write {}: {message}", path.display())]
    Output { path: PathBuf, message: String },
    /// A merged dataset could not be read back.
    #[error("cannot read merged dataset {}: {message}", path.display())]
    MergedParse { path: PathBuf, message: String },
}

impl ReconError {
    pub(crate) fn csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        Self::Csv { path: path.into(), message: err.to_string() }
    }
}
