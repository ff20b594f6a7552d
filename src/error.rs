//! Error type shared by the loaders, lookups and filename parsers.

use std::path::PathBuf;

use thiserror::Error;

use crate::data::literal::LiteralError;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading a file or directory failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the file (bad quoting, ragged rows, bad field types).
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A cell could not be decoded as a literal value.
    #[error("{}, row {row}, column '{column}': {source}", path.display())]
    Literal {
        path: PathBuf,
        row: usize,
        column: String,
        #[source]
        source: LiteralError,
    },

    #[error("{}: missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("unknown song '{0}'")]
    UnknownSong(String),

    #[error("no start time for participant {participant}, song '{song}'")]
    StartTimeNotFound { participant: u32, song: String },

    #[error("{count} start times for participant {participant}, song '{song}' (expected one)")]
    AmbiguousStartTime {
        participant: u32,
        song: String,
        count: usize,
    },

    /// A trial filename did not follow the `-P<d>` / `-0<d><name><suffix>` convention.
    #[error("malformed trial name '{name}': {reason}")]
    TrialName { name: String, reason: &'static str },

    /// The working directory has no parent to use as the dataset root.
    #[error("cannot resolve dataset root from {}", .0.display())]
    NoDatasetRoot(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }
}
