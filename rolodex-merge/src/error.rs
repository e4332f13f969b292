//! Error types for rolodex-merge
//!
//! Fatal errors abort the whole run. Slot conflicts are not errors: they are
//! reported through [`crate::table::Conflict`] and logged.

use std::path::PathBuf;
use thiserror::Error;

use crate::sources::ScanError;

/// Merge error type
#[derive(Debug, Error)]
pub enum MergeError {
    /// No first-name column could be recognized after header normalization
    #[error("No name in header of table {table}")]
    MissingName {
        /// Label of the offending table
        table: String,
    },

    /// More than one record already holds this identity key
    #[error("Multiple entries exist for {first} {last}")]
    DuplicateIdentity { first: String, last: String },

    /// Malformed CSV input or failed CSV output
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Input directory could not be listed
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Merge report could not be serialized
    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),
}

impl MergeError {
    /// Attach a path to a csv error
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        MergeError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Result type for merge operations
pub type MergeResult<T> = Result<T, MergeError>;
