//! Error types for hwhash-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hwhash-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid UTF-8
    #[error("file '{path}' is not valid UTF-8: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// File is empty or contains only whitespace
    #[error("file '{0}' is empty")]
    EmptyFile(PathBuf),

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Neither header nor headerless parsing produced any rows
    #[error("no usable rows found in '{0}'")]
    NoRows(PathBuf),

    /// Input root is missing or not a directory
    #[error("'{0}' does not exist or is not a directory")]
    InvalidDirectory(PathBuf),

    /// A row carries a column that is not part of the unioned schema
    #[error("row {row} has column '{column}' missing from the consolidated schema")]
    SchemaViolation { row: usize, column: String },

    /// Failed to write the consolidated output
    #[error("failed to write '{path}': {message}")]
    Export { path: PathBuf, message: String },

    /// Invalid run configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
