//! Error types for the Assay library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Assay operations.
#[derive(Debug, Error)]
pub enum AssayError {
    /// The configuration source could not be found, read or parsed.
    #[error("Failed to load config '{path}': {message}")]
    ConfigLoad { path: PathBuf, message: String },

    /// The dataset named by the configuration could not be read.
    #[error("Failed to load dataset '{path}': {message}")]
    DatasetLoad { path: PathBuf, message: String },

    /// A log level outside the recognized severity set.
    #[error("Invalid log level '{0}': expected one of 10, 20, 30, 40, 50 or debug, info, warning, error, critical")]
    InvalidLogLevel(String),

    /// The context was requested without paths before any was constructed.
    #[error("No active analysis context: a config path is required on first construction")]
    NotInitialized,

    /// A provider tried to construct a context while one was loading.
    #[error("Context construction re-entered from inside a provider")]
    ReentrantLoad,

    /// The selected template identifier is malformed.
    #[error("Invalid template identifier: '{0}'")]
    InvalidTemplate(String),

    /// Two dataset columns share a name.
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Assay operations.
pub type Result<T> = std::result::Result<T, AssayError>;
