//! Error handling for docmeta
//!
//! Provides the centralized error taxonomy for the metadata pipeline using
//! thiserror. Validation failures are raised immediately and surfaced to the
//! caller verbatim; engine failures carry only the exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docmeta operations
#[derive(Error, Debug)]
pub enum MetaError {
    /// Input document does not exist
    #[error("File not found - {}", .0.display())]
    NotFound(PathBuf),

    /// Document extension is not on the allow-list
    #[error("Not an approved filetype - {0}")]
    UnsupportedFiletype(String),

    /// Engine binary is absent from the host search path
    #[error("{0} not installed!")]
    ExecutableNotFound(String),

    /// Engine reported a failure while reading a document
    #[error("Unable to read document (engine exit code {code:?})")]
    EngineReadFailed { code: Option<i32> },

    /// Engine reported a failure while writing a document
    #[error("Unable to write document (engine exit code {code:?})")]
    EngineWriteFailed { code: Option<i32> },

    /// Read pipeline was invoked with no documents
    #[error("No files to read!")]
    NoInputFiles,

    /// Metadata stream is an interactive terminal with nothing piped in
    #[error("Need an input to metadata!")]
    NoMetadataInput,

    /// Write destination is the stdout sentinel, which this pipeline rejects
    #[error("'-' not supported as a write destination")]
    UnsupportedDestination,

    /// Requested output format is outside the closed set
    #[error("Not an allowed format - {0}")]
    UnsupportedFormat(String),

    /// Custom tag is present in the engine output but not parsable
    #[error("Malformed metadata tag: {0}")]
    MalformedTag(String),

    /// IO errors (file operations, subprocess plumbing)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for docmeta operations
pub type Result<T> = std::result::Result<T, MetaError>;
