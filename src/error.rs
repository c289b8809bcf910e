//! Error types for record source processing.
//!
//! The public [`RecordSource`](crate::RecordSource) surface deliberately
//! degrades to booleans and empty results; `SourceError` is the structured
//! taxonomy used by the tokenizer layer and logged before being swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for record source operations.
pub type Result<T, E = SourceError> = std::result::Result<T, E>;

/// Main error type for record source operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SourceError {
    #[error("failed to open source file: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("tokenizer error in {context}")]
    Tokenizer {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("unsupported encoding label '{label}'")]
    Encoding { label: String },

    #[error("record binding failed: {details}")]
    Bind { details: String },
}

impl SourceError {
    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        SourceError::File { path, source }
    }

    /// Helper constructor for tokenizer errors.
    pub fn tokenizer_error(context: impl Into<String>, source: csv::Error) -> Self {
        SourceError::Tokenizer { context: context.into(), source }
    }

    /// Helper constructor for encoding errors.
    pub fn encoding_error(label: impl Into<String>) -> Self {
        SourceError::Encoding { label: label.into() }
    }

    /// Helper constructor for typed-binding errors.
    pub fn bind_error(details: impl Into<String>) -> Self {
        SourceError::Bind { details: details.into() }
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::Tokenizer { context: "record read".to_string(), source: err }
    }
}
