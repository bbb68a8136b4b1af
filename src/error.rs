//! Error types for unartifact library.
//!
//! The cleanup pass itself is total and never fails; these errors come from
//! loading documents, reading configuration and writing output.

use std::io;
use thiserror::Error;

/// Result type alias for unartifact operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unartifact library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON document, report or configuration could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTML input could not be interpreted (e.g. an invalid CSS selector).
    #[error("HTML error: {0}")]
    Html(String),

    /// The input format is not recognized.
    #[error("Unknown input format")]
    UnknownFormat,

    /// The input format is recognized but support for it is not compiled in.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A configuration value is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Required element is missing from the input (e.g. no page containers).
    #[error("Missing required component: {0}")]
    MissingComponent(String),
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
