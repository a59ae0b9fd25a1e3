//! Error types for the data-loader crate.
//!
//! Only failures that stop a whole load are errors here. Individual rating
//! entries that cannot be decoded are dropped and reported instead, see
//! [`crate::parser::DroppedRating`].

use crate::types::MovieId;
use thiserror::Error;

/// Errors that can occur while loading the catalog or a ratings document
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The document is not valid JSON or does not have the expected shape
    #[error("Malformed {document}: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The ratings document root is not a JSON object
    #[error("Expected {document} to be a JSON object but found {found}")]
    UnexpectedShape {
        document: &'static str,
        found: &'static str,
    },

    /// Two catalog records share the same id
    #[error("Duplicate movie id {id} in catalog")]
    DuplicateMovie { id: MovieId },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
