//! Error types for inkpad-core

use thiserror::Error;

/// Result type alias using inkpad-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in inkpad-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// The rendered view of a note could not be obtained
    #[error("Rendered view unavailable: {0}")]
    ViewUnavailable(String),

    /// Paginated document assembly failed
    #[error("Document error: {0}")]
    Document(String),

    /// Save sink delivery failed
    #[error("Sink error: {0}")]
    Sink(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
