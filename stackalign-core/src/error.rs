//! Error types for stackalign

use thiserror::Error;

/// Main error type for stackalign operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Degenerate transformation: {0}")]
    DegenerateTransformation(String),

    #[error("Not initialized: {0}")]
    NotInitialized(&'static str),
}

/// Result type alias for stackalign operations
pub type Result<T> = std::result::Result<T, Error>;
