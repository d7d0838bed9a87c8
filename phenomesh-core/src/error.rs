//! Error types for phenomesh

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for phenomesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("reconstruction failed: {0}")]
    Reconstruction(String),

    #[error("failed to write output {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for phenomesh operations
pub type Result<T> = std::result::Result<T, Error>;
