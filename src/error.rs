//! Error types for bloomstore
//!
//! Provides a unified error type for all operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using BloomError
pub type Result<T> = std::result::Result<T, BloomError>;

/// Unified error type for bloomstore operations
#[derive(Debug, Error)]
pub enum BloomError {
    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Operation Errors
    // -------------------------------------------------------------------------
    #[error("Insufficient hashes: {supplied} supplied, {required} required")]
    InsufficientHashes { required: u32, supplied: usize },

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
}

impl BloomError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        BloomError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
