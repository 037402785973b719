//! Error types for utility functions

use thiserror::Error;

/// Error type for stream scanning
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UtilError {
    /// No frame sync where a frame header was expected
    #[error("Lost frame sync at byte offset {0}")]
    LostSync(usize),
    /// A header field holds a reserved or forbidden value
    #[error("Invalid frame header at byte offset {offset}: {reason}")]
    InvalidHeader { offset: usize, reason: &'static str },
    /// The last frame runs past the end of the data
    #[error("Truncated frame at byte offset {offset}: needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Result type for utility operations
pub type UtilResult<T> = std::result::Result<T, UtilError>;
