//! Error types for hdr-tonemap.

use thiserror::Error;

/// Errors raised while validating tone mapping inputs and configuration.
#[derive(Error, Debug)]
pub enum ToneMapError {
    /// Image dimensions must both be non-zero.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Tone mapping parameters are out of range.
    #[error("invalid tone mapping parameters: {0}")]
    InvalidParams(String),

    /// A pixel buffer does not hold the expected number of elements.
    #[error("{buffer} buffer size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for hdr-tonemap core operations.
pub type Result<T> = std::result::Result<T, ToneMapError>;
