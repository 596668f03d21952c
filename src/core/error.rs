//! Error types for voxstamp

use thiserror::Error;

/// Main error type for structure placement and splitting
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or inconsistent structure/world metadata
    #[error("format error: {0}")]
    Format(String),

    /// Missing file, path, or dimension
    #[error("not found: {0}")]
    NotFound(String),

    /// Unrecognized facing keyword or unclassifiable yaw
    #[error("invalid orientation: {0}")]
    InvalidOrientation(String),

    /// Paste primitive failed, including the no-rotation fallback
    #[error("paste failed: {0}")]
    Paste(String),

    /// Extraction or I/O failure mid-split
    #[error("split failed: {0}")]
    Split(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
