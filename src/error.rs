//! Error types for icon providers.

use std::path::PathBuf;

/// Errors reported by icon sources and thumbnail decoders.
///
/// These never escape the cache: a failed lookup or decode degrades to the
/// fallback icon. The variants exist so provider implementations can report
/// precisely what went wrong for logging.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    /// No icon with this name exists in the source.
    #[error("Icon '{0}' not found")]
    NotFound(String),

    /// The file exists but is not a decodable image.
    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    /// The file format is recognized but not supported by this source.
    #[error("Unsupported icon format: {0}")]
    UnsupportedFormat(String),

    /// The source path is missing or not a regular file.
    #[error("Invalid icon path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for IconError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => IconError::Io(io),
            other => IconError::DecodeFailed(other.to_string()),
        }
    }
}
