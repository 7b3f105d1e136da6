//! Error types for image operations.

use thiserror::Error;

/// Result type for image operations.
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur during image ingest and normalization.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Image too large: {width}x{height} pixels (max {max_pixels})")]
    PixelCountTooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("Upload too large: {0} bytes (max {1})")]
    UploadTooLarge(usize, usize),

    #[error("Invalid crop selection: {0}")]
    InvalidSelection(String),

    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

impl ImageError {
    /// Create a decode failure error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create an invalid-selection error.
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection(message.into())
    }

    /// Create an encoding failure error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    /// True when the error is the caller's fault (bad upload or selection),
    /// as opposed to an internal encoding failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ImageError::Encode(_))
    }
}
