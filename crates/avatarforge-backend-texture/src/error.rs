//! Error types for the texture backend.

use avatarforge_types::BackendError;
use std::path::PathBuf;
use thiserror::Error;

use crate::png::PngError;

/// Result type for texture backend operations.
pub type TextureResult<T> = Result<T, TextureError>;

/// Errors that can occur while sampling or compositing textures.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The source image could not be read at all.
    #[error("Source image unavailable at {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Requested texture dimensions are unusable.
    #[error("Invalid texture size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// PNG encoding failed.
    #[error("PNG export failed: {0}")]
    Png(#[from] PngError),
}

impl BackendError for TextureError {
    fn code(&self) -> &'static str {
        match self {
            TextureError::InputUnavailable { .. } => "TEXTURE_001",
            TextureError::InvalidSize { .. } => "TEXTURE_002",
            TextureError::Png(_) => "TEXTURE_003",
        }
    }

    fn category(&self) -> &'static str {
        "texture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_and_code() {
        let err = TextureError::InvalidSize {
            width: 0,
            height: 512,
        };
        assert!(err.to_string().contains("0x512"));
        assert_eq!(err.code(), "TEXTURE_002");
        assert_eq!(err.category(), "texture");
    }

    #[test]
    fn test_png_failure_wraps() {
        let err = TextureError::from(PngError::InvalidDimensions("0x0".into()));
        assert_eq!(err.code(), "TEXTURE_003");
        assert!(err.to_string().contains("0x0"));
    }
}
