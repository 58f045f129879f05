//! Deterministic PNG writer.
//!
//! Uses fixed compression settings so the same texture always encodes to
//! the same bytes, which keeps re-exports byte-identical.

use std::io::Write;
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::TextureBuffer;

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Named compression presets, as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngPreset {
    #[default]
    Default,
    Fast,
    Best,
}

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Create config optimized for file size (slower, but deterministic).
    pub fn best_compression() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }

    /// Create config optimized for speed (faster, but larger files).
    pub fn fast() -> Self {
        Self {
            compression: Compression::Fast,
            filter: FilterType::NoFilter,
        }
    }

    /// Resolve a named preset.
    pub fn from_preset(preset: PngPreset) -> Self {
        match preset {
            PngPreset::Default => Self::default(),
            PngPreset::Fast => Self::fast(),
            PngPreset::Best => Self::best_compression(),
        }
    }
}

/// Encode raw 8-bit pixel data to any writer.
fn encode<W: Write>(
    data: &[u8],
    width: u32,
    height: u32,
    color_type: ColorType,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    let channels = match color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(PngError::InvalidDimensions(
                "Indexed color not supported".into(),
            ))
        }
    };
    let expected = (width as usize) * (height as usize) * channels;
    if width == 0 || height == 0 || data.len() != expected {
        return Err(PngError::InvalidDimensions(format!(
            "Expected {} bytes for {}x{} {:?}, got {}",
            expected,
            width,
            height,
            color_type,
            data.len()
        )));
    }

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    // The png crate writes no timestamps or other variable metadata.
    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(data)?;
    Ok(())
}

fn write_file(
    data: &[u8],
    width: u32,
    height: u32,
    color_type: ColorType,
    path: &Path,
    config: &PngConfig,
) -> Result<(), PngError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    encode(data, width, height, color_type, writer, config)
}

/// Write an opaque RGB texture to a PNG file.
pub fn write_rgb(buffer: &TextureBuffer, path: &Path, config: &PngConfig) -> Result<(), PngError> {
    write_file(
        &buffer.to_rgb8(),
        buffer.width,
        buffer.height,
        ColorType::Rgb,
        path,
        config,
    )
}

/// Write an RGBA texture to a PNG file.
pub fn write_rgba(
    buffer: &TextureBuffer,
    path: &Path,
    config: &PngConfig,
) -> Result<(), PngError> {
    write_file(
        &buffer.to_rgba8(),
        buffer.width,
        buffer.height,
        ColorType::Rgba,
        path,
        config,
    )
}

/// Write 8-bit single-channel data to a PNG file.
pub fn write_grayscale(
    data: &[u8],
    width: u32,
    height: u32,
    path: &Path,
    config: &PngConfig,
) -> Result<(), PngError> {
    write_file(data, width, height, ColorType::Grayscale, path, config)
}

/// Write 8-bit RGB pixel data (e.g. a face crop) to a PNG file.
pub fn write_rgb_raw(
    data: &[u8],
    width: u32,
    height: u32,
    path: &Path,
    config: &PngConfig,
) -> Result<(), PngError> {
    write_file(data, width, height, ColorType::Rgb, path, config)
}

/// Compute the BLAKE3 hash of PNG data.
pub fn hash_png(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Encode an RGB texture into memory and return the bytes with their hash.
pub fn write_rgb_to_vec_with_hash(
    buffer: &TextureBuffer,
    config: &PngConfig,
) -> Result<(Vec<u8>, String), PngError> {
    let mut data = Vec::new();
    encode(
        &buffer.to_rgb8(),
        buffer.width,
        buffer.height,
        ColorType::Rgb,
        &mut data,
        config,
    )?;
    let hash = hash_png(&data);
    Ok((data, hash))
}
