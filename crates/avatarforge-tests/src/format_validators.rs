//! Header-level validators for the binary formats the exporter writes.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use serde_json::Value;

/// Error type for format validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// The format being validated.
    pub format: &'static str,
    pub message: String,
    /// Byte offset where the error occurred, if applicable.
    pub offset: Option<usize>,
}

impl FormatError {
    pub fn new(format: &'static str, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
            offset: None,
        }
    }

    pub fn at_offset(format: &'static str, message: impl Into<String>, offset: usize) -> Self {
        Self {
            format,
            message: message.into(),
            offset: Some(offset),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} error at offset {}: {}", self.format, offset, self.message),
            None => write!(f, "{} error: {}", self.format, self.message),
        }
    }
}

impl std::error::Error for FormatError {}

/// Information from a PNG IHDR chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    /// 0 = grayscale, 2 = RGB, 6 = RGBA.
    pub color_type: u8,
}

impl PngInfo {
    /// Channels for this color type.
    pub fn channels(&self) -> u8 {
        match self.color_type {
            0 => 1,
            2 => 3,
            3 => 1,
            4 => 2,
            6 => 4,
            _ => 0,
        }
    }
}

/// Validates the PNG signature and IHDR chunk.
pub fn validate_png(data: &[u8]) -> Result<PngInfo, FormatError> {
    const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const MIN_HEADER_SIZE: usize = 8 + 8 + 13;

    if data.len() < MIN_HEADER_SIZE {
        return Err(FormatError::new(
            "PNG",
            format!("File too short: {} bytes", data.len()),
        ));
    }
    if data[0..8] != PNG_SIGNATURE {
        return Err(FormatError::at_offset("PNG", "Invalid PNG signature", 0));
    }
    if &data[12..16] != b"IHDR" {
        return Err(FormatError::at_offset("PNG", "First chunk is not IHDR", 12));
    }

    let info = PngInfo {
        width: byteorder::BigEndian::read_u32(&data[16..20]),
        height: byteorder::BigEndian::read_u32(&data[20..24]),
        bit_depth: data[24],
        color_type: data[25],
    };
    if info.width == 0 || info.height == 0 {
        return Err(FormatError::at_offset("PNG", "Zero dimension", 16));
    }
    Ok(info)
}

/// Information from a GLB container.
#[derive(Debug, Clone, PartialEq)]
pub struct GlbInfo {
    pub version: u32,
    pub length: u32,
    pub json_chunk_length: u32,
    pub bin_chunk_length: Option<u32>,
    /// The parsed JSON chunk.
    pub json: Value,
}

/// Validates the GLB header and chunk layout and parses the JSON chunk.
pub fn validate_glb(data: &[u8]) -> Result<GlbInfo, FormatError> {
    const GLB_MAGIC: &[u8; 4] = b"glTF";
    const JSON_CHUNK_TYPE: u32 = 0x4E4F534A;
    const BIN_CHUNK_TYPE: u32 = 0x004E4942;

    if data.len() < 20 {
        return Err(FormatError::new(
            "GLB",
            format!("File too short: {} bytes", data.len()),
        ));
    }
    if &data[0..4] != GLB_MAGIC {
        return Err(FormatError::at_offset("GLB", "Invalid GLB magic", 0));
    }
    let version = LittleEndian::read_u32(&data[4..8]);
    if version != 2 {
        return Err(FormatError::at_offset(
            "GLB",
            format!("Unsupported GLB version: {}", version),
            4,
        ));
    }
    let length = LittleEndian::read_u32(&data[8..12]);
    if length as usize != data.len() {
        return Err(FormatError::at_offset(
            "GLB",
            format!("Declared length {} but file is {} bytes", length, data.len()),
            8,
        ));
    }

    let json_chunk_length = LittleEndian::read_u32(&data[12..16]);
    if LittleEndian::read_u32(&data[16..20]) != JSON_CHUNK_TYPE {
        return Err(FormatError::at_offset("GLB", "First chunk must be JSON", 16));
    }
    if json_chunk_length % 4 != 0 {
        return Err(FormatError::at_offset("GLB", "JSON chunk not 4-byte aligned", 12));
    }
    let json_end = 20 + json_chunk_length as usize;
    let json_bytes = data
        .get(20..json_end)
        .ok_or_else(|| FormatError::at_offset("GLB", "JSON chunk overruns file", 20))?;
    let json: Value = serde_json::from_slice(json_bytes)
        .map_err(|e| FormatError::at_offset("GLB", format!("Invalid JSON chunk: {}", e), 20))?;

    let bin_chunk_length = if data.len() > json_end {
        let header = data
            .get(json_end..json_end + 8)
            .ok_or_else(|| FormatError::at_offset("GLB", "Truncated BIN chunk header", json_end))?;
        let len = LittleEndian::read_u32(&header[0..4]);
        if LittleEndian::read_u32(&header[4..8]) != BIN_CHUNK_TYPE {
            return Err(FormatError::at_offset("GLB", "Second chunk must be BIN", json_end + 4));
        }
        if json_end + 8 + len as usize != data.len() {
            return Err(FormatError::at_offset("GLB", "BIN chunk length mismatch", json_end));
        }
        Some(len)
    } else {
        None
    };

    Ok(GlbInfo {
        version,
        length,
        json_chunk_length,
        bin_chunk_length,
        json,
    })
}
