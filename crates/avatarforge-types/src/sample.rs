//! Representative colors sampled from a face crop.

use serde::{Deserialize, Serialize};

/// 8-bit RGB triple.
pub type Rgb8 = [u8; 3];

/// Skin tone used when no face evidence exists.
pub const DEFAULT_SKIN_RGB: Rgb8 = [198, 134, 66];

/// Skin and eye colors for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSample {
    pub skin_rgb: Rgb8,
    /// Absent when no landmark evidence for the eyes exists.
    pub eye_rgb: Option<Rgb8>,
}

impl ColorSample {
    /// The sample used when no face evidence exists at all.
    pub const fn fallback() -> Self {
        Self {
            skin_rgb: DEFAULT_SKIN_RGB,
            eye_rgb: None,
        }
    }
}

impl Default for ColorSample {
    fn default() -> Self {
        Self::fallback()
    }
}
