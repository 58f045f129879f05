//! Person segmentation masks.

use crate::perception::{PerceptionError, PerceptionResult};

/// Threshold separating foreground from background.
pub const MASK_THRESHOLD: f32 = 0.5;

/// Single-channel per-pixel foreground probability, row-major.
///
/// `data.len() == width * height` always holds; every constructor checks it.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl SegmentationMask {
    /// Creates a mask, returning `None` if the data length does not match.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Like [`SegmentationMask::new`], for collaborators converting raw model
    /// output inside `segment_person`.
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> PerceptionResult<Self> {
        let len = data.len();
        Self::new(width, height, data).ok_or(PerceptionError::MalformedMask { width, height, len })
    }

    /// All-background mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Probability at a pixel; 0 outside the mask.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Whether a pixel is foreground after thresholding.
    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.get(x, y) > MASK_THRESHOLD
    }

    /// Binarized mask as 8-bit values (0 or 255).
    pub fn to_binary_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| if v > MASK_THRESHOLD { 255 } else { 0 })
            .collect()
    }

    /// Number of foreground pixels.
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v > MASK_THRESHOLD).count()
    }
}
