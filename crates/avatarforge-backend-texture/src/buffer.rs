//! Texture buffers.

use image::{RgbImage, RgbaImage};

use crate::color::{BlendMode, Color};

/// A 2D texture buffer. Dimensions never change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (RGBA, row-major).
    pub data: Vec<Color>,
}

impl TextureBuffer {
    /// Create a new texture buffer filled with a color.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: vec![fill; size],
        }
    }

    /// Create a new fully transparent buffer.
    pub fn new_transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, Color::transparent())
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        let idx = (y * self.width + x) as usize;
        self.data[idx]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let idx = (y * self.width + x) as usize;
        self.data[idx] = color;
    }

    /// Blend a pixel given signed coordinates; out-of-bounds writes are dropped.
    #[inline]
    pub fn blend_at(&mut self, x: i64, y: i64, color: Color, mode: BlendMode) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let blended = mode.blend(&self.get(x, y), &color);
        self.set(x, y, blended);
    }

    /// Flood the whole buffer with one color.
    pub fn fill(&mut self, color: Color) {
        self.data.iter_mut().for_each(|c| *c = color);
    }

    /// Paste an RGB image with its top-left corner at `(x, y)`, clipped to
    /// the buffer.
    pub fn paste_rgb(&mut self, image: &RgbImage, x: i64, y: i64) {
        for (px, py, pixel) in image.enumerate_pixels() {
            self.blend_at(
                x + px as i64,
                y + py as i64,
                Color::from_rgb8(pixel.0),
                BlendMode::Replace,
            );
        }
    }

    /// Composite an RGBA image with its top-left corner at `(x, y)`.
    pub fn composite_rgba(&mut self, image: &RgbaImage, x: i64, y: i64, mode: BlendMode) {
        for (px, py, pixel) in image.enumerate_pixels() {
            self.blend_at(
                x + px as i64,
                y + py as i64,
                Color::from_rgba8(pixel.0),
                mode,
            );
        }
    }

    /// Draw a filled disc: every pixel with `dx² + dy² <= radius²`.
    pub fn fill_disc(&mut self, cx: i64, cy: i64, radius: i64, color: Color, mode: BlendMode) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.blend_at(cx + dx, cy + dy, color, mode);
                }
            }
        }
    }

    /// Returns true if every pixel equals `color` at 8-bit precision.
    pub fn is_uniform(&self, color: Color) -> bool {
        let target = color.to_rgba8();
        self.data.iter().all(|c| c.to_rgba8() == target)
    }

    /// Convert to 8-bit RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for color in &self.data {
            bytes.extend_from_slice(&color.to_rgba8());
        }
        bytes
    }

    /// Convert to 8-bit RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 3);
        for color in &self.data {
            bytes.extend_from_slice(&color.to_rgb8());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_buffer_get_set() {
        let mut buf = TextureBuffer::new(2, 2, Color::black());
        buf.set(1, 0, Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(buf.get(1, 0), Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(buf.get(0, 1), Color::black());
    }

    #[test]
    fn paste_clips_to_bounds() {
        let mut buf = TextureBuffer::new(4, 4, Color::black());
        let img = RgbImage::from_pixel(3, 3, image::Rgb([255, 0, 0]));
        buf.paste_rgb(&img, 2, -1);

        assert_eq!(buf.get(2, 0).to_rgb8(), [255, 0, 0]);
        assert_eq!(buf.get(3, 1).to_rgb8(), [255, 0, 0]);
        assert_eq!(buf.get(1, 0).to_rgb8(), [0, 0, 0]);
        assert_eq!(buf.get(2, 2).to_rgb8(), [0, 0, 0]);
    }

    #[test]
    fn fill_disc_covers_radius() {
        let mut buf = TextureBuffer::new(11, 11, Color::black());
        buf.fill_disc(5, 5, 3, Color::white(), BlendMode::Replace);
        assert_eq!(buf.get(5, 5), Color::white());
        assert_eq!(buf.get(8, 5), Color::white());
        assert_eq!(buf.get(5, 2), Color::white());
        // Corner of the bounding square lies outside the disc.
        assert_eq!(buf.get(8, 8), Color::black());
    }

    #[test]
    fn uniform_and_byte_layout() {
        let buf = TextureBuffer::new(2, 1, Color::from_rgb8([1, 2, 3]));
        assert!(buf.is_uniform(Color::from_rgb8([1, 2, 3])));
        assert_eq!(buf.to_rgb8(), vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(buf.to_rgba8(), vec![1, 2, 3, 255, 1, 2, 3, 255]);
    }
}
