//! Color utilities for texture compositing.

use avatarforge_types::Rgb8;

/// RGBA color with f64 components (0.0 to 1.0 range).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Create a new color with alpha = 1.0.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a new color with alpha.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create black.
    pub const fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Create white.
    pub const fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Fully transparent white, the blank canvas for previews.
    pub const fn transparent() -> Self {
        Self::rgba(1.0, 1.0, 1.0, 0.0)
    }

    /// Porter-Duff "source over destination", with `self` as destination.
    ///
    /// Over an opaque destination this reduces to
    /// `src * alpha + dst * (1 - alpha)` and stays opaque.
    pub fn over(&self, src: &Color) -> Color {
        let sa = src.a.clamp(0.0, 1.0);
        let da = self.a.clamp(0.0, 1.0);
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Color::rgba(0.0, 0.0, 0.0, 0.0);
        }
        let channel = |s: f64, d: f64| (s * sa + d * da * (1.0 - sa)) / out_a;
        Color {
            r: channel(src.r, self.r),
            g: channel(src.g, self.g),
            b: channel(src.b, self.b),
            a: out_a,
        }
    }

    /// Clamp all components to [0.0, 1.0].
    pub fn clamp(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Convert to 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = self.clamp();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (c.a * 255.0).round() as u8,
        ]
    }

    /// Convert to 8-bit RGB.
    pub fn to_rgb8(&self) -> Rgb8 {
        let c = self.clamp();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }

    /// Create from 8-bit RGBA.
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self {
            r: rgba[0] as f64 / 255.0,
            g: rgba[1] as f64 / 255.0,
            b: rgba[2] as f64 / 255.0,
            a: rgba[3] as f64 / 255.0,
        }
    }

    /// Create from 8-bit RGB.
    pub fn from_rgb8(rgb: Rgb8) -> Self {
        Self {
            r: rgb[0] as f64 / 255.0,
            g: rgb[1] as f64 / 255.0,
            b: rgb[2] as f64 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// How a layer pixel combines with the pixel beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Alpha-composite the source over the destination.
    Normal,
    /// Overwrite the destination, ignoring alpha.
    Replace,
}

impl BlendMode {
    /// Blend source color onto destination using this blend mode.
    pub fn blend(&self, dst: &Color, src: &Color) -> Color {
        match self {
            BlendMode::Normal => dst.over(src),
            BlendMode::Replace => *src,
        }
    }
}
