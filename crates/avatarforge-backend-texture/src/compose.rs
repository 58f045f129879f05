//! Layered UV texture compositing.
//!
//! Layers are applied in [`LAYER_ORDER`], each with its own blend mode:
//!
//! | Layer | Blend |
//! |---|---|
//! | base fill | replace (flood) |
//! | face overlay | replace, clipped |
//! | garment | source-over with the garment's alpha |
//! | eye paint | replace |
//!
//! Optional layers that fail are skipped and recorded as degradations;
//! only an unusable canvas size is an error.

use std::path::PathBuf;

use avatarforge_types::{DegradationCode, Degradations, Rgb8};
use image::imageops::{self, FilterType};
use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::buffer::TextureBuffer;
use crate::color::{BlendMode, Color};
use crate::error::{TextureError, TextureResult};

/// Default square texture size in pixels.
pub const DEFAULT_TEXTURE_SIZE: u32 = 512;

/// Face overlay anchor, as fractions of the texture size.
pub const FACE_ANCHOR: (f64, f64) = (0.5, 0.32);
/// Face overlay extent, as a fraction of the texture size.
pub const FACE_SCALE: f64 = 0.28;

/// Left and right eye centers, as fractions of the texture size.
pub const EYE_ANCHORS: [(f64, f64); 2] = [(0.43, 0.32), (0.57, 0.32)];
/// Eye disc radius, as a fraction of the texture width.
pub const EYE_RADIUS: f64 = 0.03;

/// Compositing layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    BaseFill,
    FaceOverlay,
    Garment,
    EyePaint,
}

/// The fixed painting order. Later layers land on top.
pub const LAYER_ORDER: [Layer; 4] = [
    Layer::BaseFill,
    Layer::FaceOverlay,
    Layer::Garment,
    Layer::EyePaint,
];

/// A face crop and where to place it.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceOverlay {
    pub image: RgbImage,
    /// Center of the pasted crop, as fractions of the texture size.
    pub anchor: (f64, f64),
    /// Maximum crop extent, as a fraction of the texture size.
    pub scale: f64,
}

impl FaceOverlay {
    /// Face overlay at the standard anchor and scale.
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            anchor: FACE_ANCHOR,
            scale: FACE_SCALE,
        }
    }
}

/// Where the garment layer comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum GarmentSource {
    /// Decoded lazily; decode failures skip the layer.
    Path(PathBuf),
    Image(RgbaImage),
}

/// Inputs to one composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeConfig {
    pub base_fill: Rgb8,
    pub face: Option<FaceOverlay>,
    pub garment: Option<GarmentSource>,
    pub eye_color: Option<Rgb8>,
    pub texture_size: u32,
}

impl CompositeConfig {
    /// A config that only floods the base color.
    pub fn new(base_fill: Rgb8) -> Self {
        Self {
            base_fill,
            face: None,
            garment: None,
            eye_color: None,
            texture_size: DEFAULT_TEXTURE_SIZE,
        }
    }

    pub fn with_face(mut self, face: FaceOverlay) -> Self {
        self.face = Some(face);
        self
    }

    pub fn with_garment(mut self, garment: GarmentSource) -> Self {
        self.garment = Some(garment);
        self
    }

    pub fn with_eye_color(mut self, eye: Rgb8) -> Self {
        self.eye_color = Some(eye);
        self
    }

    pub fn with_texture_size(mut self, size: u32) -> Self {
        self.texture_size = size;
        self
    }
}

/// A finished texture and what went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub texture: TextureBuffer,
    /// Layers actually painted, in painting order.
    pub applied: Vec<Layer>,
    pub degradations: Degradations,
}

/// Builds the avatar UV texture.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureCompositor;

impl TextureCompositor {
    pub fn new() -> Self {
        Self
    }

    /// Paints every layer of `config` in [`LAYER_ORDER`].
    pub fn compose(&self, config: &CompositeConfig) -> TextureResult<Composition> {
        let size = config.texture_size;
        if size == 0 {
            return Err(TextureError::InvalidSize {
                width: size,
                height: size,
            });
        }

        let mut texture = TextureBuffer::new(size, size, Color::black());
        let mut applied = Vec::with_capacity(LAYER_ORDER.len());
        let mut degradations = Degradations::new();

        for layer in LAYER_ORDER {
            let painted = match layer {
                Layer::BaseFill => {
                    texture.fill(Color::from_rgb8(config.base_fill));
                    true
                }
                Layer::FaceOverlay => config.face.as_ref().is_some_and(|face| {
                    paint_face(&mut texture, face, &mut degradations)
                }),
                Layer::Garment => config.garment.as_ref().is_some_and(|garment| {
                    paint_garment(&mut texture, garment, &mut degradations)
                }),
                Layer::EyePaint => config.eye_color.is_some_and(|eye| {
                    paint_eyes(&mut texture, eye);
                    true
                }),
            };
            if painted {
                debug!(?layer, "texture layer applied");
                applied.push(layer);
            }
        }

        Ok(Composition {
            texture,
            applied,
            degradations,
        })
    }
}

fn paint_face(texture: &mut TextureBuffer, face: &FaceOverlay, degradations: &mut Degradations) -> bool {
    let (fw, fh) = face.image.dimensions();
    if fw == 0 || fh == 0 {
        warn!("face crop is empty, skipping face overlay");
        degradations.push(DegradationCode::FaceOverlaySkipped, "face crop is empty");
        return false;
    }

    let size = texture.width as f64;
    let bound = (size * face.scale).max(1.0);
    let ratio = (bound / fw as f64).min(bound / fh as f64);
    let nw = ((fw as f64 * ratio).round() as u32).max(1);
    let nh = ((fh as f64 * ratio).round() as u32).max(1);
    let resized = imageops::resize(&face.image, nw, nh, FilterType::CatmullRom);

    let x = (face.anchor.0 * size) as i64 - (nw / 2) as i64;
    let y = (face.anchor.1 * texture.height as f64) as i64 - (nh / 2) as i64;
    texture.paste_rgb(&resized, x, y);
    true
}

fn paint_garment(
    texture: &mut TextureBuffer,
    garment: &GarmentSource,
    degradations: &mut Degradations,
) -> bool {
    let decoded;
    let image = match garment {
        GarmentSource::Image(image) => image,
        GarmentSource::Path(path) => match image::open(path) {
            Ok(img) => {
                decoded = img.to_rgba8();
                &decoded
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "garment could not be decoded, skipping");
                degradations.push(
                    DegradationCode::GarmentOverlaySkipped,
                    format!("garment {} could not be decoded: {}", path.display(), err),
                );
                return false;
            }
        },
    };

    if image.width() == 0 || image.height() == 0 {
        degradations.push(DegradationCode::GarmentOverlaySkipped, "garment image is empty");
        return false;
    }

    let resized = imageops::resize(image, texture.width, texture.height, FilterType::CatmullRom);
    texture.composite_rgba(&resized, 0, 0, BlendMode::Normal);
    true
}

fn paint_eyes(texture: &mut TextureBuffer, eye: Rgb8) {
    let size = texture.width as f64;
    let radius = ((size * EYE_RADIUS) as i64).max(1);
    let color = Color::from_rgb8(eye);
    for (ax, ay) in EYE_ANCHORS {
        let cx = (ax * size) as i64;
        let cy = (ay * texture.height as f64) as i64;
        texture.fill_disc(cx, cy, radius, color, BlendMode::Replace);
    }
}

/// Pixel center of an eye anchor for a square texture of `size`.
///
/// Anchor positions are truncated to whole pixels.
pub fn eye_center(anchor: (f64, f64), size: u32) -> (u32, u32) {
    let s = size as f64;
    ((anchor.0 * s) as u32, (anchor.1 * s) as u32)
}
