//! AvatarForge Texture Backend
//!
//! This crate turns a face image into the avatar's UV texture:
//!
//! - **Color sampling**: skin and eye colors through ordered landmark and
//!   eye-anchor fallback tiers
//! - **Compositing**: base fill, face overlay, garment and eye paint in a
//!   fixed layer order
//! - **Garment lookup**: gender-keyed `<gender>_outfit.{png,jpg,jpeg}` assets
//! - **Previews**: UV layout templates and 2D silhouettes
//! - **Deterministic PNG**: fixed compression settings for byte-identical output
//!
//! # Example
//!
//! ```
//! use avatarforge_backend_texture::{CompositeConfig, TextureCompositor};
//!
//! let out = TextureCompositor::new()
//!     .compose(&CompositeConfig::new([198, 134, 66]).with_eye_color([40, 60, 90]))
//!     .unwrap();
//! assert_eq!(out.texture.width, 512);
//! ```

pub mod buffer;
pub mod color;
pub mod compose;
pub mod error;
pub mod garment;
pub mod png;
pub mod sampler;
pub mod silhouette;
pub mod uv_template;

pub use buffer::TextureBuffer;
pub use color::{BlendMode, Color};
pub use compose::{
    CompositeConfig, Composition, FaceOverlay, GarmentSource, Layer, TextureCompositor,
    DEFAULT_TEXTURE_SIZE, LAYER_ORDER,
};
pub use error::{TextureError, TextureResult};
pub use garment::GarmentLibrary;
pub use png::{PngConfig, PngError, PngPreset};
pub use sampler::{ColorSampler, ColorSampling, EyeTier, LandmarkTier};
pub use silhouette::render_silhouette;
pub use uv_template::render_uv_template;
