//! Layering-order tests for the texture compositor.
//!
//! Every layer targets the same pixels so that only the painting order
//! decides what ends up visible.

use avatarforge_backend_texture::compose::{eye_center, EYE_ANCHORS};
use avatarforge_backend_texture::png::write_rgb_to_vec_with_hash;
use avatarforge_backend_texture::{
    Color, CompositeConfig, FaceOverlay, GarmentSource, Layer, PngConfig, TextureCompositor,
    LAYER_ORDER,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use pretty_assertions::assert_eq;

const SKIN: [u8; 3] = [198, 134, 66];
const FACE: [u8; 3] = [250, 220, 200];
const GARMENT: [u8; 4] = [20, 120, 40, 255];
const EYE: [u8; 3] = [30, 60, 150];

fn full_config(size: u32) -> CompositeConfig {
    CompositeConfig::new(SKIN)
        .with_texture_size(size)
        .with_face(FaceOverlay::new(RgbImage::from_pixel(64, 64, Rgb(FACE))))
        .with_garment(GarmentSource::Image(RgbaImage::from_pixel(
            32,
            32,
            Rgba(GARMENT),
        )))
        .with_eye_color(EYE)
}

#[test]
fn test_layer_order_is_fixed() {
    assert_eq!(
        LAYER_ORDER,
        [
            Layer::BaseFill,
            Layer::FaceOverlay,
            Layer::Garment,
            Layer::EyePaint
        ]
    );
}

#[test]
fn test_eyes_visible_over_garment_over_face() {
    let out = TextureCompositor::new().compose(&full_config(256)).unwrap();
    assert_eq!(out.applied, LAYER_ORDER.to_vec());

    // Eyes sit inside the face region and the garment covers everything,
    // so the eye pixels prove eye paint ran last.
    for anchor in EYE_ANCHORS {
        let (x, y) = eye_center(anchor, 256);
        assert_eq!(out.texture.get(x, y).to_rgb8(), EYE);
    }

    // The opaque garment hides the face crop.
    let (fx, fy) = (128, 82);
    assert_eq!(out.texture.get(fx, fy).to_rgb8(), [20, 120, 40]);
}

#[test]
fn test_output_is_fully_opaque() {
    let mut config = full_config(64);
    config.garment = Some(GarmentSource::Image(RgbaImage::from_pixel(
        8,
        8,
        Rgba([255, 255, 255, 100]),
    )));
    let out = TextureCompositor::new().compose(&config).unwrap();
    assert!(out.texture.data.iter().all(|c| c.to_rgba8()[3] == 255));
}

#[test]
fn test_composition_is_deterministic() {
    let config = full_config(128);
    let a = TextureCompositor::new().compose(&config).unwrap();
    let b = TextureCompositor::new().compose(&config).unwrap();

    let (bytes_a, hash_a) = write_rgb_to_vec_with_hash(&a.texture, &PngConfig::default()).unwrap();
    let (bytes_b, hash_b) = write_rgb_to_vec_with_hash(&b.texture, &PngConfig::default()).unwrap();
    assert_eq!(hash_a, hash_b);
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn test_flat_fill_without_optional_layers() {
    let out = TextureCompositor::new()
        .compose(&CompositeConfig::new(SKIN))
        .unwrap();
    assert_eq!(out.texture.width, 512);
    assert_eq!(out.texture.height, 512);
    assert!(out.texture.is_uniform(Color::from_rgb8(SKIN)));
}
