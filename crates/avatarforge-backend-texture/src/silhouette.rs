//! 2D silhouette avatar preview.

use avatarforge_types::{joints, PoseLandmarks, Rgb8, SegmentationMask};
use image::RgbImage;

use crate::buffer::TextureBuffer;
use crate::color::{BlendMode, Color};
use crate::error::{TextureError, TextureResult};

/// Tint used when the mask has no foreground.
pub const DEFAULT_TINT: Rgb8 = [200, 180, 160];
/// Alpha of the tint overlay (8-bit).
pub const TINT_ALPHA: u8 = 80;
/// Radius of the highlighted-joint dots.
pub const JOINT_DOT_RADIUS: i64 = 8;
/// Radius of the per-landmark dots.
pub const LANDMARK_DOT_RADIUS: i64 = 3;

/// Renders the person silhouette with pose landmarks on top.
///
/// Foreground pixels of `source` are placed on a transparent canvas, the
/// whole canvas is tinted with their average color, then torso and leg
/// joints get red dots and every landmark a green one.
///
/// This is not a paste of the binarized mask: the foreground keeps the
/// photo's own pixels and the tint averages those photo pixels, not the
/// mask values.
///
/// Fails with [`TextureError::InvalidSize`] unless `mask` and `source`
/// share non-zero dimensions.
pub fn render_silhouette(
    mask: &SegmentationMask,
    source: &RgbImage,
    landmarks: &PoseLandmarks,
) -> TextureResult<TextureBuffer> {
    let (width, height) = mask.dimensions();
    if (width, height) != source.dimensions() || width == 0 || height == 0 {
        return Err(TextureError::InvalidSize { width, height });
    }

    let mut canvas = TextureBuffer::new_transparent(width, height);
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for (x, y, pixel) in source.enumerate_pixels() {
        if mask.is_foreground(x, y) {
            canvas.set(x, y, Color::from_rgb8(pixel.0));
            for (acc, &c) in sum.iter_mut().zip(pixel.0.iter()) {
                *acc += c as u64;
            }
            count += 1;
        }
    }

    let tint = if count == 0 {
        DEFAULT_TINT
    } else {
        [
            (sum[0] / count) as u8,
            (sum[1] / count) as u8,
            (sum[2] / count) as u8,
        ]
    };
    let [r, g, b] = tint;
    let tint = Color::from_rgba8([r, g, b, TINT_ALPHA]);
    for pixel in canvas.data.iter_mut() {
        *pixel = pixel.over(&tint);
    }

    let size = (width, height);
    let red = Color::from_rgba8([255, 0, 0, 128]);
    for index in joints::TORSO_AND_LEGS {
        if let Some(point) = landmarks.get(index) {
            let (x, y) = point.to_pixels(size);
            canvas.fill_disc(x as i64, y as i64, JOINT_DOT_RADIUS, red, BlendMode::Normal);
        }
    }
    let green = Color::from_rgba8([0, 255, 0, 128]);
    for point in landmarks.iter() {
        let (x, y) = point.to_pixels(size);
        canvas.fill_disc(x as i64, y as i64, LANDMARK_DOT_RADIUS, green, BlendMode::Normal);
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatarforge_types::NormalizedPoint;
    use image::Rgb;

    fn half_mask(w: u32, h: u32) -> SegmentationMask {
        let data = (0..h)
            .flat_map(|_| (0..w).map(move |x| if x < w / 2 { 1.0 } else { 0.0 }))
            .collect();
        SegmentationMask::new(w, h, data).unwrap()
    }

    #[test]
    fn test_background_gets_translucent_tint() {
        let source = RgbImage::from_pixel(40, 40, Rgb([100, 50, 0]));
        let out = render_silhouette(&half_mask(40, 40), &source, &PoseLandmarks::default()).unwrap();

        let fg = out.get(5, 5).to_rgba8();
        assert_eq!(fg[3], 255);
        assert_eq!(&fg[..3], &[100, 50, 0]);

        let bg = out.get(35, 35).to_rgba8();
        assert_eq!(bg, [100, 50, 0, TINT_ALPHA]);
    }

    #[test]
    fn test_empty_mask_uses_default_tint() {
        let source = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let mask = SegmentationMask::new(10, 10, vec![0.0; 100]).unwrap();
        let out = render_silhouette(&mask, &source, &PoseLandmarks::default()).unwrap();
        let [r, g, b] = DEFAULT_TINT;
        assert!(out.is_uniform(Color::from_rgba8([r, g, b, TINT_ALPHA])));
    }

    #[test]
    fn test_joint_dots_drawn() {
        let source = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let mask = SegmentationMask::new(100, 100, vec![1.0; 10_000]).unwrap();
        let mut points = vec![NormalizedPoint::new(0.9, 0.9); 33];
        points[joints::LEFT_SHOULDER] = NormalizedPoint::new(0.2, 0.2);
        let out = render_silhouette(&mask, &source, &PoseLandmarks::new(points)).unwrap();

        // Outside the green dot but inside the red joint dot.
        let px = out.get(26, 20).to_rgba8();
        assert!(px[0] > 100 && px[1] < 50, "got {:?}", px);
    }

    #[test]
    fn test_mismatched_mask_rejected() {
        let source = RgbImage::new(4, 4);
        let mask = SegmentationMask::new(2, 2, vec![0.0; 4]).unwrap();
        assert!(render_silhouette(&mask, &source, &PoseLandmarks::default()).is_err());
    }

    #[test]
    fn test_zero_sized_mask_rejected() {
        let source = RgbImage::new(0, 0);
        let err = render_silhouette(&SegmentationMask::empty(0, 0), &source, &PoseLandmarks::default())
            .unwrap_err();
        assert!(matches!(err, TextureError::InvalidSize { width: 0, height: 0 }));
    }
}
