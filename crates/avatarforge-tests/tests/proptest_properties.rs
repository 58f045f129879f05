//! Property tests for measurement, UV projection, sampling and layering.

use avatarforge_backend_mesh::{planar_uvs, MeshAssembler};
use avatarforge_backend_texture::compose::{eye_center, EYE_ANCHORS};
use avatarforge_backend_texture::{
    ColorSampler, CompositeConfig, GarmentSource, LandmarkTier, TextureBuffer, TextureCompositor,
};
use avatarforge_pipeline::{MeasurementError, MeasurementEstimator, MIN_LANDMARKS};
use avatarforge_tests::{dense_face_landmarks, ScriptedPerception};
use avatarforge_types::{
    BodyGeometry, DegradationCode, FaceDetection, NormalizedPoint, PixelPoint, PoseLandmarks,
    POSE_LANDMARK_COUNT,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use proptest::prelude::*;

fn normalized_point() -> impl Strategy<Value = NormalizedPoint> {
    (0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(x, y)| NormalizedPoint::new(x, y))
}

fn vertex() -> impl Strategy<Value = [f32; 3]> {
    (-1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y, z)| [x, y, z])
}

proptest! {
    #[test]
    fn measurements_are_non_negative(
        points in prop::collection::vec(normalized_point(), POSE_LANDMARK_COUNT),
        width in 1u32..4000,
        height in 1u32..4000,
    ) {
        let m = MeasurementEstimator::new()
            .estimate(&PoseLandmarks::new(points), (width, height))
            .unwrap();
        prop_assert!(m.shoulder_width >= 0.0);
        prop_assert!(m.hip_width >= 0.0);
        prop_assert!(m.height >= 0.0);
    }

    #[test]
    fn short_pose_is_index_out_of_range(
        points in prop::collection::vec(normalized_point(), 0..MIN_LANDMARKS),
    ) {
        let len = points.len();
        let err = MeasurementEstimator::new()
            .estimate(&PoseLandmarks::new(points), (100, 100))
            .unwrap_err();
        prop_assert_eq!(err, MeasurementError::IndexOutOfRange { index: MIN_LANDMARKS - 1, len });
    }

    #[test]
    fn planar_uvs_stay_in_unit_square(vertices in prop::collection::vec(vertex(), 1..200)) {
        let projected = planar_uvs(&vertices);
        prop_assert_eq!(projected.uvs.len(), vertices.len());
        for uv in &projected.uvs {
            prop_assert!((0.0..=1.0).contains(&uv[0]), "u = {}", uv[0]);
            prop_assert!((0.0..=1.0).contains(&uv[1]), "v = {}", uv[1]);
        }
    }

    #[test]
    fn flat_mesh_never_divides_by_zero(
        x in -10.0f32..10.0,
        ys in prop::collection::vec(-10.0f32..10.0, 3..50),
    ) {
        let vertices: Vec<[f32; 3]> = ys.iter().map(|&y| [x, y, 0.0]).collect();
        let faces = vec![[0, 1, 2]];
        let assembly = MeshAssembler::new()
            .assemble(
                BodyGeometry { vertices, faces },
                TextureBuffer::new_transparent(4, 4),
                None,
            )
            .unwrap();
        prop_assert!(assembly.asset.uvs.iter().all(|uv| uv[0] == 0.0 && uv[1].is_finite()));
        prop_assert!(assembly.degradations.contains(DegradationCode::DegenerateGeometry));
    }

    #[test]
    fn dense_mesh_tier_wins_over_box_corners(
        w in 30u32..120,
        h in 30u32..120,
        shade in any::<u8>(),
    ) {
        let image = RgbImage::from_pixel(w, h, Rgb([shade, shade / 2, 255 - shade]));
        let center = PixelPoint::new(w as i32 / 2, h as i32 / 2);
        let perception = ScriptedPerception::new()
            .with_faces(vec![FaceDetection::new(0, 0, w as i32, h as i32)])
            .with_face_landmarks(dense_face_landmarks(center, center, center));

        let sampling = ColorSampler::new().sample(&image, &perception);
        prop_assert_eq!(sampling.landmark_tier, Some(LandmarkTier::DenseMesh));
        prop_assert!(!sampling.degradations.contains(DegradationCode::FaceLandmarksBoxCorners));
        prop_assert_eq!(sampling.sample.skin_rgb, [shade, shade / 2, 255 - shade]);
    }

    #[test]
    fn eyes_stay_on_top_of_any_garment(
        garment in any::<[u8; 4]>(),
        eye in any::<[u8; 3]>(),
        size in 16u32..96,
    ) {
        let overlay = RgbaImage::from_pixel(8, 8, Rgba(garment));
        let composition = TextureCompositor::new()
            .compose(
                &CompositeConfig::new([198, 134, 66])
                    .with_garment(GarmentSource::Image(overlay))
                    .with_eye_color(eye)
                    .with_texture_size(size),
            )
            .unwrap();
        for anchor in EYE_ANCHORS {
            let (x, y) = eye_center(anchor, size);
            let painted = composition.texture.get(x, y).to_rgb8();
            prop_assert_eq!(painted, eye);
        }
    }
}
