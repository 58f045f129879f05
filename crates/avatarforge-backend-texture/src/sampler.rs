//! Skin and eye color sampling from a face crop.
//!
//! Landmarks are located by an ordered list of [`LandmarkStrategy`]s and eye
//! anchors by an ordered list of [`EyeStrategy`]s. Each list is tried front
//! to back and the first strategy that yields a result wins, so the tiering
//! order is data, not control flow.

use std::path::Path;

use avatarforge_types::{
    ColorSample, DegradationCode, Degradations, FaceLandmarks, Perception, PerceptionResult,
    PixelPoint, Rgb8, DEFAULT_SKIN_RGB,
};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TextureError, TextureResult};

/// Half-size of the skin sampling window.
pub const SKIN_WINDOW_RADIUS: i32 = 10;
/// Half-size of the eye sampling window.
pub const EYE_WINDOW_RADIUS: i32 = 5;

/// Dense-mesh cheek landmarks used for skin sampling.
pub const CHEEK_LANDMARKS: [usize; 2] = [234, 454];
/// Dense-mesh iris landmarks (left, right).
pub const IRIS_LANDMARKS: [usize; 2] = [474, 469];
/// Eye-corner mesh landmarks used when iris landmarks are missing.
pub const EYE_MESH_LANDMARKS: [usize; 4] = [33, 133, 362, 263];

/// Which landmark source produced the face landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkTier {
    /// Dense face mesh (hundreds of points).
    DenseMesh,
    /// Four pseudo-landmarks at the face box corners.
    BoxCorners,
}

/// Which anchor set produced the eye color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeTier {
    Iris,
    EyeMesh,
}

/// A source of face landmarks.
pub trait LandmarkStrategy: Send + Sync {
    fn tier(&self) -> LandmarkTier;

    /// Locates landmarks, `Ok(None)` when this source has no evidence.
    fn locate(
        &self,
        image: &RgbImage,
        perception: &dyn Perception,
    ) -> PerceptionResult<Option<FaceLandmarks>>;
}

/// Dense face-mesh landmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseMeshLandmarks;

impl LandmarkStrategy for DenseMeshLandmarks {
    fn tier(&self) -> LandmarkTier {
        LandmarkTier::DenseMesh
    }

    fn locate(
        &self,
        image: &RgbImage,
        perception: &dyn Perception,
    ) -> PerceptionResult<Option<FaceLandmarks>> {
        Ok(perception
            .extract_face_landmarks(image)?
            .filter(|lm| !lm.is_empty()))
    }
}

/// Pseudo-landmarks from the first detected face box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxCornerLandmarks;

impl LandmarkStrategy for BoxCornerLandmarks {
    fn tier(&self) -> LandmarkTier {
        LandmarkTier::BoxCorners
    }

    fn locate(
        &self,
        image: &RgbImage,
        perception: &dyn Perception,
    ) -> PerceptionResult<Option<FaceLandmarks>> {
        Ok(perception
            .detect_faces(image)?
            .first()
            .map(FaceLandmarks::from_box_corners))
    }
}

/// A set of eye anchor points derived from landmarks.
pub trait EyeStrategy: Send + Sync {
    fn tier(&self) -> EyeTier;

    /// Anchor points, `None` when the landmarks do not cover this tier.
    fn anchors(&self, landmarks: &FaceLandmarks) -> Option<Vec<PixelPoint>>;
}

/// Iris centers; requires both iris indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrisAnchors;

impl EyeStrategy for IrisAnchors {
    fn tier(&self) -> EyeTier {
        EyeTier::Iris
    }

    fn anchors(&self, landmarks: &FaceLandmarks) -> Option<Vec<PixelPoint>> {
        IRIS_LANDMARKS
            .iter()
            .map(|&i| landmarks.get(i))
            .collect::<Option<Vec<_>>>()
    }
}

/// Eye-corner mesh points; uses whichever of the indices exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyeMeshAnchors;

impl EyeStrategy for EyeMeshAnchors {
    fn tier(&self) -> EyeTier {
        EyeTier::EyeMesh
    }

    fn anchors(&self, landmarks: &FaceLandmarks) -> Option<Vec<PixelPoint>> {
        let points: Vec<_> = EYE_MESH_LANDMARKS
            .iter()
            .filter_map(|&i| landmarks.get(i))
            .collect();
        (!points.is_empty()).then_some(points)
    }
}

/// Outcome of sampling one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSampling {
    pub sample: ColorSample,
    /// Landmark tier that fired, `None` when no face evidence existed.
    pub landmark_tier: Option<LandmarkTier>,
    /// Eye tier that fired, `None` when eye color is absent.
    pub eye_tier: Option<EyeTier>,
    pub degradations: Degradations,
}

/// Extracts representative skin and eye colors from a face image.
pub struct ColorSampler {
    landmark_strategies: Vec<Box<dyn LandmarkStrategy>>,
    eye_strategies: Vec<Box<dyn EyeStrategy>>,
}

impl Default for ColorSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ColorSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorSampler")
            .field(
                "landmark_tiers",
                &self.landmark_strategies.iter().map(|s| s.tier()).collect::<Vec<_>>(),
            )
            .field(
                "eye_tiers",
                &self.eye_strategies.iter().map(|s| s.tier()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ColorSampler {
    /// Sampler with the standard tiers: dense mesh, then box corners for
    /// landmarks; iris, then eye mesh for eyes.
    pub fn new() -> Self {
        Self {
            landmark_strategies: vec![Box::new(DenseMeshLandmarks), Box::new(BoxCornerLandmarks)],
            eye_strategies: vec![Box::new(IrisAnchors), Box::new(EyeMeshAnchors)],
        }
    }

    /// Replaces the landmark tiers.
    pub fn with_landmark_strategies(mut self, strategies: Vec<Box<dyn LandmarkStrategy>>) -> Self {
        self.landmark_strategies = strategies;
        self
    }

    /// Replaces the eye tiers.
    pub fn with_eye_strategies(mut self, strategies: Vec<Box<dyn EyeStrategy>>) -> Self {
        self.eye_strategies = strategies;
        self
    }

    /// Loads an image from disk and samples it.
    ///
    /// An unreadable image is the only fatal condition.
    pub fn sample_path(
        &self,
        path: &Path,
        perception: &dyn Perception,
    ) -> TextureResult<ColorSampling> {
        let image = image::open(path)
            .map_err(|source| TextureError::InputUnavailable {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        Ok(self.sample(&image, perception))
    }

    /// Samples skin and eye color from a face image.
    pub fn sample(&self, image: &RgbImage, perception: &dyn Perception) -> ColorSampling {
        let mut degradations = Degradations::new();

        let Some((tier, landmarks)) = self.locate_landmarks(image, perception, &mut degradations)
        else {
            debug!("no face evidence, using default skin tone");
            degradations.push(
                DegradationCode::SkinColorDefaulted,
                "no face landmarks; default skin tone used",
            );
            degradations.push(
                DegradationCode::EyeColorUnavailable,
                "no face landmarks; eye color absent",
            );
            return ColorSampling {
                sample: ColorSample::fallback(),
                landmark_tier: None,
                eye_tier: None,
                degradations,
            };
        };

        let skin = self.sample_skin(image, &landmarks).unwrap_or_else(|| {
            degradations.push(
                DegradationCode::SkinColorDefaulted,
                format!(
                    "cheek landmarks not sampleable from {} points; default skin tone used",
                    landmarks.len()
                ),
            );
            DEFAULT_SKIN_RGB
        });

        let eye = self.sample_eyes(image, &landmarks);
        match eye {
            Some((EyeTier::Iris, _)) => {}
            Some((EyeTier::EyeMesh, _)) => degradations.push(
                DegradationCode::EyeColorFallbackIndices,
                format!(
                    "iris landmarks missing ({} points); eye-mesh fallback used",
                    landmarks.len()
                ),
            ),
            None => degradations.push(
                DegradationCode::EyeColorUnavailable,
                "no valid eye region found",
            ),
        }

        ColorSampling {
            sample: ColorSample {
                skin_rgb: skin,
                eye_rgb: eye.map(|(_, rgb)| rgb),
            },
            landmark_tier: Some(tier),
            eye_tier: eye.map(|(t, _)| t),
            degradations,
        }
    }

    fn locate_landmarks(
        &self,
        image: &RgbImage,
        perception: &dyn Perception,
        degradations: &mut Degradations,
    ) -> Option<(LandmarkTier, FaceLandmarks)> {
        for strategy in &self.landmark_strategies {
            match strategy.locate(image, perception) {
                Ok(Some(landmarks)) => {
                    debug!(tier = ?strategy.tier(), count = landmarks.len(), "face landmarks located");
                    if strategy.tier() == LandmarkTier::BoxCorners {
                        degradations.push(
                            DegradationCode::FaceLandmarksBoxCorners,
                            "dense face mesh unavailable; box-corner pseudo-landmarks used",
                        );
                    }
                    return Some((strategy.tier(), landmarks));
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(tier = ?strategy.tier(), error = %err, "landmark tier failed");
                    degradations.push(
                        DegradationCode::PerceptionFailed,
                        format!("{:?} landmarks: {}", strategy.tier(), err),
                    );
                }
            }
        }
        None
    }

    fn sample_skin(&self, image: &RgbImage, landmarks: &FaceLandmarks) -> Option<Rgb8> {
        let anchors = CHEEK_LANDMARKS
            .iter()
            .map(|&i| landmarks.get(i))
            .collect::<Option<Vec<_>>>()?;
        window_average(image, &anchors, SKIN_WINDOW_RADIUS)
    }

    fn sample_eyes(&self, image: &RgbImage, landmarks: &FaceLandmarks) -> Option<(EyeTier, Rgb8)> {
        self.eye_strategies.iter().find_map(|strategy| {
            let anchors = strategy.anchors(landmarks)?;
            let rgb = window_average(image, &anchors, EYE_WINDOW_RADIUS)?;
            Some((strategy.tier(), rgb))
        })
    }
}

/// Averages pixels in a square window `[-radius, radius)` around each anchor.
///
/// Pixels outside the image are skipped. The per-channel mean is truncated
/// to an integer; `None` if no pixel was valid.
pub fn window_average(image: &RgbImage, anchors: &[PixelPoint], radius: i32) -> Option<Rgb8> {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let mut sum = [0u64; 3];
    let mut count = 0u64;

    for anchor in anchors {
        for dx in -radius..radius {
            for dy in -radius..radius {
                let nx = anchor.x as i64 + dx as i64;
                let ny = anchor.y as i64 + dy as i64;
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let pixel = image.get_pixel(nx as u32, ny as u32).0;
                for (acc, &c) in sum.iter_mut().zip(pixel.iter()) {
                    *acc += c as u64;
                }
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some([
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatarforge_types::{
        FaceDetection, Gender, PerceptionError, PoseLandmarks, SegmentationMask,
    };
    use image::Rgb;

    /// Perception stub answering only the face contracts.
    struct FaceStub {
        mesh: PerceptionResult<Option<FaceLandmarks>>,
        boxes: Vec<FaceDetection>,
    }

    impl FaceStub {
        fn new(mesh: Option<FaceLandmarks>, boxes: Vec<FaceDetection>) -> Self {
            Self {
                mesh: Ok(mesh),
                boxes,
            }
        }
    }

    impl Perception for FaceStub {
        fn detect_faces(&self, _: &RgbImage) -> PerceptionResult<Vec<FaceDetection>> {
            Ok(self.boxes.clone())
        }

        fn extract_face_landmarks(&self, _: &RgbImage) -> PerceptionResult<Option<FaceLandmarks>> {
            match &self.mesh {
                Ok(m) => Ok(m.clone()),
                Err(_) => Err(PerceptionError::inference("mesh exploded")),
            }
        }

        fn extract_pose_landmarks(&self, _: &RgbImage) -> PerceptionResult<Option<PoseLandmarks>> {
            Ok(None)
        }

        fn segment_person(&self, _: &RgbImage) -> PerceptionResult<SegmentationMask> {
            Err(PerceptionError::model_unavailable("segmenter"))
        }

        fn classify_gender(&self, _: &RgbImage) -> PerceptionResult<Gender> {
            Ok(Gender::Neutral)
        }
    }

    /// Image whose left half is one color and right half another.
    fn two_tone(size: u32, left: [u8; 3], right: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(size, size, |x, _| {
            if x < size / 2 {
                Rgb(left)
            } else {
                Rgb(right)
            }
        })
    }

    fn dense_mesh(count: usize, point: PixelPoint) -> FaceLandmarks {
        FaceLandmarks::new(vec![point; count])
    }

    #[test]
    fn test_dense_mesh_samples_cheeks_and_iris() {
        let image = RgbImage::from_pixel(100, 100, Rgb([120, 80, 60]));
        let stub = FaceStub::new(
            Some(dense_mesh(478, PixelPoint::new(50, 50))),
            vec![FaceDetection::new(0, 0, 100, 100)],
        );

        let result = ColorSampler::new().sample(&image, &stub);
        assert_eq!(result.landmark_tier, Some(LandmarkTier::DenseMesh));
        assert_eq!(result.eye_tier, Some(EyeTier::Iris));
        assert_eq!(result.sample.skin_rgb, [120, 80, 60]);
        assert_eq!(result.sample.eye_rgb, Some([120, 80, 60]));
        assert!(result.degradations.is_empty());
    }

    #[test]
    fn test_dense_mesh_wins_over_box_corners() {
        let image = RgbImage::from_pixel(64, 64, Rgb([10, 20, 30]));
        let stub = FaceStub::new(
            Some(dense_mesh(468, PixelPoint::new(32, 32))),
            vec![FaceDetection::new(0, 0, 64, 64)],
        );

        let result = ColorSampler::new().sample(&image, &stub);
        assert_eq!(result.landmark_tier, Some(LandmarkTier::DenseMesh));
        assert!(!result
            .degradations
            .contains(DegradationCode::FaceLandmarksBoxCorners));
    }

    #[test]
    fn test_mesh_without_iris_uses_eye_mesh_fallback() {
        let image = RgbImage::from_pixel(64, 64, Rgb([1, 2, 3]));
        let stub = FaceStub::new(Some(dense_mesh(468, PixelPoint::new(20, 20))), vec![]);

        let result = ColorSampler::new().sample(&image, &stub);
        assert_eq!(result.eye_tier, Some(EyeTier::EyeMesh));
        assert_eq!(result.sample.eye_rgb, Some([1, 2, 3]));
        assert!(result
            .degradations
            .contains(DegradationCode::EyeColorFallbackIndices));
    }

    #[test]
    fn test_box_corners_tier_defaults_skin_and_drops_eyes() {
        let image = RgbImage::from_pixel(64, 64, Rgb([200, 10, 10]));
        let stub = FaceStub::new(None, vec![FaceDetection::new(4, 4, 60, 60)]);

        let result = ColorSampler::new().sample(&image, &stub);
        assert_eq!(result.landmark_tier, Some(LandmarkTier::BoxCorners));
        assert_eq!(result.sample.skin_rgb, DEFAULT_SKIN_RGB);
        assert_eq!(result.sample.eye_rgb, None);
        assert_eq!(
            result.degradations.codes(),
            vec![
                DegradationCode::FaceLandmarksBoxCorners,
                DegradationCode::SkinColorDefaulted,
                DegradationCode::EyeColorUnavailable,
            ]
        );
    }

    #[test]
    fn test_no_face_evidence_returns_default() {
        let image = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
        let stub = FaceStub::new(None, vec![]);

        let result = ColorSampler::new().sample(&image, &stub);
        assert_eq!(result.sample.skin_rgb, [198, 134, 66]);
        assert_eq!(result.sample.eye_rgb, None);
        assert_eq!(result.landmark_tier, None);
    }

    #[test]
    fn test_failing_mesh_degrades_to_box_tier() {
        let image = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
        let stub = FaceStub {
            mesh: Err(PerceptionError::inference("boom")),
            boxes: vec![FaceDetection::new(0, 0, 10, 10)],
        };

        let result = ColorSampler::new().sample(&image, &stub);
        assert_eq!(result.landmark_tier, Some(LandmarkTier::BoxCorners));
        assert!(result.degradations.contains(DegradationCode::PerceptionFailed));
    }

    #[test]
    fn test_window_average_truncates_and_clips() {
        // Anchor on the two-tone boundary: 10 columns of each color.
        let image = two_tone(40, [10, 0, 0], [21, 0, 0]);
        let avg = window_average(&image, &[PixelPoint::new(20, 20)], 10).unwrap();
        // (10 + 21) / 2 = 15.5 -> 15
        assert_eq!(avg, [15, 0, 0]);

        // Window partially outside still averages the valid pixels.
        let corner = window_average(&image, &[PixelPoint::new(0, 0)], 5).unwrap();
        assert_eq!(corner, [10, 0, 0]);

        // Fully outside yields nothing.
        assert_eq!(
            window_average(&image, &[PixelPoint::new(-100, -100)], 5),
            None
        );
    }

    #[test]
    fn test_sample_path_missing_file_is_input_unavailable() {
        let stub = FaceStub::new(None, vec![]);
        let err = ColorSampler::new()
            .sample_path(Path::new("/definitely/missing.png"), &stub)
            .unwrap_err();
        assert!(matches!(err, TextureError::InputUnavailable { .. }));
    }
}
