//! Scripted collaborators and synthetic inputs.
//!
//! The pipeline never runs models itself, so end-to-end tests drive it with
//! a [`ScriptedPerception`] that returns fixed outputs and a
//! [`GridBodyModel`] that emits a flat triangulated grid.

use std::fs;
use std::path::{Path, PathBuf};

use avatarforge_types::{
    joints, BodyGeometry, BodyModel, FaceDetection, FaceLandmarks, Gender, NormalizedPoint,
    Perception, PerceptionError, PerceptionResult, PixelPoint, PoseLandmarks, SegmentationMask,
    POSE_LANDMARK_COUNT,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Number of points in a dense face mesh with iris refinement.
pub const DENSE_MESH_POINTS: usize = 478;

/// What `segment_person` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskScript {
    /// Every pixel is foreground.
    Full,
    /// No pixel is foreground.
    Empty,
    /// A mask of the wrong size.
    Mismatched,
    /// Right size, but the model emitted only a few values.
    Truncated,
    /// Segmentation fails.
    Fail,
}

/// A [`Perception`] implementation returning scripted outputs.
#[derive(Debug, Clone)]
pub struct ScriptedPerception {
    pub faces: Option<Vec<FaceDetection>>,
    pub face_landmarks: Option<FaceLandmarks>,
    pub pose: Option<PoseLandmarks>,
    pub mask: MaskScript,
    /// `None` makes gender classification fail.
    pub gender: Option<Gender>,
}

impl Default for ScriptedPerception {
    fn default() -> Self {
        Self {
            faces: Some(Vec::new()),
            face_landmarks: None,
            pose: None,
            mask: MaskScript::Full,
            gender: Some(Gender::Neutral),
        }
    }
}

impl ScriptedPerception {
    /// Nothing detected; the classifier answers `neutral`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A standing subject (see [`standing_pose`]) and nothing else.
    pub fn standing() -> Self {
        Self::new().with_pose(standing_pose())
    }

    pub fn with_pose(mut self, pose: PoseLandmarks) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn with_faces(mut self, faces: Vec<FaceDetection>) -> Self {
        self.faces = Some(faces);
        self
    }

    pub fn with_face_landmarks(mut self, landmarks: FaceLandmarks) -> Self {
        self.face_landmarks = Some(landmarks);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_mask(mut self, mask: MaskScript) -> Self {
        self.mask = mask;
        self
    }

    pub fn failing_gender(mut self) -> Self {
        self.gender = None;
        self
    }

    pub fn failing_faces(mut self) -> Self {
        self.faces = None;
        self
    }
}

impl Perception for ScriptedPerception {
    fn detect_faces(&self, _image: &RgbImage) -> PerceptionResult<Vec<FaceDetection>> {
        self.faces
            .clone()
            .ok_or_else(|| PerceptionError::inference("face detector crashed"))
    }

    fn extract_face_landmarks(&self, _image: &RgbImage) -> PerceptionResult<Option<FaceLandmarks>> {
        Ok(self.face_landmarks.clone())
    }

    fn extract_pose_landmarks(&self, _image: &RgbImage) -> PerceptionResult<Option<PoseLandmarks>> {
        Ok(self.pose.clone())
    }

    fn segment_person(&self, image: &RgbImage) -> PerceptionResult<SegmentationMask> {
        let (w, h) = image.dimensions();
        let len = (w as usize) * (h as usize);
        match self.mask {
            MaskScript::Full => SegmentationMask::from_raw(w, h, vec![1.0; len]),
            MaskScript::Empty => SegmentationMask::from_raw(w, h, vec![0.0; len]),
            MaskScript::Mismatched => {
                SegmentationMask::from_raw(w + 1, h, vec![1.0; len + h as usize])
            }
            MaskScript::Truncated => SegmentationMask::from_raw(w, h, vec![1.0; len.min(10)]),
            MaskScript::Fail => Err(PerceptionError::model_unavailable("selfie_segmentation")),
        }
    }

    fn classify_gender(&self, _image: &RgbImage) -> PerceptionResult<Gender> {
        self.gender
            .ok_or_else(|| PerceptionError::model_unavailable("gender_classifier"))
    }
}

/// A flat `cols x rows` grid in the XY plane, two triangles per cell.
#[derive(Debug, Clone, Default)]
pub struct GridBodyModel {
    pub cols: u32,
    pub rows: u32,
    /// Genders for which the model fails.
    pub failing: Vec<Gender>,
}

impl GridBodyModel {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols,
            rows,
            failing: Vec::new(),
        }
    }

    pub fn failing_for(mut self, gender: Gender) -> Self {
        self.failing.push(gender);
        self
    }
}

impl BodyModel for GridBodyModel {
    fn vertices_and_faces(&self, gender: Gender) -> PerceptionResult<BodyGeometry> {
        if self.failing.contains(&gender) {
            return Err(PerceptionError::model_unavailable(format!(
                "{} body model",
                gender
            )));
        }
        Ok(grid_geometry(self.cols, self.rows))
    }
}

/// Grid geometry spanning x in [-0.5, 0.5] and y in [0, 1.8].
pub fn grid_geometry(cols: u32, rows: u32) -> BodyGeometry {
    let mut vertices = Vec::new();
    for j in 0..=rows {
        for i in 0..=cols {
            vertices.push([
                i as f32 / cols.max(1) as f32 - 0.5,
                1.8 * j as f32 / rows.max(1) as f32,
                0.0,
            ]);
        }
    }
    let stride = cols + 1;
    let mut faces = Vec::new();
    for j in 0..rows {
        for i in 0..cols {
            let a = j * stride + i;
            faces.push([a, a + 1, a + stride]);
            faces.push([a + 1, a + stride + 1, a + stride]);
        }
    }
    BodyGeometry { vertices, faces }
}

/// Shoulders at (0.4, 0.3)/(0.6, 0.3), hips at (0.45, 0.55)/(0.55, 0.55),
/// ankles at (0.45, 0.9)/(0.55, 0.9); every other joint at the center.
pub fn standing_pose() -> PoseLandmarks {
    let mut points = vec![NormalizedPoint::new(0.5, 0.5); POSE_LANDMARK_COUNT];
    points[joints::LEFT_SHOULDER] = NormalizedPoint::new(0.4, 0.3);
    points[joints::RIGHT_SHOULDER] = NormalizedPoint::new(0.6, 0.3);
    points[joints::LEFT_HIP] = NormalizedPoint::new(0.45, 0.55);
    points[joints::RIGHT_HIP] = NormalizedPoint::new(0.55, 0.55);
    points[joints::LEFT_ANKLE] = NormalizedPoint::new(0.45, 0.9);
    points[joints::RIGHT_ANKLE] = NormalizedPoint::new(0.55, 0.9);
    PoseLandmarks::new(points)
}

/// A dense face mesh with every point at `rest`, except the cheeks at
/// `cheek` and the irises at `iris`.
pub fn dense_face_landmarks(rest: PixelPoint, cheek: PixelPoint, iris: PixelPoint) -> FaceLandmarks {
    let mut points = vec![rest; DENSE_MESH_POINTS];
    for i in [234, 454] {
        points[i] = cheek;
    }
    for i in [474, 469] {
        points[i] = iris;
    }
    FaceLandmarks::new(points)
}

/// Writes a solid-color PNG photo.
pub fn write_photo(dir: &Path, name: &str, size: (u32, u32), rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(size.0, size.1, Rgb(rgb))
        .save(&path)
        .expect("Failed to write photo");
    path
}

/// Writes a photo whose `region` (x, y, w, h) is painted `face_rgb`.
pub fn write_photo_with_face(
    dir: &Path,
    name: &str,
    size: (u32, u32),
    background: [u8; 3],
    region: (u32, u32, u32, u32),
    face_rgb: [u8; 3],
) -> PathBuf {
    let mut image = RgbImage::from_pixel(size.0, size.1, Rgb(background));
    let (x0, y0, w, h) = region;
    for y in y0..(y0 + h).min(size.1) {
        for x in x0..(x0 + w).min(size.0) {
            image.put_pixel(x, y, Rgb(face_rgb));
        }
    }
    let path = dir.join(name);
    image.save(&path).expect("Failed to write photo");
    path
}

/// Writes `<gender>_outfit.png` into `dir`, filled with `rgba`.
pub fn write_garment(dir: &Path, gender: Gender, size: u32, rgba: [u8; 4]) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create garment dir");
    let path = dir.join(format!("{}_outfit.png", gender));
    RgbaImage::from_pixel(size, size, Rgba(rgba))
        .save(&path)
        .expect("Failed to write garment");
    path
}
