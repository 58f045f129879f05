//! Contracts of the external perception collaborators.
//!
//! The pipeline never runs a neural model itself. It consumes the output
//! shapes defined here, and any implementation (ONNX runtime, remote service,
//! scripted fixture) can be plugged in behind these traits.

use image::RgbImage;
use thiserror::Error;

use crate::error::BackendError;
use crate::gender::Gender;
use crate::geometry::{FaceDetection, FaceLandmarks, PoseLandmarks};
use crate::mask::SegmentationMask;

/// Errors reported by perception collaborators.
#[derive(Debug, Error)]
pub enum PerceptionError {
    /// The model backing a contract is not available.
    #[error("Perception model '{model}' is unavailable")]
    ModelUnavailable { model: String },

    /// The model ran but failed.
    #[error("Perception inference failed: {message}")]
    Inference { message: String },

    /// A segmentation output whose data does not cover `width * height`.
    #[error("Segmentation mask is {width}x{height} but holds {len} values")]
    MalformedMask { width: u32, height: u32, len: usize },
}

impl PerceptionError {
    /// Creates a new model unavailable error.
    pub fn model_unavailable(model: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            model: model.into(),
        }
    }

    /// Creates a new inference error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }
}

impl BackendError for PerceptionError {
    fn code(&self) -> &'static str {
        match self {
            PerceptionError::ModelUnavailable { .. } => "PERCEPTION_001",
            PerceptionError::Inference { .. } => "PERCEPTION_002",
            PerceptionError::MalformedMask { .. } => "PERCEPTION_003",
        }
    }

    fn category(&self) -> &'static str {
        "perception"
    }
}

/// Result type for perception calls.
pub type PerceptionResult<T> = Result<T, PerceptionError>;

/// Image-level perception contracts.
pub trait Perception {
    /// Detects face bounding boxes, zero or many per image.
    fn detect_faces(&self, image: &RgbImage) -> PerceptionResult<Vec<FaceDetection>>;

    /// Extracts dense face-mesh landmarks in pixel space, if a face mesh fits.
    fn extract_face_landmarks(&self, image: &RgbImage) -> PerceptionResult<Option<FaceLandmarks>>;

    /// Extracts the 33 normalized body-pose landmarks, if a person is found.
    fn extract_pose_landmarks(&self, image: &RgbImage) -> PerceptionResult<Option<PoseLandmarks>>;

    /// Segments the person; the mask has the same size as the image.
    fn segment_person(&self, image: &RgbImage) -> PerceptionResult<SegmentationMask>;

    /// Classifies the subject's gender.
    fn classify_gender(&self, image: &RgbImage) -> PerceptionResult<Gender>;
}

/// Body geometry from the parametric body model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodyGeometry {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
}

/// Parametric body model contract.
pub trait BodyModel {
    /// Instantiates the body mesh for a gender.
    fn vertices_and_faces(&self, gender: Gender) -> PerceptionResult<BodyGeometry>;
}
