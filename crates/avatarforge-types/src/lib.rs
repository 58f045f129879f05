//! AvatarForge data model and shared contracts.
//!
//! This crate holds the types that flow between the avatar synthesis
//! stages: perception outputs, measurements, color samples, artifact records
//! and run reports. It also defines the collaborator contracts the pipeline
//! consumes and the error and degradation taxonomy every stage reports with.
//!
//! # Modules
//!
//! - [`geometry`]: face boxes, face landmarks, pose landmarks
//! - [`perception`]: perception and body-model contracts
//! - [`error`]: `BackendError`, degradation codes
//! - [`paths`]: deterministic artifact path derivation
//! - [`artifact`]: the persisted output record
//! - [`report`]: run reports and stage timings

pub mod artifact;
pub mod error;
pub mod gender;
pub mod geometry;
pub mod hash;
pub mod mask;
pub mod measurements;
pub mod paths;
pub mod perception;
pub mod report;
pub mod sample;

pub use artifact::{ArtifactFile, ArtifactKind, AvatarArtifact};
pub use error::{BackendError, Degradation, DegradationCode, Degradations, GenerationError};
pub use gender::Gender;
pub use geometry::{
    joints, FaceDetection, FaceLandmarks, NormalizedPoint, PixelPoint, PoseLandmarks,
    POSE_LANDMARK_COUNT,
};
pub use hash::{hash_bytes, hash_file};
pub use mask::{SegmentationMask, MASK_THRESHOLD};
pub use measurements::BodyMeasurements;
pub use paths::{artifact_path, base_name, ArtifactPaths};
pub use perception::{BodyGeometry, BodyModel, Perception, PerceptionError, PerceptionResult};
pub use report::{ReportBuilder, ReportError, RunReport, StageTiming, REPORT_VERSION};
pub use sample::{ColorSample, Rgb8, DEFAULT_SKIN_RGB};
