//! AvatarForge Pipeline
//!
//! Turns one photograph into an exported, textured avatar mesh.
//!
//! The pipeline consumes perception outputs through the
//! [`Perception`](avatarforge_types::Perception) and
//! [`BodyModel`](avatarforge_types::BodyModel) contracts and never runs
//! models itself. Only two conditions abort a run: an unreadable image and
//! an image without pose landmarks. Everything else falls back and is
//! recorded as a [`Degradation`](avatarforge_types::Degradation).
//!
//! # Example
//!
//! ```no_run
//! use avatarforge_pipeline::{Pipeline, PipelineConfig};
//! # use avatarforge_types::*;
//! # use image::RgbImage;
//! # struct Models;
//! # impl Perception for Models {
//! #     fn detect_faces(&self, _: &RgbImage) -> PerceptionResult<Vec<FaceDetection>> { Ok(vec![]) }
//! #     fn extract_face_landmarks(&self, _: &RgbImage) -> PerceptionResult<Option<FaceLandmarks>> { Ok(None) }
//! #     fn extract_pose_landmarks(&self, _: &RgbImage) -> PerceptionResult<Option<PoseLandmarks>> { Ok(None) }
//! #     fn segment_person(&self, _: &RgbImage) -> PerceptionResult<SegmentationMask> { Err(PerceptionError::model_unavailable("seg")) }
//! #     fn classify_gender(&self, _: &RgbImage) -> PerceptionResult<Gender> { Ok(Gender::Neutral) }
//! # }
//! # impl BodyModel for Models {
//! #     fn vertices_and_faces(&self, _: Gender) -> PerceptionResult<BodyGeometry> { Ok(BodyGeometry::default()) }
//! # }
//! let pipeline = Pipeline::new(Models, Models)
//!     .with_config(PipelineConfig::default().output_dir("avatars"))?;
//! let run = pipeline.run(std::path::Path::new("uploads/me.jpg"))?;
//! println!("{}", run.artifact.primary_path().display());
//! # Ok::<(), avatarforge_pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod debug;
pub mod error;
pub mod locks;
pub mod measurement;
pub mod orchestrator;
pub mod stage;

pub use config::{PipelineConfig, GARMENT_DIR_ENV};
pub use debug::{DebugArtifactError, DebugArtifacts};
pub use error::{MeasurementError, PipelineError, PipelineResult};
pub use locks::{PathGuard, PathLocks};
pub use measurement::{MeasurementEstimator, MIN_LANDMARKS, REQUIRED_JOINTS};
pub use orchestrator::{AvatarRun, Pipeline, SilhouetteRun, BACKEND_VERSION};
pub use stage::{Stage, StageClock};
