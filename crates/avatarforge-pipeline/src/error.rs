//! Error types for the pipeline.

use avatarforge_backend_mesh::MeshError;
use avatarforge_backend_texture::TextureError;
use avatarforge_types::BackendError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fatal pipeline failures. Everything else degrades.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source image could not be read.
    #[error("Source image unavailable at {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The input path has no usable file stem.
    #[error("Input path has no file name: {path}")]
    InvalidInputPath { path: PathBuf },

    /// No body pose landmarks: there is nothing to build a mesh from.
    #[error("No subject detected: {reason}")]
    NoSubjectDetected { reason: String },

    /// Neither the gender-specific nor the neutral body model produced geometry.
    #[error("Body model unavailable: {message}")]
    BodyModelUnavailable { message: String },

    /// The body model geometry could not be assembled into a mesh.
    #[error("Mesh assembly failed: {0}")]
    Assembly(#[source] MeshError),

    /// The primary mesh, material or texture could not be written.
    #[error("Export failed: {0}")]
    ExportFailed(#[source] MeshError),

    /// Texture compositing failed.
    #[error("Texture compositing failed: {0}")]
    Texture(#[from] TextureError),

    /// Configuration is invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for [`crate::PipelineConfig`].
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A pipeline-owned output (e.g. the silhouette) could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Creates a new no-subject error.
    pub fn no_subject(reason: impl Into<String>) -> Self {
        Self::NoSubjectDetected {
            reason: reason.into(),
        }
    }

    /// Creates a new write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl BackendError for PipelineError {
    fn code(&self) -> &'static str {
        match self {
            PipelineError::InputUnavailable { .. } => "PIPELINE_001",
            PipelineError::InvalidInputPath { .. } => "PIPELINE_002",
            PipelineError::NoSubjectDetected { .. } => "PIPELINE_003",
            PipelineError::BodyModelUnavailable { .. } => "PIPELINE_004",
            PipelineError::Assembly(_) => "PIPELINE_005",
            PipelineError::ExportFailed(_) => "PIPELINE_006",
            PipelineError::Texture(_) => "PIPELINE_007",
            PipelineError::InvalidConfig { .. } => "PIPELINE_008",
            PipelineError::ConfigRead { .. } => "PIPELINE_009",
            PipelineError::ConfigParse(_) => "PIPELINE_010",
            PipelineError::Write { .. } => "PIPELINE_011",
        }
    }

    fn category(&self) -> &'static str {
        "pipeline"
    }
}

/// Measurement contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasurementError {
    /// A required joint index is past the end of the landmark sequence.
    #[error("Pose landmark index {index} out of range for {len} landmarks")]
    IndexOutOfRange { index: usize, len: usize },
}

impl BackendError for MeasurementError {
    fn code(&self) -> &'static str {
        match self {
            MeasurementError::IndexOutOfRange { .. } => "MEASURE_001",
        }
    }

    fn category(&self) -> &'static str {
        "measurement"
    }
}
