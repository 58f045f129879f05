//! Error types for the mesh backend.

use avatarforge_backend_texture::TextureError;
use avatarforge_types::BackendError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh backend operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while assembling or exporting a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The body model produced no vertices or no faces.
    #[error("Mesh is empty ({vertices} vertices, {faces} faces)")]
    EmptyMesh { vertices: usize, faces: usize },

    /// A face references a vertex that does not exist.
    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    /// Export target does not end in the mesh extension.
    #[error("Mesh output path must end in .obj: {path}")]
    InvalidOutputPath { path: PathBuf },

    /// Writing an export file failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Texture encoding failed.
    #[error("Texture export failed: {0}")]
    Texture(#[from] TextureError),

    /// Binary scene assembly failed.
    #[error("GLB export failed: {message}")]
    Glb { message: String },

    /// Scene JSON could not be serialized.
    #[error("Failed to serialize scene JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshError {
    /// Creates a new write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new GLB error.
    pub fn glb(message: impl Into<String>) -> Self {
        Self::Glb {
            message: message.into(),
        }
    }
}

impl BackendError for MeshError {
    fn code(&self) -> &'static str {
        match self {
            MeshError::EmptyMesh { .. } => "MESH_001",
            MeshError::FaceIndexOutOfRange { .. } => "MESH_002",
            MeshError::NonFiniteVertex { .. } => "MESH_003",
            MeshError::InvalidOutputPath { .. } => "MESH_004",
            MeshError::Write { .. } => "MESH_005",
            MeshError::Texture(_) => "MESH_006",
            MeshError::Glb { .. } => "MESH_007",
            MeshError::Json(_) => "MESH_008",
        }
    }

    fn category(&self) -> &'static str {
        "mesh"
    }
}
