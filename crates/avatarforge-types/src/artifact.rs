//! The persisted output bundle of one pipeline run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gender::Gender;
use crate::measurements::BodyMeasurements;

/// Kind of file written by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Text mesh (OBJ).
    Mesh,
    /// Material descriptor (MTL).
    Material,
    /// UV texture image (PNG).
    Texture,
    /// Binary scene (GLB).
    Scene,
    /// Diagnostic output, not required for correctness.
    Debug,
}

/// A written file and the BLAKE3 hash of its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub hash: String,
}

impl ArtifactFile {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, hash: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            hash: hash.into(),
        }
    }
}

/// Terminal output of a run. Valid only once export has returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarArtifact {
    pub mesh_path: PathBuf,
    pub material_path: PathBuf,
    pub texture_path: PathBuf,
    /// Absent when the best-effort binary scene export failed or was disabled.
    pub scene_path: Option<PathBuf>,
    pub gender: Gender,
    pub measurements: Option<BodyMeasurements>,
    /// Every file written for this artifact, in write order.
    pub files: Vec<ArtifactFile>,
}

impl AvatarArtifact {
    /// The preferred delivery path: the binary scene if written, else the mesh.
    pub fn primary_path(&self) -> &Path {
        self.scene_path.as_deref().unwrap_or(&self.mesh_path)
    }

    /// Attaches measurements computed upstream of the export.
    pub fn with_measurements(mut self, measurements: Option<BodyMeasurements>) -> Self {
        self.measurements = measurements;
        self
    }

    /// Looks up the recorded file of the given kind.
    pub fn file(&self, kind: ArtifactKind) -> Option<&ArtifactFile> {
        self.files.iter().find(|f| f.kind == kind)
    }
}
