//! Best-effort diagnostic artifacts.
//!
//! Each file is named `<stem><suffix>` next to the avatar. A failed write
//! is logged and recorded as a degradation; it never fails the run.

use std::path::PathBuf;

use avatarforge_backend_texture::png::{write_grayscale, write_rgb_raw, write_rgba};
use avatarforge_backend_texture::{render_uv_template, PngConfig, PngError};
use avatarforge_types::paths::suffix;
use avatarforge_types::{
    artifact_path, hash_file, ArtifactFile, ArtifactKind, BodyMeasurements, DegradationCode,
    Degradations, SegmentationMask,
};
use image::RgbImage;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a diagnostic artifact could not be written.
#[derive(Debug, Error)]
pub enum DebugArtifactError {
    #[error(transparent)]
    Png(#[from] PngError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Writes diagnostics for one run and collects what was written.
#[derive(Debug)]
pub struct DebugArtifacts {
    dir: PathBuf,
    base: String,
    png: PngConfig,
    files: Vec<ArtifactFile>,
    degradations: Degradations,
}

impl DebugArtifacts {
    pub fn new(dir: impl Into<PathBuf>, base: impl Into<String>, png: PngConfig) -> Self {
        Self {
            dir: dir.into(),
            base: base.into(),
            png,
            files: Vec::new(),
            degradations: Degradations::new(),
        }
    }

    fn path(&self, suffix: &str) -> PathBuf {
        artifact_path(&self.dir, &self.base, suffix)
    }

    /// Binarized segmentation mask, 0 or 255 per pixel.
    pub fn body_mask(&mut self, mask: &SegmentationMask) {
        let path = self.path(suffix::BODY_MASK);
        let (width, height) = mask.dimensions();
        let result = write_grayscale(&mask.to_binary_u8(), width, height, &path, &self.png)
            .map_err(DebugArtifactError::from);
        self.record("body mask", path, result);
    }

    /// Measurements as pretty-printed JSON.
    pub fn measurements(&mut self, measurements: &BodyMeasurements) {
        let path = self.path(suffix::MEASUREMENTS);
        let result = serde_json::to_vec_pretty(measurements)
            .map_err(DebugArtifactError::from)
            .and_then(|json| std::fs::write(&path, json).map_err(DebugArtifactError::from));
        self.record("measurements", path, result);
    }

    /// The face crop used for sampling and overlay.
    pub fn face_crop(&mut self, crop: &RgbImage) {
        let path = self.path(suffix::FACE_CROP);
        let result = write_rgb_raw(crop.as_raw(), crop.width(), crop.height(), &path, &self.png)
            .map_err(DebugArtifactError::from);
        self.record("face crop", path, result);
    }

    /// UV layout template: one dot per vertex on a transparent canvas.
    pub fn uv_template(&mut self, uvs: &[[f32; 2]], size: u32) {
        let path = self.path(suffix::UV_TEMPLATE);
        let template = render_uv_template(uvs, size);
        let result = write_rgba(&template, &path, &self.png).map_err(DebugArtifactError::from);
        self.record("uv template", path, result);
    }

    fn record(&mut self, what: &str, path: PathBuf, result: Result<(), DebugArtifactError>) {
        let hashed = result.and_then(|()| hash_file(&path).map_err(DebugArtifactError::from));
        match hashed {
            Ok(hash) => {
                debug!(artifact = what, path = %path.display(), "debug artifact written");
                self.files.push(ArtifactFile::new(ArtifactKind::Debug, path, hash));
            }
            Err(err) => {
                warn!(artifact = what, path = %path.display(), error = %err, "debug artifact failed");
                self.degradations.push(
                    DegradationCode::DebugArtifactFailed,
                    format!("{} at {}: {}", what, path.display(), err),
                );
            }
        }
    }

    /// Files written and degradations recorded, in call order.
    pub fn finish(self) -> (Vec<ArtifactFile>, Degradations) {
        (self.files, self.degradations)
    }
}
