//! Artifact export: texture, material, mesh and binary scene.
//!
//! Files are written in dependency order (texture, material, mesh) so that
//! every reference points at a file that already exists. The binary scene
//! is a best-effort extra: its failure is a degradation, not an error.

use std::path::Path;

use avatarforge_backend_texture::png::write_rgb_to_vec_with_hash;
use avatarforge_backend_texture::PngConfig;
use avatarforge_types::paths::MESH_EXTENSION;
use avatarforge_types::{
    hash_bytes, ArtifactFile, ArtifactKind, ArtifactPaths, AvatarArtifact, DegradationCode,
    Degradations, Gender,
};
use tracing::{debug, info, warn};

use crate::assemble::MeshAsset;
use crate::error::{MeshError, MeshResult};
use crate::glb::encode_glb;
use crate::metrics::MeshMetrics;
use crate::obj::{render_mtl, render_obj};

/// Exporter settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub png: PngConfig,
    /// Write the binary scene next to the mesh.
    pub export_scene: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            png: PngConfig::default(),
            export_scene: true,
        }
    }
}

/// Output of [`ArtifactExporter::export`].
#[derive(Debug, Clone)]
pub struct Export {
    pub artifact: AvatarArtifact,
    pub metrics: MeshMetrics,
    pub degradations: Degradations,
}

/// Writes a [`MeshAsset`] to disk under deterministic names.
#[derive(Debug, Clone, Default)]
pub struct ArtifactExporter {
    options: ExportOptions,
}

impl ArtifactExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Exports `asset` with its mesh at `out_path`.
    ///
    /// Every derived path is purged first, so a re-export never leaves
    /// files from a previous run behind.
    pub fn export(&self, asset: &MeshAsset, out_path: &Path, gender: Gender) -> MeshResult<Export> {
        let is_obj = out_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(MESH_EXTENSION));
        if !is_obj {
            return Err(MeshError::InvalidOutputPath {
                path: out_path.to_path_buf(),
            });
        }

        let paths = ArtifactPaths::from_mesh_path(out_path);
        if let Some(dir) = out_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| MeshError::write(dir, e))?;
        }
        purge(&paths)?;

        let mut files = Vec::with_capacity(4);
        let mut degradations = Degradations::new();

        let (png, texture_hash) = write_rgb_to_vec_with_hash(&asset.texture, &self.options.png)
            .map_err(avatarforge_backend_texture::TextureError::from)?;
        write_file(&paths.texture, &png)?;
        files.push(ArtifactFile::new(ArtifactKind::Texture, &paths.texture, texture_hash));

        let mtl = render_mtl(&paths.texture_file_name());
        write_file(&paths.material, mtl.as_bytes())?;
        files.push(ArtifactFile::new(
            ArtifactKind::Material,
            &paths.material,
            hash_bytes(mtl.as_bytes()),
        ));

        let obj = render_obj(asset, &paths.material_file_name());
        write_file(&paths.mesh, obj.as_bytes())?;
        files.push(ArtifactFile::new(
            ArtifactKind::Mesh,
            &paths.mesh,
            hash_bytes(obj.as_bytes()),
        ));

        let scene_path = if self.options.export_scene {
            match encode_glb(asset, &png).and_then(|glb| {
                write_file(&paths.scene, &glb)?;
                Ok(hash_bytes(&glb))
            }) {
                Ok(hash) => {
                    files.push(ArtifactFile::new(ArtifactKind::Scene, &paths.scene, hash));
                    Some(paths.scene.clone())
                }
                Err(err) => {
                    warn!(path = %paths.scene.display(), error = %err, "binary scene export failed");
                    // Leave no truncated scene behind.
                    let _ = std::fs::remove_file(&paths.scene);
                    degradations.push(
                        DegradationCode::ExportPartialFailure,
                        format!("binary scene export failed: {}", err),
                    );
                    None
                }
            }
        } else {
            None
        };

        info!(mesh = %paths.mesh.display(), files = files.len(), "avatar exported");

        Ok(Export {
            artifact: AvatarArtifact {
                mesh_path: paths.mesh,
                material_path: paths.material,
                texture_path: paths.texture,
                scene_path,
                gender,
                measurements: None,
                files,
            },
            metrics: MeshMetrics::of(asset),
            degradations,
        })
    }
}

fn purge(paths: &ArtifactPaths) -> MeshResult<()> {
    for path in paths.stale_paths() {
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(MeshError::write(path, e)),
        }
    }
    Ok(())
}

fn write_file(path: &Path, data: &[u8]) -> MeshResult<()> {
    std::fs::write(path, data).map_err(|e| MeshError::write(path, e))
}
