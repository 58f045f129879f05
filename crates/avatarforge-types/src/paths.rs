//! Deterministic artifact path derivation.
//!
//! Every path produced by a run is derived from the input image's base name
//! and a semantic suffix, so re-running on the same input overwrites instead
//! of accumulating files.

use std::path::{Path, PathBuf};

use crate::gender::Gender;

/// Mesh file extension.
pub const MESH_EXTENSION: &str = "obj";
/// Material file extension.
pub const MATERIAL_EXTENSION: &str = "mtl";
/// Texture file extension.
pub const TEXTURE_EXTENSION: &str = "png";
/// Binary scene file extension.
pub const SCENE_EXTENSION: &str = "glb";

/// Suffix marking a mesh-specific file name.
pub const AVATAR_SUFFIX: &str = "_avatar";

/// Semantic suffixes for auxiliary artifacts.
pub mod suffix {
    /// Binarized segmentation mask preview.
    pub const BODY_MASK: &str = "_bodymask.png";
    /// Measurement dump.
    pub const MEASUREMENTS: &str = "_measurements.json";
    /// Face crop preview.
    pub const FACE_CROP: &str = "_facecrop.png";
    /// UV layout template.
    pub const UV_TEMPLATE: &str = "_uv_template.png";
    /// 2D silhouette avatar.
    pub const SILHOUETTE: &str = "_avatar.png";
}

/// Returns the base name (file stem) of an input image path.
pub fn base_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Builds `<dir>/<base><suffix>`.
pub fn artifact_path(dir: &Path, base: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{}", base, suffix))
}

/// The set of file paths making up one exported avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub mesh: PathBuf,
    pub material: PathBuf,
    pub texture: PathBuf,
    pub scene: PathBuf,
}

impl ArtifactPaths {
    /// Paths for a run on `image_base` with the given gender label.
    ///
    /// ```
    /// use avatarforge_types::{ArtifactPaths, Gender};
    /// use std::path::Path;
    ///
    /// let paths = ArtifactPaths::for_run(Path::new("out"), "photo", Gender::Male);
    /// assert_eq!(paths.mesh, Path::new("out/photo_male_avatar.obj"));
    /// assert_eq!(paths.texture, Path::new("out/photo_male.png"));
    /// ```
    pub fn for_run(output_dir: &Path, image_base: &str, gender: Gender) -> Self {
        let stem = format!("{}_{}{}", image_base, gender.as_str(), AVATAR_SUFFIX);
        Self::from_mesh_path(&output_dir.join(format!("{}.{}", stem, MESH_EXTENSION)))
    }

    /// Derives every sibling path from a requested mesh path.
    ///
    /// The material and scene swap the mesh extension; the texture also
    /// drops the mesh-specific `_avatar` suffix when present.
    pub fn from_mesh_path(mesh: &Path) -> Self {
        let dir = mesh.parent().unwrap_or_else(|| Path::new(""));
        let stem = mesh
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let texture_stem = match stem.strip_suffix(AVATAR_SUFFIX) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => stem.clone(),
        };

        Self {
            mesh: mesh.to_path_buf(),
            material: dir.join(format!("{}.{}", stem, MATERIAL_EXTENSION)),
            texture: dir.join(format!("{}.{}", texture_stem, TEXTURE_EXTENSION)),
            scene: dir.join(format!("{}.{}", stem, SCENE_EXTENSION)),
        }
    }

    /// Every path the exporter purges before writing.
    ///
    /// Includes a same-stem texture left by earlier naming.
    pub fn stale_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![
            self.mesh.clone(),
            self.material.clone(),
            self.texture.clone(),
            self.scene.clone(),
        ];
        let legacy_texture = self.mesh.with_extension(TEXTURE_EXTENSION);
        if !paths.contains(&legacy_texture) {
            paths.push(legacy_texture);
        }
        paths
    }

    /// File name of the material, as referenced from the mesh.
    pub fn material_file_name(&self) -> String {
        file_name(&self.material)
    }

    /// File name of the texture, as referenced from the material.
    pub fn texture_file_name(&self) -> String {
        file_name(&self.texture)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
