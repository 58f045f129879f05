//! Pipeline configuration.

use std::path::{Path, PathBuf};

use avatarforge_backend_texture::{PngPreset, DEFAULT_TEXTURE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Environment variable overriding [`PipelineConfig::garment_dir`].
pub const GARMENT_DIR_ENV: &str = "AVATARFORGE_GARMENT_DIR";

/// Default garment asset directory, relative to the working directory.
pub const DEFAULT_GARMENT_DIR: &str = "fashion_assets";

/// Largest accepted texture edge.
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Configuration for one [`crate::Pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Square texture edge length in pixels.
    pub texture_size: u32,
    /// Directory holding `<gender>_outfit.{png,jpg,jpeg}`.
    pub garment_dir: PathBuf,
    /// Where artifacts go; `None` writes next to the input image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Write mask, measurement, face-crop and UV-template diagnostics.
    pub write_debug_artifacts: bool,
    /// Write the binary GLB scene next to the OBJ.
    pub export_scene: bool,
    /// PNG compression preset for every written image.
    pub png: PngPreset,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            texture_size: DEFAULT_TEXTURE_SIZE,
            garment_dir: PathBuf::from(DEFAULT_GARMENT_DIR),
            output_dir: None,
            write_debug_artifacts: true,
            export_scene: true,
            png: PngPreset::Default,
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects unusable settings.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.texture_size == 0 || self.texture_size > MAX_TEXTURE_SIZE {
            return Err(PipelineError::invalid_config(format!(
                "texture_size must be in 1..={}, got {}",
                MAX_TEXTURE_SIZE, self.texture_size
            )));
        }
        if self.output_dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
            return Err(PipelineError::invalid_config("output_dir must not be empty"));
        }
        Ok(())
    }

    /// The garment directory, with [`GARMENT_DIR_ENV`] taking precedence.
    pub fn resolved_garment_dir(&self) -> PathBuf {
        std::env::var_os(GARMENT_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.garment_dir.clone())
    }

    /// Output directory for a given input image.
    pub fn output_dir_for(&self, image_path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => image_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// Sets the texture size.
    pub fn texture_size(mut self, size: u32) -> Self {
        self.texture_size = size;
        self
    }

    /// Sets the garment directory.
    pub fn garment_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.garment_dir = dir.into();
        self
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Enables or disables diagnostic artifacts.
    pub fn write_debug_artifacts(mut self, enabled: bool) -> Self {
        self.write_debug_artifacts = enabled;
        self
    }

    /// Enables or disables the binary scene export.
    pub fn export_scene(mut self, enabled: bool) -> Self {
        self.export_scene = enabled;
        self
    }

    /// Sets the PNG compression preset.
    pub fn png(mut self, preset: PngPreset) -> Self {
        self.png = preset;
        self
    }
}
