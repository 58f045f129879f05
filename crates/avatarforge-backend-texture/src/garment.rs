//! Gender-keyed garment asset lookup.

use std::path::{Path, PathBuf};

use avatarforge_types::Gender;

/// Extensions tried, in order, for a garment asset.
pub const GARMENT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A directory of `<gender>_outfit.<ext>` garment images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarmentLibrary {
    dir: PathBuf,
}

impl GarmentLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Finds the garment for a gender. Neutral subjects have none.
    pub fn find(&self, gender: Gender) -> Option<PathBuf> {
        if gender == Gender::Neutral {
            return None;
        }
        GARMENT_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}_outfit.{}", gender.as_str(), ext)))
            .find(|p| p.is_file())
    }
}
