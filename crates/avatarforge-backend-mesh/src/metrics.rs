//! Mesh metrics.
//!
//! Summary statistics over an assembled mesh, reported alongside the
//! exported files and used by tests to validate geometry without parsing
//! the export formats.

use serde::{Deserialize, Serialize};

use crate::assemble::MeshAsset;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner [X, Y, Z].
    pub min: [f64; 3],
    /// Maximum corner [X, Y, Z].
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Bounding box of a vertex set, `None` if it is empty.
    pub fn of(vertices: &[[f32; 3]]) -> Option<Self> {
        let first = vertices.first()?;
        let mut min = first.map(f64::from);
        let mut max = min;
        for v in vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis] as f64);
                max[axis] = max[axis].max(v[axis] as f64);
            }
        }
        Some(Self { min, max })
    }

    /// Extent along each axis.
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Returns true if every corner coordinate differs by at most `tolerance`.
    pub fn within_tolerance(&self, other: &BoundingBox, tolerance: f64) -> bool {
        self.min
            .iter()
            .chain(self.max.iter())
            .zip(other.min.iter().chain(other.max.iter()))
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// Metrics for an assembled avatar mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshMetrics {
    pub vertex_count: u32,
    pub triangle_count: u32,
    pub bounding_box: BoundingBox,
    /// UV range as `[u_min, v_min, u_max, v_max]`.
    pub uv_bounds: [f64; 4],
    pub has_vertex_colors: bool,
    /// Texture edge length in pixels.
    pub texture_size: u32,
}

impl MeshMetrics {
    /// Computes metrics for an asset.
    pub fn of(asset: &MeshAsset) -> Self {
        let bounding_box =
            BoundingBox::of(&asset.vertices).unwrap_or_else(|| BoundingBox::new([0.0; 3], [0.0; 3]));

        let mut uv_bounds = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for uv in &asset.uvs {
            uv_bounds[0] = uv_bounds[0].min(uv[0] as f64);
            uv_bounds[1] = uv_bounds[1].min(uv[1] as f64);
            uv_bounds[2] = uv_bounds[2].max(uv[0] as f64);
            uv_bounds[3] = uv_bounds[3].max(uv[1] as f64);
        }
        if asset.uvs.is_empty() {
            uv_bounds = [0.0; 4];
        }

        Self {
            vertex_count: asset.vertices.len() as u32,
            triangle_count: asset.faces.len() as u32,
            bounding_box,
            uv_bounds,
            has_vertex_colors: asset.vertex_colors.is_some(),
            texture_size: asset.texture.width,
        }
    }

    /// Returns true if every UV coordinate lies in [0, 1].
    pub fn uvs_normalized(&self) -> bool {
        self.uv_bounds.iter().all(|c| (0.0..=1.0).contains(c))
    }
}
