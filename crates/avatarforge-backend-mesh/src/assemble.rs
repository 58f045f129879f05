//! Mesh assembly: body geometry plus planar UVs, texture and vertex colors.

use avatarforge_backend_texture::TextureBuffer;
use avatarforge_types::{BodyGeometry, DegradationCode, Degradations, Rgb8};
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult};

/// RGBA vertex color.
pub type VertexColor = [u8; 4];

/// A textured mesh ready for export.
///
/// When `vertex_colors` is present both it and the texture are attached;
/// which one a renderer shows is left to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAsset {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
    /// One `[u, v]` per vertex.
    pub uvs: Vec<[f32; 2]>,
    pub texture: TextureBuffer,
    pub vertex_colors: Option<Vec<VertexColor>>,
}

/// Planar UV projection result.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarUvs {
    pub uvs: Vec<[f32; 2]>,
    /// Axes (0 = x, 1 = y) whose extent was zero.
    pub degenerate_axes: Vec<usize>,
}

/// Projects vertices onto the XY plane, normalized by their own bounding box.
///
/// `u = (x - x_min) / (x_max - x_min)`, likewise for `v` over y. A zero
/// extent uses a denominator of 1, which maps that axis to 0.
pub fn planar_uvs(vertices: &[[f32; 3]]) -> PlanarUvs {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for v in vertices {
        for axis in 0..2 {
            min[axis] = min[axis].min(v[axis] as f64);
            max[axis] = max[axis].max(v[axis] as f64);
        }
    }

    let mut degenerate_axes = Vec::new();
    let mut denom = [1.0f64; 2];
    for axis in 0..2 {
        let extent = max[axis] - min[axis];
        if extent > 0.0 {
            denom[axis] = extent;
        } else {
            degenerate_axes.push(axis);
        }
    }

    let uvs = vertices
        .iter()
        .map(|v| {
            [
                ((v[0] as f64 - min[0]) / denom[0]) as f32,
                ((v[1] as f64 - min[1]) / denom[1]) as f32,
            ]
        })
        .collect();

    PlanarUvs {
        uvs,
        degenerate_axes,
    }
}

/// Output of [`MeshAssembler::assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub asset: MeshAsset,
    pub degradations: Degradations,
}

/// Builds [`MeshAsset`]s from body-model geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshAssembler;

impl MeshAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assigns planar UVs, attaches the texture and optionally a flat
    /// per-vertex skin color.
    pub fn assemble(
        &self,
        geometry: BodyGeometry,
        texture: TextureBuffer,
        skin_color: Option<Rgb8>,
    ) -> MeshResult<Assembly> {
        let BodyGeometry { vertices, faces } = geometry;
        validate(&vertices, &faces)?;

        let mut degradations = Degradations::new();
        let PlanarUvs {
            uvs,
            degenerate_axes,
        } = planar_uvs(&vertices);
        if !degenerate_axes.is_empty() {
            let names: Vec<&str> = degenerate_axes
                .iter()
                .map(|&a| if a == 0 { "x" } else { "y" })
                .collect();
            warn!(axes = ?names, "zero-extent bounding box, UV denominator set to 1");
            degradations.push(
                DegradationCode::DegenerateGeometry,
                format!("zero extent along {} during UV projection", names.join(", ")),
            );
        }

        let vertex_colors =
            skin_color.map(|[r, g, b]| vec![[r, g, b, 255]; vertices.len()]);

        debug!(
            vertices = vertices.len(),
            faces = faces.len(),
            vertex_colors = vertex_colors.is_some(),
            "mesh assembled"
        );

        Ok(Assembly {
            asset: MeshAsset {
                vertices,
                faces,
                uvs,
                texture,
                vertex_colors,
            },
            degradations,
        })
    }
}

fn validate(vertices: &[[f32; 3]], faces: &[[u32; 3]]) -> MeshResult<()> {
    if vertices.is_empty() || faces.is_empty() {
        return Err(MeshError::EmptyMesh {
            vertices: vertices.len(),
            faces: faces.len(),
        });
    }
    if let Some(index) = vertices
        .iter()
        .position(|v| v.iter().any(|c| !c.is_finite()))
    {
        return Err(MeshError::NonFiniteVertex { index });
    }
    for (face, tri) in faces.iter().enumerate() {
        if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::FaceIndexOutOfRange {
                face,
                index,
                vertex_count: vertices.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatarforge_backend_texture::Color;
    use pretty_assertions::assert_eq;

    fn quad() -> BodyGeometry {
        BodyGeometry {
            vertices: vec![
                [-1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 2.0, 0.5],
                [-1.0, 2.0, 0.5],
            ],
            faces: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    fn texture() -> TextureBuffer {
        TextureBuffer::new(4, 4, Color::white())
    }

    #[test]
    fn test_planar_uvs_span_unit_square() {
        let out = MeshAssembler::new().assemble(quad(), texture(), None).unwrap();
        assert_eq!(
            out.asset.uvs,
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
        );
        assert!(out.degradations.is_empty());
        assert!(out.asset.vertex_colors.is_none());
    }

    #[test]
    fn test_degenerate_axis_guarded() {
        let geometry = BodyGeometry {
            vertices: vec![[3.0, 0.0, 0.0], [3.0, 1.0, 0.0], [3.0, 2.0, 1.0]],
            faces: vec![[0, 1, 2]],
        };
        let out = MeshAssembler::new().assemble(geometry, texture(), None).unwrap();
        assert!(out.asset.uvs.iter().all(|uv| uv[0] == 0.0));
        assert_eq!(out.asset.uvs[2], [0.0, 1.0]);
        assert!(out
            .degradations
            .contains(DegradationCode::DegenerateGeometry));
    }

    #[test]
    fn test_single_point_degenerate_on_both_axes() {
        let uvs = planar_uvs(&[[1.0, 1.0, 1.0]; 3]);
        assert_eq!(uvs.degenerate_axes, vec![0, 1]);
        assert!(uvs.uvs.iter().all(|uv| *uv == [0.0, 0.0]));
    }

    #[test]
    fn test_skin_color_assigned_to_every_vertex() {
        let out = MeshAssembler::new()
            .assemble(quad(), texture(), Some([10, 20, 30]))
            .unwrap();
        let colors = out.asset.vertex_colors.unwrap();
        assert_eq!(colors.len(), 4);
        assert!(colors.iter().all(|c| *c == [10, 20, 30, 255]));
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let empty = BodyGeometry::default();
        assert!(matches!(
            MeshAssembler::new().assemble(empty, texture(), None),
            Err(MeshError::EmptyMesh { .. })
        ));

        let mut bad_face = quad();
        bad_face.faces.push([0, 1, 7]);
        assert!(matches!(
            MeshAssembler::new().assemble(bad_face, texture(), None),
            Err(MeshError::FaceIndexOutOfRange { index: 7, .. })
        ));

        let mut nan = quad();
        nan.vertices[1][2] = f32::NAN;
        assert!(matches!(
            MeshAssembler::new().assemble(nan, texture(), None),
            Err(MeshError::NonFiniteVertex { index: 1 })
        ));
    }
}
