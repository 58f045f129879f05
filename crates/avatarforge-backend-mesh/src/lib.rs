//! AvatarForge Mesh Backend
//!
//! Turns body-model geometry and a composited texture into exported files.
//!
//! # Stages
//!
//! - [`assemble`]: planar UV projection over the vertex bounding box, flat
//!   per-vertex skin color, texture attachment
//! - [`export`]: stale-output purge, then texture, material and mesh in
//!   that order, then a best-effort binary scene
//!
//! # Formats
//!
//! - Wavefront OBJ + MTL, led by `mtllib` / `usemtl skin`
//! - Binary glTF 2.0 with `TEXCOORD_0`, optional `COLOR_0` and the texture
//!   embedded as PNG
//!
//! All writers format numbers with fixed precision, so exporting the same
//! asset twice yields byte-identical files.

pub mod assemble;
pub mod error;
pub mod export;
pub mod glb;
pub mod metrics;
pub mod obj;

pub use assemble::{planar_uvs, Assembly, MeshAsset, MeshAssembler, PlanarUvs, VertexColor};
pub use error::{MeshError, MeshResult};
pub use export::{ArtifactExporter, Export, ExportOptions};
pub use glb::encode_glb;
pub use metrics::{BoundingBox, MeshMetrics};
pub use obj::{render_mtl, render_obj, MATERIAL_NAME};
