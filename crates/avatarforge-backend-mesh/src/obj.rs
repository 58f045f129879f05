//! Wavefront OBJ and MTL writers.
//!
//! Both formats are rendered to strings with fixed float formatting, so the
//! same asset always produces the same bytes.

use std::fmt::Write as _;

use crate::assemble::MeshAsset;

/// Name of the single material every avatar mesh uses.
pub const MATERIAL_NAME: &str = "skin";

/// Renders the material descriptor referencing `texture_file_name`.
///
/// The texture is named without a directory, so the material and texture
/// must stay side by side.
pub fn render_mtl(texture_file_name: &str) -> String {
    format!(
        "newmtl {MATERIAL_NAME}\n\
         Ka 1.0 1.0 1.0\n\
         Kd 1.0 1.0 1.0\n\
         Ks 0.0 0.0 0.0\n\
         d 1.0\n\
         illum 2\n\
         map_Kd {texture_file_name}\n"
    )
}

/// Renders the mesh, led by `mtllib` / `usemtl` before any geometry.
///
/// Vertices carry trailing `r g b` floats when the asset has vertex colors.
/// Faces reference vertex and UV with the same 1-based index.
pub fn render_obj(asset: &MeshAsset, material_file_name: &str) -> String {
    let mut out = String::with_capacity(asset.vertices.len() * 64 + asset.faces.len() * 24);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "mtllib {}", material_file_name);
    let _ = writeln!(out, "usemtl {}", MATERIAL_NAME);

    for (i, v) in asset.vertices.iter().enumerate() {
        let _ = write!(out, "v {:.8} {:.8} {:.8}", v[0], v[1], v[2]);
        if let Some(color) = asset.vertex_colors.as_ref().and_then(|c| c.get(i)) {
            let _ = write!(
                out,
                " {:.8} {:.8} {:.8}",
                color[0] as f32 / 255.0,
                color[1] as f32 / 255.0,
                color[2] as f32 / 255.0
            );
        }
        out.push('\n');
    }

    for uv in &asset.uvs {
        let _ = writeln!(out, "vt {:.8} {:.8}", uv[0], uv[1]);
    }

    for f in &asset.faces {
        let (a, b, c) = (f[0] + 1, f[1] + 1, f[2] + 1);
        let _ = writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}");
    }

    out
}
