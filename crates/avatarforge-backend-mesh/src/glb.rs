//! Binary glTF (GLB) writer.
//!
//! Produces a single-mesh, single-material scene with the texture embedded
//! as PNG. Layout of the binary chunk, each section 4-byte aligned:
//!
//! | Section | Format |
//! |---|---|
//! | positions | `f32 x3` |
//! | TEXCOORD_0 | `f32 x2`, v flipped to glTF's top-left origin |
//! | COLOR_0 (optional) | normalized `u8 x4` |
//! | indices | `u32` |
//! | image | PNG bytes |

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use serde_json::{json, Value};

use crate::assemble::MeshAsset;
use crate::error::{MeshError, MeshResult};
use crate::metrics::BoundingBox;
use crate::obj::MATERIAL_NAME;

/// GLB magic, "glTF" little-endian.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// GLB container version.
pub const GLB_VERSION: u32 = 2;
/// JSON chunk type, "JSON".
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// BIN chunk type, "BIN\0".
pub const CHUNK_BIN: u32 = 0x004E_4942;

mod component {
    pub const UNSIGNED_BYTE: u32 = 5121;
    pub const UNSIGNED_INT: u32 = 5125;
    pub const FLOAT: u32 = 5126;
}

mod target {
    pub const ARRAY_BUFFER: u32 = 34962;
    pub const ELEMENT_ARRAY_BUFFER: u32 = 34963;
}

/// A byte range inside the BIN chunk.
struct View {
    offset: usize,
    length: usize,
    target: Option<u32>,
}

fn pad_to_4(buf: &mut Vec<u8>, fill: u8) {
    while buf.len() % 4 != 0 {
        buf.push(fill);
    }
}

fn encode_bin(asset: &MeshAsset, png: &[u8]) -> io::Result<(Vec<u8>, Vec<View>)> {
    let mut bin = Vec::new();
    let mut views = Vec::new();

    let start = bin.len();
    for v in &asset.vertices {
        for c in v {
            bin.write_f32::<LittleEndian>(*c)?;
        }
    }
    views.push(View {
        offset: start,
        length: bin.len() - start,
        target: Some(target::ARRAY_BUFFER),
    });

    let start = bin.len();
    for uv in &asset.uvs {
        bin.write_f32::<LittleEndian>(uv[0])?;
        bin.write_f32::<LittleEndian>(1.0 - uv[1])?;
    }
    views.push(View {
        offset: start,
        length: bin.len() - start,
        target: Some(target::ARRAY_BUFFER),
    });

    if let Some(colors) = &asset.vertex_colors {
        let start = bin.len();
        for c in colors {
            bin.write_all(c)?;
        }
        views.push(View {
            offset: start,
            length: bin.len() - start,
            target: Some(target::ARRAY_BUFFER),
        });
    }

    let start = bin.len();
    for f in &asset.faces {
        for i in f {
            bin.write_u32::<LittleEndian>(*i)?;
        }
    }
    views.push(View {
        offset: start,
        length: bin.len() - start,
        target: Some(target::ELEMENT_ARRAY_BUFFER),
    });

    let start = bin.len();
    bin.write_all(png)?;
    views.push(View {
        offset: start,
        length: png.len(),
        target: None,
    });

    pad_to_4(&mut bin, 0);
    Ok((bin, views))
}

fn scene_json(asset: &MeshAsset, views: &[View], bin_len: usize) -> MeshResult<Value> {
    let bounds = BoundingBox::of(&asset.vertices)
        .ok_or_else(|| MeshError::glb("cannot export a mesh without vertices"))?;
    let vertex_count = asset.vertices.len();
    let has_colors = asset.vertex_colors.is_some();

    let buffer_views: Vec<Value> = views
        .iter()
        .map(|v| {
            let mut view = json!({
                "buffer": 0,
                "byteOffset": v.offset,
                "byteLength": v.length,
            });
            if let Some(t) = v.target {
                view["target"] = json!(t);
            }
            view
        })
        .collect();

    let mut accessors = vec![
        json!({
            "bufferView": 0,
            "componentType": component::FLOAT,
            "count": vertex_count,
            "type": "VEC3",
            "min": bounds.min.map(|c| c as f32),
            "max": bounds.max.map(|c| c as f32),
        }),
        json!({
            "bufferView": 1,
            "componentType": component::FLOAT,
            "count": vertex_count,
            "type": "VEC2",
        }),
    ];
    let mut attributes = json!({ "POSITION": 0, "TEXCOORD_0": 1 });
    if has_colors {
        accessors.push(json!({
            "bufferView": 2,
            "componentType": component::UNSIGNED_BYTE,
            "normalized": true,
            "count": vertex_count,
            "type": "VEC4",
        }));
        attributes["COLOR_0"] = json!(2);
    }
    let index_view = if has_colors { 3 } else { 2 };
    let index_accessor = accessors.len();
    accessors.push(json!({
        "bufferView": index_view,
        "componentType": component::UNSIGNED_INT,
        "count": asset.faces.len() * 3,
        "type": "SCALAR",
    }));

    Ok(json!({
        "asset": { "version": "2.0", "generator": concat!("avatarforge ", env!("CARGO_PKG_VERSION")) },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "name": "avatar" }],
        "meshes": [{
            "name": "avatar",
            "primitives": [{
                "attributes": attributes,
                "indices": index_accessor,
                "material": 0,
                "mode": 4,
            }],
        }],
        "materials": [{
            "name": MATERIAL_NAME,
            "pbrMetallicRoughness": {
                "baseColorTexture": { "index": 0 },
                "metallicFactor": 0.0,
                "roughnessFactor": 1.0,
            },
        }],
        "textures": [{ "sampler": 0, "source": 0 }],
        "samplers": [{ "magFilter": 9729, "minFilter": 9729 }],
        "images": [{ "bufferView": index_view + 1, "mimeType": "image/png" }],
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [{ "byteLength": bin_len }],
    }))
}

fn write_container<W: Write>(out: &mut W, total: u32, json: &[u8], bin: &[u8]) -> io::Result<()> {
    out.write_u32::<LittleEndian>(GLB_MAGIC)?;
    out.write_u32::<LittleEndian>(GLB_VERSION)?;
    out.write_u32::<LittleEndian>(total)?;
    out.write_u32::<LittleEndian>(json.len() as u32)?;
    out.write_u32::<LittleEndian>(CHUNK_JSON)?;
    out.write_all(json)?;
    out.write_u32::<LittleEndian>(bin.len() as u32)?;
    out.write_u32::<LittleEndian>(CHUNK_BIN)?;
    out.write_all(bin)
}

/// Encodes the asset as a GLB with `png` embedded as its base-color texture.
pub fn encode_glb(asset: &MeshAsset, png: &[u8]) -> MeshResult<Vec<u8>> {
    let (bin, views) =
        encode_bin(asset, png).map_err(|e| MeshError::glb(format!("buffer encoding: {}", e)))?;
    let mut json = serde_json::to_vec(&scene_json(asset, &views, bin.len())?)?;
    pad_to_4(&mut json, b' ');

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let total = u32::try_from(total).map_err(|_| MeshError::glb("scene exceeds 4 GiB"))?;

    let mut out = Vec::with_capacity(total as usize);
    write_container(&mut out, total, &json, &bin)
        .map_err(|e| MeshError::glb(format!("container encoding: {}", e)))?;

    Ok(out)
}
