//! Re-running on the same input must overwrite, never accumulate.
//!
//! Output paths derive only from the input name and gender, and every writer
//! uses fixed formatting, so a second run must reproduce the first run's
//! directory byte for byte.

use std::path::Path;
use std::sync::Arc;

use avatarforge_backend_mesh::{encode_glb, ArtifactExporter, MeshAssembler};
use avatarforge_backend_texture::png::write_rgb_to_vec_with_hash;
use avatarforge_backend_texture::{CompositeConfig, PngConfig, TextureCompositor};
use avatarforge_pipeline::{PathLocks, Pipeline, PipelineConfig};
use avatarforge_tests::determinism::file_names;
use avatarforge_tests::{
    grid_geometry, snapshot_dir, verify_determinism, write_photo, GridBodyModel, ScriptedPerception,
};
use avatarforge_types::{Gender, DEFAULT_SKIN_RGB};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn pipeline(out: &Path, debug: bool) -> Pipeline {
    Pipeline::new(ScriptedPerception::standing(), GridBodyModel::new(3, 5))
        .with_config(
            PipelineConfig::default()
                .texture_size(32)
                .garment_dir(out.join("no-garments"))
                .output_dir(out)
                .write_debug_artifacts(debug),
        )
        .unwrap()
        .with_locks(Arc::new(PathLocks::new()))
}

#[test]
fn test_rerun_is_byte_identical() {
    let root = TempDir::new().unwrap();
    let photo = write_photo(root.path(), "me.png", (80, 120), [150, 120, 100]);
    let out = root.path().join("out");
    let pipeline = pipeline(&out, true);

    pipeline.run(&photo).unwrap();
    let first = snapshot_dir(&out);
    pipeline.run(&photo).unwrap();
    let second = snapshot_dir(&out);

    assert_eq!(first, second);
    assert_eq!(
        file_names(&second),
        vec![
            "me_bodymask.png",
            "me_measurements.json",
            "me_neutral.png",
            "me_neutral_avatar.glb",
            "me_neutral_avatar.mtl",
            "me_neutral_avatar.obj",
            "me_uv_template.png",
        ]
    );
}

#[test]
fn test_stale_outputs_are_purged() {
    let root = TempDir::new().unwrap();
    let photo = write_photo(root.path(), "me.png", (40, 40), [150, 120, 100]);
    let out = root.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    // A scene from an earlier run with scene export on, and a texture
    // written under the older same-stem naming.
    std::fs::write(out.join("me_neutral_avatar.glb"), b"stale").unwrap();
    std::fs::write(out.join("me_neutral_avatar.png"), b"stale").unwrap();

    let run = Pipeline::new(ScriptedPerception::standing(), GridBodyModel::new(2, 2))
        .with_config(
            PipelineConfig::default()
                .texture_size(16)
                .output_dir(&out)
                .garment_dir(root.path())
                .write_debug_artifacts(false)
                .export_scene(false),
        )
        .unwrap()
        .run(&photo)
        .unwrap();

    assert_eq!(run.artifact.scene_path, None);
    assert_eq!(
        file_names(&snapshot_dir(&out)),
        vec!["me_neutral.png", "me_neutral_avatar.mtl", "me_neutral_avatar.obj"]
    );
}

#[test]
fn test_exporter_twice_on_same_path() {
    let root = TempDir::new().unwrap();
    let texture = TextureCompositor::new()
        .compose(&CompositeConfig::new(DEFAULT_SKIN_RGB).with_texture_size(16))
        .unwrap()
        .texture;
    let asset = MeshAssembler::new()
        .assemble(grid_geometry(2, 3), texture, Some(DEFAULT_SKIN_RGB))
        .unwrap()
        .asset;
    let out = root.path().join("a_male_avatar.obj");
    let exporter = ArtifactExporter::default();

    let first = exporter.export(&asset, &out, Gender::Male).unwrap();
    let before = snapshot_dir(root.path());
    let second = exporter.export(&asset, &out, Gender::Male).unwrap();

    assert_eq!(first.artifact, second.artifact);
    assert_eq!(before, snapshot_dir(root.path()));
}

#[test]
fn test_in_memory_encoders_are_deterministic() {
    let compose = || {
        TextureCompositor::new()
            .compose(
                &CompositeConfig::new([120, 80, 60])
                    .with_eye_color([20, 40, 80])
                    .with_texture_size(48),
            )
            .unwrap()
            .texture
    };
    verify_determinism(
        || write_rgb_to_vec_with_hash(&compose(), &PngConfig::default()).unwrap().0,
        3,
    )
    .assert_deterministic();

    verify_determinism(
        || {
            let asset = MeshAssembler::new()
                .assemble(grid_geometry(4, 4), compose(), Some([120, 80, 60]))
                .unwrap()
                .asset;
            let (png, _) = write_rgb_to_vec_with_hash(&asset.texture, &PngConfig::default()).unwrap();
            encode_glb(&asset, &png).unwrap()
        },
        3,
    )
    .assert_deterministic();
}
