//! AvatarForge End-to-End Test Infrastructure
//!
//! Integration tests for the full photo-to-avatar flow:
//!
//! - **Pipeline**: scripted perception -> exported mesh, material, texture, scene
//! - **Determinism**: re-running on the same input yields byte-identical
//!   files and leaves nothing stale behind
//! - **Properties**: measurement, UV and sampling invariants under proptest
//! - **Formats**: PNG and GLB headers, plus a full glTF import
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p avatarforge-tests
//! ```

pub mod determinism;
pub mod fixtures;
pub mod format_validators;

pub use determinism::{first_difference, snapshot_dir, verify_determinism, DeterminismResult};
pub use fixtures::{
    dense_face_landmarks, grid_geometry, standing_pose, write_garment, write_photo,
    write_photo_with_face, GridBodyModel, MaskScript, ScriptedPerception,
};
pub use format_validators::{validate_glb, validate_png, FormatError, GlbInfo, PngInfo};
