//! The avatar synthesis pipeline.
//!
//! `Intake -> PerceptionGather -> {Measurement, ColorSampling} -> Compose ->
//! Assemble -> Export`. Missing pose landmarks abort the run; every other
//! perception failure is recorded as a degradation and the run continues
//! with a documented fallback.

use std::path::Path;
use std::sync::Arc;

use avatarforge_backend_mesh::{ArtifactExporter, ExportOptions, MeshAssembler, MeshMetrics};
use avatarforge_backend_texture::png::write_rgba;
use avatarforge_backend_texture::{
    render_silhouette, ColorSampler, ColorSampling, CompositeConfig, Composition, FaceOverlay,
    GarmentLibrary, GarmentSource, PngConfig, TextureBuffer, TextureCompositor,
};
use avatarforge_types::paths::suffix;
use avatarforge_types::{
    artifact_path, base_name, hash_file, ArtifactFile, ArtifactKind, ArtifactPaths, AvatarArtifact,
    BackendError, BodyGeometry, BodyModel, ColorSample, DegradationCode,
    Degradations, FaceDetection, Gender, Perception, PoseLandmarks, ReportError, RunReport,
    SegmentationMask,
};
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::debug::DebugArtifacts;
use crate::error::{PipelineError, PipelineResult};
use crate::locks::PathLocks;
use crate::measurement::MeasurementEstimator;
use crate::stage::{Stage, StageClock};

/// Producer string written into run reports.
pub const BACKEND_VERSION: &str = concat!("avatarforge-pipeline v", env!("CARGO_PKG_VERSION"));

/// A successful avatar run.
#[derive(Debug, Clone)]
pub struct AvatarRun {
    pub artifact: AvatarArtifact,
    pub metrics: MeshMetrics,
    pub degradations: Degradations,
    pub report: RunReport,
}

/// A successful silhouette run.
#[derive(Debug, Clone)]
pub struct SilhouetteRun {
    pub file: ArtifactFile,
    pub degradations: Degradations,
}

/// Perception outputs for one image.
#[derive(Debug)]
struct Perceived {
    gender: Gender,
    pose: PoseLandmarks,
    faces: Vec<FaceDetection>,
    mask: Option<SegmentationMask>,
}

/// Mutable bookkeeping for one run, kept for the report even on failure.
#[derive(Debug, Default)]
struct RunState {
    clock: StageClock,
    degradations: Degradations,
    gender: Option<Gender>,
    outputs: Vec<ArtifactFile>,
}

impl RunState {
    fn report(self, error: Option<&PipelineError>) -> RunReport {
        let duration_ms = self.clock.elapsed_ms();
        let mut builder = RunReport::builder(BACKEND_VERSION)
            .degradations(self.degradations)
            .outputs(self.outputs)
            .stages(self.clock.into_timings());
        if let Some(gender) = self.gender {
            builder = builder.gender(gender);
        }
        if let Some(err) = error {
            builder = builder.error(ReportError::new(err.code(), err.to_string()));
        }
        builder.build(duration_ms)
    }
}

/// Sequences perception, sampling, compositing, assembly and export.
pub struct Pipeline {
    perception: Box<dyn Perception + Send + Sync>,
    body_model: Box<dyn BodyModel + Send + Sync>,
    config: PipelineConfig,
    sampler: ColorSampler,
    locks: Arc<PathLocks>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("sampler", &self.sampler)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline with the default configuration.
    pub fn new(
        perception: impl Perception + Send + Sync + 'static,
        body_model: impl BodyModel + Send + Sync + 'static,
    ) -> Self {
        Self {
            perception: Box::new(perception),
            body_model: Box::new(body_model),
            config: PipelineConfig::default(),
            sampler: ColorSampler::new(),
            locks: PathLocks::global(),
        }
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces the color sampler, e.g. to change its tier order.
    pub fn with_sampler(mut self, sampler: ColorSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Uses a private lock registry instead of the process-wide one.
    pub fn with_locks(mut self, locks: Arc<PathLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generates an avatar from the image at `image_path`.
    pub fn run(&self, image_path: &Path) -> PipelineResult<AvatarRun> {
        let mut state = RunState::default();
        let (artifact, metrics) = self.execute(image_path, &mut state)?;
        let degradations = state.degradations.clone();
        Ok(AvatarRun {
            artifact,
            metrics,
            degradations,
            report: state.report(None),
        })
    }

    /// Like [`Pipeline::run`], but always returns a report.
    ///
    /// A failed run yields `ok == false` with the error code, plus whatever
    /// degradations and outputs were recorded before the failure.
    pub fn run_report(&self, image_path: &Path) -> RunReport {
        let mut state = RunState::default();
        match self.execute(image_path, &mut state) {
            Ok(_) => state.report(None),
            Err(err) => {
                warn!(path = %image_path.display(), code = err.code(), error = %err, "avatar run failed");
                state.report(Some(&err))
            }
        }
    }

    fn execute(
        &self,
        image_path: &Path,
        state: &mut RunState,
    ) -> PipelineResult<(AvatarArtifact, MeshMetrics)> {
        let base = base_name(image_path).ok_or_else(|| PipelineError::InvalidInputPath {
            path: image_path.to_path_buf(),
        })?;
        let image = state.clock.run(Stage::Intake, || load_image(image_path))?;
        info!(
            path = %image_path.display(),
            width = image.width(),
            height = image.height(),
            "avatar run started"
        );

        let perceived = state
            .clock
            .run(Stage::PerceptionGather, || self.gather(&image, &mut state.degradations))?;
        state.gender = Some(perceived.gender);

        let measurements = state.clock.run(Stage::Measurement, || {
            match MeasurementEstimator::new().estimate(&perceived.pose, image.dimensions()) {
                Ok(m) => Some(m),
                Err(err) => {
                    warn!(code = err.code(), error = %err, "measurements unavailable");
                    state
                        .degradations
                        .push(DegradationCode::MeasurementsUnavailable, err.to_string());
                    None
                }
            }
        });

        let face_crop = perceived.faces.first().and_then(|face| crop_face(&image, face));
        let sampling = state.clock.run(Stage::ColorSampling, || {
            self.sample_colors(face_crop.as_ref(), &perceived.faces)
        });
        state.degradations.extend(sampling.degradations);
        let colors = sampling.sample;

        let composition = state.clock.run(Stage::Compose, || {
            self.compose(colors, face_crop.as_ref(), perceived.gender, &mut state.degradations)
        })?;

        let assembly = state.clock.run(Stage::Assemble, || {
            let geometry = self.body_geometry(perceived.gender, &mut state.degradations)?;
            MeshAssembler::new()
                .assemble(geometry, composition.texture, Some(colors.skin_rgb))
                .map_err(PipelineError::Assembly)
        })?;
        state.degradations.extend(assembly.degradations);
        let asset = assembly.asset;

        let output_dir = self.config.output_dir_for(image_path);
        let paths = ArtifactPaths::for_run(&output_dir, &base, perceived.gender);
        // Created before locking so the lock key resolves the real directory.
        if let Err(e) = std::fs::create_dir_all(&output_dir) {
            warn!(path = %output_dir.display(), error = %e, "cannot create output directory");
        }
        let _guard = self.locks.lock(&paths.mesh);

        if self.config.write_debug_artifacts {
            state.clock.run(Stage::Diagnostics, || {
                let mut debug = DebugArtifacts::new(&output_dir, &base, self.png());
                if let Some(mask) = &perceived.mask {
                    debug.body_mask(mask);
                }
                if let Some(m) = &measurements {
                    debug.measurements(m);
                }
                if let Some(crop) = &face_crop {
                    debug.face_crop(crop);
                }
                debug.uv_template(&asset.uvs, self.config.texture_size);
                let (files, degradations) = debug.finish();
                state.outputs.extend(files);
                state.degradations.extend(degradations);
            });
        }

        let exporter = ArtifactExporter::new(ExportOptions {
            png: self.png(),
            export_scene: self.config.export_scene,
        });
        let export = state.clock.run(Stage::Export, || {
            exporter
                .export(&asset, &paths.mesh, perceived.gender)
                .map_err(PipelineError::ExportFailed)
        })?;
        state.degradations.extend(export.degradations);
        state.outputs.extend(export.artifact.files.iter().cloned());

        info!(
            mesh = %export.artifact.mesh_path.display(),
            gender = perceived.gender.as_str(),
            degradations = state.degradations.len(),
            "avatar run finished"
        );
        Ok((export.artifact.with_measurements(measurements), export.metrics))
    }

    /// Runs every perception call. Only missing pose landmarks are fatal.
    fn gather(&self, image: &RgbImage, degradations: &mut Degradations) -> PipelineResult<Perceived> {
        let gender = match self.perception.classify_gender(image) {
            Ok(gender) => gender,
            Err(err) => {
                warn!(error = %err, "gender classification failed, using neutral");
                degradations.push(
                    DegradationCode::GenderUnavailable,
                    format!("gender classification failed: {}", err),
                );
                Gender::Neutral
            }
        };

        let pose = self.pose_landmarks(image)?;

        let faces = match self.perception.detect_faces(image) {
            Ok(faces) => faces,
            Err(err) => {
                warn!(error = %err, "face detection failed");
                degradations.push(
                    DegradationCode::PerceptionFailed,
                    format!("face detection: {}", err),
                );
                Vec::new()
            }
        };

        let mask = match self.segmentation(image) {
            Ok(mask) => Some(mask),
            Err(reason) => {
                warn!(reason = %reason, "segmentation unavailable");
                degradations.push(DegradationCode::SegmentationUnavailable, reason);
                None
            }
        };

        debug!(
            gender = gender.as_str(),
            pose_landmarks = pose.len(),
            faces = faces.len(),
            mask = mask.is_some(),
            "perception gathered"
        );
        Ok(Perceived {
            gender,
            pose,
            faces,
            mask,
        })
    }

    fn pose_landmarks(&self, image: &RgbImage) -> PipelineResult<PoseLandmarks> {
        match self.perception.extract_pose_landmarks(image) {
            Ok(Some(pose)) if !pose.is_empty() => Ok(pose),
            Ok(_) => Err(PipelineError::no_subject("no pose landmarks detected")),
            Err(err) => Err(PipelineError::no_subject(format!(
                "pose estimation failed: {}",
                err
            ))),
        }
    }

    fn sample_colors(&self, face_crop: Option<&RgbImage>, faces: &[FaceDetection]) -> ColorSampling {
        match face_crop {
            Some(crop) => self.sampler.sample(crop, self.perception.as_ref()),
            None => {
                let reason = if faces.is_empty() {
                    "no face detected"
                } else {
                    "face box lies outside the image"
                };
                info!(reason, "face unavailable, using default colors");
                let mut degradations = Degradations::new();
                degradations.push(DegradationCode::FaceNotDetected, reason);
                degradations.push(
                    DegradationCode::SkinColorDefaulted,
                    "no face evidence; default skin tone used",
                );
                degradations.push(
                    DegradationCode::EyeColorUnavailable,
                    "no face evidence; eye color absent",
                );
                ColorSampling {
                    sample: ColorSample::fallback(),
                    landmark_tier: None,
                    eye_tier: None,
                    degradations,
                }
            }
        }
    }

    fn compose(
        &self,
        colors: ColorSample,
        face_crop: Option<&RgbImage>,
        gender: Gender,
        degradations: &mut Degradations,
    ) -> PipelineResult<Composition> {
        let mut config =
            CompositeConfig::new(colors.skin_rgb).with_texture_size(self.config.texture_size);
        if let Some(crop) = face_crop {
            config = config.with_face(FaceOverlay::new(crop.clone()));
        }

        let library = GarmentLibrary::new(self.config.resolved_garment_dir());
        match library.find(gender) {
            Some(path) => {
                debug!(path = %path.display(), "garment found");
                config = config.with_garment(GarmentSource::Path(path));
            }
            None => {
                debug!(dir = %library.dir().display(), gender = gender.as_str(), "no garment asset");
                degradations.push(
                    DegradationCode::GarmentUnavailable,
                    format!("no {} garment in {}", gender.as_str(), library.dir().display()),
                );
            }
        }

        if let Some(eye) = colors.eye_rgb {
            config = config.with_eye_color(eye);
        }

        let composition = TextureCompositor::new().compose(&config)?;
        debug!(layers = ?composition.applied, "texture composed");
        degradations.extend(composition.degradations.clone());
        Ok(composition)
    }

    /// Geometry for `gender`, falling back to the neutral model.
    fn body_geometry(
        &self,
        gender: Gender,
        degradations: &mut Degradations,
    ) -> PipelineResult<BodyGeometry> {
        let first_err = match self.body_model.vertices_and_faces(gender) {
            Ok(geometry) => return Ok(geometry),
            Err(err) => err,
        };
        if gender == Gender::Neutral {
            return Err(PipelineError::BodyModelUnavailable {
                message: first_err.to_string(),
            });
        }

        warn!(gender = gender.as_str(), error = %first_err, "body model failed, trying neutral");
        match self.body_model.vertices_and_faces(Gender::Neutral) {
            Ok(geometry) => {
                degradations.push(
                    DegradationCode::BodyModelFallback,
                    format!("{} body model failed: {}", gender.as_str(), first_err),
                );
                Ok(geometry)
            }
            Err(err) => Err(PipelineError::BodyModelUnavailable {
                message: format!("{}: {}; neutral: {}", gender.as_str(), first_err, err),
            }),
        }
    }

    /// Renders a 2D silhouette avatar to `<stem>_avatar.png`.
    pub fn generate_silhouette(&self, image_path: &Path) -> PipelineResult<SilhouetteRun> {
        let base = base_name(image_path).ok_or_else(|| PipelineError::InvalidInputPath {
            path: image_path.to_path_buf(),
        })?;
        let image = load_image(image_path)?;
        let pose = self.pose_landmarks(&image)?;

        let mut degradations = Degradations::new();
        let mask = self.segmentation(&image).unwrap_or_else(|reason| {
            warn!(reason = %reason, "segmentation unavailable, rendering without silhouette");
            degradations.push(DegradationCode::SegmentationUnavailable, reason);
            SegmentationMask::empty(image.width(), image.height())
        });

        let canvas = render_silhouette(&mask, &image, &pose)?;
        let output_dir = self.config.output_dir_for(image_path);
        let path = artifact_path(&output_dir, &base, suffix::SILHOUETTE);
        let file = write_silhouette(&canvas, &path, &self.png())?;
        info!(path = %path.display(), "silhouette written");
        Ok(SilhouetteRun { file, degradations })
    }

    /// Person mask for `image`, or why none is usable.
    fn segmentation(&self, image: &RgbImage) -> Result<SegmentationMask, String> {
        let mask = self
            .perception
            .segment_person(image)
            .map_err(|err| err.to_string())?;
        if mask.dimensions() != image.dimensions() {
            let (mw, mh) = mask.dimensions();
            return Err(format!(
                "mask is {}x{}, image is {}x{}",
                mw,
                mh,
                image.width(),
                image.height()
            ));
        }
        Ok(mask)
    }

    fn png(&self) -> PngConfig {
        PngConfig::from_preset(self.config.png)
    }
}

fn load_image(path: &Path) -> PipelineResult<RgbImage> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| PipelineError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })
}

/// Crops the face box, clipped to the image.
fn crop_face(image: &RgbImage, face: &FaceDetection) -> Option<RgbImage> {
    let (x, y, w, h) = face.clip_to(image.width(), image.height())?;
    Some(image::imageops::crop_imm(image, x, y, w, h).to_image())
}

fn write_silhouette(
    canvas: &TextureBuffer,
    path: &Path,
    png: &PngConfig,
) -> PipelineResult<ArtifactFile> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::write(dir, e))?;
    }
    write_rgba(canvas, path, png).map_err(avatarforge_backend_texture::TextureError::from)?;
    let hash = hash_file(path).map_err(|e| PipelineError::write(path, e))?;
    Ok(ArtifactFile::new(ArtifactKind::Debug, path, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatarforge_types::{
        joints, FaceLandmarks, NormalizedPoint, PerceptionError, PerceptionResult,
        POSE_LANDMARK_COUNT,
    };
    use std::path::PathBuf;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Stub {
        pose: bool,
        faces: Vec<FaceDetection>,
        gender_fails: bool,
    }

    impl Perception for Stub {
        fn detect_faces(&self, _: &RgbImage) -> PerceptionResult<Vec<FaceDetection>> {
            Ok(self.faces.clone())
        }
        fn extract_face_landmarks(&self, _: &RgbImage) -> PerceptionResult<Option<FaceLandmarks>> {
            Ok(None)
        }
        fn extract_pose_landmarks(&self, _: &RgbImage) -> PerceptionResult<Option<PoseLandmarks>> {
            if !self.pose {
                return Ok(None);
            }
            let mut points = vec![NormalizedPoint::new(0.5, 0.5); POSE_LANDMARK_COUNT];
            points[joints::LEFT_SHOULDER] = NormalizedPoint::new(0.4, 0.3);
            points[joints::RIGHT_SHOULDER] = NormalizedPoint::new(0.6, 0.3);
            points[joints::LEFT_ANKLE] = NormalizedPoint::new(0.45, 0.9);
            points[joints::RIGHT_ANKLE] = NormalizedPoint::new(0.55, 0.9);
            Ok(Some(PoseLandmarks::new(points)))
        }
        fn segment_person(&self, image: &RgbImage) -> PerceptionResult<SegmentationMask> {
            Ok(SegmentationMask::empty(image.width(), image.height()))
        }
        fn classify_gender(&self, _: &RgbImage) -> PerceptionResult<Gender> {
            if self.gender_fails {
                Err(PerceptionError::model_unavailable("gender"))
            } else {
                Ok(Gender::Male)
            }
        }
    }

    struct Triangle {
        male_fails: bool,
    }

    impl BodyModel for Triangle {
        fn vertices_and_faces(&self, gender: Gender) -> PerceptionResult<BodyGeometry> {
            if self.male_fails && gender == Gender::Male {
                return Err(PerceptionError::model_unavailable("male body model"));
            }
            Ok(BodyGeometry {
                vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
                faces: vec![[0, 1, 2]],
            })
        }
    }

    fn photo(dir: &Path) -> PathBuf {
        let path = dir.join("photo.png");
        RgbImage::from_pixel(40, 40, image::Rgb([120, 90, 70]))
            .save(&path)
            .unwrap();
        path
    }

    fn pipeline(stub: Stub, male_fails: bool, out: &Path) -> Pipeline {
        Pipeline::new(stub, Triangle { male_fails })
            .with_config(
                PipelineConfig::default()
                    .texture_size(32)
                    .garment_dir(out.join("no-garments"))
                    .output_dir(out.join("out")),
            )
            .unwrap()
            .with_locks(Arc::new(PathLocks::new()))
    }

    #[test]
    fn test_missing_pose_is_no_subject() {
        let dir = tempfile::tempdir().unwrap();
        let image = photo(dir.path());
        let p = pipeline(Stub::default(), false, dir.path());

        let err = p.run(&image).unwrap_err();
        assert!(matches!(err, PipelineError::NoSubjectDetected { .. }));

        let report = p.run_report(&image);
        assert!(!report.ok);
        assert_eq!(report.errors[0].code, "PIPELINE_003");
        assert_eq!(report.gender, None);
        assert!(report.outputs.is_empty());
    }

    #[test]
    fn test_unreadable_input_is_input_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(Stub::default(), false, dir.path());
        let err = p.run(&dir.path().join("missing.jpg")).unwrap_err();
        assert_eq!(err.code(), "PIPELINE_001");
    }

    #[test]
    fn test_gender_and_body_model_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let image = photo(dir.path());
        let stub = Stub {
            pose: true,
            ..Stub::default()
        };
        let run = pipeline(stub, true, dir.path()).run(&image).unwrap();

        assert_eq!(run.artifact.gender, Gender::Male);
        assert!(run.degradations.contains(DegradationCode::BodyModelFallback));
        assert!(run.degradations.contains(DegradationCode::FaceNotDetected));
        assert!(run.report.ok);
        assert_eq!(
            run.artifact.mesh_path,
            dir.path().join("out").join("photo_male_avatar.obj")
        );

        let stub = Stub {
            pose: true,
            gender_fails: true,
            ..Stub::default()
        };
        let run = pipeline(stub, true, dir.path()).run(&image).unwrap();
        assert_eq!(run.artifact.gender, Gender::Neutral);
        assert!(run.degradations.contains(DegradationCode::GenderUnavailable));
        assert!(!run.degradations.contains(DegradationCode::BodyModelFallback));
    }

    #[test]
    fn test_report_lists_stages_and_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let image = photo(dir.path());
        let stub = Stub {
            pose: true,
            faces: vec![FaceDetection::new(10, 5, 30, 25)],
            ..Stub::default()
        };
        let run = pipeline(stub, false, dir.path()).run(&image).unwrap();

        let stages: Vec<_> = run.report.stages.iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(
            stages,
            vec![
                "intake",
                "perception_gather",
                "measurement",
                "color_sampling",
                "compose",
                "assemble",
                "diagnostics",
                "export"
            ]
        );
        let debug_count = run
            .report
            .outputs
            .iter()
            .filter(|f| f.kind == ArtifactKind::Debug)
            .count();
        assert_eq!(debug_count, 4);
        assert!(run.artifact.measurements.is_some());
        assert!(!run.degradations.contains(DegradationCode::FaceNotDetected));
        // Four box-corner landmarks cannot reach the cheek indices.
        assert!(run.degradations.contains(DegradationCode::FaceLandmarksBoxCorners));
    }

    #[test]
    fn test_silhouette_written() {
        let dir = tempfile::tempdir().unwrap();
        let image = photo(dir.path());
        let stub = Stub {
            pose: true,
            ..Stub::default()
        };
        let run = pipeline(stub, false, dir.path())
            .generate_silhouette(&image)
            .unwrap();
        assert_eq!(run.file.path, dir.path().join("out").join("photo_avatar.png"));
        assert!(run.degradations.is_empty());
        let decoded = image::open(&run.file.path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 40));
    }
}
