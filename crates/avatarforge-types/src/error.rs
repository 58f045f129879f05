//! Error and degradation taxonomy shared by every pipeline stage.
//!
//! Fatal conditions are modelled as error enums in each crate, all of which
//! implement [`BackendError`]. Non-fatal conditions never become errors: they
//! are recorded as [`Degradation`] entries so a caller can enumerate exactly
//! which fallback fired during a run.

use serde::{Deserialize, Serialize};

/// Stable codes for non-fatal degradations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationCode {
    /// D001: No face was detected in the source image.
    FaceNotDetected,
    /// D002: Dense face mesh unavailable, box-corner pseudo-landmarks used.
    FaceLandmarksBoxCorners,
    /// D003: Skin color fell back to the default tone.
    SkinColorDefaulted,
    /// D004: Iris landmarks missing, eye color sampled from eye-mesh indices.
    EyeColorFallbackIndices,
    /// D005: No eye color could be sampled.
    EyeColorUnavailable,
    /// D006: The face overlay layer was skipped.
    FaceOverlaySkipped,
    /// D007: No garment asset exists for the gender.
    GarmentUnavailable,
    /// D008: A garment asset exists but could not be applied.
    GarmentOverlaySkipped,
    /// D009: Zero-extent bounding box during UV computation.
    DegenerateGeometry,
    /// D010: The secondary binary scene export failed.
    ExportPartialFailure,
    /// D011: Gender classification failed, neutral used.
    GenderUnavailable,
    /// D012: Person segmentation failed.
    SegmentationUnavailable,
    /// D013: Body measurements could not be estimated.
    MeasurementsUnavailable,
    /// D014: Gender-specific body model failed, neutral model used.
    BodyModelFallback,
    /// D015: A diagnostic artifact could not be written.
    DebugArtifactFailed,
    /// D016: A perception collaborator returned an error.
    PerceptionFailed,
}

impl DegradationCode {
    /// Returns the code string (e.g., "D001").
    pub fn code(&self) -> &'static str {
        match self {
            DegradationCode::FaceNotDetected => "D001",
            DegradationCode::FaceLandmarksBoxCorners => "D002",
            DegradationCode::SkinColorDefaulted => "D003",
            DegradationCode::EyeColorFallbackIndices => "D004",
            DegradationCode::EyeColorUnavailable => "D005",
            DegradationCode::FaceOverlaySkipped => "D006",
            DegradationCode::GarmentUnavailable => "D007",
            DegradationCode::GarmentOverlaySkipped => "D008",
            DegradationCode::DegenerateGeometry => "D009",
            DegradationCode::ExportPartialFailure => "D010",
            DegradationCode::GenderUnavailable => "D011",
            DegradationCode::SegmentationUnavailable => "D012",
            DegradationCode::MeasurementsUnavailable => "D013",
            DegradationCode::BodyModelFallback => "D014",
            DegradationCode::DebugArtifactFailed => "D015",
            DegradationCode::PerceptionFailed => "D016",
        }
    }
}

impl std::fmt::Display for DegradationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A non-fatal condition recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    /// The degradation code.
    pub code: DegradationCode,
    /// Human-readable description.
    pub message: String,
}

impl Degradation {
    /// Creates a new degradation record.
    pub fn new(code: DegradationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// An ordered collection of degradations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degradations(Vec<Degradation>);

impl Degradations {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a degradation.
    pub fn push(&mut self, code: DegradationCode, message: impl Into<String>) {
        self.0.push(Degradation::new(code, message));
    }

    /// Appends every entry of `other`.
    pub fn extend(&mut self, other: Degradations) {
        self.0.extend(other.0);
    }

    /// Returns true if a degradation with `code` was recorded.
    pub fn contains(&self, code: DegradationCode) -> bool {
        self.0.iter().any(|d| d.code == code)
    }

    /// Returns the recorded codes in order.
    pub fn codes(&self) -> Vec<DegradationCode> {
        self.0.iter().map(|d| d.code).collect()
    }

    /// Returns true if nothing degraded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded degradations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the recorded degradations.
    pub fn iter(&self) -> std::slice::Iter<'_, Degradation> {
        self.0.iter()
    }
}

impl IntoIterator for Degradations {
    type Item = Degradation;
    type IntoIter = std::vec::IntoIter<Degradation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Common trait for stage errors.
///
/// Each crate's error enum implements this trait so that errors from
/// different stages can be reported uniformly:
/// - stable codes for programmatic handling ("TEXTURE_002", "MESH_004", ...)
/// - a category naming the stage family
///
/// # Example
///
/// ```ignore
/// use avatarforge_types::error::BackendError;
///
/// fn describe<E: BackendError>(err: E) -> String {
///     format!("[{}] {}", err.code(), err.message())
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category ("texture", "mesh", "pipeline").
    fn category(&self) -> &'static str;
}

/// A unified error type that can wrap any stage error.
#[derive(Debug)]
pub struct GenerationError {
    /// The error code (e.g., "PIPELINE_001").
    pub code: &'static str,
    /// The human-readable error message.
    pub message: String,
    /// The error category.
    pub category: &'static str,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GenerationError {
    /// Create a `GenerationError` from any `BackendError` implementor.
    pub fn from_backend<E: BackendError + Send + Sync + 'static>(err: E) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
            category: err.category(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a `GenerationError` with explicit values.
    pub fn new(code: &'static str, message: impl Into<String>, category: &'static str) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            source: None,
        }
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
