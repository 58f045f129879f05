//! Run reports.
//!
//! A report documents one pipeline run: whether it succeeded, which
//! degradations fired, which files were written, and how long each stage
//! took.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactFile;
use crate::error::{Degradation, Degradations};
use crate::gender::Gender;

/// Report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Timing information for a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Name of the stage (e.g., "perception_gather", "texture_compose").
    pub stage: String,
    /// Duration of this stage in milliseconds.
    pub duration_ms: u64,
}

impl StageTiming {
    pub fn new(stage: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            stage: stage.into(),
            duration_ms,
        }
    }
}

/// Error entry in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportError {
    /// Error code (e.g., "PIPELINE_002").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ReportError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A complete report for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Report schema version.
    pub report_version: u32,
    /// Whether the run produced an artifact.
    pub ok: bool,
    /// Gender label used for the run, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Fatal errors (at most one per run).
    pub errors: Vec<ReportError>,
    /// Non-fatal degradations in the order they fired.
    pub degradations: Vec<Degradation>,
    /// Files written, with hashes.
    pub outputs: Vec<ArtifactFile>,
    /// Per-stage timings.
    pub stages: Vec<StageTiming>,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    /// Producer identifier and version.
    pub backend_version: String,
}

impl RunReport {
    /// Creates a new report builder.
    pub fn builder(backend_version: impl Into<String>) -> ReportBuilder {
        ReportBuilder::new(backend_version.into())
    }

    /// Serializes the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a report from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Builder for [`RunReport`].
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    backend_version: String,
    gender: Option<Gender>,
    errors: Vec<ReportError>,
    degradations: Degradations,
    outputs: Vec<ArtifactFile>,
    stages: Vec<StageTiming>,
}

impl ReportBuilder {
    fn new(backend_version: String) -> Self {
        Self {
            backend_version,
            gender: None,
            errors: Vec::new(),
            degradations: Degradations::new(),
            outputs: Vec::new(),
            stages: Vec::new(),
        }
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn error(mut self, error: ReportError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn degradations(mut self, degradations: Degradations) -> Self {
        self.degradations.extend(degradations);
        self
    }

    pub fn outputs(mut self, outputs: impl IntoIterator<Item = ArtifactFile>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    pub fn stages(mut self, stages: Vec<StageTiming>) -> Self {
        self.stages = stages;
        self
    }

    pub fn build(self, duration_ms: u64) -> RunReport {
        RunReport {
            report_version: REPORT_VERSION,
            ok: self.errors.is_empty(),
            gender: self.gender,
            errors: self.errors,
            degradations: self.degradations.into_iter().collect(),
            outputs: self.outputs,
            stages: self.stages,
            duration_ms,
            backend_version: self.backend_version,
        }
    }
}
