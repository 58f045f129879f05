//! Pipeline stages and their timings.

use std::time::Instant;

use avatarforge_types::StageTiming;
use tracing::debug;

/// Linear pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Intake,
    PerceptionGather,
    Measurement,
    ColorSampling,
    Compose,
    Assemble,
    Diagnostics,
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intake => "intake",
            Stage::PerceptionGather => "perception_gather",
            Stage::Measurement => "measurement",
            Stage::ColorSampling => "color_sampling",
            Stage::Compose => "compose",
            Stage::Assemble => "assemble",
            Stage::Diagnostics => "diagnostics",
            Stage::Export => "export",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collects per-stage wall-clock timings for the run report.
#[derive(Debug)]
pub struct StageClock {
    started: Instant,
    timings: Vec<StageTiming>,
}

impl Default for StageClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StageClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            timings: Vec::new(),
        }
    }

    /// Runs `f` as `stage`, recording how long it took.
    pub fn run<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        debug!(stage = stage.as_str(), "stage started");
        let out = f();
        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(stage = stage.as_str(), duration_ms, "stage finished");
        self.timings.push(StageTiming::new(stage.as_str(), duration_ms));
        out
    }

    /// Milliseconds since the clock was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn into_timings(self) -> Vec<StageTiming> {
        self.timings
    }
}
