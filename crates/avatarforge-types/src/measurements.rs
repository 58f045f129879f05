//! Linear body measurements derived from pose landmarks.

use serde::{Deserialize, Serialize};

/// Body measurements as Euclidean pixel distances.
///
/// All values are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    /// Distance between the left and right shoulder.
    pub shoulder_width: f64,
    /// Distance between the left and right hip.
    pub hip_width: f64,
    /// Distance between the shoulder midpoint and the ankle midpoint.
    pub height: f64,
}
