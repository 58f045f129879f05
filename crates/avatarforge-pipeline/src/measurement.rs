//! Body measurements from pose landmarks.

use avatarforge_types::{joints, BodyMeasurements, NormalizedPoint, PoseLandmarks};

use crate::error::MeasurementError;

/// Joints read by the estimator.
pub const REQUIRED_JOINTS: [usize; 12] = [
    joints::LEFT_SHOULDER,
    joints::RIGHT_SHOULDER,
    joints::LEFT_ELBOW,
    joints::RIGHT_ELBOW,
    joints::LEFT_WRIST,
    joints::RIGHT_WRIST,
    joints::LEFT_HIP,
    joints::RIGHT_HIP,
    joints::LEFT_KNEE,
    joints::RIGHT_KNEE,
    joints::LEFT_ANKLE,
    joints::RIGHT_ANKLE,
];

/// Minimum landmark count that covers every required joint.
pub const MIN_LANDMARKS: usize = joints::RIGHT_ANKLE + 1;

/// Single-frame linear body measurements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementEstimator;

impl MeasurementEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Converts normalized landmarks to pixel distances.
    ///
    /// No smoothing or outlier rejection is applied.
    pub fn estimate(
        &self,
        landmarks: &PoseLandmarks,
        image_size: (u32, u32),
    ) -> Result<BodyMeasurements, MeasurementError> {
        if landmarks.len() < MIN_LANDMARKS {
            return Err(MeasurementError::IndexOutOfRange {
                index: MIN_LANDMARKS - 1,
                len: landmarks.len(),
            });
        }

        let px = |i: usize| -> Result<(f64, f64), MeasurementError> {
            landmarks
                .get(i)
                .map(|p: NormalizedPoint| p.to_pixels(image_size))
                .ok_or(MeasurementError::IndexOutOfRange {
                    index: i,
                    len: landmarks.len(),
                })
        };

        let l_sh = px(joints::LEFT_SHOULDER)?;
        let r_sh = px(joints::RIGHT_SHOULDER)?;
        let l_hip = px(joints::LEFT_HIP)?;
        let r_hip = px(joints::RIGHT_HIP)?;
        let l_ank = px(joints::LEFT_ANKLE)?;
        let r_ank = px(joints::RIGHT_ANKLE)?;

        Ok(BodyMeasurements {
            shoulder_width: distance(l_sh, r_sh),
            hip_width: distance(l_hip, r_hip),
            height: distance(midpoint(l_sh, r_sh), midpoint(l_ank, r_ank)),
        })
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
