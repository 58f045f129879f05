//! Perception geometry: face boxes, face landmarks and body-pose landmarks.

use serde::{Deserialize, Serialize};

/// Number of landmarks in a full body-pose estimate.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Fixed body-joint schema for pose landmark indices.
pub mod joints {
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;

    /// Joints highlighted on silhouette previews.
    pub const TORSO_AND_LEGS: [usize; 8] = [
        LEFT_SHOULDER,
        RIGHT_SHOULDER,
        LEFT_HIP,
        RIGHT_HIP,
        LEFT_KNEE,
        RIGHT_KNEE,
        LEFT_ANKLE,
        RIGHT_ANKLE,
    ];
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A point in normalized image space (x and y in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Converts to pixel space for an image of the given size.
    pub fn to_pixels(&self, image_size: (u32, u32)) -> (f64, f64) {
        (self.x * image_size.0 as f64, self.y * image_size.1 as f64)
    }
}

/// A detected face bounding box in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl FaceDetection {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width of the box (zero if inverted).
    pub fn width(&self) -> u32 {
        (self.x2 - self.x1).max(0) as u32
    }

    /// Height of the box (zero if inverted).
    pub fn height(&self) -> u32 {
        (self.y2 - self.y1).max(0) as u32
    }

    /// The four box corners, clockwise from top-left.
    pub fn corners(&self) -> [PixelPoint; 4] {
        [
            PixelPoint::new(self.x1, self.y1),
            PixelPoint::new(self.x2, self.y1),
            PixelPoint::new(self.x2, self.y2),
            PixelPoint::new(self.x1, self.y2),
        ]
    }

    /// Intersects the box with an image of the given size.
    ///
    /// Returns `(x, y, width, height)` or `None` if nothing remains.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x1.clamp(0, width as i32);
        let y1 = self.y1.clamp(0, height as i32);
        let x2 = self.x2.clamp(0, width as i32);
        let y2 = self.y2.clamp(0, height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some((x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32))
    }
}

/// Ordered face landmarks in pixel space.
///
/// A dense face mesh carries hundreds of points; the box-corner fallback
/// carries exactly four.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks(pub Vec<PixelPoint>);

impl FaceLandmarks {
    pub fn new(points: Vec<PixelPoint>) -> Self {
        Self(points)
    }

    /// Pseudo-landmarks synthesized from a face box.
    pub fn from_box_corners(detection: &FaceDetection) -> Self {
        Self(detection.corners().to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PixelPoint> {
        self.0.get(index).copied()
    }
}

/// Normalized body-pose landmarks, indexed by [`joints`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseLandmarks(pub Vec<NormalizedPoint>);

impl PoseLandmarks {
    pub fn new(points: Vec<NormalizedPoint>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NormalizedPoint> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedPoint> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_corners_clockwise() {
        let det = FaceDetection::new(10, 20, 30, 50);
        let lm = FaceLandmarks::from_box_corners(&det);
        assert_eq!(lm.len(), 4);
        assert_eq!(lm.get(0), Some(PixelPoint::new(10, 20)));
        assert_eq!(lm.get(1), Some(PixelPoint::new(30, 20)));
        assert_eq!(lm.get(2), Some(PixelPoint::new(30, 50)));
        assert_eq!(lm.get(3), Some(PixelPoint::new(10, 50)));
    }

    #[test]
    fn test_clip_to_image() {
        let det = FaceDetection::new(-5, 10, 120, 40);
        assert_eq!(det.clip_to(100, 100), Some((0, 10, 100, 30)));

        let outside = FaceDetection::new(200, 200, 300, 300);
        assert_eq!(outside.clip_to(100, 100), None);
    }

    #[test]
    fn test_normalized_to_pixels() {
        let p = NormalizedPoint::new(0.25, 0.5);
        assert_eq!(p.to_pixels((200, 100)), (50.0, 50.0));
    }
}
