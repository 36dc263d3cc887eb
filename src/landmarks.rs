//! Hand landmark frames as produced by the external hand landmark detector.
//!
//! Landmarks follow the MediaPipe hand model: 21 keypoints normalized to the
//! camera frame, with a relative depth that may be missing.

use serde::{Deserialize, Serialize};

/// Hand landmark indices (MediaPipe hand landmark model convention)
#[allow(dead_code)]
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A single hand keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (0.0 to 1.0, normalized to image width)
    pub x: f64,
    /// Y coordinate (0.0 to 1.0, normalized to image height)
    pub y: f64,
    /// Depth relative to the wrist, absent when the detector omits it
    #[serde(default)]
    pub z: Option<f64>,
}

impl Landmark {
    /// Create a landmark with depth
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Planar distance to another landmark, depth ignored
    #[must_use]
    pub fn planar_distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Which hand the detector believes it saw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// Landmarks of one hand for one processed video frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandFrame {
    /// Up to 21 keypoints, indexed per [`index`]
    pub landmarks: Vec<Landmark>,
    /// Optional handedness label
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl HandFrame {
    /// Create a frame without handedness
    #[must_use]
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks,
            handedness: None,
        }
    }

    /// Landmark at `idx`, if the detector produced that many
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Landmark> {
        self.landmarks.get(idx)
    }

    /// Index fingertip
    #[must_use]
    pub fn index_tip(&self) -> Option<&Landmark> {
        self.get(index::INDEX_FINGER_TIP)
    }

    /// Middle fingertip
    #[must_use]
    pub fn middle_tip(&self) -> Option<&Landmark> {
        self.get(index::MIDDLE_FINGER_TIP)
    }

    /// Thumb tip
    #[must_use]
    pub fn thumb_tip(&self) -> Option<&Landmark> {
        self.get(index::THUMB_TIP)
    }

    /// Index-to-thumb planar distance
    #[must_use]
    pub fn pinch_distance(&self) -> Option<f64> {
        Some(self.index_tip()?.planar_distance(self.thumb_tip()?))
    }
}
