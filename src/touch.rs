//! Touch detector for grid mode.
//!
//! A fingertip is a touch candidate when it is close to the surface plane
//! (small absolute depth) and moving fast in depth. A touch is confirmed
//! after a run of consecutive candidate frames; the index finger wins over
//! the middle finger when both qualify.

use crate::{
    constants::{TOUCH_CONFIRMATION_FRAMES, TOUCH_VELOCITY_THRESHOLD, TOUCH_Z_THRESHOLD},
    landmarks::{index::MIDDLE_FINGER_TIP, HandFrame},
};
use log::debug;

/// Finger that touched the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
}

/// Confirmed touch-down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    /// Which fingertip touched
    pub finger: Finger,
}

/// Latched touch state exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchState {
    /// A touch was confirmed and not both fingers have lifted since
    pub is_touching: bool,
    /// Finger of the latest confirmed touch
    pub touch_type: Option<Finger>,
}

/// Touch thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchConfig {
    /// Absolute depth under which a fingertip is near the surface
    pub z_threshold: f64,
    /// Per-frame depth change above which a fingertip is tapping
    pub velocity_threshold: f64,
    /// Consecutive candidate frames needed for a touch
    pub confirmation_frames: u32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            z_threshold: TOUCH_Z_THRESHOLD,
            velocity_threshold: TOUCH_VELOCITY_THRESHOLD,
            confirmation_frames: TOUCH_CONFIRMATION_FRAMES,
        }
    }
}

/// Per-finger confirmation state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FingerTrack {
    /// Absolute depth seen last frame
    pub last_depth: Option<f64>,
    /// Absolute depth change since last frame
    pub velocity: f64,
    /// Consecutive candidate frames
    pub consecutive_frames: u32,
}

impl FingerTrack {
    /// Record this frame's depth and report whether it is a touch candidate
    fn observe(&mut self, depth: f64, config: &TouchConfig) -> bool {
        let depth = depth.abs();
        if let Some(previous) = self.last_depth {
            self.velocity = (depth - previous).abs();
        }
        self.last_depth = Some(depth);
        depth < config.z_threshold && self.velocity > config.velocity_threshold
    }

    /// Count a candidate frame; true once the run is long enough
    fn confirm(&mut self, required: u32) -> bool {
        self.consecutive_frames += 1;
        if self.consecutive_frames >= required {
            self.consecutive_frames = 0;
            true
        } else {
            false
        }
    }
}

/// Depth and velocity based touch detector
#[derive(Debug, Clone, Default)]
pub struct TouchDetector {
    config: TouchConfig,
    index: FingerTrack,
    middle: FingerTrack,
    state: TouchState,
}

impl TouchDetector {
    /// Create a detector
    ///
    /// # Panics
    ///
    /// Panics if `confirmation_frames` is zero
    #[must_use]
    pub fn new(config: TouchConfig) -> Self {
        assert!(config.confirmation_frames > 0, "Confirmation frames must be greater than 0");
        Self {
            config,
            ..Self::default()
        }
    }

    /// Process one frame; returns a touch when one is confirmed this frame
    pub fn update(&mut self, hand: Option<&HandFrame>) -> Option<TouchEvent> {
        let Some((index_z, middle_z)) = hand.and_then(fingertip_depths) else {
            self.reset();
            return None;
        };

        let index_candidate = self.index.observe(index_z, &self.config);
        let middle_candidate = self.middle.observe(middle_z, &self.config);
        let required = self.config.confirmation_frames;

        let mut detected = None;
        if index_candidate {
            if self.index.confirm(required) {
                detected = Some(Finger::Index);
            }
        } else {
            self.index.consecutive_frames = 0;
        }

        if middle_candidate && detected.is_none() {
            if self.middle.confirm(required) {
                detected = Some(Finger::Middle);
            }
        } else {
            self.middle.consecutive_frames = 0;
        }

        if let Some(finger) = detected {
            debug!("Touch confirmed: {:?}", finger);
            self.state = TouchState {
                is_touching: true,
                touch_type: Some(finger),
            };
        } else if !index_candidate && !middle_candidate {
            self.state = TouchState::default();
        }

        detected.map(|finger| TouchEvent { finger })
    }

    /// Latched touch state
    #[must_use]
    pub const fn state(&self) -> TouchState {
        self.state
    }

    /// Confirmation progress of one finger
    #[must_use]
    pub const fn track(&self, finger: Finger) -> &FingerTrack {
        match finger {
            Finger::Index => &self.index,
            Finger::Middle => &self.middle,
        }
    }

    /// Forget all per-finger history and clear the latched state
    pub fn reset(&mut self) {
        self.index = FingerTrack::default();
        self.middle = FingerTrack::default();
        self.state = TouchState::default();
    }
}

/// Index and middle fingertip depths, if the frame is complete enough
fn fingertip_depths(hand: &HandFrame) -> Option<(f64, f64)> {
    if hand.landmarks.len() <= MIDDLE_FINGER_TIP {
        return None;
    }
    Some((hand.index_tip()?.z?, hand.middle_tip()?.z?))
}
