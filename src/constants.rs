//! Constants used throughout the application

use std::time::Duration;

/// Number of landmarks produced per hand
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Normalized index-to-thumb distance below which the hand is pinching
pub const PINCH_THRESHOLD: f64 = 0.05;

/// Pinch distance reported before any hand has been seen
pub const INITIAL_PINCH_DISTANCE: f64 = 1.0;

/// Cursor smoothing factor, 0 to 1, lower is smoother but laggier
pub const MOVEMENT_SMOOTHING: f64 = 0.15;

/// Time to wait for another pinch release before resolving a click
pub const DOUBLE_CLICK_TIMEOUT: Duration = Duration::from_millis(300);

/// How long an emitted click stays visible as the last gesture
pub const GESTURE_FEEDBACK_DURATION: Duration = Duration::from_millis(500);

/// Luminance or mean RGB at or above which a pixel counts as surface
pub const SURFACE_WHITE_THRESHOLD: f64 = 200.0;

/// Flood fill seed spacing in pixels
pub const SURFACE_SEED_STEP: usize = 10;

/// Sampling step of the fallback bounding box scan
pub const SURFACE_FALLBACK_STEP: usize = 3;

/// Normalized component area below which the fallback scan is used
pub const SURFACE_MIN_COMPONENT_AREA: f64 = 0.001;

/// Minimum normalized width and height of a fallback box
pub const SURFACE_FALLBACK_MIN_EXTENT: f64 = 0.03;

/// Padding added on each side of a fallback box
pub const SURFACE_FALLBACK_PADDING: f64 = 0.02;

/// Minimum normalized area of an accepted surface
pub const SURFACE_MIN_AREA: f64 = 0.01;

/// Surface detection polling period while calibrating
pub const SURFACE_DETECTION_INTERVAL: Duration = Duration::from_millis(100);

/// Margin kept around the on-screen grid on each side
pub const GRID_SCREEN_MARGIN: f64 = 0.05;

/// Smallest on-screen grid edge while editing, in pixels
pub const GRID_MIN_SIZE_PX: f64 = 100.0;

/// Absolute fingertip depth under which a finger may be touching
pub const TOUCH_Z_THRESHOLD: f64 = 0.05;

/// Per-frame depth change above which a finger is moving onto the surface
pub const TOUCH_VELOCITY_THRESHOLD: f64 = 0.005;

/// Consecutive qualifying frames needed to confirm a touch
pub const TOUCH_CONFIRMATION_FRAMES: u32 = 3;

/// Default render tick rate
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Default minimum detector confidence for a hand to be accepted
pub const DEFAULT_HAND_CONFIDENCE: f32 = 0.5;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-9;
