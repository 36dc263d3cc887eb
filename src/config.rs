//! Configuration management for the hand pointer application

use crate::{
    calibration::CalibrationConfig,
    constants::{
        DEFAULT_HAND_CONFIDENCE, DEFAULT_TARGET_FPS, DOUBLE_CLICK_TIMEOUT, GESTURE_FEEDBACK_DURATION,
        GRID_MIN_SIZE_PX, GRID_SCREEN_MARGIN, MOVEMENT_SMOOTHING, PINCH_THRESHOLD,
        SURFACE_DETECTION_INTERVAL, SURFACE_FALLBACK_MIN_EXTENT, SURFACE_FALLBACK_PADDING,
        SURFACE_FALLBACK_STEP, SURFACE_MIN_AREA, SURFACE_MIN_COMPONENT_AREA, SURFACE_SEED_STEP,
        SURFACE_WHITE_THRESHOLD, TOUCH_CONFIRMATION_FRAMES, TOUCH_VELOCITY_THRESHOLD, TOUCH_Z_THRESHOLD,
    },
    landmark_source::SubprocessConfig,
    session::SessionConfig,
    surface::SurfaceDetectorConfig,
    touch::TouchConfig,
    tracker::PinchThresholds,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cursor tracking and pinch detection
    pub tracking: TrackingConfig,

    /// Click debouncing
    pub gesture: GestureConfig,

    /// Surface detection
    pub surface: SurfaceConfig,

    /// Calibration and grid editing
    pub calibration: CalibrationSection,

    /// Touch detection in grid mode
    pub touch: TouchSection,

    /// Hand landmark detector
    pub landmarks: LandmarksConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Cursor tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Smoothing filter, `lerp` or `none`
    pub filter: String,

    /// Lerp smoothing factor (0.0-1.0], lower is smoother
    pub smoothing: f64,

    /// Index-to-thumb distance below which a pinch starts
    pub pinch_threshold: f64,

    /// Distance at which a held pinch ends; defaults to `pinch_threshold`
    pub pinch_release_threshold: Option<f64>,
}

/// Gesture debouncing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Window after a pinch release in which more releases are coalesced
    pub double_click_timeout_ms: u64,

    /// How long a click stays visible as feedback
    pub feedback_duration_ms: u64,
}

/// Surface detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Luminance or mean RGB (0-255) at or above which a pixel is light
    pub brightness_threshold: f64,

    /// Flood fill seed spacing in pixels
    pub seed_step: usize,

    /// Fallback scan step in pixels
    pub fallback_step: usize,

    /// Component area below which the fallback scan runs
    pub min_component_area: f64,

    /// Minimum fallback box width and height
    pub fallback_min_extent: f64,

    /// Padding on each side of a fallback box
    pub fallback_padding: f64,

    /// Minimum accepted surface area
    pub min_area: f64,
}

/// Calibration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSection {
    /// Surface detection period while calibrating
    pub poll_interval_ms: u64,

    /// Screen margin around a new grid (0.0-0.5)
    pub screen_margin: f64,

    /// Smallest grid edge while editing, in pixels
    pub grid_min_size_px: f64,

    /// Pointer distance at which a grid handle is grabbed, in pixels
    pub handle_tolerance_px: f64,
}

/// Touch detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchSection {
    /// Absolute fingertip depth under which a finger may touch
    pub z_threshold: f64,

    /// Per-frame depth change above which a finger is tapping
    pub velocity_threshold: f64,

    /// Consecutive qualifying frames needed for a touch
    pub confirmation_frames: u32,
}

/// Landmark detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarksConfig {
    /// Python interpreter with mediapipe installed
    pub python: PathBuf,

    /// Detector script
    pub script: PathBuf,

    /// Minimum hand score (0.0-1.0)
    pub min_confidence: f32,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target tick rate
    pub target_fps: u32,

    /// Show the preview window
    pub gui: bool,

    /// Preview window width
    pub window_width: i32,

    /// Preview window height
    pub window_height: i32,

    /// Mirror the preview like a selfie camera
    pub mirror_preview: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            filter: "lerp".to_string(),
            smoothing: MOVEMENT_SMOOTHING,
            pinch_threshold: PINCH_THRESHOLD,
            pinch_release_threshold: None,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_click_timeout_ms: duration_ms(DOUBLE_CLICK_TIMEOUT),
            feedback_duration_ms: duration_ms(GESTURE_FEEDBACK_DURATION),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: SURFACE_WHITE_THRESHOLD,
            seed_step: SURFACE_SEED_STEP,
            fallback_step: SURFACE_FALLBACK_STEP,
            min_component_area: SURFACE_MIN_COMPONENT_AREA,
            fallback_min_extent: SURFACE_FALLBACK_MIN_EXTENT,
            fallback_padding: SURFACE_FALLBACK_PADDING,
            min_area: SURFACE_MIN_AREA,
        }
    }
}

impl Default for CalibrationSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: duration_ms(SURFACE_DETECTION_INTERVAL),
            screen_margin: GRID_SCREEN_MARGIN,
            grid_min_size_px: GRID_MIN_SIZE_PX,
            handle_tolerance_px: 12.0,
        }
    }
}

impl Default for TouchSection {
    fn default() -> Self {
        Self {
            z_threshold: TOUCH_Z_THRESHOLD,
            velocity_threshold: TOUCH_VELOCITY_THRESHOLD,
            confirmation_frames: TOUCH_CONFIRMATION_FRAMES,
        }
    }
}

impl Default for LandmarksConfig {
    fn default() -> Self {
        let subprocess = SubprocessConfig::default();
        Self {
            python: subprocess.python,
            script: subprocess.script,
            min_confidence: DEFAULT_HAND_CONFIDENCE,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            gui: true,
            window_width: 960,
            window_height: 540,
            mirror_preview: true,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn check_unit(value: f64, name: &str) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{name} must be between 0.0 and 1.0")))
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        // Tracking
        match self.tracking.filter.as_str() {
            "lerp" | "exponential" | "none" => {}
            other => {
                return Err(Error::ConfigError(format!(
                    "Unknown tracking filter: {other} (expected lerp or none)"
                )))
            }
        }
        if !(self.tracking.smoothing > 0.0 && self.tracking.smoothing <= 1.0) {
            return Err(Error::ConfigError("Smoothing must be in (0.0, 1.0]".to_string()));
        }
        if self.tracking.pinch_threshold <= 0.0 {
            return Err(Error::ConfigError("Pinch threshold must be greater than 0".to_string()));
        }
        if let Some(release) = self.tracking.pinch_release_threshold {
            if release < self.tracking.pinch_threshold {
                return Err(Error::ConfigError(
                    "Pinch release threshold must not be below the pinch threshold".to_string(),
                ));
            }
        }

        // Gesture
        if self.gesture.double_click_timeout_ms == 0 {
            return Err(Error::ConfigError("Double click timeout must be greater than 0".to_string()));
        }

        // Surface
        if !(0.0..=255.0).contains(&self.surface.brightness_threshold) {
            return Err(Error::ConfigError(
                "Brightness threshold must be between 0 and 255".to_string(),
            ));
        }
        if self.surface.seed_step == 0 || self.surface.fallback_step == 0 {
            return Err(Error::ConfigError("Surface scan steps must be greater than 0".to_string()));
        }
        check_unit(self.surface.min_component_area, "Minimum component area")?;
        check_unit(self.surface.fallback_min_extent, "Fallback minimum extent")?;
        check_unit(self.surface.fallback_padding, "Fallback padding")?;
        check_unit(self.surface.min_area, "Minimum surface area")?;

        // Calibration
        if self.calibration.poll_interval_ms == 0 {
            return Err(Error::ConfigError("Calibration poll interval must be greater than 0".to_string()));
        }
        if !(0.0..0.5).contains(&self.calibration.screen_margin) {
            return Err(Error::ConfigError("Screen margin must be in [0.0, 0.5)".to_string()));
        }
        if self.calibration.grid_min_size_px <= 0.0 {
            return Err(Error::ConfigError("Minimum grid size must be greater than 0".to_string()));
        }

        // Touch
        if self.touch.z_threshold <= 0.0 || self.touch.velocity_threshold < 0.0 {
            return Err(Error::ConfigError(
                "Touch thresholds must be positive".to_string(),
            ));
        }
        if self.touch.confirmation_frames == 0 {
            return Err(Error::ConfigError(
                "Touch confirmation frames must be greater than 0".to_string(),
            ));
        }

        // Landmarks
        if !(0.0..=1.0).contains(&self.landmarks.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum hand confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        // Display
        if self.display.target_fps == 0 {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Filter name understood by [`crate::filters::create_filter`]
    #[must_use]
    pub fn filter_name(&self) -> String {
        match self.tracking.filter.as_str() {
            "none" => "none".to_string(),
            _ => format!("lerp:{}", self.tracking.smoothing),
        }
    }

    /// Session parameters for this configuration
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            filter: self.filter_name(),
            pinch: PinchThresholds {
                engage: self.tracking.pinch_threshold,
                release: self
                    .tracking
                    .pinch_release_threshold
                    .unwrap_or(self.tracking.pinch_threshold),
            },
            double_click_timeout: Duration::from_millis(self.gesture.double_click_timeout_ms),
            feedback_duration: Duration::from_millis(self.gesture.feedback_duration_ms),
            surface: SurfaceDetectorConfig {
                brightness_threshold: self.surface.brightness_threshold,
                seed_step: self.surface.seed_step,
                fallback_step: self.surface.fallback_step,
                min_component_area: self.surface.min_component_area,
                fallback_min_extent: self.surface.fallback_min_extent,
                fallback_padding: self.surface.fallback_padding,
                min_area: self.surface.min_area,
            },
            calibration: CalibrationConfig {
                poll_interval: Duration::from_millis(self.calibration.poll_interval_ms),
                screen_margin: self.calibration.screen_margin,
            },
            touch: TouchConfig {
                z_threshold: self.touch.z_threshold,
                velocity_threshold: self.touch.velocity_threshold,
                confirmation_frames: self.touch.confirmation_frames,
            },
            grid_min_size: self.calibration.grid_min_size_px,
        }
    }

    /// Subprocess parameters of the landmark detector
    #[must_use]
    pub fn subprocess_config(&self) -> SubprocessConfig {
        SubprocessConfig {
            python: self.landmarks.python.clone(),
            script: self.landmarks.script.clone(),
            min_confidence: self.landmarks.min_confidence,
        }
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hand Pointer Configuration

# Cursor tracking
tracking:
  filter: "lerp"
  smoothing: 0.15
  pinch_threshold: 0.05
  # pinch_release_threshold: 0.07

# Click debouncing
gesture:
  double_click_timeout_ms: 300
  feedback_duration_ms: 500

# Surface detection
surface:
  brightness_threshold: 200.0
  seed_step: 10
  fallback_step: 3
  min_component_area: 0.001
  fallback_min_extent: 0.03
  fallback_padding: 0.02
  min_area: 0.01

# Calibration and grid editing
calibration:
  poll_interval_ms: 100
  screen_margin: 0.05
  grid_min_size_px: 100.0
  handle_tolerance_px: 12.0

# Touch detection in grid mode
touch:
  z_threshold: 0.05
  velocity_threshold: 0.005
  confirmation_frames: 3

# Hand landmark detector
landmarks:
  python: ".venv/bin/python"
  script: "scripts/hand_detect.py"
  min_confidence: 0.5

# Display settings
display:
  target_fps: 60
  gui: true
  window_width: 960
  window_height: 540
  mirror_preview: true
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed = Config::from_yaml("touch:\n  confirmation_frames: 5\n").unwrap();
        assert_eq!(parsed.touch.confirmation_frames, 5);
        assert!((parsed.touch.z_threshold - TOUCH_Z_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(parsed.display, DisplayConfig::default());
    }

    #[test]
    fn test_release_below_engage_is_invalid() {
        let mut config = Config::default();
        config.tracking.pinch_release_threshold = Some(0.01);
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_session_config_defaults_to_no_hysteresis() {
        let session = Config::default().session_config();
        assert!((session.pinch.engage - session.pinch.release).abs() < f64::EPSILON);
        assert_eq!(session.double_click_timeout, DOUBLE_CLICK_TIMEOUT);
        assert_eq!(session.filter, "lerp:0.15");
    }
}
