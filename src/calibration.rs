//! Surface calibration and camera-to-screen grid mapping.
//!
//! Calibration polls the surface detector until the user confirms a
//! detected surface. Confirming produces [`GridBounds`]: the surface
//! rectangle in camera space paired with an aspect-matched rectangle on
//! screen. Fingertips inside the surface map linearly into the screen grid.
//!
//! ```text
//! Idle --start--> Calibrating --confirm--> GridActive <--toggle--> GridInactive
//!                     |--cancel--> Idle
//! any --reset--> Idle
//! ```

use crate::{
    constants::{GRID_SCREEN_MARGIN, SURFACE_DETECTION_INTERVAL},
    geometry::{BoundingBox, ScreenPoint, ScreenSize},
    timer::Interval,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Calibration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalibrationState {
    /// Normal pointer mode
    #[default]
    Idle,
    /// Polling the surface detector
    Calibrating,
    /// Grid mapping and touch detection enabled
    GridActive,
    /// Grid calibrated but switched off
    GridInactive,
}

/// Calibrated pairing of a camera surface with an on-screen grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    /// Surface rectangle, normalized to the camera image
    pub surface_box: BoundingBox,
    /// Grid rectangle, normalized to the screen
    pub screen_box: BoundingBox,
    /// Surface width over height
    pub aspect_ratio: f64,
}

impl GridBounds {
    /// Grid for a detected surface: a `margin` inset screen rectangle with one
    /// dimension shrunk and centred so its aspect matches the surface
    #[must_use]
    pub fn from_surface(surface_box: BoundingBox, margin: f64) -> Self {
        let full = BoundingBox::new(margin, margin, 1.0 - 2.0 * margin, 1.0 - 2.0 * margin);
        let surface_aspect = surface_box.aspect_ratio();

        let mut screen_box = full;
        if surface_aspect > full.aspect_ratio() {
            // Wider surface: shrink height
            let height = full.width / surface_aspect;
            screen_box.y = (1.0 - height) / 2.0;
            screen_box.height = height;
        } else {
            let width = full.height * surface_aspect;
            screen_box.x = (1.0 - width) / 2.0;
            screen_box.width = width;
        }

        Self {
            surface_box,
            screen_box,
            aspect_ratio: surface_aspect,
        }
    }

    /// Map a camera-normalized point into screen pixels; `None` when the
    /// point lies outside the surface
    #[must_use]
    pub fn map_to_grid(&self, camera_x: f64, camera_y: f64, screen: ScreenSize) -> Option<ScreenPoint> {
        let (rel_x, rel_y) = self.surface_box.relative(camera_x, camera_y);
        if !(0.0..=1.0).contains(&rel_x) || !(0.0..=1.0).contains(&rel_y) {
            return None;
        }

        let grid = self.screen_box;
        Some(ScreenPoint::new(
            grid.x * screen.width + rel_x * grid.width * screen.width,
            grid.y * screen.height + rel_y * grid.height * screen.height,
        ))
    }

    /// Apply an on-screen edit to the surface rectangle with the same
    /// relative scale and offset, clamped inside the camera frame
    #[must_use]
    pub fn with_screen_box(&self, screen_box: BoundingBox) -> Self {
        if screen_box == self.screen_box {
            return *self;
        }

        let old_screen = self.screen_box;
        let scale_x = screen_box.width / old_screen.width;
        let scale_y = screen_box.height / old_screen.height;
        let offset_x = (screen_box.x - old_screen.x) / old_screen.width;
        let offset_y = (screen_box.y - old_screen.y) / old_screen.height;

        let old_surface = self.surface_box;
        let mut surface = BoundingBox::new(
            offset_x.mul_add(old_surface.width, old_surface.x),
            offset_y.mul_add(old_surface.height, old_surface.y),
            old_surface.width * scale_x,
            old_surface.height * scale_y,
        );

        surface.x = surface.x.min(1.0 - surface.width).max(0.0);
        surface.y = surface.y.min(1.0 - surface.height).max(0.0);
        surface.width = surface.width.min(1.0 - surface.x);
        surface.height = surface.height.min(1.0 - surface.y);

        Self {
            surface_box: surface,
            screen_box,
            aspect_ratio: surface.aspect_ratio(),
        }
    }
}

/// Calibration parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Surface detection period while calibrating
    pub poll_interval: Duration,
    /// Screen margin around a freshly confirmed grid
    pub screen_margin: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            poll_interval: SURFACE_DETECTION_INTERVAL,
            screen_margin: GRID_SCREEN_MARGIN,
        }
    }
}

/// Calibration state machine owning the grid bounds
pub struct SurfaceCalibrator {
    config: CalibrationConfig,
    state: CalibrationState,
    grid_bounds: Option<GridBounds>,
    detected_surface: Option<BoundingBox>,
    detection: Interval,
}

impl Default for SurfaceCalibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl SurfaceCalibrator {
    /// Create an idle calibrator
    #[must_use]
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            state: CalibrationState::Idle,
            grid_bounds: None,
            detected_surface: None,
            detection: Interval::new(config.poll_interval),
        }
    }

    /// Begin calibrating; ignored while the camera is not ready
    pub fn start_calibration(&mut self, now: Instant, camera_ready: bool) -> bool {
        if !camera_ready {
            debug!("Calibration requested before the camera is ready");
            return false;
        }
        info!("Calibration started");
        self.state = CalibrationState::Calibrating;
        self.detected_surface = None;
        self.detection.start(now);
        true
    }

    /// Abort calibration, keeping any earlier grid bounds
    pub fn cancel_calibration(&mut self) {
        if self.state == CalibrationState::Calibrating {
            info!("Calibration cancelled");
            self.state = CalibrationState::Idle;
        }
        self.detected_surface = None;
        self.detection.cancel();
    }

    /// Turn the detected surface into grid bounds and enable grid mode;
    /// a no-op outside calibration or without a detected surface
    pub fn confirm_calibration(&mut self) -> Option<GridBounds> {
        if self.state != CalibrationState::Calibrating {
            debug!("Confirm ignored in {:?}", self.state);
            return None;
        }
        let surface = self.detected_surface.take()?;
        let bounds = GridBounds::from_surface(surface, self.config.screen_margin);
        info!(
            "Calibration confirmed: surface {:?} -> screen {:?}",
            bounds.surface_box, bounds.screen_box
        );
        self.grid_bounds = Some(bounds);
        self.state = CalibrationState::GridActive;
        self.detection.cancel();
        Some(bounds)
    }

    /// Flip grid mode without recalibrating; needs existing grid bounds
    pub fn toggle_grid_mode(&mut self) {
        if self.grid_bounds.is_none() || self.state == CalibrationState::Calibrating {
            return;
        }
        self.state = match self.state {
            CalibrationState::GridActive => CalibrationState::GridInactive,
            _ => CalibrationState::GridActive,
        };
        info!("Grid mode {:?}", self.state);
    }

    /// Discard all calibration
    pub fn reset(&mut self) {
        info!("Calibration reset");
        self.state = CalibrationState::Idle;
        self.grid_bounds = None;
        self.detected_surface = None;
        self.detection.cancel();
    }

    /// Whether the surface detector should run this tick
    pub fn detection_due(&mut self, now: Instant) -> bool {
        self.state == CalibrationState::Calibrating && self.detection.poll(now)
    }

    /// Record a detection result; misses keep the previous surface
    pub fn record_detection(&mut self, surface: Option<BoundingBox>) {
        if self.state != CalibrationState::Calibrating {
            return;
        }
        if let Some(surface) = surface {
            self.detected_surface = Some(surface);
        }
    }

    /// Map a camera-normalized point onto the screen grid
    #[must_use]
    pub fn map_to_grid(&self, camera_x: f64, camera_y: f64, screen: ScreenSize) -> Option<ScreenPoint> {
        self.grid_bounds?.map_to_grid(camera_x, camera_y, screen)
    }

    /// Commit an edited grid, carrying the edit over to the surface rectangle
    pub fn update_grid_bounds(&mut self, edited: GridBounds) {
        let updated = match self.grid_bounds {
            Some(current) => current.with_screen_box(edited.screen_box),
            None => edited,
        };
        debug!("Grid bounds updated: {:?}", updated);
        self.grid_bounds = Some(updated);
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> CalibrationState {
        self.state
    }

    /// Whether grid mapping is active
    #[must_use]
    pub fn is_grid_mode(&self) -> bool {
        self.state == CalibrationState::GridActive
    }

    /// Whether detection polling is active
    #[must_use]
    pub fn is_calibrating(&self) -> bool {
        self.state == CalibrationState::Calibrating
    }

    /// Confirmed grid bounds
    #[must_use]
    pub const fn grid_bounds(&self) -> Option<GridBounds> {
        self.grid_bounds
    }

    /// Surface found by the latest successful detection
    #[must_use]
    pub const fn detected_surface(&self) -> Option<BoundingBox> {
        self.detected_surface
    }

    /// Stop periodic work
    pub fn shutdown(&mut self) {
        self.detection.cancel();
    }
}
