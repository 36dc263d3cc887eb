//! One stateful session composing every tracking component.
//!
//! The app loop calls [`Session::tick`] once per frame with the tick instant
//! and the latest hand frame. In normal mode the pointer tracker and gesture
//! debouncer produce the cursor and pinch clicks; in grid mode the fingertip
//! is mapped through the calibrated grid and touches become clicks.

use crate::{
    calibration::{CalibrationConfig, CalibrationState, GridBounds, SurfaceCalibrator},
    constants::{DOUBLE_CLICK_TIMEOUT, GESTURE_FEEDBACK_DURATION, GRID_MIN_SIZE_PX},
    filters::create_filter,
    geometry::{BoundingBox, ScreenPoint, ScreenSize},
    gesture::{ClickEvent, ClickKind, GestureDebouncer, GestureKind},
    grid_editor::{DragMode, GridEditor},
    landmarks::HandFrame,
    surface::{DetectionStats, SurfaceDetector, SurfaceDetectorConfig},
    touch::{Finger, TouchConfig, TouchDetector},
    tracker::{PinchThresholds, PointerTracker},
    Result,
};
use image::RgbaImage;
use log::{debug, info};
use std::time::{Duration, Instant};

/// On-demand access to the current video frame
pub trait FrameProvider {
    /// Whether frames can be captured yet
    fn is_ready(&self) -> bool;

    /// RGBA copy of the most recent frame
    fn snapshot(&mut self) -> Option<RgbaImage>;
}

/// Frame provider for runs without a camera
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrames;

impl FrameProvider for NoFrames {
    fn is_ready(&self) -> bool {
        false
    }

    fn snapshot(&mut self) -> Option<RgbaImage> {
        None
    }
}

impl From<Finger> for ClickKind {
    fn from(finger: Finger) -> Self {
        match finger {
            Finger::Index => Self::Left,
            Finger::Middle => Self::Right,
        }
    }
}

/// Tunables of every session component
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cursor filter name, see [`create_filter`]
    pub filter: String,
    /// Pinch engage/release distances
    pub pinch: PinchThresholds,
    /// Debounce window after a pinch release
    pub double_click_timeout: Duration,
    /// How long an emitted click stays visible
    pub feedback_duration: Duration,
    /// Surface detector parameters
    pub surface: SurfaceDetectorConfig,
    /// Calibration polling and margin
    pub calibration: CalibrationConfig,
    /// Touch thresholds
    pub touch: TouchConfig,
    /// Smallest grid edge while editing, in pixels
    pub grid_min_size: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            filter: "lerp".to_string(),
            pinch: PinchThresholds::default(),
            double_click_timeout: DOUBLE_CLICK_TIMEOUT,
            feedback_duration: GESTURE_FEEDBACK_DURATION,
            surface: SurfaceDetectorConfig::default(),
            calibration: CalibrationConfig::default(),
            touch: TouchConfig::default(),
            grid_min_size: GRID_MIN_SIZE_PX,
        }
    }
}

/// Everything the dispatch and render layers need after one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    /// Clicks to dispatch, in order
    pub clicks: Vec<ClickEvent>,
    /// Current cursor position in screen pixels
    pub cursor: ScreenPoint,
    /// Pinching in normal mode, touching in grid mode
    pub is_active: bool,
    /// Gesture to display
    pub gesture: GestureKind,
    /// Calibration lifecycle state
    pub calibration: CalibrationState,
    /// Confirmed grid, if any
    pub grid_bounds: Option<GridBounds>,
    /// Latest detected surface while calibrating
    pub detected_surface: Option<BoundingBox>,
    /// Diagnostics when the surface detector ran this tick
    pub detection: Option<DetectionStats>,
}

/// Pointer session state
pub struct Session {
    screen: ScreenSize,
    tracker: PointerTracker,
    debouncer: GestureDebouncer,
    calibrator: SurfaceCalibrator,
    detector: SurfaceDetector,
    touch: TouchDetector,
    editor: GridEditor,
    grid_cursor: ScreenPoint,
    last_touch_type: Option<Finger>,
}

impl Session {
    /// Create a session for `screen`
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` if the configured filter is invalid
    pub fn new(screen: ScreenSize, config: &SessionConfig) -> Result<Self> {
        let filter = create_filter(&config.filter, screen.center())?;
        info!("Cursor filter: {}", filter.name());
        let tracker = PointerTracker::with_filter(screen, filter, config.pinch);
        Ok(Self::assemble(screen, tracker, config))
    }

    /// Create a session with every default
    #[must_use]
    pub fn with_defaults(screen: ScreenSize) -> Self {
        Self::assemble(screen, PointerTracker::new(screen), &SessionConfig::default())
    }

    fn assemble(screen: ScreenSize, tracker: PointerTracker, config: &SessionConfig) -> Self {
        Self {
            screen,
            tracker,
            debouncer: GestureDebouncer::new(config.double_click_timeout, config.feedback_duration),
            calibrator: SurfaceCalibrator::new(config.calibration),
            detector: SurfaceDetector::new(config.surface),
            touch: TouchDetector::new(config.touch),
            editor: GridEditor::with_min_size(screen, config.grid_min_size),
            grid_cursor: screen.center(),
            last_touch_type: None,
        }
    }

    /// Advance the session by one frame
    pub fn tick(&mut self, now: Instant, hand: Option<&HandFrame>, frames: &mut dyn FrameProvider) -> TickOutput {
        let detection = self.poll_surface(now, frames);

        let mut clicks = Vec::new();
        let (cursor, is_active) = if self.calibrator.is_grid_mode() {
            // Resolve a pinch window left open when grid mode started
            clicks.extend(self.debouncer.poll(now));
            self.grid_tick(now, hand, &mut clicks)
        } else {
            if self.last_touch_type.is_some() || self.touch.state().is_touching {
                self.touch.reset();
                self.last_touch_type = None;
            }
            let pointer = self.tracker.update(hand);
            clicks.extend(self.debouncer.update(pointer.is_pinching, pointer.cursor, now));
            (pointer.cursor, pointer.is_pinching)
        };

        TickOutput {
            clicks,
            cursor,
            is_active,
            gesture: self.debouncer.current_gesture(now, hand.is_some()),
            calibration: self.calibrator.state(),
            grid_bounds: self.calibrator.grid_bounds(),
            detected_surface: self.calibrator.detected_surface(),
            detection,
        }
    }

    fn poll_surface(&mut self, now: Instant, frames: &mut dyn FrameProvider) -> Option<DetectionStats> {
        if !self.calibrator.detection_due(now) {
            return None;
        }
        let Some(frame) = frames.snapshot() else {
            debug!("Surface detection skipped: no frame");
            return None;
        };
        let stats = self.detector.detect_with_stats(&frame);
        self.calibrator.record_detection(stats.surface);
        Some(stats)
    }

    fn grid_tick(&mut self, now: Instant, hand: Option<&HandFrame>, clicks: &mut Vec<ClickEvent>) -> (ScreenPoint, bool) {
        // Off-surface fingertips leave the cursor where it was
        let mapped = hand
            .and_then(HandFrame::index_tip)
            .and_then(|tip| self.calibrator.map_to_grid(tip.x, tip.y, self.screen));
        if let Some(point) = mapped {
            self.grid_cursor = point;
        }

        let _ = self.touch.update(hand);
        let touch = self.touch.state();
        if touch.touch_type != self.last_touch_type {
            if mapped.is_none() && touch.touch_type.is_some() {
                debug!("Touch off the surface, no click");
            } else if let Some(finger) = touch.touch_type {
                let event = ClickEvent {
                    kind: finger.into(),
                    position: self.grid_cursor,
                };
                info!(
                    "{:?} touch -> {:?} click at ({:.0}, {:.0})",
                    finger, event.kind, event.position.x, event.position.y
                );
                self.debouncer.show_feedback(event.kind, now);
                clicks.push(event);
            }
            self.last_touch_type = touch.touch_type;
        }

        (self.grid_cursor, touch.is_touching)
    }

    /// Begin calibrating if the frame provider is ready
    pub fn start_calibration(&mut self, now: Instant, frames: &dyn FrameProvider) -> bool {
        self.calibrator.start_calibration(now, frames.is_ready())
    }

    /// Abort calibration
    pub fn cancel_calibration(&mut self) {
        self.calibrator.cancel_calibration();
    }

    /// Confirm the detected surface and switch to grid mode
    pub fn confirm_calibration(&mut self) -> Option<GridBounds> {
        let bounds = self.calibrator.confirm_calibration()?;
        self.mode_changed();
        Some(bounds)
    }

    /// Flip grid mode on or off
    pub fn toggle_grid_mode(&mut self) {
        self.calibrator.toggle_grid_mode();
        self.mode_changed();
    }

    /// Discard calibration and return to normal pointer mode
    pub fn reset_calibration(&mut self) {
        self.calibrator.reset();
        self.editor.cancel();
        self.mode_changed();
    }

    /// Grid ticks never feed the debouncer, so its pinch edge is stale
    /// across a switch between pointer and grid mode
    fn mode_changed(&mut self) {
        self.debouncer.forget_pinch();
        self.reset_touch();
    }

    fn reset_touch(&mut self) {
        self.touch.reset();
        self.last_touch_type = None;
    }

    /// Start a grid drag if `pointer` hits the grid or one of its handles
    pub fn begin_grid_edit(&mut self, pointer: ScreenPoint, tolerance: f64) -> Option<DragMode> {
        let bounds = self.calibrator.grid_bounds()?;
        let mode = self.editor.hit_test(pointer, &bounds.screen_box, tolerance)?;
        self.editor.begin(mode, pointer, &bounds.screen_box);
        Some(mode)
    }

    /// Preview of the grid being dragged
    #[must_use]
    pub fn preview_grid_edit(&self, pointer: ScreenPoint) -> Option<BoundingBox> {
        self.editor.drag_to(pointer)
    }

    /// Finish a grid drag and commit it to the calibration
    pub fn end_grid_edit(&mut self, pointer: ScreenPoint) -> Option<GridBounds> {
        let screen_box = self.editor.end(pointer)?;
        let current = self.calibrator.grid_bounds()?;
        self.calibrator.update_grid_bounds(GridBounds { screen_box, ..current });
        self.calibrator.grid_bounds()
    }

    /// Abandon a grid drag
    pub fn cancel_grid_edit(&mut self) {
        self.editor.cancel();
    }

    /// Whether a pinch click is still waiting for its window to close
    #[must_use]
    pub const fn has_pending_click(&self) -> bool {
        self.debouncer.has_pending_click()
    }

    /// Whether a grid drag is in progress
    #[must_use]
    pub const fn is_editing_grid(&self) -> bool {
        self.editor.is_dragging()
    }

    /// Calibration state machine
    #[must_use]
    pub const fn calibrator(&self) -> &SurfaceCalibrator {
        &self.calibrator
    }

    /// Screen the session maps onto
    #[must_use]
    pub const fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// Cancel every pending timer and interval
    pub fn shutdown(&mut self) {
        debug!("Session shutdown");
        self.debouncer.reset();
        self.calibrator.shutdown();
        self.editor.cancel();
        self.reset_touch();
    }
}
