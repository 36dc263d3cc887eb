//! Pointer tracker: maps the index fingertip to a smoothed screen cursor and
//! measures the index-to-thumb pinch.

use crate::{
    constants::{INITIAL_PINCH_DISTANCE, MOVEMENT_SMOOTHING, PINCH_THRESHOLD},
    filters::{exponential::ExponentialFilter, CursorFilter},
    geometry::{ScreenPoint, ScreenSize},
    landmarks::HandFrame,
};
use log::trace;

/// Per-frame tracker output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Smoothed cursor position in screen pixels
    pub cursor: ScreenPoint,
    /// Whether index and thumb tips are pinched together
    pub is_pinching: bool,
    /// Planar index-to-thumb distance in normalized camera units
    pub pinch_distance: f64,
}

impl PointerState {
    /// Resting state before any hand is seen
    #[must_use]
    pub fn resting(screen: ScreenSize) -> Self {
        Self {
            cursor: screen.center(),
            is_pinching: false,
            pinch_distance: INITIAL_PINCH_DISTANCE,
        }
    }
}

/// Pinch classification thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchThresholds {
    /// Distance below which a pinch starts
    pub engage: f64,
    /// Distance at or above which a held pinch ends
    pub release: f64,
}

impl Default for PinchThresholds {
    fn default() -> Self {
        Self::without_hysteresis(PINCH_THRESHOLD)
    }
}

impl PinchThresholds {
    /// Single threshold, no dead zone
    #[must_use]
    pub const fn without_hysteresis(threshold: f64) -> Self {
        Self {
            engage: threshold,
            release: threshold,
        }
    }

    /// Classify `distance` given whether the hand was already pinching
    #[must_use]
    pub fn is_pinching(&self, distance: f64, was_pinching: bool) -> bool {
        if was_pinching {
            distance < self.release
        } else {
            distance < self.engage
        }
    }
}

/// Tracks the cursor and pinch state from hand frames
pub struct PointerTracker {
    screen: ScreenSize,
    filter: Box<dyn CursorFilter>,
    thresholds: PinchThresholds,
    state: PointerState,
}

impl PointerTracker {
    /// Create a tracker with the default lerp smoothing
    #[must_use]
    pub fn new(screen: ScreenSize) -> Self {
        Self::with_filter(
            screen,
            Box::new(ExponentialFilter::new(MOVEMENT_SMOOTHING, screen.center())),
            PinchThresholds::default(),
        )
    }

    /// Create a tracker with an explicit filter and pinch thresholds
    #[must_use]
    pub fn with_filter(
        screen: ScreenSize,
        mut filter: Box<dyn CursorFilter>,
        thresholds: PinchThresholds,
    ) -> Self {
        let state = PointerState::resting(screen);
        filter.reset(state.cursor);
        Self {
            screen,
            filter,
            thresholds,
            state,
        }
    }

    /// Feed the latest hand frame; without a usable hand the previous state
    /// is kept as-is
    pub fn update(&mut self, hand: Option<&HandFrame>) -> PointerState {
        let Some(frame) = hand else {
            return self.state;
        };
        let (Some(index_tip), Some(thumb_tip)) = (frame.index_tip(), frame.thumb_tip()) else {
            return self.state;
        };

        // Front-facing camera: mirror x so the cursor follows the hand
        let target = ScreenPoint::new(
            (1.0 - index_tip.x) * self.screen.width,
            index_tip.y * self.screen.height,
        );
        let cursor = self.filter.apply(target);

        let pinch_distance = index_tip.planar_distance(thumb_tip);
        let is_pinching = self
            .thresholds
            .is_pinching(pinch_distance, self.state.is_pinching);

        trace!(
            "cursor=({:.1}, {:.1}) pinch={:.4} pinching={}",
            cursor.x,
            cursor.y,
            pinch_distance,
            is_pinching
        );

        self.state = PointerState {
            cursor,
            is_pinching,
            pinch_distance,
        };
        self.state
    }

    /// Latest published state
    #[must_use]
    pub const fn state(&self) -> PointerState {
        self.state
    }

    /// Screen the cursor is mapped onto
    #[must_use]
    pub const fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// Return to the resting state at the screen centre
    pub fn reset(&mut self) {
        self.state = PointerState::resting(self.screen);
        self.filter.reset(self.state.cursor);
    }
}
