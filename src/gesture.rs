//! Gesture debouncer turning pinch releases into left/right clicks.
//!
//! Every falling edge of the pinch signal counts one release and restarts a
//! single debounce window. When the window closes, one release resolves to a
//! left click and two or more to a right click, placed where the last
//! release happened.

use crate::{
    constants::{DOUBLE_CLICK_TIMEOUT, GESTURE_FEEDBACK_DURATION},
    geometry::ScreenPoint,
    timer::OneShot,
};
use log::{debug, info};
use std::time::{Duration, Instant};

/// Mouse button a gesture resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Primary click
    Left,
    /// Context-menu click
    Right,
}

/// A resolved click at a screen position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Which button
    pub kind: ClickKind,
    /// Where to click
    pub position: ScreenPoint,
}

/// Gesture shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureKind {
    /// Nothing tracked
    #[default]
    None,
    /// Hand moving the cursor
    Move,
    /// Pinch being held
    PinchStart,
    /// Pinch released once
    ClickLeft,
    /// Pinch released twice
    ClickRight,
}

impl From<ClickKind> for GestureKind {
    fn from(kind: ClickKind) -> Self {
        match kind {
            ClickKind::Left => Self::ClickLeft,
            ClickKind::Right => Self::ClickRight,
        }
    }
}

/// Click decision waiting for its debounce window to close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingClick {
    /// Releases seen in this window
    pub releases: u32,
    /// Cursor position at the latest release
    pub position: ScreenPoint,
}

impl PendingClick {
    /// Fold a release into the pending window, opening one if needed
    #[must_use]
    pub fn register(slot: Option<Self>, position: ScreenPoint) -> Self {
        let releases = slot.map_or(0, |pending| pending.releases);
        Self {
            releases: releases.saturating_add(1),
            position,
        }
    }

    /// Decide the click once the window has closed
    #[must_use]
    pub fn resolve(self) -> Option<ClickEvent> {
        let kind = match self.releases {
            0 => return None,
            1 => ClickKind::Left,
            _ => ClickKind::Right,
        };
        Some(ClickEvent {
            kind,
            position: self.position,
        })
    }
}

/// Pinch-release click debouncer
pub struct GestureDebouncer {
    timeout: Duration,
    feedback_duration: Duration,
    was_pinching: bool,
    window: OneShot<PendingClick>,
    feedback: OneShot<ClickKind>,
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_TIMEOUT, GESTURE_FEEDBACK_DURATION)
    }
}

impl GestureDebouncer {
    /// Create a debouncer with the given debounce window and feedback duration
    #[must_use]
    pub const fn new(timeout: Duration, feedback_duration: Duration) -> Self {
        Self {
            timeout,
            feedback_duration,
            was_pinching: false,
            window: OneShot::new(),
            feedback: OneShot::new(),
        }
    }

    /// Process one tick of pinch state; returns a click if a window closed
    pub fn update(&mut self, is_pinching: bool, cursor: ScreenPoint, now: Instant) -> Option<ClickEvent> {
        let fired = self.poll(now);

        if self.was_pinching && !is_pinching {
            self.on_release(cursor, now);
        }
        self.was_pinching = is_pinching;

        fired
    }

    /// Resolve the debounce window if it has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<ClickEvent> {
        // Clears the feedback flag once expired
        let _ = self.feedback.poll(now);

        let event = self.window.poll(now)?.resolve()?;
        info!(
            "{:?} click at ({:.0}, {:.0})",
            event.kind, event.position.x, event.position.y
        );
        self.show_feedback(event.kind, now);
        Some(event)
    }

    /// Show `kind` as the last gesture for the feedback duration
    pub fn show_feedback(&mut self, kind: ClickKind, now: Instant) {
        self.feedback.arm(now, self.feedback_duration, kind);
    }

    fn on_release(&mut self, cursor: ScreenPoint, now: Instant) {
        let pending = PendingClick::register(self.window.cancel(), cursor);
        debug!(
            "pinch released ({} in window) at ({:.0}, {:.0})",
            pending.releases, cursor.x, cursor.y
        );
        self.window.arm(now, self.timeout, pending);
    }

    /// Click shown as feedback, until its display duration runs out
    #[must_use]
    pub fn last_gesture(&self, now: Instant) -> GestureKind {
        match (self.feedback.deadline(), self.feedback.peek()) {
            (Some(deadline), Some(kind)) if deadline > now => (*kind).into(),
            _ => GestureKind::None,
        }
    }

    /// Gesture to display this tick
    #[must_use]
    pub fn current_gesture(&self, now: Instant, hand_present: bool) -> GestureKind {
        match self.last_gesture(now) {
            GestureKind::None if self.was_pinching => GestureKind::PinchStart,
            GestureKind::None if hand_present => GestureKind::Move,
            shown => shown,
        }
    }

    /// Releases counted in the open window
    #[must_use]
    pub fn pending_releases(&self) -> u32 {
        self.window.peek().map_or(0, |pending| pending.releases)
    }

    /// When the open window closes
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.window.deadline()
    }

    /// Whether a debounce window is open
    #[must_use]
    pub const fn has_pending_click(&self) -> bool {
        self.window.is_pending()
    }

    /// Treat the hand as open, keeping any open window
    pub fn forget_pinch(&mut self) {
        self.was_pinching = false;
    }

    /// Drop any pending decision and feedback
    pub fn reset(&mut self) {
        self.window.cancel();
        self.feedback.cancel();
        self.was_pinching = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_register_counts_and_keeps_latest_position() {
        let first = PendingClick::register(None, ScreenPoint::new(1.0, 1.0));
        let second = PendingClick::register(Some(first), ScreenPoint::new(2.0, 2.0));
        assert_eq!(second.releases, 2);
        assert_eq!(second.position, ScreenPoint::new(2.0, 2.0));
    }

    #[test]
    fn test_resolve_counts() {
        let p = ScreenPoint::default();
        let left = PendingClick { releases: 1, position: p };
        let right = PendingClick { releases: 5, position: p };
        assert_eq!(left.resolve().unwrap().kind, ClickKind::Left);
        assert_eq!(right.resolve().unwrap().kind, ClickKind::Right);
        assert!(PendingClick { releases: 0, position: p }.resolve().is_none());
    }

    #[test]
    fn test_feedback_expires() {
        let t0 = Instant::now();
        let mut debouncer = GestureDebouncer::new(ms(300), ms(500));
        let p = ScreenPoint::new(10.0, 10.0);
        debouncer.update(true, p, t0);
        debouncer.update(false, p, t0 + ms(10));
        let event = debouncer.update(false, p, t0 + ms(310));
        assert!(event.is_some());
        assert_eq!(debouncer.last_gesture(t0 + ms(400)), GestureKind::ClickLeft);
        assert_eq!(debouncer.last_gesture(t0 + ms(810)), GestureKind::None);
    }

    #[test]
    fn test_reset_cancels_window() {
        let t0 = Instant::now();
        let mut debouncer = GestureDebouncer::default();
        debouncer.update(true, ScreenPoint::default(), t0);
        debouncer.update(false, ScreenPoint::default(), t0 + ms(10));
        assert_eq!(debouncer.pending_releases(), 1);
        debouncer.reset();
        assert_eq!(debouncer.poll(t0 + ms(1000)), None);
    }
}
