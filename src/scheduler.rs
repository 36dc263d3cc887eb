//! Tick sources driving the per-frame session update.
//!
//! The app loop pulls ticks from a [`TickSource`]; every tick carries the
//! instant the session should use as "now". A shared [`CancelHandle`] stops
//! any source, e.g. from a Ctrl-C handler.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

/// Shared stop flag
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create an untripped handle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request every holder of this handle to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Source of tick instants
pub trait TickSource {
    /// Wait for the next tick; `None` once the source is cancelled or exhausted
    fn next_tick(&mut self) -> Option<Instant>;

    /// Handle that stops this source
    fn cancel_handle(&self) -> CancelHandle;
}

fn period_for(fps: u32) -> Duration {
    assert!(fps > 0, "Target FPS must be greater than 0");
    Duration::from_secs(1) / fps
}

/// Wall-clock ticker sleeping to hold a target rate
pub struct FixedRateTicker {
    period: Duration,
    next: Option<Instant>,
    cancel: CancelHandle,
}

impl FixedRateTicker {
    /// Create a ticker at `fps` ticks per second
    ///
    /// # Panics
    ///
    /// Panics if `fps` is zero
    #[must_use]
    pub fn new(fps: u32, cancel: CancelHandle) -> Self {
        Self {
            period: period_for(fps),
            next: None,
            cancel,
        }
    }

    /// Time between ticks
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl TickSource for FixedRateTicker {
    fn next_tick(&mut self) -> Option<Instant> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if let Some(next) = self.next {
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            }
        }
        if self.cancel.is_cancelled() {
            return None;
        }

        // A slow tick delays the schedule rather than bursting to catch up
        let tick = Instant::now();
        self.next = Some(tick + self.period);
        Some(tick)
    }

    fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

/// Ticker advancing a virtual clock without sleeping, for replays and tests
pub struct SimulatedTicker {
    period: Duration,
    now: Instant,
    remaining: Option<u64>,
    cancel: CancelHandle,
}

impl SimulatedTicker {
    /// Create a ticker starting at `start`, at `fps`, optionally limited to
    /// `limit` ticks
    ///
    /// # Panics
    ///
    /// Panics if `fps` is zero
    #[must_use]
    pub fn new(start: Instant, fps: u32, limit: Option<u64>, cancel: CancelHandle) -> Self {
        let period = period_for(fps);
        Self {
            period,
            // First tick lands on `start`
            now: start.checked_sub(period).unwrap_or(start),
            remaining: limit,
            cancel,
        }
    }
}

impl TickSource for SimulatedTicker {
    fn next_tick(&mut self) -> Option<Instant> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        self.now += self.period;
        Some(self.now)
    }

    fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}
