//! Deadline-based timers driven by the tick loop.
//!
//! Nothing here sleeps or spawns: each timer is a slot holding the next
//! deadline, and the owner polls it with the current tick time.

use std::time::{Duration, Instant};

/// One-shot delayed payload; arming while pending replaces the old payload
#[derive(Debug, Clone)]
pub struct OneShot<T> {
    pending: Option<(Instant, T)>,
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> OneShot<T> {
    /// Create an unarmed timer
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Arm to fire `delay` after `now`, returning any payload it replaced
    pub fn arm(&mut self, now: Instant, delay: Duration, payload: T) -> Option<T> {
        self.pending
            .replace((now + delay, payload))
            .map(|(_, previous)| previous)
    }

    /// Disarm without firing
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// Take the payload if the deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.cancel(),
            _ => None,
        }
    }

    /// Deadline of the pending payload
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Pending payload, if armed
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, payload)| payload)
    }

    /// Whether a payload is waiting
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Repeating timer that is due immediately when started
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    /// Create a stopped interval
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Start (or restart) the interval; the first poll at or after `now` is due
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now);
    }

    /// Stop the interval
    pub fn cancel(&mut self) {
        self.next = None;
    }

    /// Whether the interval is due at `now`; consumes the due slot
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if next <= now => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    /// Whether the interval is running
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.next.is_some()
    }

    /// Period between firings
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}
