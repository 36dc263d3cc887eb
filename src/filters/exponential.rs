use super::CursorFilter;
use crate::geometry::ScreenPoint;

/// Exponential smoothing: each step moves the cursor a fixed fraction of the
/// remaining distance to the target
pub struct ExponentialFilter {
    alpha: f64,
    current: ScreenPoint,
}

impl ExponentialFilter {
    /// Create a filter resting at `origin`
    ///
    /// # Panics
    ///
    /// Panics if alpha is not in the range (0, 1]
    #[must_use]
    pub fn new(alpha: f64, origin: ScreenPoint) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self {
            alpha,
            current: origin,
        }
    }

    /// Smoothing factor
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl CursorFilter for ExponentialFilter {
    fn apply(&mut self, target: ScreenPoint) -> ScreenPoint {
        self.current = self.current.lerp(target, self.alpha);
        self.current
    }

    fn reset(&mut self, position: ScreenPoint) {
        self.current = position;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
