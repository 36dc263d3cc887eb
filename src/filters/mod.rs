//! Cursor smoothing filters.
//!
//! The pointer tracker pushes every raw fingertip target through one of these
//! filters before publishing the cursor position.

/// Exponential (lerp) smoothing towards the latest target
pub mod exponential;

use crate::{constants::MOVEMENT_SMOOTHING, geometry::ScreenPoint, Result};

/// Trait for all cursor filters
pub trait CursorFilter: Send + Sync {
    /// Feed a new target position and return the filtered cursor position
    fn apply(&mut self, target: ScreenPoint) -> ScreenPoint;

    /// Reset filter state so the cursor rests at `position`
    fn reset(&mut self, position: ScreenPoint);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes targets through unchanged
pub struct NoFilter;

impl CursorFilter for NoFilter {
    fn apply(&mut self, target: ScreenPoint) -> ScreenPoint {
        target
    }

    fn reset(&mut self, _position: ScreenPoint) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a cursor filter by type name, starting at `origin`
///
/// Accepts `none`, `lerp` / `exponential` (default smoothing factor) or
/// `lerp:<alpha>` with alpha in (0, 1].
///
/// # Errors
///
/// Returns `Error::FilterError` for unknown names or out-of-range parameters
pub fn create_filter(filter_type: &str, origin: ScreenPoint) -> Result<Box<dyn CursorFilter>> {
    let lowered = filter_type.to_lowercase();
    let mut parts = lowered.split(':');
    let name = parts.next().unwrap_or_default();
    let param = parts.next();

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "lerp" | "exponential" => {
            let alpha = match param {
                Some(raw) => raw.parse::<f64>().map_err(|_| {
                    crate::Error::FilterError(format!("Alpha must be a number, got: {raw}"))
                })?,
                None => MOVEMENT_SMOOTHING,
            };
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(crate::Error::FilterError(format!(
                    "Alpha must be in (0, 1], got: {alpha}"
                )));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha, origin)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {filter_type}"))),
    }
}
