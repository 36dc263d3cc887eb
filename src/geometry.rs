//! Points, sizes and normalized rectangles shared by every component.

use serde::{Deserialize, Serialize};

/// A position in screen-pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
}

impl ScreenPoint {
    /// Create a new screen point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `target` by `factor`
    #[must_use]
    pub fn lerp(self, target: Self, factor: f64) -> Self {
        Self {
            x: factor.mul_add(target.x - self.x, self.x),
            y: factor.mul_add(target.y - self.y, self.y),
        }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl ScreenSize {
    /// Create a new screen size
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre of the screen
    #[must_use]
    pub fn center(self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

impl From<(u16, u16)> for ScreenSize {
    fn from((width, height): (u16, u16)) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }
}

/// Rectangle normalized to [0, 1] relative to an image or the screen
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized area
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Width divided by height
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Position of `(x, y)` relative to this box, where (0,0) is the
    /// top-left corner and (1,1) the bottom-right one
    #[must_use]
    pub fn relative(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.x) / self.width, (y - self.y) / self.height)
    }

    /// Scale this normalized box into pixels of `screen`
    #[must_use]
    pub fn to_pixels(&self, screen: ScreenSize) -> PixelRect {
        PixelRect {
            left: self.x * screen.width,
            top: self.y * screen.height,
            width: self.width * screen.width,
            height: self.height * screen.height,
        }
    }
}

/// Rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl PixelRect {
    /// Normalize this rectangle against `screen`
    #[must_use]
    pub fn to_normalized(&self, screen: ScreenSize) -> BoundingBox {
        BoundingBox::new(
            self.left / screen.width,
            self.top / screen.height,
            self.width / screen.width,
            self.height / screen.height,
        )
    }

    /// Whether the pixel point lies inside the rectangle, edges included
    #[must_use]
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_half_way() {
        let p = ScreenPoint::new(0.0, 10.0).lerp(ScreenPoint::new(10.0, 20.0), 0.5);
        assert_eq!(p, ScreenPoint::new(5.0, 15.0));
    }

    #[test]
    fn test_relative_corners() {
        let bbox = BoundingBox::new(0.2, 0.4, 0.5, 0.25);
        assert_eq!(bbox.relative(0.2, 0.4), (0.0, 0.0));
        let (rx, ry) = bbox.relative(0.7, 0.65);
        assert!((rx - 1.0).abs() < 1e-12);
        assert!((ry - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pixel_round_trip() {
        let screen = ScreenSize::new(1920.0, 1080.0);
        let bbox = BoundingBox::new(0.1, 0.2, 0.5, 0.5);
        let px = bbox.to_pixels(screen);
        assert_eq!(px.left, 192.0);
        assert_eq!(px.height, 540.0);
        let back = px.to_normalized(screen);
        assert!((back.x - bbox.x).abs() < 1e-12);
        assert!((back.width - bbox.width).abs() < 1e-12);
    }
}
