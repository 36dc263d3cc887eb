//! Interactive move and resize of the on-screen grid rectangle.
//!
//! Edits happen in screen pixels. The rectangle always stays inside the
//! screen and never shrinks below the minimum edge length. A handle only
//! moves the edges named by its compass direction.

use crate::{
    constants::GRID_MIN_SIZE_PX,
    geometry::{BoundingBox, PixelRect, ScreenPoint, ScreenSize},
};

/// Resize handle on the grid outline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Handle {
    /// Every handle, corners first
    pub const ALL: [Self; 8] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthWest,
        Self::SouthEast,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    const fn moves_left(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    const fn moves_right(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    const fn moves_top(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    const fn moves_bottom(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    /// Pixel position of this handle on `rect`
    #[must_use]
    pub fn anchor(self, rect: &PixelRect) -> ScreenPoint {
        let x = if self.moves_left() {
            rect.left
        } else if self.moves_right() {
            rect.left + rect.width
        } else {
            rect.left + rect.width / 2.0
        };
        let y = if self.moves_top() {
            rect.top
        } else if self.moves_bottom() {
            rect.top + rect.height
        } else {
            rect.top + rect.height / 2.0
        };
        ScreenPoint::new(x, y)
    }
}

/// What a drag does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Translate the whole rectangle
    Move,
    /// Drag one handle
    Resize(Handle),
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    mode: DragMode,
    origin: ScreenPoint,
    start: PixelRect,
}

/// Drag/resize session over the grid rectangle
#[derive(Debug, Clone)]
pub struct GridEditor {
    screen: ScreenSize,
    min_size: f64,
    drag: Option<DragState>,
}

// `f64::clamp` panics when lo > hi, which happens on screens smaller than the
// minimum grid size
fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

impl GridEditor {
    /// Create an editor for `screen` with the default minimum size
    #[must_use]
    pub const fn new(screen: ScreenSize) -> Self {
        Self::with_min_size(screen, GRID_MIN_SIZE_PX)
    }

    /// Create an editor with an explicit minimum edge length in pixels
    #[must_use]
    pub const fn with_min_size(screen: ScreenSize, min_size: f64) -> Self {
        Self {
            screen,
            min_size,
            drag: None,
        }
    }

    /// Find the handle within `tolerance` pixels of `pointer`, or the body
    #[must_use]
    pub fn hit_test(&self, pointer: ScreenPoint, screen_box: &BoundingBox, tolerance: f64) -> Option<DragMode> {
        let rect = screen_box.to_pixels(self.screen);
        Handle::ALL
            .into_iter()
            .find(|handle| handle.anchor(&rect).distance(pointer) <= tolerance)
            .map(DragMode::Resize)
            .or_else(|| rect.contains(pointer).then_some(DragMode::Move))
    }

    /// Start dragging `screen_box` from `pointer`
    pub fn begin(&mut self, mode: DragMode, pointer: ScreenPoint, screen_box: &BoundingBox) {
        self.drag = Some(DragState {
            mode,
            origin: pointer,
            start: screen_box.to_pixels(self.screen),
        });
    }

    /// Whether a drag is in progress
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Rectangle for the pointer at `pointer`, without ending the drag
    #[must_use]
    pub fn drag_to(&self, pointer: ScreenPoint) -> Option<BoundingBox> {
        let drag = self.drag?;
        let dx = pointer.x - drag.origin.x;
        let dy = pointer.y - drag.origin.y;
        let rect = match drag.mode {
            DragMode::Move => self.moved(&drag.start, dx, dy),
            DragMode::Resize(handle) => self.resized(&drag.start, handle, dx, dy),
        };
        Some(rect.to_normalized(self.screen))
    }

    /// Finish the drag at `pointer`, returning the edited rectangle
    pub fn end(&mut self, pointer: ScreenPoint) -> Option<BoundingBox> {
        let edited = self.drag_to(pointer);
        self.drag = None;
        edited
    }

    /// Abandon the drag
    pub fn cancel(&mut self) {
        self.drag = None;
    }

    fn moved(&self, start: &PixelRect, dx: f64, dy: f64) -> PixelRect {
        PixelRect {
            left: clamp_range(start.left + dx, 0.0, self.screen.width - start.width),
            top: clamp_range(start.top + dy, 0.0, self.screen.height - start.height),
            ..*start
        }
    }

    fn resized(&self, start: &PixelRect, handle: Handle, dx: f64, dy: f64) -> PixelRect {
        let mut left = start.left;
        let mut top = start.top;
        let mut right = start.left + start.width;
        let mut bottom = start.top + start.height;

        if handle.moves_left() {
            left = clamp_range(left + dx, 0.0, right - self.min_size);
        }
        if handle.moves_right() {
            right = clamp_range(right + dx, left + self.min_size, self.screen.width);
        }
        if handle.moves_top() {
            top = clamp_range(top + dy, 0.0, bottom - self.min_size);
        }
        if handle.moves_bottom() {
            bottom = clamp_range(bottom + dy, top + self.min_size, self.screen.height);
        }

        PixelRect {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}
