//! Helper functions and utilities for tests
#![allow(dead_code)]

use hand_pointer::{
    cursor_control::PointerSink,
    geometry::ScreenPoint,
    gesture::ClickEvent,
    landmarks::{index, HandFrame, Landmark},
    session::FrameProvider,
    Result,
};
use image::{Rgba, RgbaImage};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Full 21-point hand with every landmark at `(0.5, 0.5)` and depth 0.3
pub fn resting_hand() -> HandFrame {
    HandFrame::new(vec![Landmark::new(0.5, 0.5, 0.3); 21])
}

/// Hand with the index and thumb tips at the given normalized positions
pub fn pointing_hand(index_tip: (f64, f64), thumb_tip: (f64, f64)) -> HandFrame {
    let mut hand = resting_hand();
    hand.landmarks[index::INDEX_FINGER_TIP] = Landmark::new(index_tip.0, index_tip.1, 0.3);
    hand.landmarks[index::THUMB_TIP] = Landmark::new(thumb_tip.0, thumb_tip.1, 0.3);
    hand
}

/// Hand whose index and thumb are `gap` apart horizontally
pub fn pinch_hand(x: f64, y: f64, gap: f64) -> HandFrame {
    pointing_hand((x, y), (x + gap, y))
}

/// Hand with fingertip depths for touch detection; the index tip sits at
/// `(x, y)`
pub fn touch_hand(x: f64, y: f64, index_z: f64, middle_z: f64) -> HandFrame {
    let mut hand = resting_hand();
    hand.landmarks[index::INDEX_FINGER_TIP] = Landmark::new(x, y, index_z);
    hand.landmarks[index::MIDDLE_FINGER_TIP].z = Some(middle_z);
    hand
}

/// Index depth sequence that qualifies as a touch on every frame after the
/// first: small depth, alternating by more than the velocity threshold
pub fn tapping_depths(frames: usize) -> Vec<f64> {
    (0..frames)
        .map(|i| if i % 2 == 0 { 0.01 } else { 0.03 })
        .collect()
}

/// Solid frame
pub fn solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// Black frame with a white rectangle covering `[x0, x1) x [y0, y1)`
pub fn image_with_rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbaImage {
    let mut frame = solid_image(width, height, BLACK);
    for y in y0..y1 {
        for x in x0..x1 {
            frame.put_pixel(x, y, WHITE);
        }
    }
    frame
}

/// Assert two floats agree within `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual} (tolerance {tolerance})"
    );
}

/// Assert two screen points agree within `tolerance` pixels
pub fn assert_point_close(actual: ScreenPoint, expected: ScreenPoint, tolerance: f64) {
    assert!(
        actual.distance(expected) <= tolerance,
        "expected ({:.2}, {:.2}), got ({:.2}, {:.2})",
        expected.x,
        expected.y,
        actual.x,
        actual.y
    );
}

/// Frame provider serving a fixed image
pub struct StaticFrames {
    pub frame: Option<RgbaImage>,
    pub snapshots: usize,
}

impl StaticFrames {
    pub fn new(frame: RgbaImage) -> Self {
        Self {
            frame: Some(frame),
            snapshots: 0,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            frame: None,
            snapshots: 0,
        }
    }
}

impl FrameProvider for StaticFrames {
    fn is_ready(&self) -> bool {
        self.frame.is_some()
    }

    fn snapshot(&mut self) -> Option<RgbaImage> {
        self.snapshots += 1;
        self.frame.clone()
    }
}

/// Pointer sink recording everything it is asked to do
#[derive(Default)]
pub struct RecordingSink {
    pub moves: Vec<ScreenPoint>,
    pub clicks: Vec<ClickEvent>,
}

impl PointerSink for RecordingSink {
    fn move_to(&mut self, position: ScreenPoint) -> Result<()> {
        self.moves.push(position);
        Ok(())
    }

    fn click(&mut self, event: &ClickEvent) -> Result<()> {
        self.clicks.push(*event);
        Ok(())
    }
}
