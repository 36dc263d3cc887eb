//! Hand pointer library: webcam hand tracking as a virtual pointing device.
//!
//! The library turns a stream of hand landmarks into pointer motion and
//! clicks:
//! - a smoothed cursor that follows the index fingertip
//! - pinch releases debounced into left (one release) or right (two or more)
//!   clicks
//! - surface calibration that finds a light work surface in the camera image
//!   and maps it onto an on-screen grid
//! - touch detection on that surface, index for left and middle for right
//!
//! The external pieces (MediaPipe landmark detection, `OpenCV` capture and X11
//! dispatch) live behind the [`landmark_source`], [`camera`] and
//! [`cursor_control`] modules. Everything else is pure and driven by
//! [`session::Session::tick`].
//!
//! # Examples
//!
//! ## Pinch clicks
//!
//! ```no_run
//! use hand_pointer::{
//!     geometry::ScreenSize,
//!     landmark_source::{LandmarkSource, ReplaySource},
//!     session::{NoFrames, Session},
//! };
//! use std::time::Instant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = ReplaySource::open("recording.jsonl")?;
//! let mut session = Session::with_defaults(ScreenSize::new(1920.0, 1080.0));
//!
//! while !source.is_exhausted() {
//!     let hand = source.detect(None)?;
//!     let output = session.tick(Instant::now(), hand.as_ref(), &mut NoFrames);
//!     for click in output.clicks {
//!         println!("{:?} click at ({:.0}, {:.0})", click.kind, click.position.x, click.position.y);
//!     }
//! }
//! session.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! ## Surface detection
//!
//! ```no_run
//! use hand_pointer::{calibration::GridBounds, surface::SurfaceDetector};
//! use image::{Rgba, RgbaImage};
//!
//! let mut frame = RgbaImage::from_pixel(320, 240, Rgba([0, 0, 0, 255]));
//! for y in 60..180 {
//!     for x in 80..240 {
//!         frame.put_pixel(x, y, Rgba([255, 255, 255, 255]));
//!     }
//! }
//!
//! if let Some(surface) = SurfaceDetector::default().detect(&frame) {
//!     let grid = GridBounds::from_surface(surface, 0.05);
//!     println!("Grid on screen: {:?}", grid.screen_box);
//! }
//! ```

/// Hand landmark frames
pub mod landmarks;

/// Screen and normalized geometry
pub mod geometry;

/// Cursor smoothing filters
pub mod filters;

/// Index fingertip cursor and pinch tracking
pub mod tracker;

/// Deadline-based one-shot and interval timers
pub mod timer;

/// Pinch-release click debouncing
pub mod gesture;

/// Light surface detection in camera frames
pub mod surface;

/// Calibration state machine and grid mapping
pub mod calibration;

/// Interactive move/resize of the on-screen grid
pub mod grid_editor;

/// Fingertip touch detection on the calibrated surface
pub mod touch;

/// Per-frame session composing every component
pub mod session;

/// Tick sources and cancellation
pub mod scheduler;

/// Hand landmark sources
pub mod landmark_source;

/// Camera capture
pub mod camera;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Cursor control module for X11 systems
pub mod cursor_control;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
