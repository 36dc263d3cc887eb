//! Cursor control module for X11-based systems.
//!
//! Moves the pointer with `WarpPointer` and synthesises button presses
//! through the XTEST extension.

use crate::{
    error::{AppError, Result},
    geometry::{ScreenPoint, ScreenSize},
    gesture::{ClickEvent, ClickKind},
};
use log::{debug, info};
use x11rb::{
    connection::{Connection, RequestConnection},
    protocol::{
        xproto::{ConnectionExt, Screen, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT},
        xtest::{self, ConnectionExt as _},
    },
    rust_connection::RustConnection,
    CURRENT_TIME,
};

/// Destination of cursor motion and clicks
pub trait PointerSink {
    /// Move the pointer to `position` in screen pixels
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorControl` if the display rejects the request
    fn move_to(&mut self, position: ScreenPoint) -> Result<()>;

    /// Click at the event position
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorControl` if the display rejects the request
    fn click(&mut self, event: &ClickEvent) -> Result<()>;
}

/// X11 button number for a click
#[must_use]
pub const fn button_for(kind: ClickKind) -> u8 {
    match kind {
        ClickKind::Left => 1,
        ClickKind::Right => 3,
    }
}

/// Round a pixel coordinate into `0..extent`
#[allow(clippy::cast_possible_truncation)] // Clamped to the i16 screen range first
#[must_use]
pub fn to_pixel(value: f64, extent: u16) -> i16 {
    let max = f64::from(i16::try_from(extent.saturating_sub(1)).unwrap_or(i16::MAX));
    if value.is_finite() {
        value.round().clamp(0.0, max) as i16
    } else {
        0
    }
}

/// Cursor control implementation for X11
pub struct CursorController {
    connection: RustConnection,
    screen: Screen,
    screen_width: u16,
    screen_height: u16,
}

impl CursorController {
    /// Connect to the X server and check for XTEST
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorControl` without a display or XTEST support
    pub fn new() -> Result<Self> {
        info!("Initializing X11 cursor controller");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| AppError::CursorControl(format!("Failed to connect to X11: {e}")))?;

        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| AppError::CursorControl("Failed to get screen".to_string()))?
            .clone();

        let xtest_present = connection
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(|e| AppError::CursorControl(format!("Failed to query XTEST: {e}")))?
            .is_some();
        if !xtest_present {
            return Err(AppError::CursorControl(
                "XTEST extension not available, clicks cannot be synthesised".to_string(),
            ));
        }

        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;
        info!("Connected to X11 display, screen: {}x{}", screen_width, screen_height);

        Ok(Self {
            connection,
            screen,
            screen_width,
            screen_height,
        })
    }

    /// Get current cursor position
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorControl` if the query fails
    pub fn get_position(&self) -> Result<(i16, i16)> {
        let reply = self
            .connection
            .query_pointer(self.screen.root)
            .map_err(|e| AppError::CursorControl(format!("Failed to send query pointer: {e}")))?
            .reply()
            .map_err(|e| AppError::CursorControl(format!("Failed to query pointer: {e}")))?;

        Ok((reply.root_x, reply.root_y))
    }

    /// Set cursor position (absolute), clamped to the screen
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorControl` if the warp fails
    pub fn set_position(&self, x: i16, y: i16) -> Result<()> {
        let max_x = i16::try_from(self.screen_width.saturating_sub(1)).unwrap_or(i16::MAX);
        let max_y = i16::try_from(self.screen_height.saturating_sub(1)).unwrap_or(i16::MAX);
        let x = x.clamp(0, max_x);
        let y = y.clamp(0, max_y);

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| AppError::CursorControl(format!("Failed to warp pointer: {e}")))?;

        self.flush()
    }

    /// Press and release `button` at the current pointer position
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorControl` if XTEST rejects the fake input
    pub fn press_button(&self, button: u8) -> Result<()> {
        for event_type in [BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT] {
            self.connection
                .xtest_fake_input(event_type, button, CURRENT_TIME, self.screen.root, 0, 0, 0)
                .map_err(|e| AppError::CursorControl(format!("Failed to fake button {button}: {e}")))?;
        }
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        self.connection
            .flush()
            .map_err(|e| AppError::CursorControl(format!("Failed to flush connection: {e}")))
    }

    /// Get screen dimensions
    #[must_use]
    pub const fn get_screen_size(&self) -> (u16, u16) {
        (self.screen_width, self.screen_height)
    }

    /// Screen dimensions as a float size
    #[must_use]
    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize::from((self.screen_width, self.screen_height))
    }
}

impl PointerSink for CursorController {
    fn move_to(&mut self, position: ScreenPoint) -> Result<()> {
        self.set_position(
            to_pixel(position.x, self.screen_width),
            to_pixel(position.y, self.screen_height),
        )
    }

    fn click(&mut self, event: &ClickEvent) -> Result<()> {
        self.move_to(event.position)?;
        let button = button_for(event.kind);
        debug!("Pressing button {} at ({:.0}, {:.0})", button, event.position.x, event.position.y);
        self.press_button(button)
    }
}
