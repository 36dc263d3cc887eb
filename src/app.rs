//! Main application module: camera, landmark source, session and dispatch.

use crate::{
    calibration::CalibrationState,
    camera::{Camera, VideoSource},
    config::Config,
    cursor_control::{CursorController, PointerSink},
    error::Result,
    geometry::{BoundingBox, ScreenPoint, ScreenSize},
    landmark_source::{LandmarkSource, ReplaySource, SubprocessLandmarkSource},
    landmarks::HandFrame,
    scheduler::{CancelHandle, FixedRateTicker, SimulatedTicker, TickSource},
    session::{FrameProvider, NoFrames, Session, TickOutput},
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Point, Rect, Scalar, CV_8UC3},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

const CAMERA_WINDOW: &str = "Hand Pointer";
const SCREEN_WINDOW: &str = "Hand Pointer Screen";

/// Screen size assumed when no display is connected
pub const FALLBACK_SCREEN_SIZE: ScreenSize = ScreenSize::new(1920.0, 1080.0);

/// Where hand landmarks come from
#[derive(Debug, Clone)]
pub enum LandmarkInput {
    /// Live MediaPipe subprocess fed from the camera
    Live,
    /// Recorded JSON lines
    Replay(PathBuf),
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Landmark input
    pub landmarks: LandmarkInput,
    /// Drive the system pointer
    pub cursor_enabled: bool,
    /// Begin calibrating as soon as the camera delivers a frame
    pub calibrate_on_start: bool,
    /// File settings
    pub settings: Config,
}

/// Keyboard command in the preview window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    StartCalibration,
    ConfirmCalibration,
    CancelCalibration,
    ToggleGrid,
    ResetCalibration,
    Quit,
}

impl KeyCommand {
    /// Map a `wait_key` code to a command
    #[must_use]
    pub const fn from_key(key: i32) -> Option<Self> {
        match key {
            99 => Some(Self::StartCalibration),       // c
            10 | 13 => Some(Self::ConfirmCalibration), // Enter
            27 => Some(Self::CancelCalibration),      // Esc
            103 => Some(Self::ToggleGrid),            // g
            114 => Some(Self::ResetCalibration),      // r
            113 => Some(Self::Quit),                  // q
            _ => None,
        }
    }
}

/// Mouse input on the screen window, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
enum MouseInput {
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up(ScreenPoint),
}

/// Main application struct
pub struct HandPointerApp {
    config: AppConfig,
    camera: Option<Camera>,
    landmarks: Box<dyn LandmarkSource>,
    session: Session,
    cursor: Option<CursorController>,
    no_frames: NoFrames,
    cancel: CancelHandle,
    mouse_events: Arc<Mutex<Vec<MouseInput>>>,
    canvas_size: (i32, i32),
    last_cursor: Option<ScreenPoint>,
    drag_pointer: Option<ScreenPoint>,
    calibrate_pending: bool,
}

impl HandPointerApp {
    /// Create the application
    ///
    /// # Errors
    ///
    /// Returns an error if the camera, landmark source or windows cannot be
    /// set up
    pub fn new(config: AppConfig, cancel: CancelHandle) -> Result<Self> {
        info!("Initializing Hand Pointer application");

        let cursor = if config.cursor_enabled {
            match CursorController::new() {
                Ok(controller) => {
                    info!("X11 cursor control initialized");
                    Some(controller)
                }
                Err(e) => {
                    warn!("Failed to initialize cursor control: {}", e);
                    None
                }
            }
        } else {
            None
        };
        let screen = cursor
            .as_ref()
            .map_or(FALLBACK_SCREEN_SIZE, CursorController::screen_size);

        let (camera, landmarks) = match &config.landmarks {
            LandmarkInput::Live => {
                let camera = Camera::open(&config.video_source)?;
                let source = SubprocessLandmarkSource::spawn(&config.settings.subprocess_config())?;
                (Some(camera), Box::new(source) as Box<dyn LandmarkSource>)
            }
            LandmarkInput::Replay(path) => {
                let source = ReplaySource::open(path)?;
                (None, Box::new(source) as Box<dyn LandmarkSource>)
            }
        };

        let session = Session::new(screen, &config.settings.session_config())?;

        let display = &config.settings.display;
        let canvas_width = display.window_width.max(1);
        #[allow(clippy::cast_possible_truncation)] // Window sizes are small
        let canvas_height = ((f64::from(canvas_width) * screen.height / screen.width) as i32).max(1);
        let mouse_events = Arc::new(Mutex::new(Vec::new()));

        if display.gui {
            highgui::named_window(CAMERA_WINDOW, WINDOW_NORMAL)?;
            highgui::resize_window(CAMERA_WINDOW, display.window_width, display.window_height)?;
            highgui::named_window(SCREEN_WINDOW, WINDOW_NORMAL)?;
            highgui::resize_window(SCREEN_WINDOW, canvas_width, canvas_height)?;

            let events = Arc::clone(&mouse_events);
            let scale = screen.width / f64::from(canvas_width);
            highgui::set_mouse_callback(
                SCREEN_WINDOW,
                Some(Box::new(move |event, x, y, _flags| {
                    let point = ScreenPoint::new(f64::from(x) * scale, f64::from(y) * scale);
                    let input = match event {
                        highgui::EVENT_LBUTTONDOWN => MouseInput::Down(point),
                        highgui::EVENT_MOUSEMOVE => MouseInput::Move(point),
                        highgui::EVENT_LBUTTONUP => MouseInput::Up(point),
                        _ => return,
                    };
                    if let Ok(mut queue) = events.lock() {
                        queue.push(input);
                    }
                })),
            )?;
        }

        let calibrate_pending = config.calibrate_on_start;
        Ok(Self {
            config,
            camera,
            landmarks,
            session,
            cursor,
            no_frames: NoFrames,
            cancel,
            mouse_events,
            canvas_size: (canvas_width, canvas_height),
            last_cursor: None,
            drag_pointer: None,
            calibrate_pending,
        })
    }

    /// Run the main application loop; the session is shut down on every exit
    /// path
    ///
    /// # Errors
    ///
    /// Returns an error if capture, detection or display fails
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");
        let result = self.run_loop();
        self.session.shutdown();
        info!("Application shutting down");
        result
    }

    fn ticker(&self) -> Box<dyn TickSource> {
        let fps = self.config.settings.display.target_fps;
        let offline = self.camera.is_none() && !self.config.settings.display.gui;
        if offline {
            // Replays without a window run as fast as the file allows
            Box::new(SimulatedTicker::new(Instant::now(), fps, None, self.cancel.clone()))
        } else {
            Box::new(FixedRateTicker::new(fps, self.cancel.clone()))
        }
    }

    fn run_loop(&mut self) -> Result<()> {
        let mut ticker = self.ticker();
        let mut frame_count: u64 = 0;
        let start_time = Instant::now();
        let mut last_fps_update = Instant::now();
        let mut fps = 0.0;

        let mut input_ended = false;
        while let Some(now) = ticker.next_tick() {
            if !input_ended {
                if let Some(camera) = self.camera.as_mut() {
                    if !camera.read()? {
                        if !camera.is_file() {
                            warn!("Failed to read frame, retrying...");
                            continue;
                        }
                        info!("End of video file reached");
                        input_ended = true;
                    }
                }
            }

            let hand = if input_ended {
                None
            } else {
                self.landmarks.detect(self.camera.as_ref().map(Camera::frame))?
            };
            input_ended |= self.landmarks.is_exhausted();
            // Keep ticking until a trailing click window has closed
            if input_ended && !self.session.has_pending_click() {
                break;
            }

            if self.calibrate_pending {
                let frames: &dyn FrameProvider = match self.camera.as_ref() {
                    Some(camera) => camera,
                    None => &self.no_frames,
                };
                if self.session.start_calibration(now, frames) {
                    self.calibrate_pending = false;
                }
            }

            let output = {
                let frames: &mut dyn FrameProvider = match self.camera.as_mut() {
                    Some(camera) => camera,
                    None => &mut self.no_frames,
                };
                self.session.tick(now, hand.as_ref(), frames)
            };
            self.dispatch(&output);

            frame_count += 1;
            if last_fps_update.elapsed() >= Duration::from_secs(1) {
                #[allow(clippy::cast_precision_loss)]
                let frames = frame_count as f64;
                fps = frames / start_time.elapsed().as_secs_f64();
                last_fps_update = Instant::now();
                debug!("FPS: {:.1}", fps);
            }

            if self.config.settings.display.gui {
                self.apply_mouse_input();
                self.display_results(hand.as_ref(), &output, fps)?;

                let key = highgui::wait_key(1)?;
                if let Some(command) = KeyCommand::from_key(key & 0xFF) {
                    if self.handle_command(command, now) {
                        info!("Exit requested by user");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply a keyboard command; returns true on quit
    fn handle_command(&mut self, command: KeyCommand, now: Instant) -> bool {
        match command {
            KeyCommand::StartCalibration => {
                let frames: &dyn FrameProvider = match self.camera.as_ref() {
                    Some(camera) => camera,
                    None => &self.no_frames,
                };
                if !self.session.start_calibration(now, frames) {
                    warn!("Camera not ready, cannot calibrate");
                }
            }
            KeyCommand::ConfirmCalibration => {
                if self.session.confirm_calibration().is_none() {
                    warn!("Nothing to confirm: not calibrating or no surface detected yet");
                }
            }
            KeyCommand::CancelCalibration => self.session.cancel_calibration(),
            KeyCommand::ToggleGrid => self.session.toggle_grid_mode(),
            KeyCommand::ResetCalibration => self.session.reset_calibration(),
            KeyCommand::Quit => {
                self.cancel.cancel();
                return true;
            }
        }
        false
    }

    fn dispatch(&mut self, output: &TickOutput) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };

        if self.last_cursor != Some(output.cursor) {
            if let Err(e) = cursor.move_to(output.cursor) {
                warn!("Failed to move cursor: {}", e);
            }
            self.last_cursor = Some(output.cursor);
        }
        for click in &output.clicks {
            if let Err(e) = cursor.click(click) {
                warn!("Failed to dispatch {:?} click: {}", click.kind, e);
            }
        }
    }

    fn apply_mouse_input(&mut self) {
        let inputs: Vec<MouseInput> = match self.mouse_events.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => return,
        };
        let tolerance = self.config.settings.calibration.handle_tolerance_px;

        for input in inputs {
            match input {
                MouseInput::Down(point) => {
                    if let Some(mode) = self.session.begin_grid_edit(point, tolerance) {
                        debug!("Grid edit started: {:?}", mode);
                        self.drag_pointer = Some(point);
                    }
                }
                MouseInput::Move(point) => {
                    if self.session.is_editing_grid() {
                        self.drag_pointer = Some(point);
                    }
                }
                MouseInput::Up(point) => {
                    self.drag_pointer = None;
                    if let Some(bounds) = self.session.end_grid_edit(point) {
                        info!("Grid edited: screen {:?}, surface {:?}", bounds.screen_box, bounds.surface_box);
                    }
                }
            }
        }
    }

    /// Pixel rect of a normalized box on a `width` x `height` image
    #[allow(clippy::cast_possible_truncation)]
    fn box_rect(bbox: &BoundingBox, width: i32, height: i32, mirror: bool) -> Rect {
        let x = if mirror { 1.0 - bbox.x - bbox.width } else { bbox.x };
        Rect::new(
            (x * f64::from(width)) as i32,
            (bbox.y * f64::from(height)) as i32,
            (bbox.width * f64::from(width)) as i32,
            (bbox.height * f64::from(height)) as i32,
        )
    }

    fn put_label(image: &mut Mat, text: &str, origin: Point, color: Scalar) -> Result<()> {
        imgproc::put_text(image, text, origin, FONT_HERSHEY_SIMPLEX, 0.6, color, 2, LINE_8, false)?;
        Ok(())
    }

    /// Display results in GUI windows
    #[allow(clippy::cast_possible_truncation)]
    fn display_results(&self, hand: Option<&HandFrame>, output: &TickOutput, fps: f64) -> Result<()> {
        let mirror = self.config.settings.display.mirror_preview;
        let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
        let yellow = Scalar::new(0.0, 255.0, 255.0, 0.0);
        let red = Scalar::new(0.0, 0.0, 255.0, 0.0);

        // Camera window
        let mut preview = match self.camera.as_ref() {
            Some(camera) if mirror => {
                let mut flipped = Mat::default();
                opencv::core::flip(camera.frame(), &mut flipped, 1)?;
                flipped
            }
            Some(camera) => camera.frame().try_clone()?,
            None => Mat::zeros(480, 640, CV_8UC3)?.to_mat()?,
        };
        let (width, height) = (preview.cols(), preview.rows());

        if let Some(hand) = hand {
            for landmark in &hand.landmarks {
                let x = if mirror { 1.0 - landmark.x } else { landmark.x };
                let center = Point::new((x * f64::from(width)) as i32, (landmark.y * f64::from(height)) as i32);
                imgproc::circle(&mut preview, center, 3, Scalar::new(255.0, 0.0, 0.0, 0.0), -1, LINE_8, 0)?;
            }
        }

        match output.calibration {
            CalibrationState::Calibrating => {
                if let Some(surface) = output.detected_surface {
                    imgproc::rectangle(&mut preview, Self::box_rect(&surface, width, height, mirror), yellow, 2, LINE_8, 0)?;
                    Self::put_label(&mut preview, "Surface found: Enter to confirm", Point::new(10, 60), yellow)?;
                } else {
                    Self::put_label(&mut preview, "Awaiting surface detection...", Point::new(10, 60), yellow)?;
                }
            }
            CalibrationState::GridActive | CalibrationState::GridInactive => {
                if let Some(bounds) = output.grid_bounds {
                    let color = if output.calibration == CalibrationState::GridActive { green } else { red };
                    imgproc::rectangle(
                        &mut preview,
                        Self::box_rect(&bounds.surface_box, width, height, mirror),
                        color,
                        2,
                        LINE_8,
                        0,
                    )?;
                }
            }
            CalibrationState::Idle => {}
        }

        let status = format!("FPS: {:.1}  {:?}  {:?}", fps, output.calibration, output.gesture);
        Self::put_label(&mut preview, &status, Point::new(10, 30), green)?;
        highgui::imshow(CAMERA_WINDOW, &preview)?;

        // Screen window
        let (canvas_width, canvas_height) = self.canvas_size;
        let mut canvas = Mat::zeros(canvas_height, canvas_width, CV_8UC3)?.to_mat()?;
        let screen = self.session.screen();
        let grid = self
            .drag_pointer
            .and_then(|pointer| self.session.preview_grid_edit(pointer))
            .or(output.grid_bounds.map(|bounds| bounds.screen_box));
        if let Some(grid) = grid {
            imgproc::rectangle(&mut canvas, Self::box_rect(&grid, canvas_width, canvas_height, false), yellow, 2, LINE_8, 0)?;
        }

        let cursor = Point::new(
            (output.cursor.x / screen.width * f64::from(canvas_width)) as i32,
            (output.cursor.y / screen.height * f64::from(canvas_height)) as i32,
        );
        let color = if output.is_active { red } else { green };
        imgproc::circle(&mut canvas, cursor, 8, color, -1, LINE_8, 0)?;
        highgui::imshow(SCREEN_WINDOW, &canvas)?;

        Ok(())
    }
}
