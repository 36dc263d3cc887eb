//! Hand pointer: webcam hand tracking as a virtual pointing device.

use anyhow::{Context, Result};
use clap::Parser;
use hand_pointer::{
    app::{AppConfig, HandPointerApp, LandmarkInput},
    camera::VideoSource,
    config::Config,
    scheduler::CancelHandle,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long, default_value = "0")]
    cam: i32,

    /// Video file to process instead of a camera
    #[arg(short, long)]
    video: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Show preview windows (overrides the config file)
    #[arg(short, long)]
    gui: Option<bool>,

    /// Track without moving the system pointer
    #[arg(long)]
    no_cursor: bool,

    /// Start surface calibration as soon as the camera is ready
    #[arg(long)]
    calibrate: bool,

    /// Python interpreter with mediapipe installed
    #[arg(long)]
    python: Option<PathBuf>,

    /// Hand detector script
    #[arg(long)]
    script: Option<PathBuf>,

    /// Replay recorded hand frames (JSON lines) instead of live detection
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Target frame rate (overrides the config file)
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Hand Pointer");

    let mut settings = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(gui) = args.gui {
        settings.display.gui = gui;
    }
    if let Some(fps) = args.fps {
        settings.display.target_fps = fps;
    }
    if let Some(python) = args.python {
        settings.landmarks.python = python;
    }
    if let Some(script) = args.script {
        settings.landmarks.script = script;
    }
    settings.validate().context("Invalid configuration")?;

    let config = AppConfig {
        video_source: args.video.map_or(VideoSource::Camera(args.cam), VideoSource::File),
        landmarks: args.replay.map_or(LandmarkInput::Live, LandmarkInput::Replay),
        cursor_enabled: !args.no_cursor,
        calibrate_on_start: args.calibrate,
        settings,
    };

    let cancel = CancelHandle::new();
    let handler_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        handler_cancel.cancel();
    })?;

    let mut app = HandPointerApp::new(config, cancel)?;
    app.run()?;

    Ok(())
}
