//! Hand landmark sources.
//!
//! The live source runs the MediaPipe hand landmarker in a Python
//! subprocess. Frames go to its stdin as a little-endian
//! `width, height, channels` header followed by raw BGR bytes; one JSON line
//! per frame comes back on stdout. The replay source reads recorded JSON
//! lines, one `HandFrame` or `null` per frame.
//!
//! # Setup
//!
//! ```text
//! python3 -m venv .venv && .venv/bin/pip install mediapipe numpy
//! wget https://storage.googleapis.com/mediapipe-models/hand_landmarker/hand_landmarker/float16/latest/hand_landmarker.task -O models/hand_landmarker.task
//! ```

use crate::{
    constants::{DEFAULT_HAND_CONFIDENCE, NUM_HAND_LANDMARKS},
    error::{Error, Result},
    landmarks::{HandFrame, Handedness, Landmark},
};
use log::{debug, info, warn};
use opencv::{core::Mat, prelude::*};
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

/// Anything that yields at most one hand per video frame
pub trait LandmarkSource {
    /// Landmarks for `frame`, or `None` when no hand was found
    ///
    /// # Errors
    ///
    /// Returns an error when the source fails irrecoverably
    fn detect(&mut self, frame: Option<&Mat>) -> Result<Option<HandFrame>>;

    /// Whether the source has no more frames to give
    fn is_exhausted(&self) -> bool {
        false
    }
}

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f64,
    y: f64,
    #[serde(default)]
    z: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: Option<String>,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

fn parse_handedness(label: &str) -> Option<Handedness> {
    match label.to_ascii_lowercase().as_str() {
        "left" => Some(Handedness::Left),
        "right" => Some(Handedness::Right),
        _ => None,
    }
}

/// Decode one detector response line into the first confident hand
///
/// # Errors
///
/// Returns `Error::Json` if the line is not a detection result
pub fn parse_detection(line: &str, min_confidence: f32) -> Result<Option<HandFrame>> {
    let result: DetectionResult = serde_json::from_str(line.trim())?;

    if let Some(error) = result.error {
        warn!("Hand detector error: {}", error);
        return Ok(None);
    }

    let Some(hand) = result.hands.into_iter().find(|hand| hand.score >= min_confidence) else {
        return Ok(None);
    };
    if hand.landmarks.len() != NUM_HAND_LANDMARKS {
        debug!("Expected {} landmarks, got {}", NUM_HAND_LANDMARKS, hand.landmarks.len());
    }

    let landmarks = hand
        .landmarks
        .into_iter()
        .map(|lm| Landmark { x: lm.x, y: lm.y, z: lm.z })
        .collect();
    Ok(Some(HandFrame {
        landmarks,
        handedness: hand.handedness.as_deref().and_then(parse_handedness),
    }))
}

/// How to launch the detector subprocess
#[derive(Debug, Clone)]
pub struct SubprocessConfig {
    /// Python interpreter
    pub python: PathBuf,
    /// Detector script speaking the frame protocol
    pub script: PathBuf,
    /// Minimum hand score
    pub min_confidence: f32,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from(".venv/bin/python"),
            script: PathBuf::from("scripts/hand_detect.py"),
            min_confidence: DEFAULT_HAND_CONFIDENCE,
        }
    }
}

/// MediaPipe hand landmarker running in a Python subprocess
pub struct SubprocessLandmarkSource {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    min_confidence: f32,
}

impl SubprocessLandmarkSource {
    /// Start the subprocess and wait for its `READY` line
    ///
    /// # Errors
    ///
    /// Returns `Error::LandmarkSource` if the interpreter or script is missing,
    /// or the subprocess does not signal readiness
    pub fn spawn(config: &SubprocessConfig) -> Result<Self> {
        if !config.script.exists() {
            return Err(Error::LandmarkSource(format!(
                "Hand detection script not found at {}",
                config.script.display()
            )));
        }
        if !config.python.exists() {
            return Err(Error::LandmarkSource(format!(
                "Python interpreter not found at {}. Run: python3 -m venv .venv && .venv/bin/pip install mediapipe numpy",
                config.python.display()
            )));
        }

        info!("Starting MediaPipe hand detector subprocess...");
        let mut process = Command::new(&config.python)
            .arg(&config.script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::LandmarkSource(format!("Failed to start Python subprocess: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::LandmarkSource("Failed to get subprocess stdin".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::LandmarkSource("Failed to get subprocess stdout".to_string()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            return Err(Error::LandmarkSource(format!(
                "Subprocess did not signal ready, got: {}",
                ready_line.trim()
            )));
        }
        info!("MediaPipe hand detector ready");

        Ok(Self {
            process,
            stdin,
            stdout,
            min_confidence: config.min_confidence.clamp(0.0, 1.0),
        })
    }

    fn send_frame(&mut self, frame: &Mat) -> Result<()> {
        let width = u32::try_from(frame.cols())
            .map_err(|_| Error::InvalidInput(format!("Invalid frame width: {}", frame.cols())))?;
        let height = u32::try_from(frame.rows())
            .map_err(|_| Error::InvalidInput(format!("Invalid frame height: {}", frame.rows())))?;
        let channels = u32::try_from(frame.channels())
            .map_err(|_| Error::InvalidInput(format!("Invalid channel count: {}", frame.channels())))?;
        let data = frame.data_bytes()?;

        self.stdin.write_all(&width.to_le_bytes())?;
        self.stdin.write_all(&height.to_le_bytes())?;
        self.stdin.write_all(&channels.to_le_bytes())?;
        self.stdin.write_all(data)?;
        self.stdin.flush()?;
        Ok(())
    }
}

impl LandmarkSource for SubprocessLandmarkSource {
    fn detect(&mut self, frame: Option<&Mat>) -> Result<Option<HandFrame>> {
        let Some(frame) = frame.filter(|frame| !frame.empty()) else {
            return Ok(None);
        };
        self.send_frame(frame)?;

        let mut response = String::new();
        if self.stdout.read_line(&mut response)? == 0 {
            return Err(Error::LandmarkSource("Hand detector subprocess exited".to_string()));
        }
        let hand = parse_detection(&response, self.min_confidence)?;
        if let Some(hand) = &hand {
            if let Some(tip) = hand.index_tip() {
                debug!("Hand detected: {:?}, index_tip=({:.3},{:.3})", hand.handedness, tip.x, tip.y);
            }
        }
        Ok(hand)
    }
}

impl Drop for SubprocessLandmarkSource {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Recorded hand frames, one JSON value per line
pub struct ReplaySource<R> {
    reader: R,
    line_number: usize,
    exhausted: bool,
}

impl ReplaySource<BufReader<File>> {
    /// Open a recording
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Replaying hand frames from {}", path.display());
        Ok(Self::from_reader(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Replay from any buffered reader
    pub const fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            exhausted: false,
        }
    }
}

impl<R: BufRead> LandmarkSource for ReplaySource<R> {
    fn detect(&mut self, _frame: Option<&Mat>) -> Result<Option<HandFrame>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                if !self.exhausted {
                    info!("Replay finished after {} lines", self.line_number);
                }
                self.exhausted = true;
                return Ok(None);
            }
            self.line_number += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        serde_json::from_str::<Option<HandFrame>>(line.trim()).map_err(|e| {
            Error::LandmarkSource(format!("Invalid replay line {}: {e}", self.line_number))
        })
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
