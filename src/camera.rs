//! Camera capture and RGBA frame snapshots.

use crate::{
    error::{Error, Result},
    session::FrameProvider,
};
use image::RgbaImage;
use log::{info, warn};
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};

/// Where frames come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Convert a BGR `Mat` into an RGBA image
///
/// # Errors
///
/// Returns an error if the frame is empty or not 3-channel
pub fn mat_to_rgba(frame: &Mat) -> Result<RgbaImage> {
    let rows = frame.rows();
    let cols = frame.cols();
    if rows <= 0 || cols <= 0 {
        return Err(Error::InvalidInput(format!("Invalid frame size: {cols}x{rows}")));
    }
    if frame.channels() != 3 {
        return Err(Error::InvalidInput(format!(
            "Expected a 3-channel BGR frame, got {} channels",
            frame.channels()
        )));
    }

    let mut rgba = Mat::default();
    imgproc::cvt_color(frame, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;
    let rgba = if rgba.is_continuous() { rgba } else { rgba.try_clone()? };

    let width = u32::try_from(cols).map_err(|_| Error::InvalidInput(format!("Invalid width: {cols}")))?;
    let height = u32::try_from(rows).map_err(|_| Error::InvalidInput(format!("Invalid height: {rows}")))?;
    RgbaImage::from_raw(width, height, rgba.data_bytes()?.to_vec())
        .ok_or_else(|| Error::Camera("Frame buffer size mismatch".to_string()))
}

/// Video capture holding the most recent frame
pub struct Camera {
    source: VideoSource,
    capture: VideoCapture,
    frame: Mat,
}

impl Camera {
    /// Open a camera or video file
    ///
    /// # Errors
    ///
    /// Returns `Error::Camera` if the source cannot be opened
    pub fn open(source: &VideoSource) -> Result<Self> {
        let capture = match source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
                // Low latency over smoothness
                if !cap.set(CAP_PROP_BUFFERSIZE, 1.0)? {
                    warn!("Camera ignored buffer size request");
                }
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };
        if !capture.is_opened()? {
            return Err(Error::Camera(format!("Failed to open {source:?}")));
        }

        Ok(Self {
            source: source.clone(),
            capture,
            frame: Mat::default(),
        })
    }

    /// Grab the next frame; `false` when none was available
    ///
    /// # Errors
    ///
    /// Returns an error if the capture backend fails
    pub fn read(&mut self) -> Result<bool> {
        let grabbed = self.capture.read(&mut self.frame)?;
        Ok(grabbed && !self.frame.empty())
    }

    /// Most recent frame, BGR
    #[must_use]
    pub const fn frame(&self) -> &Mat {
        &self.frame
    }

    /// Whether the source is a finite video file
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.source, VideoSource::File(_))
    }
}

impl FrameProvider for Camera {
    fn is_ready(&self) -> bool {
        !self.frame.empty()
    }

    fn snapshot(&mut self) -> Option<RgbaImage> {
        match mat_to_rgba(&self.frame) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Failed to snapshot frame: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    #[test]
    fn test_mat_to_rgba_swaps_channels() {
        let bgr = Mat::new_rows_cols_with_default(2, 3, CV_8UC3, Scalar::new(10.0, 20.0, 30.0, 0.0)).unwrap();
        let rgba = mat_to_rgba(&bgr).unwrap();
        assert_eq!(rgba.dimensions(), (3, 2));
        assert_eq!(rgba.get_pixel(2, 1).0, [30, 20, 10, 255]);
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        assert!(mat_to_rgba(&Mat::default()).is_err());
    }

    #[test]
    #[ignore] // Requires a camera
    fn test_open_camera() {
        let camera = Camera::open(&VideoSource::Camera(0));
        assert!(camera.is_ok());
    }
}
