//! Surface detector: finds the largest light-coloured region of a video frame.
//!
//! The frame is thresholded into a light/dark mask, connected light regions
//! are grown by flood fill from a sparse seed grid, and the largest one wins.
//! When no region is big enough a coarse bounding box of all light pixels is
//! tried instead.

use crate::{
    constants::{
        SURFACE_FALLBACK_MIN_EXTENT, SURFACE_FALLBACK_PADDING, SURFACE_FALLBACK_STEP,
        SURFACE_MIN_AREA, SURFACE_MIN_COMPONENT_AREA, SURFACE_SEED_STEP, SURFACE_WHITE_THRESHOLD,
    },
    geometry::BoundingBox,
};
use image::RgbaImage;
use log::debug;

/// Surface detector parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDetectorConfig {
    /// Luminance or mean RGB at or above which a pixel is light
    pub brightness_threshold: f64,
    /// Seed spacing of the flood fill, in pixels
    pub seed_step: usize,
    /// Sampling step of the fallback scan, in pixels
    pub fallback_step: usize,
    /// Normalized component area under which the fallback scan runs
    pub min_component_area: f64,
    /// Minimum normalized width and height of a fallback box
    pub fallback_min_extent: f64,
    /// Padding added to each side of a fallback box
    pub fallback_padding: f64,
    /// Minimum normalized area of an accepted surface
    pub min_area: f64,
}

impl Default for SurfaceDetectorConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: SURFACE_WHITE_THRESHOLD,
            seed_step: SURFACE_SEED_STEP,
            fallback_step: SURFACE_FALLBACK_STEP,
            min_component_area: SURFACE_MIN_COMPONENT_AREA,
            fallback_min_extent: SURFACE_FALLBACK_MIN_EXTENT,
            fallback_padding: SURFACE_FALLBACK_PADDING,
            min_area: SURFACE_MIN_AREA,
        }
    }
}

/// How a candidate box was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// Largest flood-filled component
    FloodFill,
    /// Padded bounding box of sampled light pixels
    Fallback,
}

/// Diagnostics of one detection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionStats {
    /// Fraction of pixels classified as light
    pub light_fraction: f64,
    /// Best candidate before the minimum-area check
    pub candidate: Option<BoundingBox>,
    /// Method that produced the candidate
    pub method: Option<DetectionMethod>,
    /// Accepted surface
    pub surface: Option<BoundingBox>,
}

/// Whether an RGBA pixel counts as light
#[must_use]
pub fn is_light_pixel(rgba: [u8; 4], threshold: f64) -> bool {
    let (r, g, b) = (f64::from(rgba[0]), f64::from(rgba[1]), f64::from(rgba[2]));
    let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
    let mean = (r + g + b) / 3.0;
    luminance >= threshold || mean >= threshold
}

/// Binary light/dark mask, row-major
pub struct LightMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    light_pixels: usize,
}

impl LightMask {
    /// Threshold a frame
    #[must_use]
    pub fn from_image(frame: &RgbaImage, threshold: f64) -> Self {
        let cells: Vec<bool> = frame.pixels().map(|p| is_light_pixel(p.0, threshold)).collect();
        let light_pixels = cells.iter().filter(|&&light| light).count();
        Self {
            width: frame.width() as usize,
            height: frame.height() as usize,
            cells,
            light_pixels,
        }
    }

    /// Mask width in pixels
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Mask height in pixels
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether `(x, y)` is light
    #[must_use]
    pub fn is_light(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Fraction of light pixels
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn light_fraction(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.light_pixels as f64 / self.cells.len() as f64
        }
    }
}

/// Pixel bounds and size of one connected light region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Leftmost column
    pub min_x: usize,
    /// Rightmost column
    pub max_x: usize,
    /// Top row
    pub min_y: usize,
    /// Bottom row
    pub max_y: usize,
    /// Pixel count
    pub area: usize,
}

impl Component {
    /// Bounds normalized against the mask size
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized(&self, width: usize, height: usize) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        BoundingBox::new(
            self.min_x as f64 / w,
            self.min_y as f64 / h,
            (self.max_x - self.min_x) as f64 / w,
            (self.max_y - self.min_y) as f64 / h,
        )
    }
}

/// Grow the 4-connected light region containing `(start_x, start_y)`,
/// marking it in `visited`. Uses an explicit stack.
pub fn flood_fill(mask: &LightMask, visited: &mut [bool], start_x: usize, start_y: usize) -> Option<Component> {
    let width = mask.width();
    let height = mask.height();
    let start = start_y * width + start_x;
    if visited[start] || !mask.is_light(start_x, start_y) {
        return None;
    }

    let mut component = Component {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        area: 0,
    };
    let mut stack = vec![(start_x, start_y)];
    visited[start] = true;

    while let Some((x, y)) = stack.pop() {
        component.area += 1;
        component.min_x = component.min_x.min(x);
        component.max_x = component.max_x.max(x);
        component.min_y = component.min_y.min(y);
        component.max_y = component.max_y.max(y);

        let neighbours = [
            (x + 1 < width).then(|| (x + 1, y)),
            x.checked_sub(1).map(|nx| (nx, y)),
            (y + 1 < height).then(|| (x, y + 1)),
            y.checked_sub(1).map(|ny| (x, ny)),
        ];
        for (nx, ny) in neighbours.into_iter().flatten() {
            let idx = ny * width + nx;
            if !visited[idx] && mask.is_light(nx, ny) {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
    }

    Some(component)
}

/// Light surface detector
#[derive(Debug, Clone, Default)]
pub struct SurfaceDetector {
    config: SurfaceDetectorConfig,
}

impl SurfaceDetector {
    /// Create a detector
    ///
    /// # Panics
    ///
    /// Panics if either sampling step is zero
    #[must_use]
    pub fn new(config: SurfaceDetectorConfig) -> Self {
        assert!(config.seed_step > 0, "Seed step must be greater than 0");
        assert!(config.fallback_step > 0, "Fallback step must be greater than 0");
        Self { config }
    }

    /// Detector parameters
    #[must_use]
    pub const fn config(&self) -> &SurfaceDetectorConfig {
        &self.config
    }

    /// Find the best light surface in `frame`
    #[must_use]
    pub fn detect(&self, frame: &RgbaImage) -> Option<BoundingBox> {
        self.detect_with_stats(frame).surface
    }

    /// Find the best light surface in `frame`, with diagnostics
    #[must_use]
    pub fn detect_with_stats(&self, frame: &RgbaImage) -> DetectionStats {
        let mut stats = DetectionStats {
            light_fraction: 0.0,
            candidate: None,
            method: None,
            surface: None,
        };
        if frame.width() == 0 || frame.height() == 0 {
            return stats;
        }

        let mask = LightMask::from_image(frame, self.config.brightness_threshold);
        stats.light_fraction = mask.light_fraction();
        debug!(
            "Light pixels: {:.1}% (threshold {})",
            stats.light_fraction * 100.0,
            self.config.brightness_threshold
        );

        if let Some(largest) = self.largest_component(&mask) {
            stats.candidate = Some(largest.normalized(mask.width(), mask.height()));
            stats.method = Some(DetectionMethod::FloodFill);
        }

        let too_small = stats
            .candidate
            .map_or(true, |bbox| bbox.area() < self.config.min_component_area);
        if too_small {
            if let Some(fallback) = self.fallback_box(&mask) {
                stats.candidate = Some(fallback);
                stats.method = Some(DetectionMethod::Fallback);
            }
        }

        match stats.candidate {
            Some(bbox) if bbox.area() >= self.config.min_area => {
                debug!(
                    "Surface detected ({:?}): {:.1}% x {:.1}%",
                    stats.method,
                    bbox.width * 100.0,
                    bbox.height * 100.0
                );
                stats.surface = Some(bbox);
            }
            Some(bbox) => debug!(
                "Light region too small: {:.1}% of frame (min {:.1}%)",
                bbox.area() * 100.0,
                self.config.min_area * 100.0
            ),
            None => debug!("No light region found"),
        }

        stats
    }

    /// Largest component reachable from the seed grid; ties keep the first
    /// one found in scan order
    fn largest_component(&self, mask: &LightMask) -> Option<Component> {
        let mut visited = vec![false; mask.width() * mask.height()];
        let mut largest: Option<Component> = None;

        for y in (0..mask.height()).step_by(self.config.seed_step) {
            for x in (0..mask.width()).step_by(self.config.seed_step) {
                if let Some(component) = flood_fill(mask, &mut visited, x, y) {
                    if largest.map_or(true, |best| component.area > best.area) {
                        largest = Some(component);
                    }
                }
            }
        }

        largest
    }

    /// Padded bounding box of every sampled light pixel
    #[allow(clippy::cast_precision_loss)]
    fn fallback_box(&self, mask: &LightMask) -> Option<BoundingBox> {
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for y in (0..mask.height()).step_by(self.config.fallback_step) {
            for x in (0..mask.width()).step_by(self.config.fallback_step) {
                if mask.is_light(x, y) {
                    bounds = Some(match bounds {
                        None => (x, x, y, y),
                        Some((min_x, max_x, min_y, max_y)) => {
                            (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
                        }
                    });
                }
            }
        }

        let (min_x, max_x, min_y, max_y) = bounds?;
        let (w, h) = (mask.width() as f64, mask.height() as f64);
        let box_width = (max_x - min_x) as f64 / w;
        let box_height = (max_y - min_y) as f64 / h;
        let min_extent = self.config.fallback_min_extent;
        if box_width <= min_extent || box_height <= min_extent {
            debug!(
                "Fallback region too thin: {:.1}% x {:.1}%",
                box_width * 100.0,
                box_height * 100.0
            );
            return None;
        }

        let padding = self.config.fallback_padding;
        let x = (min_x as f64 / w - padding).max(0.0);
        let y = (min_y as f64 / h - padding).max(0.0);
        Some(BoundingBox::new(
            x,
            y,
            (box_width + 2.0 * padding).min(1.0 - x),
            (box_height + 2.0 * padding).min(1.0 - y),
        ))
    }
}
