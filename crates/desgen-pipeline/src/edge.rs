//! Gradient-based edge detection.
//!
//! The default [`EdgeDetectorKind::TwoLevel`] detector smooths with the
//! light 3x3 kernel, takes Sobel responses in both directions, and
//! classifies each pixel by its gradient magnitude alone:
//!
//! - magnitude > `high` -> [`EdgeLevel::Strong`] (255)
//! - magnitude > `low`  -> [`EdgeLevel::Weak`] (128)
//! - otherwise          -> [`EdgeLevel::Background`] (0)
//!
//! There is no non-maximum suppression, so edges come out several pixels
//! thick. [`EdgeDetectorKind::Canny`] runs full Canny (suppression plus
//! hysteresis, see [`crate::canny`]) for thin edges instead.
//!
//! The smoothed buffer has a zero border one pixel wide, and Sobel reads
//! it: on a bright image the ring one pixel in from the edge classifies
//! as an edge. Only the outermost ring is always background.

use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::blur::{SmoothingKernel, for_each_interior, smooth};
use crate::types::{Dimensions, PipelineError, validate_thresholds};

const SOBEL_X: [i32; 9] = [
    -1, 0, 1, //
    -2, 0, 2, //
    -1, 0, 1,
];

const SOBEL_Y: [i32; 9] = [
    -1, -2, -1, //
    0, 0, 0, //
    1, 2, 1,
];

/// Gradients are computed wherever the 3x3 Sobel window fits inside
/// the image.
const GRADIENT_MARGIN: u32 = 1;

/// Classification of a single edge-map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeLevel {
    /// Not an edge.
    Background,
    /// Gradient above the low threshold only.
    Weak,
    /// Gradient above the high threshold.
    Strong,
}

impl EdgeLevel {
    /// Stored intensity for this level.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Background => 0,
            Self::Weak => 128,
            Self::Strong => 255,
        }
    }

    /// Level for a stored intensity, if it is one of 0, 128 or 255.
    #[must_use]
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Background),
            128 => Some(Self::Weak),
            255 => Some(Self::Strong),
            _ => None,
        }
    }
}

/// Three-level edge classification of an image.
///
/// Every cell holds 0, 128, or 255 (see [`EdgeLevel`]).
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap(GrayImage);

impl EdgeMap {
    /// An all-background edge map.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self(GrayImage::new(width, height))
    }

    /// Wrap an existing buffer of edge levels.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if any pixel is not 0, 128,
    /// or 255.
    pub fn from_levels(image: GrayImage) -> Result<Self, PipelineError> {
        if let Some((x, y, p)) = image
            .enumerate_pixels()
            .find(|(_, _, p)| EdgeLevel::from_value(p.0[0]).is_none())
        {
            return Err(PipelineError::InvalidInput(format!(
                "edge map pixel ({x},{y}) has value {}, expected 0, 128 or 255",
                p.0[0],
            )));
        }
        Ok(Self(image))
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Dimensions in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.0)
    }

    /// Raw stored intensity at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[must_use]
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.0.get_pixel(x, y).0[0]
    }

    /// Classification at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[must_use]
    pub fn level(&self, x: u32, y: u32) -> EdgeLevel {
        match self.value(x, y) {
            255 => EdgeLevel::Strong,
            128 => EdgeLevel::Weak,
            _ => EdgeLevel::Background,
        }
    }

    /// Set the classification at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, level: EdgeLevel) {
        self.0.put_pixel(x, y, image::Luma([level.value()]));
    }

    /// Number of cells at the given level.
    #[must_use]
    pub fn count(&self, level: EdgeLevel) -> u64 {
        let v = level.value();
        self.0.pixels().map(|p| u64::from(p.0[0] == v)).sum()
    }

    /// Borrow the underlying buffer (e.g. to save it as a preview).
    #[must_use]
    pub const fn as_image(&self) -> &GrayImage {
        &self.0
    }

}

/// Selects which edge detection algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeDetectorKind {
    /// Sobel magnitude with a direct two-level threshold (no suppression).
    #[default]
    TwoLevel,
    /// Full Canny with non-maximum suppression and hysteresis.
    ///
    /// Edges are one pixel wide and every edge pixel is strong; there are
    /// no weak cells in the output.
    Canny,
}

impl fmt::Display for EdgeDetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoLevel => f.write_str("TwoLevel"),
            Self::Canny => f.write_str("Canny"),
        }
    }
}

/// Trait for edge detection strategies.
pub trait EdgeDetector {
    /// Classify every pixel of `image` as background, weak, or strong edge.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] for an empty image and
    /// [`PipelineError::InvalidParameter`] unless `0 <= low < high`.
    fn detect(&self, image: &GrayImage, low: i32, high: i32) -> Result<EdgeMap, PipelineError>;
}

impl EdgeDetector for EdgeDetectorKind {
    fn detect(&self, image: &GrayImage, low: i32, high: i32) -> Result<EdgeMap, PipelineError> {
        Dimensions::of(image).ensure_non_empty()?;
        validate_thresholds(low, high)?;
        Ok(match *self {
            Self::TwoLevel => two_level(image, low, high),
            Self::Canny => canny(image, low, high),
        })
    }
}

/// Run the default two-level detector.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] for an empty image and
/// [`PipelineError::InvalidParameter`] unless `0 <= low < high`.
pub fn detect_edges(image: &GrayImage, low: i32, high: i32) -> Result<EdgeMap, PipelineError> {
    EdgeDetectorKind::TwoLevel.detect(image, low, high)
}

/// Sobel responses `(gx, gy)` at an interior pixel of `image`.
fn sobel_at(image: &GrayImage, x: u32, y: u32) -> (i32, i32) {
    let mut gx = 0;
    let mut gy = 0;
    for (k, (dy, dx)) in (0..3u32)
        .flat_map(|dy| (0..3u32).map(move |dx| (dy, dx)))
        .enumerate()
    {
        let v = i32::from(image.get_pixel(x + dx - 1, y + dy - 1).0[0]);
        gx += v * SOBEL_X[k];
        gy += v * SOBEL_Y[k];
    }
    (gx, gy)
}

/// Squared gradient magnitude of the light-smoothed image at every pixel.
///
/// Pixels outside the valid region are zero.
#[must_use]
pub fn gradient_magnitude_squared(image: &GrayImage) -> Vec<i64> {
    let (w, h) = image.dimensions();
    let blurred = smooth(image, SmoothingKernel::Light3x3);
    let mut out = vec![0i64; w as usize * h as usize];
    for_each_interior(w, h, GRADIENT_MARGIN, |x, y| {
        let (gx, gy) = sobel_at(&blurred, x, y);
        out[y as usize * w as usize + x as usize] =
            i64::from(gx) * i64::from(gx) + i64::from(gy) * i64::from(gy);
    });
    out
}

fn two_level(image: &GrayImage, low: i32, high: i32) -> EdgeMap {
    // Magnitudes and thresholds are non-negative, so comparing squares
    // is exact and avoids the square root.
    let low_sq = i64::from(low) * i64::from(low);
    let high_sq = i64::from(high) * i64::from(high);

    let (w, h) = image.dimensions();
    let magnitudes = gradient_magnitude_squared(image);
    let mut edges = EdgeMap::new(w, h);
    for (i, &m) in magnitudes.iter().enumerate() {
        let level = if m > high_sq {
            EdgeLevel::Strong
        } else if m > low_sq {
            EdgeLevel::Weak
        } else {
            continue;
        };
        #[allow(clippy::cast_possible_truncation)]
        edges.set((i % w as usize) as u32, (i / w as usize) as u32, level);
    }
    edges
}

#[allow(clippy::cast_precision_loss)]
fn canny(image: &GrayImage, low: i32, high: i32) -> EdgeMap {
    let binary = crate::canny::canny(image, low as f32, high as f32);
    EdgeMap(GrayImage::from_fn(binary.width(), binary.height(), |x, y| {
        let level = if binary.get_pixel(x, y).0[0] > 0 {
            EdgeLevel::Strong
        } else {
            EdgeLevel::Background
        };
        image::Luma([level.value()])
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 20x20 image with a sharp vertical boundary at x = 10.
    fn sharp_edge_image() -> GrayImage {
        GrayImage::from_fn(20, 20, |x, _y| {
            if x < 10 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        })
    }

    #[test]
    fn uniform_image_outlines_the_smoothing_border() {
        // The zero border left by smoothing gives every pixel one step in
        // from the edge a gradient of 4 * 200 = 800.
        let img = GrayImage::from_pixel(20, 20, image::Luma([200]));
        let edges = detect_edges(&img, 50, 150).unwrap();
        assert_eq!(edges.level(5, 1), EdgeLevel::Strong);
        assert_eq!(edges.level(1, 5), EdgeLevel::Strong);
        assert_eq!(edges.level(18, 12), EdgeLevel::Strong);
        assert_eq!(edges.level(1, 1), EdgeLevel::Strong);
        assert_eq!(edges.level(5, 5), EdgeLevel::Background);
        assert_eq!(edges.level(2, 5), EdgeLevel::Background);
        // Ring of 18x18 cells one pixel in from the border.
        assert_eq!(edges.count(EdgeLevel::Strong), 68);
        assert_eq!(edges.count(EdgeLevel::Weak), 0);
    }

    #[test]
    fn black_image_produces_no_edges() {
        let img = GrayImage::new(20, 20);
        let edges = detect_edges(&img, 0, 1).unwrap();
        assert_eq!(edges.count(EdgeLevel::Background), 400);
    }

    #[test]
    fn sharp_edge_is_strong() {
        let edges = detect_edges(&sharp_edge_image(), 50, 150).unwrap();
        assert_eq!(edges.level(10, 10), EdgeLevel::Strong);
        assert_eq!(edges.level(9, 10), EdgeLevel::Strong);
        // Far from the boundary the gradient is zero.
        assert_eq!(edges.level(4, 10), EdgeLevel::Background);
        assert_eq!(edges.level(15, 10), EdgeLevel::Background);
    }

    #[test]
    fn outermost_ring_is_always_background() {
        let edges = detect_edges(&sharp_edge_image(), 0, 1).unwrap();
        for x in 0..20 {
            for y in [0, 19] {
                assert_eq!(edges.level(x, y), EdgeLevel::Background, "({x},{y})");
                assert_eq!(edges.level(y, x), EdgeLevel::Background, "({y},{x})");
            }
        }
    }

    #[test]
    fn weak_band_between_thresholds() {
        // A gentle ramp of 4 intensity levels per column gives a Sobel
        // magnitude of 4 * 8 = 32 in the interior.
        let img = GrayImage::from_fn(12, 12, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            image::Luma([(x * 4) as u8])
        });
        let weak = detect_edges(&img, 20, 40).unwrap();
        assert_eq!(weak.level(6, 6), EdgeLevel::Weak);
        let strong = detect_edges(&img, 10, 20).unwrap();
        assert_eq!(strong.level(6, 6), EdgeLevel::Strong);
        let none = detect_edges(&img, 40, 80).unwrap();
        assert_eq!(none.level(6, 6), EdgeLevel::Background);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        // Same ramp: magnitude is exactly 32.
        let img = GrayImage::from_fn(12, 12, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            image::Luma([(x * 4) as u8])
        });
        let edges = detect_edges(&img, 32, 100).unwrap();
        assert_eq!(edges.level(6, 6), EdgeLevel::Background);
        let edges = detect_edges(&img, 31, 100).unwrap();
        assert_eq!(edges.level(6, 6), EdgeLevel::Weak);
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = GrayImage::new(17, 31);
        let edges = detect_edges(&img, 50, 150).unwrap();
        assert_eq!(edges.width(), 17);
        assert_eq!(edges.height(), 31);
    }

    #[test]
    fn low_not_below_high_is_rejected() {
        let img = sharp_edge_image();
        assert!(matches!(
            detect_edges(&img, 150, 150),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            detect_edges(&img, 200, 100),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let img = sharp_edge_image();
        assert!(matches!(
            detect_edges(&img, -5, 100),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_image_is_invalid_input() {
        let img = GrayImage::new(0, 0);
        assert!(matches!(
            detect_edges(&img, 10, 20),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn canny_produces_only_strong_or_background() {
        let edges = EdgeDetectorKind::Canny
            .detect(&sharp_edge_image(), 50, 150)
            .unwrap();
        assert!(edges.count(EdgeLevel::Strong) > 0);
        assert_eq!(edges.count(EdgeLevel::Weak), 0);
    }

    #[test]
    fn canny_accepts_a_zero_low_threshold() {
        let edges = EdgeDetectorKind::Canny
            .detect(&sharp_edge_image(), 0, 1)
            .unwrap();
        assert!(edges.count(EdgeLevel::Strong) > 0);
        assert_eq!(edges.level(0, 10), EdgeLevel::Background);
    }

    #[test]
    fn canny_validates_thresholds_too() {
        assert!(
            EdgeDetectorKind::Canny
                .detect(&sharp_edge_image(), 100, 50)
                .is_err()
        );
    }

    #[test]
    fn from_levels_rejects_other_values() {
        let mut img = GrayImage::new(3, 3);
        img.put_pixel(1, 1, image::Luma([42]));
        assert!(matches!(
            EdgeMap::from_levels(img),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn set_and_level_agree() {
        let mut edges = EdgeMap::new(4, 4);
        edges.set(2, 1, EdgeLevel::Weak);
        edges.set(3, 3, EdgeLevel::Strong);
        assert_eq!(edges.level(2, 1), EdgeLevel::Weak);
        assert_eq!(edges.value(3, 3), 255);
        assert_eq!(edges.count(EdgeLevel::Background), 14);
    }

    #[test]
    fn detection_is_deterministic() {
        let img = GrayImage::from_fn(30, 30, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Luma([((x * 37 + y * 91) % 256) as u8])
        });
        assert_eq!(
            detect_edges(&img, 40, 120).unwrap(),
            detect_edges(&img, 40, 120).unwrap()
        );
    }
}
