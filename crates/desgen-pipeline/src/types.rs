//! Shared types for the desgen image-to-curve pipeline.

use serde::{Deserialize, Serialize};

use crate::edge::EdgeDetectorKind;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` for hosts that hand the pipeline a decoded
/// color buffer.
pub use image::RgbaImage;

/// A 2D point.
///
/// Used both for pixel positions (integer-valued, +Y down) and for
/// target-space positions (+Y up). The two spaces live in different
/// containers: [`Contour`] holds pixel points, [`Polyline`] holds
/// target-space points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Ordered pixel-space points produced by contour tracing.
///
/// The order is the order in which the tracer visited the pixels. It is
/// not a geometric walk around the region: consecutive points are 8-connected
/// most of the time but the sequence can jump back when the trace unwinds.
/// Simplification is sensitive to this order (it picks the first and last
/// points as its initial chord).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Create a contour from pixel-space points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of traced pixels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the contour and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// A sequence of connected target-space points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// A finished curve ready for a plotting surface.
///
/// Points are in target space. Curves are immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    id: String,
    points: Vec<Point>,
    color: String,
}

impl Curve {
    /// Assemble a curve from its parts.
    #[must_use]
    pub const fn new(id: String, points: Vec<Point>, color: String) -> Self {
        Self { id, points, color }
    }

    /// Identifier of the form `curve_<n>`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target-space points in drawing order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Display color as a CSS hex string.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Number of points in the curve.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the curve has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an existing grayscale buffer.
    #[must_use]
    pub fn of(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// The longer of the two axes, as `f64`.
    #[must_use]
    pub fn longer_dim(self) -> f64 {
        f64::from(self.width.max(self.height))
    }

    /// Fail with [`PipelineError::InvalidInput`] if either axis is zero.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] for an empty image.
    pub fn ensure_non_empty(self) -> Result<(), PipelineError> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidInput(format!(
                "image must have non-zero dimensions, got {}x{}",
                self.width, self.height,
            )));
        }
        Ok(())
    }
}

/// Configuration for the image-to-curve pipeline.
///
/// Every field has a default (see the `DEFAULT_*` constants), so a JSON
/// config only needs to name the fields it changes. Call
/// [`validate`](Self::validate) before use; the pipeline entry points do
/// this themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gradient magnitudes above this (and at most `high_threshold`) are
    /// weak edges. Must be `>= 0` and `< high_threshold`.
    pub low_threshold: i32,

    /// Gradient magnitudes above this are strong edges.
    pub high_threshold: i32,

    /// Keep at most this many curves, longest contours first.
    pub max_curves: usize,

    /// Run contrast stretch, strong blur, and morphological closing before
    /// edge detection.
    pub enhance: bool,

    /// Douglas-Peucker tolerance in target-space units.
    pub simplify_tolerance: f64,

    /// Extent of the target coordinate system along the image's longer axis.
    pub target_span: f64,

    /// Which edge detector to run.
    pub edge_detector: EdgeDetectorKind,
}

impl PipelineConfig {
    /// Default weak-edge threshold.
    pub const DEFAULT_LOW_THRESHOLD: i32 = 50;
    /// Default strong-edge threshold.
    pub const DEFAULT_HIGH_THRESHOLD: i32 = 150;
    /// Default number of curves kept.
    pub const DEFAULT_MAX_CURVES: usize = 10;
    /// Default simplification tolerance.
    pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.1;
    /// Default target-space span (the plot is roughly 10 units wide).
    pub const DEFAULT_TARGET_SPAN: f64 = 10.0;

    /// Check every field against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_thresholds(self.low_threshold, self.high_threshold)?;
        validate_max_curves(self.max_curves)?;
        validate_tolerance(self.simplify_tolerance)?;
        validate_target_span(self.target_span)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            low_threshold: Self::DEFAULT_LOW_THRESHOLD,
            high_threshold: Self::DEFAULT_HIGH_THRESHOLD,
            max_curves: Self::DEFAULT_MAX_CURVES,
            enhance: false,
            simplify_tolerance: Self::DEFAULT_SIMPLIFY_TOLERANCE,
            target_span: Self::DEFAULT_TARGET_SPAN,
            edge_detector: EdgeDetectorKind::default(),
        }
    }
}

pub(crate) fn validate_thresholds(low: i32, high: i32) -> Result<(), PipelineError> {
    if low < 0 || high < 0 {
        return Err(PipelineError::InvalidParameter(format!(
            "thresholds must be non-negative, got low={low} high={high}",
        )));
    }
    if low >= high {
        return Err(PipelineError::InvalidParameter(format!(
            "low threshold must be below high threshold, got low={low} high={high}",
        )));
    }
    Ok(())
}

pub(crate) fn validate_max_curves(max_curves: usize) -> Result<(), PipelineError> {
    if max_curves == 0 {
        return Err(PipelineError::InvalidParameter(
            "max_curves must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_tolerance(tolerance: f64) -> Result<(), PipelineError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(PipelineError::InvalidParameter(format!(
            "simplify tolerance must be finite and non-negative, got {tolerance}",
        )));
    }
    Ok(())
}

pub(crate) fn validate_target_span(span: f64) -> Result<(), PipelineError> {
    if !span.is_finite() || span <= 0.0 {
        return Err(PipelineError::InvalidParameter(format!(
            "target span must be finite and positive, got {span}",
        )));
    }
    Ok(())
}

/// Result of running the full pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Curves in selection order (longest source contour first).
    pub curves: Vec<Curve>,

    /// Number of contours traced before ranking and selection.
    pub contour_count: usize,

    /// Dimensions of the processed image in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The pixel buffer is empty or inconsistent with its dimensions.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A tunable parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
