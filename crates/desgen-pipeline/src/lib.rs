//! desgen-pipeline: Pure image-to-curve pipeline (sans-IO).
//!
//! Converts a raw RGBA buffer into a handful of vector curves for a
//! graphing surface through:
//! grayscale -> (optional enhancement) -> edge detection ->
//! contour tracing -> ranking -> coordinate mapping -> simplification.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! buffers and returns structured data. Decoding, resizing and output
//! live in the `desgen` CLI.

pub mod blur;
pub mod canny;
pub mod contour;
pub mod contrast;
pub mod curve;
pub mod diagnostics;
pub mod edge;
pub mod grayscale;
pub mod morphology;
pub mod normalize;
pub mod simplify;
pub mod types;

pub use contour::find_contours;
pub use curve::{CurveBuilder, build_curves};
pub use edge::{EdgeDetector, EdgeDetectorKind, EdgeLevel, EdgeMap, detect_edges};
pub use grayscale::to_grayscale;
pub use types::{
    Contour, Curve, Dimensions, GrayImage, PipelineConfig, PipelineError, Point, Polyline,
    ProcessResult, RgbaImage,
};

/// Enhance a grayscale image before edge detection.
///
/// Stretches contrast to the full range, smooths with the strong 5x5
/// kernel, then applies a 3x3 morphological closing. Together these
/// suppress noise and bridge small gaps, at the cost of fine detail and
/// a zero border two pixels wide.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] if the image is empty.
pub fn enhance(gray: &GrayImage) -> Result<GrayImage, PipelineError> {
    Dimensions::of(gray).ensure_non_empty()?;
    let stretched = contrast::stretch_contrast(gray);
    let smoothed = blur::smooth(&stretched, blur::SmoothingKernel::Strong5x5);
    Ok(morphology::close(&smoothed))
}

/// Run the full image-to-curve pipeline.
///
/// # Pipeline steps
///
/// 1. RGBA to grayscale
/// 2. Optional enhancement (see [`enhance`])
/// 3. Edge detection (pluggable strategy)
/// 4. Contour tracing
/// 5. Rank by length and keep the `max_curves` longest
/// 6. Map into target space and simplify (Douglas-Peucker)
/// 7. Assemble curves, dropping paths shorter than three points
///
/// An image with no edges yields an empty curve list, not an error.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameter`] if `config` fails
/// [`PipelineConfig::validate`], and [`PipelineError::InvalidInput`] if
/// the dimensions are zero or `rgba.len() != width * height * 4`.
pub fn process(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    diagnostics::process_with_diagnostics(
        rgba,
        width,
        height,
        config,
        &diagnostics::StoppedClock,
    )
    .map(|(result, _)| result)
}
