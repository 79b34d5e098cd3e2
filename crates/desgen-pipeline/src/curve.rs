//! Ranking, selection and final curve assembly.
//!
//! Contours are ranked by point count (longest first, ties keep trace
//! order), the top `max_curves` are mapped into target space and
//! simplified, and every simplified path long enough to draw becomes a
//! [`Curve`].

use std::cmp::Reverse;

use crate::normalize::map_to_target;
use crate::simplify::simplify;
use crate::types::{
    Contour, Curve, Dimensions, PipelineConfig, PipelineError, validate_max_curves,
    validate_target_span, validate_tolerance,
};

/// Display color assigned to every curve.
pub const DEFAULT_CURVE_COLOR: &str = "#2464b4";

/// Simplified paths with fewer points than this produce no curve.
pub const MIN_CURVE_POINTS: usize = 3;

/// Keep the `max_curves` longest contours.
///
/// The sort is stable, so contours of equal length stay in the order the
/// tracer produced them.
#[must_use]
pub fn rank_contours(contours: &[Contour], max_curves: usize) -> Vec<&Contour> {
    let mut ranked: Vec<&Contour> = contours.iter().collect();
    ranked.sort_by_key(|c| Reverse(c.len()));
    ranked.truncate(max_curves);
    ranked
}

/// Turns traced contours into curves.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveBuilder {
    /// Number of contours selected before simplification.
    pub max_curves: usize,
    /// Douglas-Peucker tolerance in target-space units.
    pub tolerance: f64,
    /// Extent of the target system along the image's longer axis.
    pub target_span: f64,
    /// Minimum simplified point count for a curve to be emitted.
    pub min_points: usize,
    /// Color stamped on every curve.
    pub color: String,
}

impl CurveBuilder {
    /// Builder with the given selection size and tolerance and default
    /// span, minimum points and color.
    #[must_use]
    pub fn new(max_curves: usize, tolerance: f64) -> Self {
        Self {
            max_curves,
            tolerance,
            ..Self::default()
        }
    }

    /// Builder matching a pipeline configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_curves: config.max_curves,
            tolerance: config.simplify_tolerance,
            target_span: config.target_span,
            ..Self::default()
        }
    }

    /// Rank, map, simplify and label `contours`.
    ///
    /// Curve identifiers are `curve_0`, `curve_1`, ... in selection order
    /// and stay contiguous when a selected contour simplifies below
    /// `min_points` and is skipped. The result never holds more than
    /// `max_curves` curves.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if `max_curves` is zero,
    /// `tolerance` is negative or non-finite, or `target_span` is not a
    /// positive finite number, and [`PipelineError::InvalidInput`] if
    /// `dimensions` is empty.
    pub fn build(
        &self,
        contours: &[Contour],
        dimensions: Dimensions,
    ) -> Result<Vec<Curve>, PipelineError> {
        validate_max_curves(self.max_curves)?;
        validate_tolerance(self.tolerance)?;
        validate_target_span(self.target_span)?;
        dimensions.ensure_non_empty()?;

        let curves: Vec<Curve> = rank_contours(contours, self.max_curves)
            .into_iter()
            .map(|contour| {
                simplify(
                    &map_to_target(contour, dimensions, self.target_span),
                    self.tolerance,
                )
            })
            .filter(|path| path.len() >= self.min_points)
            .enumerate()
            .map(|(i, path)| {
                Curve::new(
                    format!("curve_{i}"),
                    path.into_points(),
                    self.color.clone(),
                )
            })
            .collect();

        log::debug!(
            "built {} curves from {} contours (max {})",
            curves.len(),
            contours.len(),
            self.max_curves,
        );

        Ok(curves)
    }
}

impl Default for CurveBuilder {
    fn default() -> Self {
        Self {
            max_curves: PipelineConfig::DEFAULT_MAX_CURVES,
            tolerance: PipelineConfig::DEFAULT_SIMPLIFY_TOLERANCE,
            target_span: PipelineConfig::DEFAULT_TARGET_SPAN,
            min_points: MIN_CURVE_POINTS,
            color: DEFAULT_CURVE_COLOR.to_string(),
        }
    }
}

/// Build curves with the default span, minimum point count and color.
///
/// # Errors
///
/// See [`CurveBuilder::build`].
pub fn build_curves(
    contours: &[Contour],
    dimensions: Dimensions,
    max_curves: usize,
    tolerance: f64,
) -> Result<Vec<Curve>, PipelineError> {
    CurveBuilder::new(max_curves, tolerance).build(contours, dimensions)
}
