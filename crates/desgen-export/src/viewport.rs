//! Plot bounds that frame a set of curves.

use serde::{Deserialize, Serialize};

use desgen_pipeline::Curve;

/// Each axis of the fitted viewport is this many times the extent of the
/// curves along it.
pub const VIEWPORT_PADDING: f64 = 1.2;

/// Axis-aligned plot bounds in target space (+Y up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Smallest visible X.
    pub left: f64,
    /// Largest visible X.
    pub right: f64,
    /// Smallest visible Y.
    pub bottom: f64,
    /// Largest visible Y.
    pub top: f64,
}

impl Viewport {
    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

/// Bounding box of every curve point, scaled by [`VIEWPORT_PADDING`]
/// about its center.
///
/// Returns `None` when there are no points at all. A single point gives a
/// zero-size viewport centered on it.
#[must_use]
pub fn fit_viewport(curves: &[Curve]) -> Option<Viewport> {
    let mut points = curves.iter().flat_map(Curve::points);
    let first = points.next()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let half_x = (max_x - min_x) * VIEWPORT_PADDING / 2.0;
    let half_y = (max_y - min_y) * VIEWPORT_PADDING / 2.0;
    let center_x = f64::midpoint(min_x, max_x);
    let center_y = f64::midpoint(min_y, max_y);

    Some(Viewport {
        left: center_x - half_x,
        right: center_x + half_x,
        bottom: center_y - half_y,
        top: center_y + half_y,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use desgen_pipeline::Point;

    use super::*;

    fn curve(coords: &[(f64, f64)]) -> Curve {
        Curve::new(
            "curve_0".to_string(),
            coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            "#2464b4".to_string(),
        )
    }

    #[test]
    fn no_curves_no_viewport() {
        assert!(fit_viewport(&[]).is_none());
        assert!(fit_viewport(&[curve(&[])]).is_none());
    }

    #[test]
    fn pads_twenty_percent_about_center() {
        let vp = fit_viewport(&[curve(&[(-5.0, -2.0), (5.0, 3.0), (0.0, 0.0)])]).unwrap();
        assert!((vp.left - (-6.0)).abs() < 1e-12, "{vp:?}");
        assert!((vp.right - 6.0).abs() < 1e-12, "{vp:?}");
        assert!((vp.bottom - (-2.5)).abs() < 1e-12, "{vp:?}");
        assert!((vp.top - 3.5).abs() < 1e-12, "{vp:?}");
        assert!((vp.width() - 12.0).abs() < 1e-12);
        assert!((vp.height() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn spans_all_curves() {
        let vp = fit_viewport(&[
            curve(&[(0.0, 0.0), (1.0, 1.0)]),
            curve(&[(9.0, -9.0), (10.0, -10.0)]),
        ])
        .unwrap();
        assert!(vp.left < 0.0 && vp.right > 10.0);
        assert!(vp.bottom < -10.0 && vp.top > 1.0);
    }

    #[test]
    fn single_point_is_degenerate() {
        let vp = fit_viewport(&[curve(&[(2.0, -1.0)])]).unwrap();
        assert_eq!(
            vp,
            Viewport {
                left: 2.0,
                right: 2.0,
                bottom: -1.0,
                top: -1.0
            }
        );
    }

    #[test]
    fn serializes_with_named_bounds() {
        let vp = Viewport {
            left: -1.0,
            right: 1.0,
            bottom: -2.0,
            top: 2.0,
        };
        let json = serde_json::to_value(vp).unwrap();
        assert_eq!(json["left"], -1.0);
        assert_eq!(json["top"], 2.0);
    }
}
