//! Pixel-to-target coordinate transform.
//!
//! Maps pixel-space contour points into a center-origin target system
//! whose longer image axis spans `target_span` units:
//!
//! ```text
//! scale = target_span / max(width, height)
//! tx    = (px - width / 2)  * scale
//! ty    = (height / 2 - py) * scale
//! ```
//!
//! The Y-axis is **flipped** so that target space uses the mathematical
//! convention of +Y pointing upward. Export formats that need +Y-down
//! (SVG) flip back at the export boundary.
//!
//! The mapping is affine with a uniform scale, so it preserves the
//! relative distances that simplification measures. It is applied before
//! simplification, which makes the tolerance a target-space length.

use crate::types::{Contour, Dimensions, Point, Polyline};

/// Map one pixel-space contour into target space.
///
/// `dimensions` must be non-empty; the pipeline entry points check this
/// before tracing.
#[must_use]
pub fn map_to_target(contour: &Contour, dimensions: Dimensions, target_span: f64) -> Polyline {
    let center_x = f64::from(dimensions.width) / 2.0;
    let center_y = f64::from(dimensions.height) / 2.0;
    let scale = target_span / dimensions.longer_dim();

    Polyline::new(
        contour
            .points()
            .iter()
            .map(|p| Point::new((p.x - center_x) * scale, (center_y - p.y) * scale))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions {
            width: w,
            height: h,
        }
    }

    fn map_one(x: f64, y: f64, dimensions: Dimensions, span: f64) -> Point {
        let contour = Contour::new(vec![Point::new(x, y)]);
        map_to_target(&contour, dimensions, span).points()[0]
    }

    #[test]
    fn center_maps_to_origin() {
        let p = map_one(50.0, 50.0, dims(100, 100), 10.0);
        assert!(p.x.abs() < 1e-10, "center x should be 0, got {}", p.x);
        assert!(p.y.abs() < 1e-10, "center y should be 0, got {}", p.y);
    }

    #[test]
    fn right_edge_maps_to_half_span() {
        let p = map_one(100.0, 50.0, dims(100, 100), 10.0);
        assert!((p.x - 5.0).abs() < 1e-10, "got {}", p.x);
    }

    #[test]
    fn top_left_corner() {
        // 100x50 image, span 10: scale = 0.1.
        // (0, 0) -> ((0 - 50) * 0.1, (25 - 0) * 0.1) = (-5.0, 2.5)
        let p = map_one(0.0, 0.0, dims(100, 50), 10.0);
        assert!((p.x - (-5.0)).abs() < 1e-10, "got {}", p.x);
        assert!((p.y - 2.5).abs() < 1e-10, "got {}", p.y);
    }

    #[test]
    fn y_flips_direction() {
        let below = map_one(50.0, 100.0, dims(100, 100), 10.0);
        assert!((below.y - (-5.0)).abs() < 1e-10, "got {}", below.y);
        let above = map_one(50.0, 0.0, dims(100, 100), 10.0);
        assert!((above.y - 5.0).abs() < 1e-10, "got {}", above.y);
    }

    #[test]
    fn tall_image_scales_by_height() {
        // 50x200: longer dim = 200, scale = 0.05.
        let p = map_one(25.0, 0.0, dims(50, 200), 10.0);
        assert!(p.x.abs() < 1e-10);
        assert!((p.y - 5.0).abs() < 1e-10, "got {}", p.y);
    }

    #[test]
    fn span_scales_linearly() {
        let small = map_one(80.0, 30.0, dims(100, 100), 10.0);
        let large = map_one(80.0, 30.0, dims(100, 100), 20.0);
        assert!((large.x - 2.0 * small.x).abs() < 1e-10);
        assert!((large.y - 2.0 * small.y).abs() < 1e-10);
    }

    #[test]
    fn point_order_is_preserved() {
        let contour = Contour::new(vec![
            Point::new(1.0, 1.0),
            Point::new(9.0, 1.0),
            Point::new(5.0, 9.0),
        ]);
        let mapped = map_to_target(&contour, dims(10, 10), 10.0);
        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped.points()[0], Point::new(-4.0, 4.0));
        assert_eq!(mapped.points()[1], Point::new(4.0, 4.0));
        assert_eq!(mapped.points()[2], Point::new(0.0, -4.0));
    }
}
