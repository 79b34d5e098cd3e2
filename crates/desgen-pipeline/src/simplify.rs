//! Path simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Reduces point count in polylines by removing points that lie within a
//! given perpendicular distance of the chord between the surviving points
//! on either side. The output is always a subsequence of the input that
//! keeps both endpoints.
//!
//! Splits are processed from an explicit work stack rather than by
//! recursion, so a long, nearly collinear contour cannot exhaust the call
//! stack.

use crate::types::{Point, Polyline};

/// Simplify a single polyline using the Ramer-Douglas-Peucker algorithm.
///
/// Within each span the point farthest from the chord is found; ties go
/// to the earliest point. If that distance exceeds `tolerance`, the point
/// is kept and both halves are processed; otherwise every interior point
/// of the span is dropped.
///
/// Polylines with fewer than 3 points are returned unchanged. Negative or
/// NaN tolerances behave like `0.0`, which keeps every point that is not
/// exactly on its chord.
#[must_use = "returns the simplified polyline"]
pub fn simplify(polyline: &Polyline, tolerance: f64) -> Polyline {
    let points = polyline.points();
    if points.len() < 3 {
        return polyline.clone();
    }
    let tolerance = tolerance.max(0.0);

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    let mut spans = vec![(0, points.len() - 1)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }
        let (max_idx, max_dist) = farthest_from_chord(points, start, end);
        if max_dist > tolerance {
            kept[max_idx] = true;
            // Right half pushed first so the left half is processed first.
            spans.push((max_idx, end));
            spans.push((start, max_idx));
        }
    }

    let simplified: Vec<Point> = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Polyline::new(simplified)
}

/// Index and distance of the interior point farthest from the chord
/// `points[start]` -> `points[end]`.
///
/// Uses a strict comparison, so the earliest of several equally distant
/// points wins. Returns `(start, 0.0)` when every interior point lies on
/// the chord.
fn farthest_from_chord(points: &[Point], start: usize, end: usize) -> (usize, f64) {
    let mut max_dist = 0.0;
    let mut max_idx = start;

    for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
        let d = perpendicular_distance(p, points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    (max_idx, max_dist)
}

/// Distance from `p` to its orthogonal projection on the line through `a`
/// and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let u = (p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / length_sq;
    let projection = Point::new(u.mul_add(dx, a.x), u.mul_add(dy, a.y));
    p.distance(projection)
}
