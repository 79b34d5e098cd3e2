//! Contour tracing: extract connected edge regions from an [`EdgeMap`].
//!
//! Pixels are scanned in row-major order. Every strong, not yet visited
//! pixel seeds a depth-first flood over its 8-connected neighborhood.
//! Weak pixels join a contour once the flood reaches them but never seed
//! one themselves.
//!
//! The flood uses an explicit stack, and neighbors are pushed without
//! checking them first; the visited/level check happens when a position
//! is popped. The resulting point order is therefore the stack-pop order,
//! not a walk along the region's outline.

use crate::edge::{EdgeLevel, EdgeMap};
use crate::types::{Contour, Point};

/// A single trace stops once it has collected this many points.
///
/// The remaining pixels of a larger region stay unvisited and can seed
/// further contours later in the scan.
pub const MAX_CONTOUR_POINTS: usize = 1000;

/// Contours with fewer points than this are discarded as noise.
pub const MIN_CONTOUR_POINTS: usize = 11;

/// 8-connected neighbor offsets in push order.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Trace every contour in `edges`.
///
/// Returns contours in seed order (row-major position of their first
/// point). Each has between [`MIN_CONTOUR_POINTS`] and
/// [`MAX_CONTOUR_POINTS`] points.
#[must_use]
pub fn find_contours(edges: &EdgeMap) -> Vec<Contour> {
    let (w, h) = (edges.width(), edges.height());
    let mut visited = vec![false; w as usize * h as usize];
    let mut contours = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y as usize * w as usize + x as usize;
            if edges.level(x, y) == EdgeLevel::Strong && !visited[idx] {
                let contour = trace_from(edges, &mut visited, x, y);
                if contour.len() >= MIN_CONTOUR_POINTS {
                    contours.push(contour);
                }
            }
        }
    }

    contours
}

/// Flood from `(start_x, start_y)`, marking pixels in `visited`.
fn trace_from(edges: &EdgeMap, visited: &mut [bool], start_x: u32, start_y: u32) -> Contour {
    let (w, h) = (i64::from(edges.width()), i64::from(edges.height()));
    let mut points = Vec::new();
    let mut stack = vec![(i64::from(start_x), i64::from(start_y))];

    while points.len() < MAX_CONTOUR_POINTS {
        let Some((x, y)) = stack.pop() else {
            break;
        };
        if x < 0 || x >= w || y < 0 || y >= h {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (ux, uy) = (x as u32, y as u32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = (y * w + x) as usize;
        if visited[idx] || edges.level(ux, uy) == EdgeLevel::Background {
            continue;
        }

        visited[idx] = true;
        points.push(Point::new(f64::from(ux), f64::from(uy)));

        stack.extend(NEIGHBORS.iter().map(|&(dx, dy)| (x + dx, y + dy)));
    }

    Contour::new(points)
}
