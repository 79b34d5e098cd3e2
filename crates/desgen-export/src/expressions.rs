//! Graphing-calculator expression export.
//!
//! Each curve becomes two coordinate lists and a polygon that joins them:
//!
//! ```text
//! L_{0}=[-4.00,0.50,0.50]
//! M_{0}=[4.00,4.00,-1.00]
//! \operatorname{polygon}(L_{0},M_{0})
//!
//! ```
//!
//! followed by an empty separator line. Coordinates are written with
//! exactly two decimals, rounding ties away from zero. Long curves are
//! subsampled by a fixed stride so a single list stays near
//! [`MAX_POINTS_PER_CURVE`] entries.
//!
//! This is a pure function with no I/O: it returns strings.

use desgen_pipeline::{Curve, Point};

/// Target upper size of one coordinate list.
///
/// The stride is `max(1, len / MAX_POINTS_PER_CURVE)` with integer
/// division, so a curve shorter than twice this value is emitted at
/// full resolution.
pub const MAX_POINTS_PER_CURVE: usize = 200;

/// Every `step`-th point of `points`, starting with the first.
fn subsample(points: &[Point]) -> impl Iterator<Item = &Point> {
    let step = (points.len() / MAX_POINTS_PER_CURVE).max(1);
    points.iter().step_by(step)
}

/// Format `value` with two decimals, rounding ties away from zero.
///
/// Negative values that round to zero keep their sign (`-0.00`);
/// negative zero itself prints as `0.00`.
#[must_use]
pub fn format_coordinate(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // The exact decimal expansion makes the tie check independent of the
    // binary rounding `{:.2}` would apply.
    let expanded = format!("{:.30}", value.abs());
    let (int_part, frac) = expanded.split_once('.').unwrap_or((expanded.as_str(), "00"));
    let frac = frac.as_bytes();

    let mut digits: Vec<u8> = int_part.bytes().chain(frac.iter().copied().take(2)).collect();
    if frac.get(2).is_some_and(|&d| d >= b'5') {
        round_up(&mut digits);
    }

    let split = digits.len() - 2;
    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|&d| char::from(d)));
    out.push('.');
    out.extend(digits[split..].iter().map(|&d| char::from(d)));
    out
}

/// Add one to a big-endian ASCII decimal digit string.
fn round_up(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

fn coordinate_list<'a>(points: impl Iterator<Item = &'a Point>, axis: fn(&Point) -> f64) -> String {
    points
        .map(|p| format_coordinate(axis(p)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Expression lines for `curves`, four per curve.
///
/// Curve `i` (its position in `curves`) contributes `L_{i}=[...]`,
/// `M_{i}=[...]`, `\operatorname{polygon}(L_{i},M_{i})` and an empty
/// line.
#[must_use]
pub fn to_expression_lines(curves: &[Curve]) -> Vec<String> {
    let mut lines = Vec::with_capacity(curves.len() * 4);
    for (i, curve) in curves.iter().enumerate() {
        let xs = coordinate_list(subsample(curve.points()), |p| p.x);
        let ys = coordinate_list(subsample(curve.points()), |p| p.y);
        lines.push(format!("L_{{{i}}}=[{xs}]"));
        lines.push(format!("M_{{{i}}}=[{ys}]"));
        lines.push(format!("\\operatorname{{polygon}}(L_{{{i}}},M_{{{i}}})"));
        lines.push(String::new());
    }
    lines
}

/// [`to_expression_lines`] joined with newlines.
///
/// Non-empty output ends with a single `\n` (the last separator line).
#[must_use]
pub fn to_expression_text(curves: &[Curve]) -> String {
    to_expression_lines(curves).join("\n")
}
