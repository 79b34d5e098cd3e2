//! SVG preview export.
//!
//! Renders curves into an SVG string with one `<path>` element per curve,
//! using the [`svg`] crate for document construction, XML escaping, and
//! path data formatting.
//!
//! Curves live in target space (+Y up, origin at the image center). The
//! document's `viewBox` is the square `target_span` wide centered on the
//! origin, and every Y coordinate is negated on the way out so the
//! preview is not upside down.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O: it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Path, Title};
use svg::node::{Text, Value};

use desgen_pipeline::{Curve, Point};

/// Stroke width as a fraction of `target_span`.
const STROKE_FRACTION: f64 = 0.003;

/// Rendered width and height of the document, in pixels.
const DOCUMENT_SIZE: u32 = 500;

/// Metadata to embed in the SVG document.
///
/// Both fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the pipeline parameters used to produce the curves.
    pub description: Option<&'a str>,
}

/// Build an SVG path `d` attribute for a target-space point sequence.
///
/// Uses `M` for the first point and `L` for the rest, negating Y.
/// Returns an empty string for fewer than 2 points.
///
/// # Examples
///
/// ```
/// use desgen_pipeline::Point;
/// use desgen_export::svg::build_path_data;
///
/// let d = build_path_data(&[Point::new(-4.0, 4.0), Point::new(1.5, -2.0)]);
/// assert_eq!(d, "M-4,-4 L1.5,2");
/// ```
#[must_use]
pub fn build_path_data(points: &[Point]) -> String {
    let [first, rest @ ..] = points else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to(flip(first));
    for p in rest {
        data = data.line_to(flip(p));
    }
    String::from(Value::from(data))
}

/// Target space to SVG user space. Subtracting from zero keeps a zero Y
/// from printing as `-0`.
fn flip(p: &Point) -> (f64, f64) {
    (p.x, 0.0 - p.y)
}

/// Serialize curves into an SVG document string.
///
/// Each curve with at least 2 points becomes a `<path>` stroked with the
/// curve's color and carrying its identifier as `id`.
#[must_use]
pub fn to_svg(curves: &[Curve], target_span: f64, metadata: &SvgMetadata<'_>) -> String {
    let half = target_span / 2.0;
    let mut doc = Document::new()
        .set("width", DOCUMENT_SIZE)
        .set("height", DOCUMENT_SIZE)
        .set(
            "viewBox",
            format!("{} {} {target_span} {target_span}", -half, -half),
        );

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    let stroke_width = target_span * STROKE_FRACTION;
    for curve in curves {
        let d = build_path_data(curve.points());
        if d.is_empty() {
            continue;
        }

        let path = Path::new()
            .set("id", curve.id())
            .set("d", d)
            .set("fill", "none")
            .set("stroke", curve.color())
            .set("stroke-width", format!("{stroke_width:.4}"))
            .set("stroke-linejoin", "round");
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
