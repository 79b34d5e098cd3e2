//! desgen-export: Pure output serializers (sans-IO).
//!
//! Turns pipeline curves into consumer formats: graphing-calculator
//! expression lists, a fitted plot viewport, and an SVG preview.

pub mod expressions;
pub mod svg;
pub mod viewport;

pub use expressions::{to_expression_lines, to_expression_text};
pub use svg::{SvgMetadata, to_svg};
pub use viewport::{Viewport, fit_viewport};
