//! RGBA to grayscale conversion.
//!
//! This is the first step in the pipeline: a raw RGBA pixel buffer in,
//! a single-channel `GrayImage` out. Decoding image files into that
//! buffer is the host's job.

use image::GrayImage;

use crate::types::{Dimensions, PipelineError, RgbaImage};

/// BT.601 luma weights scaled by 1000 so the conversion stays in integers.
const WEIGHT_R: u32 = 299;
const WEIGHT_G: u32 = 587;
const WEIGHT_B: u32 = 114;
const WEIGHT_SUM: u32 = WEIGHT_R + WEIGHT_G + WEIGHT_B;
const _: () = assert!(WEIGHT_SUM == 1000);

/// Convert a raw RGBA buffer to grayscale.
///
/// Each pixel becomes `0.299*R + 0.587*G + 0.114*B`, truncated. Alpha is
/// ignored. Because the weights sum to exactly one, a pixel with
/// `R == G == B == v` maps to `v`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] if either dimension is zero or
/// `rgba.len() != width * height * 4`.
pub fn to_grayscale(rgba: &[u8], width: u32, height: u32) -> Result<GrayImage, PipelineError> {
    Dimensions { width, height }.ensure_non_empty()?;

    let expected = u64::from(width) * u64::from(height) * 4;
    if rgba.len() as u64 != expected {
        return Err(PipelineError::InvalidInput(format!(
            "RGBA buffer for {width}x{height} must hold {expected} bytes, got {}",
            rgba.len(),
        )));
    }

    let luma: Vec<u8> = rgba.chunks_exact(4).map(luma_of).collect();
    GrayImage::from_raw(width, height, luma).ok_or_else(|| {
        PipelineError::InvalidInput(format!("cannot build {width}x{height} grayscale buffer"))
    })
}

/// Convert an already-decoded RGBA image to grayscale.
#[must_use = "returns the grayscale image"]
pub fn rgba_to_grayscale(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([luma_of(&image.get_pixel(x, y).0)])
    })
}

/// Expand a grayscale image to opaque RGBA with `R = G = B = luma`.
#[must_use = "returns the RGBA image"]
pub fn gray_to_rgba(image: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let v = image.get_pixel(x, y).0[0];
        image::Rgba([v, v, v, 255])
    })
}

#[allow(clippy::cast_possible_truncation)]
fn luma_of(px: &[u8]) -> u8 {
    let weighted = WEIGHT_R * u32::from(px[0])
        + WEIGHT_G * u32::from(px[1])
        + WEIGHT_B * u32::from(px[2]);
    // Max is 255 * 1000 / 1000, so the quotient always fits.
    (weighted / WEIGHT_SUM) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rgba_pixel(r: u8, g: u8, b: u8) -> Vec<u8> {
        vec![r, g, b, 255]
    }

    #[test]
    fn zero_width_is_invalid_input() {
        let result = to_grayscale(&[], 0, 4);
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn short_buffer_is_invalid_input() {
        let result = to_grayscale(&[0; 15], 2, 2);
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn output_dimensions_match_input() {
        let buf = vec![128; 17 * 31 * 4];
        let gray = to_grayscale(&buf, 17, 31).unwrap();
        assert_eq!(gray.width(), 17);
        assert_eq!(gray.height(), 31);
    }

    #[test]
    fn white_stays_white_and_black_stays_black() {
        let mut buf = rgba_pixel(255, 255, 255);
        buf.extend(rgba_pixel(0, 0, 0));
        let gray = to_grayscale(&buf, 2, 1).unwrap();
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn weighted_luminance_truncates() {
        // 0.299 * 255 = 76.245, 0.587 * 255 = 149.685, 0.114 * 255 = 29.07
        let r = to_grayscale(&rgba_pixel(255, 0, 0), 1, 1).unwrap();
        let g = to_grayscale(&rgba_pixel(0, 255, 0), 1, 1).unwrap();
        let b = to_grayscale(&rgba_pixel(0, 0, 255), 1, 1).unwrap();
        assert_eq!(r.get_pixel(0, 0).0[0], 76);
        assert_eq!(g.get_pixel(0, 0).0[0], 149);
        assert_eq!(b.get_pixel(0, 0).0[0], 29);
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = to_grayscale(&[10, 200, 30, 255], 1, 1).unwrap();
        let clear = to_grayscale(&[10, 200, 30, 0], 1, 1).unwrap();
        assert_eq!(opaque, clear);
    }

    #[test]
    fn converting_gray_again_is_identity() {
        let gray = GrayImage::from_fn(16, 16, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Luma([((x * 16 + y) % 256) as u8])
        });
        let rgba = gray_to_rgba(&gray);
        let again = to_grayscale(rgba.as_raw(), 16, 16).unwrap();
        assert_eq!(gray, again);
    }

    #[test]
    fn rgba_image_path_matches_raw_path() {
        let rgba = RgbaImage::from_fn(5, 3, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([(x * 40) as u8, (y * 70) as u8, 99, 255])
        });
        let from_raw = to_grayscale(rgba.as_raw(), 5, 3).unwrap();
        assert_eq!(rgba_to_grayscale(&rgba), from_raw);
    }
}
