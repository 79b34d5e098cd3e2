//! Global min/max contrast stretch.
//!
//! First step of the optional enhancement path: spreads the occupied
//! intensity range over the full `0..=255` range so that low-contrast
//! photos still produce gradients the edge thresholds can see.

use image::GrayImage;

/// Linearly rescale intensities so the darkest pixel becomes 0 and the
/// brightest becomes 255.
///
/// Each value maps to `(v - min) / (max - min) * 255`, truncated. A flat
/// image (`min == max`) has no range to stretch and is returned unchanged.
#[must_use = "returns the stretched image"]
pub fn stretch_contrast(image: &GrayImage) -> GrayImage {
    let Some((min, max)) = intensity_range(image) else {
        return image.clone();
    };
    if max == min {
        return image.clone();
    }

    let range = u32::from(max - min);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let v = u32::from(image.get_pixel(x, y).0[0] - min);
        #[allow(clippy::cast_possible_truncation)]
        image::Luma([(v * 255 / range) as u8])
    })
}

/// Darkest and brightest intensity, or `None` for an empty image.
#[must_use]
pub fn intensity_range(image: &GrayImage) -> Option<(u8, u8)> {
    image.pixels().map(|p| p.0[0]).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
