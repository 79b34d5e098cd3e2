//! 3x3 grayscale morphology.
//!
//! [`close`] bridges small gaps in bright regions before edge detection,
//! at the cost of fine detail. Border pixels are skipped (left at zero)
//! the same way [`crate::blur::smooth`] skips them.

use image::GrayImage;

use crate::blur::for_each_interior;

/// Replace each interior pixel with the maximum of its 3x3 neighborhood.
#[must_use = "returns the dilated image"]
pub fn dilate(image: &GrayImage) -> GrayImage {
    neighborhood_filter(image, u8::MIN, u8::max)
}

/// Replace each interior pixel with the minimum of its 3x3 neighborhood.
#[must_use = "returns the eroded image"]
pub fn erode(image: &GrayImage) -> GrayImage {
    neighborhood_filter(image, u8::MAX, u8::min)
}

/// Morphological closing: [`dilate`] followed by [`erode`].
#[must_use = "returns the closed image"]
pub fn close(image: &GrayImage) -> GrayImage {
    erode(&dilate(image))
}

/// Fold every interior pixel's 3x3 window with `combine`, starting from
/// `identity`.
fn neighborhood_filter(image: &GrayImage, identity: u8, combine: fn(u8, u8) -> u8) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut out = GrayImage::new(w, h);
    for_each_interior(w, h, 1, |x, y| {
        let mut v = identity;
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                v = combine(v, image.get_pixel(nx, ny).0[0]);
            }
        }
        out.put_pixel(x, y, image::Luma([v]));
    });
    out
}
