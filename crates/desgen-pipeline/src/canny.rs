//! Canny edge detection with a border-safe hysteresis pass.
//!
//! Gaussian blur and Sobel gradients come from `imageproc`. Non-maximum
//! suppression and hysteresis are done here: the hysteresis walk checks
//! every one of the eight neighbors against the image bounds, so an edge
//! that reaches row 0 or column 0 never steps outside the buffer.
//!
//! Output is binary: 255 for edge pixels, 0 for background.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::{filter_clamped, gaussian_blur_f32};
use imageproc::kernel;

/// Standard deviation of the pre-gradient Gaussian blur.
const SIGMA: f32 = 1.4;

/// Minimum threshold handed to hysteresis.
///
/// With a low threshold of zero every background pixel would qualify as
/// a weak edge and hysteresis would flood the whole image.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Detect edges using the Canny algorithm.
///
/// Both thresholds are raised to at least [`MIN_THRESHOLD`] and `low` is
/// lowered to at most `high`. Pixels whose thinned gradient magnitude
/// reaches `high` seed an edge; neighbors reaching `low` extend it.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);

    let blurred = gaussian_blur_f32(image, SIGMA);
    let gx: Image<Luma<i16>> = filter_clamped(&blurred, kernel::SOBEL_HORIZONTAL_3X3);
    let gy: Image<Luma<i16>> = filter_clamped(&blurred, kernel::SOBEL_VERTICAL_3X3);
    let thinned = suppress_non_maxima(&gx, &gy);
    hysteresis(&thinned, image.width(), image.height(), low, high)
}

/// Gradient magnitudes with every pixel that is not a local maximum
/// across the edge zeroed. The one-pixel border is always zero.
fn suppress_non_maxima(gx: &Image<Luma<i16>>, gy: &Image<Luma<i16>>) -> Vec<f32> {
    let (w, h) = gx.dimensions();
    let magnitude: Vec<f32> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(a, b)| f32::from(a.0[0]).hypot(f32::from(b.0[0])))
        .collect();
    let mut out = vec![0.0; magnitude.len()];
    if w < 3 || h < 3 {
        return out;
    }

    let index = |x: u32, y: u32| y as usize * w as usize + x as usize;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let angle = f32::from(gy.get_pixel(x, y).0[0])
                .atan2(f32::from(gx.get_pixel(x, y).0[0]))
                .to_degrees();
            let angle = if angle < 0.0 { angle + 180.0 } else { angle };

            // The two neighbors along the gradient direction.
            let (a, b) = if !(22.5..157.5).contains(&angle) {
                (index(x - 1, y), index(x + 1, y))
            } else if angle < 67.5 {
                (index(x + 1, y + 1), index(x - 1, y - 1))
            } else if angle < 112.5 {
                (index(x, y - 1), index(x, y + 1))
            } else {
                (index(x - 1, y + 1), index(x + 1, y - 1))
            };

            let i = index(x, y);
            let m = magnitude[i];
            if m >= magnitude[a] && m >= magnitude[b] {
                out[i] = m;
            }
        }
    }
    out
}

/// Keep strong pixels and every weak pixel connected to one.
fn hysteresis(thinned: &[f32], w: u32, h: u32, low: f32, high: f32) -> GrayImage {
    let index = |x: u32, y: u32| y as usize * w as usize + x as usize;
    let mut out = GrayImage::new(w, h);
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if thinned[index(x, y)] < high || out.get_pixel(x, y).0[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, Luma([255]));
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for (dx, dy) in NEIGHBORS {
                    let (Some(nx), Some(ny)) = (cx.checked_add_signed(dx), cy.checked_add_signed(dy))
                    else {
                        continue;
                    };
                    if nx >= w || ny >= h {
                        continue;
                    }
                    if thinned[index(nx, ny)] >= low && out.get_pixel(nx, ny).0[0] == 0 {
                        out.put_pixel(nx, ny, Luma([255]));
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }
    out
}
