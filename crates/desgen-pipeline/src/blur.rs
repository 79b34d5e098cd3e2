//! Integer Gaussian-like smoothing.
//!
//! Convolves a grayscale image with one of two fixed, normalized kernels.
//! Only the valid convolution region is computed: output pixels closer
//! than half the kernel width to any edge stay at zero. Sums are
//! accumulated in integers and divided by the kernel sum with truncation.
//!
//! The light 3x3 kernel runs inside edge detection; the strong 5x5 kernel
//! belongs to the optional enhancement path.

use image::GrayImage;

const LIGHT_3X3: [u32; 9] = [
    1, 2, 1, //
    2, 4, 2, //
    1, 2, 1,
];

const STRONG_5X5: [u32; 25] = [
    1, 4, 7, 4, 1, //
    4, 16, 26, 16, 4, //
    7, 26, 41, 26, 7, //
    4, 16, 26, 16, 4, //
    1, 4, 7, 4, 1,
];

const _: () = assert!(kernel_sum(&LIGHT_3X3) == 16);
const _: () = assert!(kernel_sum(&STRONG_5X5) == 273);

const fn kernel_sum(weights: &[u32]) -> u32 {
    let mut total = 0;
    let mut i = 0;
    while i < weights.len() {
        total += weights[i];
        i += 1;
    }
    total
}

/// Which smoothing kernel to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingKernel {
    /// 3x3 binomial kernel, weights sum to 16.
    Light3x3,
    /// 5x5 Gaussian approximation, weights sum to 273.
    Strong5x5,
}

impl SmoothingKernel {
    /// Side length of the square kernel.
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Light3x3 => 3,
            Self::Strong5x5 => 5,
        }
    }

    /// Number of border pixels on each side that the kernel cannot reach.
    #[must_use]
    pub const fn radius(self) -> u32 {
        self.size() / 2
    }

    const fn weights(self) -> &'static [u32] {
        match self {
            Self::Light3x3 => &LIGHT_3X3,
            Self::Strong5x5 => &STRONG_5X5,
        }
    }

    /// Sum of all kernel weights (the normalization divisor).
    #[must_use]
    pub const fn sum(self) -> u32 {
        kernel_sum(self.weights())
    }
}

/// Smooth a grayscale image with the given kernel.
///
/// Border pixels within [`SmoothingKernel::radius`] of an edge are left
/// at zero. Images too small to contain an interior pixel come back
/// entirely zero, with their dimensions preserved.
#[must_use = "returns the smoothed image"]
#[allow(clippy::cast_possible_truncation)]
pub fn smooth(image: &GrayImage, kernel: SmoothingKernel) -> GrayImage {
    let (w, h) = image.dimensions();
    let r = kernel.radius();
    let size = kernel.size() as usize;
    let weights = kernel.weights();
    let divisor = kernel.sum();

    let mut out = GrayImage::new(w, h);
    for_each_interior(w, h, r, |x, y| {
        let mut sum = 0u32;
        for ky in 0..size {
            for kx in 0..size {
                let px = image.get_pixel(x + kx as u32 - r, y + ky as u32 - r).0[0];
                sum += u32::from(px) * weights[ky * size + kx];
            }
        }
        out.put_pixel(x, y, image::Luma([(sum / divisor) as u8]));
    });
    out
}

/// Visit every pixel at least `margin` pixels away from all four edges,
/// in row-major order.
pub(crate) fn for_each_interior(w: u32, h: u32, margin: u32, mut f: impl FnMut(u32, u32)) {
    if w <= 2 * margin || h <= 2 * margin {
        return;
    }
    for y in margin..h - margin {
        for x in margin..w - margin {
            f(x, y);
        }
    }
}
