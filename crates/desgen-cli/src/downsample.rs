//! Shrink decoded images to the working width.
//!
//! Wide photos are scaled down so their width is at most the working
//! width, preserving aspect ratio. Output sizes are truncated to whole
//! pixels. Narrower images are never scaled up.

use clap::ValueEnum;
use image::DynamicImage;
use image::imageops::FilterType;

/// Resampling filter used when downsampling.
///
/// Ordered from fastest/lowest-quality to slowest/highest-quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DownsampleFilter {
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom): moderate speed, good quality.
    CatmullRom,
    /// Gaussian: moderate speed, smooth output.
    Gaussian,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl DownsampleFilter {
    const fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Size of `(width, height)` after limiting the width to `max_width`.
///
/// Scale is `min(1, max_width / width)`; both axes are truncated and the
/// height never drops below one pixel.
#[must_use]
pub fn working_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = u64::from(height) * u64::from(max_width) / u64::from(width);
    // `scaled < height` because `max_width < width`.
    let new_height = u32::try_from(scaled).unwrap_or(height).max(1);
    (max_width, new_height)
}

/// Downsample `image` so its width is at most `max_width` pixels.
///
/// Returns the (possibly unchanged) image and whether resampling was
/// applied.
#[must_use]
pub fn downsample(
    image: DynamicImage,
    max_width: u32,
    filter: DownsampleFilter,
) -> (DynamicImage, bool) {
    let (w, h) = (image.width(), image.height());
    let (new_w, new_h) = working_size(w, h, max_width);
    if (new_w, new_h) == (w, h) {
        return (image, false);
    }
    (
        image.resize_exact(new_w, new_h, filter.to_image_filter()),
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            w,
            h,
            image::Rgba([128, 128, 128, 255]),
        ))
    }

    #[test]
    fn default_filter_is_triangle() {
        assert_eq!(DownsampleFilter::default(), DownsampleFilter::Triangle);
    }

    #[test]
    fn narrow_image_is_untouched() {
        let (result, applied) = downsample(test_image(320, 900), 500, DownsampleFilter::Triangle);
        assert!(!applied);
        assert_eq!((result.width(), result.height()), (320, 900));
    }

    #[test]
    fn exact_width_is_untouched() {
        let (result, applied) = downsample(test_image(500, 200), 500, DownsampleFilter::Triangle);
        assert!(!applied);
        assert_eq!((result.width(), result.height()), (500, 200));
    }

    #[test]
    fn wide_image_is_scaled_by_width() {
        let (result, applied) = downsample(test_image(1000, 750), 500, DownsampleFilter::Triangle);
        assert!(applied);
        assert_eq!((result.width(), result.height()), (500, 375));
    }

    #[test]
    fn height_is_truncated() {
        // 333 * 500 / 1001 = 166.33
        assert_eq!(working_size(1001, 333, 500), (500, 166));
    }

    #[test]
    fn tall_narrow_strip_keeps_one_row() {
        assert_eq!(working_size(5000, 3, 500), (500, 1));
        assert_eq!(working_size(5000, 1, 500), (500, 1));
    }

    #[test]
    fn portrait_is_limited_by_width_only() {
        // Width already within limit: height may exceed it.
        assert_eq!(working_size(400, 2000, 500), (400, 2000));
        assert_eq!(working_size(1000, 2000, 500), (500, 1000));
    }
}
