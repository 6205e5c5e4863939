//! Intensity-based leaf segmentation.
//!
//! Gaussian smoothing followed by global Otsu thresholding. The resulting
//! binary mask is consumed by presentation layers and by the validity
//! gate's area checks; the texture descriptors never see it.

use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::filter::gaussian_blur_f32;

/// Sigma of the pre-threshold Gaussian blur.
///
/// Matches the sigma OpenCV derives for a 5x5 kernel:
/// 0.3 * ((ksize - 1) * 0.5 - 1) + 0.8.
const BLUR_SIGMA: f32 = 1.1;

/// Segments leaf foreground from background with Otsu's method.
///
/// The image is smoothed to suppress sensor noise, then binarized at the
/// threshold minimizing intra-class intensity variance. Foreground pixels
/// are 255, background pixels 0.
pub fn segment_otsu(gray: &GrayImage) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, BLUR_SIGMA);
    let level = imageproc::contrast::otsu_level(&blurred);
    threshold(&blurred, level, ThresholdType::Binary)
}

/// Returns the fraction of mask pixels that are foreground.
pub fn foreground_ratio(mask: &GrayImage) -> f32 {
    let total = mask.as_raw().len();
    if total == 0 {
        return 0.0;
    }
    let foreground = mask.as_raw().iter().filter(|&&p| p > 0).count();
    foreground as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_bimodal_image_splits_cleanly() {
        // Left half dark, right half bright; Otsu should separate them.
        let img = GrayImage::from_fn(64, 64, |x, _| Luma([if x < 32 { 30 } else { 220 }]));
        let mask = segment_otsu(&img);

        assert_eq!(mask.get_pixel(4, 32)[0], 0);
        assert_eq!(mask.get_pixel(60, 32)[0], 255);
    }

    #[test]
    fn test_mask_is_binary() {
        let img = GrayImage::from_fn(32, 32, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let mask = segment_otsu(&img);
        assert!(mask.as_raw().iter().all(|&p| p == 0 || p == 255));
    }

    #[test]
    fn test_foreground_ratio() {
        let mask = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 3 { 255 } else { 0 }]));
        assert!((foreground_ratio(&mask) - 0.3).abs() < 1e-6);
    }
}
