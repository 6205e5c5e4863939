//! Utility functions for image loading, conversion, and measurement.
//!
//! This module provides functions for loading images from disk, converting
//! between color representations, and computing the scalar image statistics
//! consumed by the validity gate.

use crate::core::PipelineError;
use image::{DynamicImage, GrayImage, RgbImage};

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Arguments
///
/// * `path` - A reference to the path of the image file to load
///
/// # Returns
///
/// * `Ok(RgbImage)` - The loaded and converted RGB image
/// * `Err(PipelineError)` - An `ImageLoad` error if the file cannot be
///   decoded by the image crate
pub fn load_image(path: &std::path::Path) -> Result<RgbImage, PipelineError> {
    let img = image::open(path).map_err(PipelineError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Converts an RGB pixel to HSV using OpenCV's 8-bit conventions.
///
/// Hue is reported on the halved 0-180 scale, saturation and value on
/// 0-255. Zero-value pixels report zero saturation and hue.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let h = if delta > 0.0 {
        let h = if max == rf {
            60.0 * (gf - bf) / delta
        } else if max == gf {
            120.0 + 60.0 * (bf - rf) / delta
        } else {
            240.0 + 60.0 * (rf - gf) / delta
        };
        let h = if h < 0.0 { h + 360.0 } else { h };
        h / 2.0
    } else {
        0.0
    };

    (h.round() as u8, s.round() as u8, v.round() as u8)
}

/// Computes the Shannon entropy of a grayscale image in bits.
///
/// The entropy of the 256-bin intensity histogram; an 8-bit image is
/// bounded by 8 bits, a constant image has entropy 0.
pub fn shannon_entropy(gray: &GrayImage) -> f32 {
    let mut counts = [0u32; 256];
    for pixel in gray.pixels() {
        counts[pixel[0] as usize] += 1;
    }
    let total = gray.as_raw().len() as f64;
    if total == 0.0 {
        return 0.0;
    }

    let mut entropy = 0.0f64;
    for &count in &counts {
        if count > 0 {
            let p = count as f64 / total;
            entropy -= p * p.log2();
        }
    }
    entropy as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), (120, 255, 255));
    }

    #[test]
    fn test_hsv_gray_has_zero_saturation() {
        let (_, s, v) = rgb_to_hsv(128, 128, 128);
        assert_eq!(s, 0);
        assert_eq!(v, 128);
    }

    #[test]
    fn test_entropy_constant_image_is_zero() {
        let img = GrayImage::from_pixel(16, 16, Luma([77]));
        assert_eq!(shannon_entropy(&img), 0.0);
    }

    #[test]
    fn test_entropy_two_level_image_is_one_bit() {
        let img = GrayImage::from_fn(16, 16, |x, _| Luma([if x < 8 { 0 } else { 255 }]));
        assert!((shannon_entropy(&img) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_image_missing_path_fails() {
        let err = load_image(std::path::Path::new("definitely/not/here.png"));
        assert!(matches!(err, Err(PipelineError::ImageLoad(_))));
    }
}
