//! Input preprocessing for the classification pipeline.
//!
//! Every input image is brought onto a fixed working canvas before any
//! other stage runs: resized with bilinear filtering, kept as 8-bit RGB
//! (the channel values are interpreted as [0,1]-normalized samples), and
//! reduced to an 8-bit grayscale image with BT.601 luma weights. The
//! grayscale image is the sole input of the texture descriptors, so its
//! derivation must stay stable across releases.

use crate::core::{PipelineError, PreprocessConfig};
use image::{DynamicImage, GrayImage, Luma, RgbImage, imageops::FilterType};

/// An input image resized onto the working canvas.
///
/// Both representations have the configured target dimensions. `rgb` feeds
/// the validity gate's color checks; `gray` feeds segmentation and the
/// texture descriptors.
#[derive(Debug, Clone)]
pub struct PreprocessedImage {
    /// Resized RGB image.
    pub rgb: RgbImage,
    /// Grayscale derivation of `rgb`, values in [0, 255].
    pub gray: GrayImage,
}

/// Resizes an input image to the working canvas and derives its grayscale
/// representation.
///
/// # Errors
///
/// Returns `InvalidImage` if the input has a zero dimension.
pub fn preprocess(
    img: &DynamicImage,
    config: &PreprocessConfig,
) -> Result<PreprocessedImage, PipelineError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(PipelineError::invalid_image(format!(
            "input has degenerate dimensions {}x{}",
            img.width(),
            img.height()
        )));
    }

    let rgb = image::imageops::resize(
        &img.to_rgb8(),
        config.target_width,
        config.target_height,
        FilterType::Triangle,
    );
    let gray = rgb_to_luma601(&rgb);

    Ok(PreprocessedImage { rgb, gray })
}

/// Converts an RGB image to grayscale with BT.601 weights.
///
/// 0.299 R + 0.587 G + 0.114 B, rounded to nearest. `DynamicImage::to_luma8`
/// uses BT.709 weights and would shift every value relative to the data the
/// classifier was trained on.
pub fn rgb_to_luma601(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y);
        let luma = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
        Luma([luma.round() as u8])
    })
}
