//! Heuristic validity gate over raw pipeline outputs.
//!
//! The gate is caller-side policy, not part of the feature pipeline: it
//! inspects the preprocessed image, the segmentation mask, and the
//! classifier's probability distribution, and rejects inputs that do not
//! look like a usable corn-leaf photograph. Checks run in a fixed order
//! and the first failure short-circuits the rest.

use crate::core::GateConfig;
use crate::domain::Prediction;
use crate::processors::{PreprocessedImage, foreground_ratio};
use crate::utils::{rgb_to_hsv, shannon_entropy};
use image::GrayImage;
use serde::Serialize;

/// The individual checks the gate runs, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateCheck {
    /// Fraction of green pixels in the working image.
    GreenRatio,
    /// Shannon entropy of the grayscale image.
    Entropy,
    /// Segmented foreground area ratio.
    ForegroundRatio,
    /// Fraction of low-saturation pixels on the segmented leaf.
    GrayOnLeaf,
    /// Top-1 probability and top-1/top-2 margin.
    Confidence,
}

impl std::fmt::Display for GateCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateCheck::GreenRatio => write!(f, "green ratio"),
            GateCheck::Entropy => write!(f, "entropy"),
            GateCheck::ForegroundRatio => write!(f, "foreground ratio"),
            GateCheck::GrayOnLeaf => write!(f, "grayscale-on-leaf ratio"),
            GateCheck::Confidence => write!(f, "confidence"),
        }
    }
}

/// A rejected input: the first failing check and the measured value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateRejection {
    /// The check that failed.
    pub check: GateCheck,
    /// The value the check measured.
    pub measured: f32,
}

impl std::fmt::Display for GateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} check failed ({:.3})", self.check, self.measured)
    }
}

/// All scalars measured by a fully-passing gate run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReport {
    /// Fraction of green pixels in the working image.
    pub green_ratio: f32,
    /// Shannon entropy of the grayscale image in bits.
    pub entropy: f32,
    /// Segmented foreground area ratio.
    pub foreground_ratio: f32,
    /// Fraction of low-saturation pixels on the segmented leaf.
    pub gray_on_leaf: f32,
    /// Top-1 probability.
    pub confidence: f32,
    /// Gap between the top-1 and top-2 probabilities.
    pub margin: f32,
}

/// Outcome of the validity gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GateOutcome {
    /// Every check passed; all measured scalars are reported.
    Accepted(GateReport),
    /// A check failed; later checks were not evaluated.
    Rejected(GateRejection),
}

impl GateOutcome {
    /// Returns true when every check passed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateOutcome::Accepted(_))
    }
}

/// Runs the validity checks against a prediction and its source images.
pub fn evaluate(
    pre: &PreprocessedImage,
    prediction: &Prediction,
    config: &GateConfig,
) -> GateOutcome {
    let green_ratio = green_pixel_ratio(pre, config);
    if green_ratio < config.min_green_ratio {
        return GateOutcome::Rejected(GateRejection {
            check: GateCheck::GreenRatio,
            measured: green_ratio,
        });
    }

    let entropy = shannon_entropy(&pre.gray);
    if entropy < config.min_entropy || entropy > config.max_entropy {
        return GateOutcome::Rejected(GateRejection {
            check: GateCheck::Entropy,
            measured: entropy,
        });
    }

    let fg_ratio = foreground_ratio(&prediction.segmentation);
    if fg_ratio < config.min_foreground_ratio {
        return GateOutcome::Rejected(GateRejection {
            check: GateCheck::ForegroundRatio,
            measured: fg_ratio,
        });
    }

    let gray_on_leaf = gray_on_leaf_ratio(pre, &prediction.segmentation, config);
    if gray_on_leaf > config.max_gray_on_leaf {
        return GateOutcome::Rejected(GateRejection {
            check: GateCheck::GrayOnLeaf,
            measured: gray_on_leaf,
        });
    }

    let margin = prediction.margin();
    if prediction.confidence < config.min_confidence || margin < config.min_margin {
        let measured = if prediction.confidence < config.min_confidence {
            prediction.confidence
        } else {
            margin
        };
        return GateOutcome::Rejected(GateRejection {
            check: GateCheck::Confidence,
            measured,
        });
    }

    GateOutcome::Accepted(GateReport {
        green_ratio,
        entropy,
        foreground_ratio: fg_ratio,
        gray_on_leaf,
        confidence: prediction.confidence,
        margin,
    })
}

/// Fraction of pixels whose HSV value falls inside the green window.
fn green_pixel_ratio(pre: &PreprocessedImage, config: &GateConfig) -> f32 {
    let total = (pre.rgb.width() * pre.rgb.height()) as f32;
    if total == 0.0 {
        return 0.0;
    }
    let green = pre
        .rgb
        .pixels()
        .filter(|p| {
            let (h, s, v) = rgb_to_hsv(p[0], p[1], p[2]);
            (config.green_hue_lo..=config.green_hue_hi).contains(&h)
                && s >= config.green_min_sat
                && v >= config.green_min_val
        })
        .count();
    green as f32 / total
}

/// Fraction of segmented-foreground pixels with near-zero saturation.
fn gray_on_leaf_ratio(pre: &PreprocessedImage, mask: &GrayImage, config: &GateConfig) -> f32 {
    let mut on_leaf = 0u32;
    let mut low_sat = 0u32;
    for (pixel, mask_pixel) in pre.rgb.pixels().zip(mask.pixels()) {
        if mask_pixel[0] == 0 {
            continue;
        }
        on_leaf += 1;
        let (_, s, _) = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
        if s < config.low_saturation {
            low_sat += 1;
        }
    }
    if on_leaf == 0 {
        return 0.0;
    }
    low_sat as f32 / on_leaf as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LeafClass;
    use image::{Luma, Rgb, RgbImage};

    fn leafy_preprocessed(green: Rgb<u8>) -> PreprocessedImage {
        // Half leaf, half dark background; enough intensity spread to
        // clear the entropy floor.
        let rgb = RgbImage::from_fn(64, 64, |x, y| {
            if x < 32 {
                Rgb([green[0], green[1].saturating_add((y % 32) as u8), green[2]])
            } else {
                Rgb([(y % 16) as u8, (y % 16) as u8, (y % 16) as u8])
            }
        });
        let gray = crate::processors::rgb_to_luma601(&rgb);
        PreprocessedImage { rgb, gray }
    }

    fn prediction_with(probabilities: [f32; 4], mask: GrayImage) -> Prediction {
        let best = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        Prediction {
            class: LeafClass::from_index(best).unwrap(),
            probabilities,
            confidence: probabilities[best],
            segmentation: mask,
        }
    }

    fn full_mask() -> GrayImage {
        GrayImage::from_pixel(64, 64, Luma([255]))
    }

    #[test]
    fn test_healthy_input_is_accepted() {
        let pre = leafy_preprocessed(Rgb([40, 180, 60]));
        let pred = prediction_with([0.05, 0.8, 0.1, 0.05], full_mask());
        let outcome = evaluate(&pre, &pred, &GateConfig::default());
        assert!(outcome.is_accepted(), "rejected: {outcome:?}");
    }

    #[test]
    fn test_non_green_input_fails_green_check() {
        let rgb = RgbImage::from_fn(64, 64, |_, y| Rgb([200, 30, (y % 64) as u8]));
        let gray = crate::processors::rgb_to_luma601(&rgb);
        let pre = PreprocessedImage { rgb, gray };
        let pred = prediction_with([0.05, 0.8, 0.1, 0.05], full_mask());

        let outcome = evaluate(&pre, &pred, &GateConfig::default());
        match outcome {
            GateOutcome::Rejected(r) => assert_eq!(r.check, GateCheck::GreenRatio),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_image_fails_entropy_check() {
        // Constant green clears the green-ratio check but has zero
        // entropy.
        let rgb = RgbImage::from_pixel(64, 64, Rgb([40, 180, 60]));
        let gray = crate::processors::rgb_to_luma601(&rgb);
        let pre = PreprocessedImage { rgb, gray };
        let pred = prediction_with([0.05, 0.8, 0.1, 0.05], full_mask());

        let outcome = evaluate(&pre, &pred, &GateConfig::default());
        match outcome {
            GateOutcome::Rejected(r) => assert_eq!(r.check, GateCheck::Entropy),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_small_foreground_fails_area_check() {
        let pre = leafy_preprocessed(Rgb([40, 180, 60]));
        // 2 foreground pixels out of 4096.
        let mut mask = GrayImage::from_pixel(64, 64, Luma([0]));
        mask.put_pixel(0, 0, Luma([255]));
        mask.put_pixel(1, 0, Luma([255]));
        let pred = prediction_with([0.05, 0.8, 0.1, 0.05], mask);

        let outcome = evaluate(&pre, &pred, &GateConfig::default());
        match outcome {
            GateOutcome::Rejected(r) => assert_eq!(r.check, GateCheck::ForegroundRatio),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_low_confidence_fails_confidence_check() {
        let pre = leafy_preprocessed(Rgb([40, 180, 60]));
        let pred = prediction_with([0.3, 0.35, 0.2, 0.15], full_mask());

        let outcome = evaluate(&pre, &pred, &GateConfig::default());
        match outcome {
            GateOutcome::Rejected(r) => assert_eq!(r.check, GateCheck::Confidence),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_small_margin_fails_confidence_check() {
        let pre = leafy_preprocessed(Rgb([40, 180, 60]));
        // Raw scores need not sum to 1: confidence clears the floor but
        // the top two classes are nearly tied.
        let pred = prediction_with([0.05, 0.60, 0.55, 0.05], full_mask());

        let outcome = evaluate(&pre, &pred, &GateConfig::default());
        match outcome {
            GateOutcome::Rejected(r) => assert_eq!(r.check, GateCheck::Confidence),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_desaturated_leaf_fails_gray_on_leaf_check() {
        // Foreground is almost entirely near-gray pixels; the leaf looks
        // like a grayscale photograph.
        let rgb = RgbImage::from_fn(64, 64, |x, y| {
            if x < 8 {
                Rgb([40, 180, 60])
            } else {
                let v = 60 + ((x + y) % 120) as u8;
                Rgb([v, v, v])
            }
        });
        let gray = crate::processors::rgb_to_luma601(&rgb);
        let pre = PreprocessedImage { rgb, gray };
        let config = GateConfig {
            min_green_ratio: 0.05,
            ..GateConfig::default()
        };
        let pred = prediction_with([0.05, 0.8, 0.1, 0.05], full_mask());

        let outcome = evaluate(&pre, &pred, &config);
        match outcome {
            GateOutcome::Rejected(r) => assert_eq!(r.check, GateCheck::GrayOnLeaf),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
