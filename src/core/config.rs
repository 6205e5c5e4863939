//! Configuration types for the classification pipeline.
//!
//! Every stage of the pipeline is driven by a small serde-serializable
//! config struct with defaults matching the parameters the persisted
//! classifier was trained with. Changing the feature parameters invalidates
//! the trained model, so `FeatureConfig::validate` enforces the contract
//! between descriptor parameters and histogram lengths.

use crate::core::errors::PipelineError;
use crate::features::{COARSE_BINS, DOR_BINS, FINE_BINS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default relative path of the serialized classifier artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/xgb_corn_leaf.onnx";

/// Parameters for the three texture descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Sampling radius for the fine-texture descriptor.
    pub radius: u32,
    /// Number of neighbors sampled around each center pixel.
    pub neighbors: u32,
    /// Scan stride of the fine-texture sampling grid.
    pub step: u32,
    /// Number of bins in the gradient-magnitude histogram.
    pub coarse_bins: usize,
    /// Window size (odd) for the directional-order-relation descriptor.
    pub dor_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            radius: 1,
            neighbors: 8,
            step: 2,
            coarse_bins: COARSE_BINS,
            dor_window: 5,
        }
    }
}

impl FeatureConfig {
    /// Validates the descriptor parameters against the fixed histogram
    /// lengths the trained model expects.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// * `radius` or `step` is zero
    /// * `neighbors` does not produce a code space matching the 256-bin
    ///   fine histogram (i.e. `neighbors != 8`)
    /// * `coarse_bins` does not match the 32-bin coarse histogram
    /// * `dor_window` is even, smaller than 3, or its squared size does not
    ///   match the 25-bin DOR histogram
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.radius == 0 {
            return Err(PipelineError::config_error_with_context(
                "radius",
                &self.radius.to_string(),
                "must be at least 1",
            ));
        }
        if self.step == 0 {
            return Err(PipelineError::config_error_with_context(
                "step",
                &self.step.to_string(),
                "must be at least 1",
            ));
        }
        if self.neighbors >= 16 || 1usize << self.neighbors != FINE_BINS {
            return Err(PipelineError::config_error_with_context(
                "neighbors",
                &self.neighbors.to_string(),
                &format!("code space 2^neighbors must equal {FINE_BINS} bins"),
            ));
        }
        if self.coarse_bins != COARSE_BINS {
            return Err(PipelineError::config_error_with_context(
                "coarse_bins",
                &self.coarse_bins.to_string(),
                &format!("must equal {COARSE_BINS} bins"),
            ));
        }
        if self.dor_window < 3 || self.dor_window % 2 == 0 {
            return Err(PipelineError::config_error_with_context(
                "dor_window",
                &self.dor_window.to_string(),
                "must be an odd value of at least 3",
            ));
        }
        if self.dor_window * self.dor_window != DOR_BINS {
            return Err(PipelineError::config_error_with_context(
                "dor_window",
                &self.dor_window.to_string(),
                &format!("squared window size must equal {DOR_BINS} bins"),
            ));
        }
        Ok(())
    }
}

/// Parameters for input preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Target width of the working canvas.
    pub target_width: u32,
    /// Target height of the working canvas.
    pub target_height: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_width: 256,
            target_height: 256,
        }
    }
}

impl PreprocessConfig {
    /// Validates the target canvas dimensions.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(PipelineError::config_error(format!(
                "target size must be non-zero, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        Ok(())
    }
}

/// Thresholds for the heuristic validity gate.
///
/// The gate is caller-side policy layered on top of raw pipeline outputs;
/// these defaults reproduce the thresholds the original deployment used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Minimum fraction of green pixels in the working image.
    pub min_green_ratio: f32,
    /// Lower hue bound of the green window (OpenCV scale, 0-180).
    pub green_hue_lo: u8,
    /// Upper hue bound of the green window (OpenCV scale, 0-180).
    pub green_hue_hi: u8,
    /// Minimum saturation for a pixel to count as green.
    pub green_min_sat: u8,
    /// Minimum value (brightness) for a pixel to count as green.
    pub green_min_val: u8,
    /// Lower bound of the accepted grayscale Shannon entropy.
    pub min_entropy: f32,
    /// Upper bound of the accepted grayscale Shannon entropy.
    pub max_entropy: f32,
    /// Minimum segmented foreground area ratio.
    pub min_foreground_ratio: f32,
    /// Saturation below which a foreground pixel counts as grayscale.
    pub low_saturation: u8,
    /// Maximum fraction of low-saturation pixels on the segmented leaf.
    pub max_gray_on_leaf: f32,
    /// Minimum top-1 probability for the prediction to be displayed.
    pub min_confidence: f32,
    /// Minimum gap between the top-1 and top-2 probabilities.
    pub min_margin: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_green_ratio: 0.15,
            green_hue_lo: 25,
            green_hue_hi: 95,
            green_min_sat: 40,
            green_min_val: 40,
            min_entropy: 3.0,
            max_entropy: 8.8,
            min_foreground_ratio: 0.05,
            low_saturation: 30,
            max_gray_on_leaf: 0.85,
            min_confidence: 0.55,
            min_margin: 0.10,
        }
    }
}

impl GateConfig {
    /// Validates the gate thresholds.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.green_hue_lo > self.green_hue_hi {
            return Err(PipelineError::config_error(format!(
                "green hue window is inverted: {}..{}",
                self.green_hue_lo, self.green_hue_hi
            )));
        }
        if self.min_entropy > self.max_entropy {
            return Err(PipelineError::config_error(format!(
                "entropy window is inverted: {}..{}",
                self.min_entropy, self.max_entropy
            )));
        }
        for (name, value) in [
            ("min_green_ratio", self.min_green_ratio),
            ("min_foreground_ratio", self.min_foreground_ratio),
            ("max_gray_on_leaf", self.max_gray_on_leaf),
            ("min_confidence", self.min_confidence),
            ("min_margin", self.min_margin),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::config_error_with_context(
                    name,
                    &value.to_string(),
                    "must be a ratio in [0, 1]",
                ));
            }
        }
        Ok(())
    }
}

/// Top-level configuration for the classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Preprocessing parameters.
    pub preprocess: PreprocessConfig,
    /// Texture descriptor parameters.
    pub features: FeatureConfig,
    /// Validity gate thresholds.
    pub gate: GateConfig,
    /// Path of the serialized classifier artifact.
    pub model_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            features: FeatureConfig::default(),
            gate: GateConfig::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl PipelineConfig {
    /// Validates all nested configuration sections.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.preprocess.validate()?;
        self.features.validate()?;
        self.gate.validate()?;
        Ok(())
    }
}
