//! End-to-end classification pipeline.
//!
//! Orchestrates the stages in their fixed order: preprocessing, Otsu
//! segmentation, texture feature extraction, and classification. The
//! segmenter's output is independent of the feature path - the descriptors
//! only ever see the grayscale image.
//!
//! Two entry points are provided: [`CornPipeline::predict`] returns the raw
//! pipeline output, and [`CornPipeline::predict_gated`] additionally runs
//! the heuristic validity gate over it.

pub mod gate;

use crate::classifier::ClassifierHandle;
use crate::core::{PipelineConfig, PipelineError, SimpleError};
use crate::domain::{LeafClass, Prediction};
use crate::features::extract_features;
use crate::pipeline::gate::GateOutcome;
use crate::processors::{PreprocessedImage, preprocess, segment_otsu};
use crate::utils::load_image;
use image::DynamicImage;
use std::path::Path;
use tracing::{debug, warn};

/// A prediction together with the validity-gate outcome for its input.
#[derive(Debug, Clone)]
pub struct GatedPrediction {
    /// The raw pipeline output.
    pub prediction: Prediction,
    /// Outcome of the heuristic validity checks.
    pub gate: GateOutcome,
}

/// The corn-leaf classification pipeline.
///
/// Holds the validated configuration and the lazily-loaded classifier
/// handle. All per-call state (images, histograms, feature vectors) is
/// created fresh per inference and dropped afterwards; the model handle is
/// the only state shared across calls and is read-only once loaded.
#[derive(Debug)]
pub struct CornPipeline {
    config: PipelineConfig,
    classifier: ClassifierHandle,
}

impl CornPipeline {
    /// Creates a pipeline from a validated configuration.
    ///
    /// The model artifact is not touched here; it is loaded on the first
    /// prediction.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let classifier = ClassifierHandle::new(config.model_path.clone());
        Ok(Self { config, classifier })
    }

    /// Creates a pipeline with the default configuration.
    pub fn with_defaults() -> Result<Self, PipelineError> {
        Self::new(PipelineConfig::default())
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns true once the classifier artifact has been loaded.
    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_loaded()
    }

    /// Runs the full pipeline on an in-memory image.
    pub fn predict(&self, img: &DynamicImage) -> Result<Prediction, PipelineError> {
        let pre = preprocess(img, &self.config.preprocess)?;
        self.predict_preprocessed(&pre)
    }

    /// Runs the full pipeline on an image loaded from disk.
    pub fn predict_path(&self, path: impl AsRef<Path>) -> Result<Prediction, PipelineError> {
        let rgb = load_image(path.as_ref())?;
        self.predict(&DynamicImage::ImageRgb8(rgb))
    }

    /// Runs the full pipeline and the validity gate on an in-memory image.
    ///
    /// The gate never fails the call: a rejected input still carries the
    /// raw prediction so callers can decide what to surface.
    pub fn predict_gated(&self, img: &DynamicImage) -> Result<GatedPrediction, PipelineError> {
        let pre = preprocess(img, &self.config.preprocess)?;
        let prediction = self.predict_preprocessed(&pre)?;
        let gate = gate::evaluate(&pre, &prediction, &self.config.gate);
        if let GateOutcome::Rejected(rejection) = &gate {
            warn!(%rejection, "input rejected by validity gate");
        }
        Ok(GatedPrediction { prediction, gate })
    }

    fn predict_preprocessed(&self, pre: &PreprocessedImage) -> Result<Prediction, PipelineError> {
        let segmentation = segment_otsu(&pre.gray);
        let features = extract_features(&pre.gray, &self.config.features)?;

        let classifier = self.classifier.get()?;
        let (index, probabilities) = classifier.predict(&features)?;
        let class = LeafClass::from_index(index).ok_or_else(|| {
            PipelineError::classification(
                "class index out of range",
                SimpleError::new(format!("model returned class index {index}")),
            )
        })?;
        let confidence = probabilities[index];

        debug!(
            class = %class,
            confidence,
            features = features.len(),
            "classified leaf image"
        );

        Ok(Prediction {
            class,
            probabilities,
            confidence,
            segmentation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FeatureConfig;
    use image::{Rgb, RgbImage};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(320, 240, |x, y| {
            Rgb([
                (x % 97) as u8,
                (160 + (y % 64)) as u8,
                ((x + y) % 53) as u8,
            ])
        }))
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = PipelineConfig {
            features: FeatureConfig {
                dor_window: 4,
                ..FeatureConfig::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            CornPipeline::new(config),
            Err(PipelineError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_missing_model_surfaces_model_not_found() {
        // Preprocessing, segmentation, and extraction all succeed; the
        // call fails at the one-time model load and stays retryable.
        let config = PipelineConfig {
            model_path: "models/not_a_real_model.onnx".into(),
            ..PipelineConfig::default()
        };
        let pipeline = CornPipeline::new(config).unwrap();

        let err = pipeline.predict(&sample_image()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelNotFound { .. }));
        assert!(!pipeline.is_model_loaded());

        let err = pipeline.predict(&sample_image()).unwrap_err();
        assert!(matches!(err, PipelineError::ModelNotFound { .. }));
    }

    #[test]
    fn test_predict_path_missing_file_is_image_load_error() {
        let pipeline = CornPipeline::with_defaults().unwrap();
        let err = pipeline.predict_path("no/such/leaf.jpg").unwrap_err();
        assert!(matches!(err, PipelineError::ImageLoad(_)));
    }
}
