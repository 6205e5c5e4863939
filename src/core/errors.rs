//! Error types for the classification pipeline.
//!
//! This module defines the error types that can occur while preprocessing
//! images, extracting texture features, and running the tree-ensemble
//! classifier. It also provides utility functions for creating these errors
//! with appropriate context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Enum representing different stages of processing in the pipeline.
///
/// This enum is used to identify which stage of the pipeline an error
/// occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred while preprocessing the input image.
    Preprocess,
    /// Error occurred during Otsu segmentation.
    Segmentation,
    /// Error occurred while extracting texture features.
    FeatureExtraction,
    /// Error occurred while running the classifier.
    Classification,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Preprocess => write!(f, "preprocess"),
            ProcessingStage::Segmentation => write!(f, "segmentation"),
            ProcessingStage::FeatureExtraction => write!(f, "feature extraction"),
            ProcessingStage::Classification => write!(f, "classification"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the pipeline.
///
/// Model-artifact problems (`ModelNotFound`, `ModelLoad`) are hard failures:
/// they are surfaced to the caller and never silently defaulted. Extraction
/// stage errors fail the whole inference call; no partial feature vectors
/// are ever returned.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input cannot be decoded or converted to the required form.
    #[error("invalid image: {message}")]
    InvalidImage {
        /// A message describing why the input was rejected.
        message: String,
    },

    /// Error occurred while decoding an image file.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// The classifier artifact does not exist at the expected path.
    #[error("model not found at {}", path.display())]
    ModelNotFound {
        /// The path that was probed for the artifact.
        path: PathBuf,
    },

    /// The classifier artifact exists but could not be loaded.
    #[error("model load failed for {}: {context}", path.display())]
    ModelLoad {
        /// The path of the artifact that failed to load.
        path: PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during processing.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage of the pipeline where the error occurred.
        stage: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Creates a PipelineError for invalid input images.
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
        }
    }

    /// Creates a PipelineError for a missing model artifact.
    pub fn model_not_found(path: &Path) -> Self {
        Self::ModelNotFound {
            path: path.to_path_buf(),
        }
    }

    /// Creates a PipelineError for a model artifact that failed to load.
    pub fn model_load(
        path: &Path,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a PipelineError for a failed processing stage.
    pub fn processing(
        stage: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a PipelineError for classification failures.
    pub fn classification(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage: ProcessingStage::Classification,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a PipelineError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a PipelineError for configuration errors with field context.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::ConfigError {
            message: format!(
                "Configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

/// A simple error type carrying only a message.
///
/// Used as the source for errors where no richer underlying error exists.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found_carries_path() {
        let err = PipelineError::model_not_found(Path::new("models/missing.onnx"));
        match err {
            PipelineError::ModelNotFound { ref path } => {
                assert_eq!(path, Path::new("models/missing.onnx"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn test_processing_stage_display() {
        assert_eq!(
            ProcessingStage::FeatureExtraction.to_string(),
            "feature extraction"
        );
        assert_eq!(ProcessingStage::Segmentation.to_string(), "segmentation");
    }

    #[test]
    fn test_config_error_with_context_message() {
        let err = PipelineError::config_error_with_context("dor_window", "4", "must be odd");
        assert!(err.to_string().contains("dor_window"));
        assert!(err.to_string().contains("must be odd"));
    }
}
