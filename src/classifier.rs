//! Classifier adapter for the persisted tree-ensemble model.
//!
//! The trained gradient-boosted-tree classifier is consumed as an opaque
//! ONNX artifact: a [1, 313] f32 feature tensor in, a 4-class probability
//! distribution out. The adapter performs a one-time load and holds the
//! session for the remainder of the process; prediction never retries
//! internally and has no side effects beyond that load.

use crate::core::{PipelineError, SimpleError};
use crate::domain::class::CLASS_COUNT;
use crate::features::FEATURE_LEN;
use ndarray::Array2;
use once_cell::sync::OnceCell;
use ort::{session::Session, value::TensorRef};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Input tensor names probed when the model does not use the default.
const COMMON_INPUT_NAMES: [&str; 4] = ["input", "float_input", "features", "x"];

/// Output name carrying per-class probabilities in common sklearn/XGBoost
/// ONNX exports; other outputs (e.g. the argmax label) are skipped.
const PROBABILITY_OUTPUT: &str = "probabilities";

/// A loaded tree-ensemble classifier.
///
/// The session is mutex-guarded because ONNX Runtime requires exclusive
/// access per run; the model weights themselves are read-only after load.
#[derive(Debug)]
pub struct CornClassifier {
    /// ONNX Runtime session for the tree-ensemble model.
    session: Mutex<Session>,
    /// The name of the input tensor.
    input_name: String,
    /// Output names in probe order (probability output first).
    output_names: Vec<String>,
    /// The path the model was loaded from, kept for error context.
    model_path: PathBuf,
}

impl CornClassifier {
    /// Loads the classifier from a serialized ONNX artifact.
    ///
    /// # Errors
    ///
    /// * `ModelNotFound` if `model_path` does not exist
    /// * `ModelLoad` if the artifact exists but cannot be parsed into a
    ///   session, or exposes no usable input/output tensors
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(PipelineError::model_not_found(path));
        }

        let session = Session::builder()
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| PipelineError::model_load(path, "failed to create ONNX session", e))?;

        let available_inputs: Vec<String> =
            session.inputs().iter().map(|i| i.name().to_string()).collect();
        let input_name = COMMON_INPUT_NAMES
            .iter()
            .find(|&&name| available_inputs.iter().any(|i| i == name))
            .map(|&name| name.to_string())
            .or_else(|| available_inputs.first().cloned())
            .ok_or_else(|| {
                PipelineError::model_load(
                    path,
                    "model exposes no input tensors",
                    SimpleError::new("empty session input list"),
                )
            })?;

        let mut output_names: Vec<String> =
            session.outputs().iter().map(|o| o.name().to_string()).collect();
        if output_names.is_empty() {
            return Err(PipelineError::model_load(
                path,
                "model exposes no output tensors",
                SimpleError::new("empty session output list"),
            ));
        }
        // Probe the probability output before any label output.
        output_names.sort_by_key(|name| name.as_str() != PROBABILITY_OUTPUT);

        debug!(
            model = %path.display(),
            input = %input_name,
            outputs = ?output_names,
            "classifier session created"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_names,
            model_path: path.to_path_buf(),
        })
    }

    /// Returns the path the model was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Maps a feature vector to a class index and probability distribution.
    ///
    /// The returned index and probabilities follow the fixed training-time
    /// class ordering. No internal retry: callers decide retry policy.
    ///
    /// # Errors
    ///
    /// Fails if the feature vector does not have the expected length, the
    /// session run fails, or the model yields no 4-class f32 output.
    pub fn predict(&self, features: &[f32]) -> Result<(usize, [f32; CLASS_COUNT]), PipelineError> {
        if features.len() != FEATURE_LEN {
            return Err(PipelineError::classification(
                "feature vector length mismatch",
                SimpleError::new(format!(
                    "expected {FEATURE_LEN} features, got {}",
                    features.len()
                )),
            ));
        }

        let input = Array2::from_shape_vec((1, FEATURE_LEN), features.to_vec())?;
        let input_tensor = TensorRef::from_array_view(input.view())
            .map_err(|e| PipelineError::classification("failed to build input tensor", e))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            PipelineError::classification(
                "failed to acquire session lock",
                SimpleError::new("classifier session mutex poisoned"),
            )
        })?;
        let outputs = session.run(inputs)?;

        for name in &self.output_names {
            let Ok((_, data)) = outputs[name.as_str()].try_extract_tensor::<f32>() else {
                continue;
            };
            if data.len() != CLASS_COUNT {
                continue;
            }
            let mut probabilities = [0f32; CLASS_COUNT];
            probabilities.copy_from_slice(data);
            let class_index = probabilities
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap_or(0);
            return Ok((class_index, probabilities));
        }

        Err(PipelineError::classification(
            "no usable probability output",
            SimpleError::new(format!(
                "model '{}' produced no f32 output of length {CLASS_COUNT}",
                self.model_path.display()
            )),
        ))
    }
}

/// Lazily-initialized, process-wide classifier cache.
///
/// The first caller performs the load under mutual exclusion; a successful
/// load is cached for the process lifetime and subsequent reads take no
/// lock. A failed load is NOT cached: the error is surfaced to the caller
/// and a later call attempts the load again.
#[derive(Debug)]
pub struct ClassifierHandle {
    /// Path of the serialized model artifact.
    model_path: PathBuf,
    /// The once-guarded slot holding the loaded classifier.
    cell: OnceCell<CornClassifier>,
}

impl ClassifierHandle {
    /// Creates an unloaded handle for the given artifact path.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Returns the loaded classifier, loading it on first use.
    pub fn get(&self) -> Result<&CornClassifier, PipelineError> {
        self.cell
            .get_or_try_init(|| CornClassifier::load(&self.model_path))
    }

    /// Returns true if the classifier has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns the configured artifact path.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_is_model_not_found() {
        let err = CornClassifier::load("models/does_not_exist.onnx").unwrap_err();
        assert!(matches!(err, PipelineError::ModelNotFound { .. }));
    }

    #[test]
    fn test_handle_failure_is_not_cached() {
        let handle = ClassifierHandle::new("models/does_not_exist.onnx");

        // Both attempts must surface the load failure; the handle never
        // serves a stale cached result after an error.
        assert!(matches!(
            handle.get(),
            Err(PipelineError::ModelNotFound { .. })
        ));
        assert!(!handle.is_loaded());
        assert!(matches!(
            handle.get(),
            Err(PipelineError::ModelNotFound { .. })
        ));
        assert!(!handle.is_loaded());
    }

    #[test]
    fn test_corrupt_artifact_is_model_load_error() {
        let path = std::env::temp_dir().join("cornshield_corrupt_model_test.onnx");
        std::fs::write(&path, b"definitely not an onnx protobuf").unwrap();

        let err = CornClassifier::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ModelLoad { .. }));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_handle_reports_configured_path() {
        let handle = ClassifierHandle::new("models/xgb_corn_leaf.onnx");
        assert_eq!(
            handle.model_path(),
            Path::new("models/xgb_corn_leaf.onnx")
        );
        assert!(!handle.is_loaded());
    }
}
