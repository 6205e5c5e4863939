//! # cornshield
//!
//! A Rust library that classifies corn-leaf images into four condition
//! classes (healthy, damaged, blight, rust) using hand-engineered texture
//! features and a pre-trained gradient-boosted-tree model in ONNX format.
//!
//! ## Features
//!
//! - Fixed 256x256 preprocessing canvas with BT.601 grayscale derivation
//! - Three deterministic texture descriptors assembled into a
//!   313-dimensional feature vector (256 + 32 + 25)
//! - Otsu segmentation mask for display and validity heuristics
//! - Lazily-loaded, process-cached ONNX classifier via ONNX Runtime
//! - Optional heuristic validity gate over raw predictions
//!
//! ## Modules
//!
//! * [`core`] - Error and configuration types
//! * [`domain`] - The class set and prediction results
//! * [`processors`] - Preprocessing and segmentation
//! * [`features`] - Texture feature extraction
//! * [`classifier`] - The tree-ensemble classifier adapter
//! * [`pipeline`] - End-to-end pipeline and validity gate
//! * [`utils`] - Image loading and measurement helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cornshield::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = CornPipeline::with_defaults()?;
//! let prediction = pipeline.predict_path("leaf.jpg")?;
//!
//! println!(
//!     "{} ({:.1}% confidence)",
//!     prediction.class,
//!     prediction.confidence * 100.0
//! );
//! for (class, probability) in prediction.ranked() {
//!     println!("  {class}: {probability:.3}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Feature extraction is usable on its own when only the descriptor
//! vector is needed:
//!
//! ```rust
//! use cornshield::core::FeatureConfig;
//! use cornshield::features::{FEATURE_LEN, extract_features};
//! use image::GrayImage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gray = GrayImage::new(256, 256);
//! let features = extract_features(&gray, &FeatureConfig::default())?;
//! assert_eq!(features.len(), FEATURE_LEN);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod core;
pub mod domain;
pub mod features;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use cornshield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{PipelineConfig, PipelineError, PipelineResult};
    pub use crate::domain::{LeafClass, Prediction};
    pub use crate::features::{FEATURE_LEN, extract_features};
    pub use crate::pipeline::{CornPipeline, GatedPrediction, gate::GateOutcome};
    pub use crate::utils::load_image;
}
