//! Core error and configuration types shared across the pipeline.

pub mod config;
pub mod errors;

pub use config::{
    DEFAULT_MODEL_PATH, FeatureConfig, GateConfig, PipelineConfig, PreprocessConfig,
};
pub use errors::{PipelineError, ProcessingStage, SimpleError};

/// Convenient result alias used throughout the crate.
pub type PipelineResult<T> = Result<T, PipelineError>;
