//! Domain types: the class set and prediction results.

pub mod class;
pub mod prediction;

pub use class::{CLASS_COUNT, LeafClass};
pub use prediction::Prediction;
