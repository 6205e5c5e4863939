//! Image processing stages: preprocessing and segmentation.

pub mod preprocess;
pub mod segmentation;

pub use preprocess::{PreprocessedImage, preprocess, rgb_to_luma601};
pub use segmentation::{foreground_ratio, segment_otsu};
