//! Utility functions for image handling.

pub mod image;

pub use image::{dynamic_to_rgb, load_image, rgb_to_hsv, shannon_entropy};
