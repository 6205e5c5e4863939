//! Prediction output of the classification pipeline.

use crate::domain::class::{CLASS_COUNT, LeafClass};
use image::GrayImage;

/// Result of running the full pipeline on a single image.
///
/// Probabilities are aligned to the fixed class ordering of
/// [`LeafClass::ALL`]. The segmentation mask is produced at the pipeline's
/// working resolution; callers overlaying it on a differently-sized image
/// must resize that image to the mask's dimensions, never the reverse.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// The predicted condition class.
    pub class: LeafClass,
    /// Per-class probability distribution in model output order.
    pub probabilities: [f32; CLASS_COUNT],
    /// Confidence of the prediction (the maximum probability).
    pub confidence: f32,
    /// Binary foreground mask from Otsu segmentation (0 or 255).
    pub segmentation: GrayImage,
}

impl Prediction {
    /// Returns the gap between the top-1 and top-2 class probabilities.
    ///
    /// Used by the validity gate as a rejection signal: a small margin
    /// means the classifier could not separate the two best candidates.
    pub fn margin(&self) -> f32 {
        let mut sorted = self.probabilities;
        sorted.sort_unstable_by(|a, b| b.total_cmp(a));
        sorted[0] - sorted[1]
    }

    /// Returns classes and probabilities paired, ordered by probability
    /// descending.
    pub fn ranked(&self) -> [(LeafClass, f32); CLASS_COUNT] {
        let mut pairs: [(LeafClass, f32); CLASS_COUNT] = [
            (LeafClass::ALL[0], self.probabilities[0]),
            (LeafClass::ALL[1], self.probabilities[1]),
            (LeafClass::ALL[2], self.probabilities[2]),
            (LeafClass::ALL[3], self.probabilities[3]),
        ];
        pairs.sort_unstable_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }
}
