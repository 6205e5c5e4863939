//! Texture feature extraction.
//!
//! Three independent descriptors are computed from the preprocessed
//! grayscale image and concatenated into one fixed-length vector:
//!
//! * [`fine::fine_histogram`] - rotation-invariant local intensity-order
//!   codes, 256 bins
//! * [`coarse::coarse_histogram`] - gradient magnitudes, 32 bins
//! * [`dor::dor_histogram`] - directional order relations, 25 bins
//!
//! The concatenation order and the individual histogram lengths are a
//! contract with the persisted classifier; changing either invalidates the
//! trained model.

pub mod coarse;
pub mod dor;
pub mod fine;

use crate::core::{FeatureConfig, PipelineError};
use image::GrayImage;

pub use coarse::coarse_histogram;
pub use dor::dor_histogram;
pub use fine::fine_histogram;

/// Number of bins in the fine-texture histogram.
pub const FINE_BINS: usize = 256;
/// Number of bins in the gradient-magnitude histogram.
pub const COARSE_BINS: usize = 32;
/// Number of bins in the DOR histogram.
pub const DOR_BINS: usize = 25;
/// Length of the assembled feature vector.
pub const FEATURE_LEN: usize = FINE_BINS + COARSE_BINS + DOR_BINS;

/// Extracts the full feature vector from a grayscale image.
///
/// The three descriptors have no interdependency and run in parallel; their
/// histograms are concatenated in the fixed order [fine, coarse, dor].
/// Each sub-histogram sums to 1 on its own, so the assembled vector sums
/// to 3 rather than 1 - this matches the input distribution the classifier
/// was trained on and no cross-descriptor normalization is applied.
///
/// # Errors
///
/// Returns a `ConfigError` if the descriptor parameters do not match the
/// fixed histogram lengths.
pub fn extract_features(gray: &GrayImage, config: &FeatureConfig) -> Result<Vec<f32>, PipelineError> {
    config.validate()?;

    let (fine, (coarse, dor)) = rayon::join(
        || fine_histogram(gray, config.radius, config.neighbors, config.step),
        || {
            rayon::join(
                || coarse_histogram(gray, config.coarse_bins),
                || dor_histogram(gray, config.dor_window),
            )
        },
    );

    let mut features = Vec::with_capacity(FEATURE_LEN);
    features.extend_from_slice(&fine);
    features.extend_from_slice(&coarse);
    features.extend_from_slice(&dor);
    Ok(features)
}

/// Normalizes raw bin counts into a histogram summing to 1.
///
/// The epsilon keeps the division defined when all counts are zero; that
/// degenerate case yields the all-zero histogram rather than an error.
pub(crate) fn normalize_counts(counts: &[u32]) -> Vec<f32> {
    let total: u64 = counts.iter().map(|&c| c as u64).sum();
    let denom = total as f64 + 1e-8;
    counts.iter().map(|&c| (c as f64 / denom) as f32).collect()
}

/// Mirrors an out-of-range index back into [0, len) without duplicating the
/// edge sample (reflect-101).
#[inline]
pub(crate) fn reflect101(i: i64, len: i64) -> usize {
    let j = if i < 0 {
        -i
    } else if i >= len {
        2 * len - i - 2
    } else {
        i
    };
    j as usize
}
