//! DOR (directional order relation) descriptor.
//!
//! For every pixel, a WxW window (mirror-padded at the borders) is compared
//! against its center: the flat row-major index of the cell with the
//! largest absolute difference is recorded, and the indices collected over
//! the whole image are binned into a normalized W²-bin histogram. The
//! descriptor captures which relative position holds the most different
//! pixel, an index-based co-occurrence signature over the image.

use image::GrayImage;
use rayon::prelude::*;

use super::{normalize_counts, reflect101};

/// Computes the DOR histogram of a grayscale image.
///
/// `window` must be odd; ties in the window arg-max resolve to the lowest
/// flat index (first occurrence), which skews constant regions toward
/// bin 0. Images too small for the mirror padding normalize to the
/// all-zero histogram.
pub fn dor_histogram(gray: &GrayImage, window: usize) -> Vec<f32> {
    let bins = window * window;
    if window == 0 || window % 2 == 0 {
        return normalize_counts(&vec![0u32; bins.max(1)]);
    }

    let (width, height) = gray.dimensions();
    let pad = window / 2;
    let zero = vec![0u32; bins];
    // Mirror padding by `pad` needs at least pad + 1 samples per axis.
    if (width as usize) <= pad || (height as usize) <= pad {
        return normalize_counts(&zero);
    }

    let data = gray.as_raw();
    let (w, h) = (width as i64, height as i64);
    let stride = width as usize;
    let pad = pad as i64;

    let counts = (0..h)
        .into_par_iter()
        .fold(
            || vec![0u32; bins],
            |mut acc, y| {
                for x in 0..w {
                    let center = data[y as usize * stride + x as usize] as f32;
                    let mut best = f32::NEG_INFINITY;
                    let mut best_idx = 0usize;
                    for wy in 0..window as i64 {
                        let sy = reflect101(y + wy - pad, h);
                        for wx in 0..window as i64 {
                            let sx = reflect101(x + wx - pad, w);
                            let diff = (data[sy * stride + sx] as f32 - center).abs();
                            if diff > best {
                                best = diff;
                                best_idx = (wy as usize) * window + wx as usize;
                            }
                        }
                    }
                    acc[best_idx] += 1;
                }
                acc
            },
        )
        .reduce(
            || vec![0u32; bins],
            |mut a, b| {
                for (lhs, rhs) in a.iter_mut().zip(b) {
                    *lhs += rhs;
                }
                a
            },
        );

    normalize_counts(&counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DOR_BINS;
    use image::Luma;

    #[test]
    fn test_constant_image_ties_resolve_to_bin_zero() {
        // Every difference is exactly zero, so first-occurrence arg-max
        // always lands on flat index 0.
        let img = GrayImage::from_pixel(32, 32, Luma([66]));
        let hist = dor_histogram(&img, 5);

        assert_eq!(hist.len(), DOR_BINS);
        assert!(hist[0] > 0.999);
        assert!(hist[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_bright_pixel_dominates_neighboring_windows() {
        // A lone bright pixel at (8, 8) is the most different cell for
        // every window that contains it; the recorded index names where
        // the spike sits relative to each center.
        let mut img = GrayImage::from_pixel(17, 17, Luma([50]));
        img.put_pixel(8, 8, Luma([250]));
        let hist = dor_histogram(&img, 5);

        // 25 centers contain the spike: the spike's own window ties to
        // bin 0, the center two-right-two-down of it sees the spike at
        // window cell (0, 0), and the remaining 23 record nonzero indices.
        let off_center_mass: f32 = (1..DOR_BINS).map(|i| hist[i]).sum();
        let expected = 23.0 / (17.0 * 17.0);
        assert!((off_center_mass - expected).abs() < 1e-5);
    }

    #[test]
    fn test_spike_direction_maps_to_flat_index() {
        // Center (10, 10), spike at (12, 12): window offset (+2, +2) is
        // row 4, column 4 of the 5x5 window, flat index 24.
        let mut img = GrayImage::from_pixel(21, 21, Luma([100]));
        img.put_pixel(12, 12, Luma([255]));
        let hist = dor_histogram(&img, 5);

        assert!(hist[24] > 0.0);
    }

    #[test]
    fn test_histogram_is_normalized() {
        let img = GrayImage::from_fn(40, 40, |x, y| Luma([((x * 9 + y * 23) % 256) as u8]));
        let hist = dor_histogram(&img, 5);
        let sum: f32 = hist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_even_window_yields_zero_histogram() {
        let img = GrayImage::from_pixel(16, 16, Luma([10]));
        let hist = dor_histogram(&img, 4);
        assert!(hist.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mirror_padding_keeps_border_windows_in_range() {
        // A gradient image exercises every border window; the histogram
        // must stay normalized with all mass inside the W² bins.
        let img = GrayImage::from_fn(12, 12, |x, y| Luma([(x * 20 + y) as u8]));
        let hist = dor_histogram(&img, 5);
        let sum: f32 = hist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_idempotent() {
        let img = GrayImage::from_fn(33, 33, |x, y| Luma([((x * 3 + y * 31) % 256) as u8]));
        assert_eq!(dor_histogram(&img, 5), dor_histogram(&img, 5));
    }
}
