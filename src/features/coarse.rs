//! Coarse texture descriptor: gradient-magnitude histogram.
//!
//! A 3x3 Sobel pass over the f32-cast image yields per-pixel gradient
//! magnitudes; their distribution is binned over the data-dependent range
//! [0, max + 1e-8]. The bin edges therefore vary per image: the descriptor
//! captures the shape of the magnitude distribution, not calibrated
//! absolute magnitudes.

use image::GrayImage;

use super::{normalize_counts, reflect101};

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Computes the gradient-magnitude histogram of a grayscale image.
///
/// Border pixels are included, with the 3x3 window indices mirrored across
/// the image edge (reflect-101, the edge pixel itself not duplicated).
/// A constant image has zero magnitude everywhere and collapses into the
/// first bin.
pub fn coarse_histogram(gray: &GrayImage, bins: usize) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    if bins == 0 {
        return Vec::new();
    }
    let zero = vec![0u32; bins];
    // Reflect-101 needs at least two samples per axis to mirror across.
    if width < 2 || height < 2 {
        return normalize_counts(&zero);
    }

    let data = gray.as_raw();
    let (w, h) = (width as i64, height as i64);
    let stride = width as usize;

    let mut magnitudes = vec![0f32; (width * height) as usize];
    let mut max_magnitude = 0f32;
    for y in 0..h {
        for x in 0..w {
            let mut gx = 0f32;
            let mut gy = 0f32;
            for ky in 0..3i64 {
                let sy = reflect101(y + ky - 1, h);
                for kx in 0..3i64 {
                    let sx = reflect101(x + kx - 1, w);
                    let v = data[sy * stride + sx] as f32;
                    gx += SOBEL_X[ky as usize][kx as usize] * v;
                    gy += SOBEL_Y[ky as usize][kx as usize] * v;
                }
            }
            let magnitude = (gx * gx + gy * gy).sqrt();
            max_magnitude = max_magnitude.max(magnitude);
            magnitudes[(y * w + x) as usize] = magnitude;
        }
    }

    let hi = max_magnitude as f64 + 1e-8;
    let mut counts = vec![0u32; bins];
    for &magnitude in &magnitudes {
        let idx = ((magnitude as f64 / hi) * bins as f64) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    normalize_counts(&counts)
}
