//! Fine texture descriptor: rotation-invariant local intensity-order codes.
//!
//! For every pixel on a strided grid, the intensities of N neighbors
//! sampled on a circle of radius R are compared against the center pixel,
//! forming an N-bit word. The word is reduced to its rotation-invariant
//! canonical form (the minimum over all cyclic rotations), and the codes
//! collected over the grid are binned into a normalized 256-bin histogram.

use image::GrayImage;
use rayon::prelude::*;

use super::{FINE_BINS, normalize_counts};

/// Computes the fine-texture histogram of a grayscale image.
///
/// Grid centers are sampled every `step` pixels in both axes, skipping a
/// border of width `radius` so every neighbor lookup stays in bounds (no
/// wraparound). Neighbor `k` sits at angle 2πk/N from the +x axis,
/// counter-clockwise, with coordinates rounded to the nearest pixel.
/// Bit `k` of the local word is set when the neighbor intensity is greater
/// than or equal to the center intensity; the first sampled neighbor is
/// the most significant bit.
///
/// The 256-bin output covers the full code space only for `neighbors == 8`;
/// codes beyond the bin range are dropped, so other neighbor counts produce
/// a truncated histogram. Degenerate inputs (dimensions too small for the
/// border, zero collected codes) normalize to the all-zero histogram.
pub fn fine_histogram(gray: &GrayImage, radius: u32, neighbors: u32, step: u32) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    let zero = vec![0u32; FINE_BINS];

    // Shift widths in the canonical-code reduction require the word to fit
    // comfortably in 32 bits.
    if step == 0 || neighbors == 0 || neighbors > 16 {
        return normalize_counts(&zero);
    }
    if width <= 2 * radius || height <= 2 * radius {
        return normalize_counts(&zero);
    }

    // The offsets are constant across all pixels; compute the trigonometry
    // once instead of per center.
    let offsets: Vec<(i64, i64)> = (0..neighbors)
        .map(|k| {
            let theta = 2.0 * std::f64::consts::PI * k as f64 / neighbors as f64;
            (
                (radius as f64 * theta.cos()).round() as i64,
                (radius as f64 * theta.sin()).round() as i64,
            )
        })
        .collect();

    let data = gray.as_raw();
    let stride = width as usize;
    let rows: Vec<u32> = (radius..height - radius).step_by(step as usize).collect();

    let counts = rows
        .par_iter()
        .fold(
            || vec![0u32; FINE_BINS],
            |mut acc, &y| {
                for x in (radius..width - radius).step_by(step as usize) {
                    let center = data[y as usize * stride + x as usize];
                    let mut word = 0u32;
                    for (k, &(dx, dy)) in offsets.iter().enumerate() {
                        let nx = (x as i64 + dx) as usize;
                        let ny = (y as i64 + dy) as usize;
                        if data[ny * stride + nx] >= center {
                            word |= 1 << (neighbors as usize - 1 - k);
                        }
                    }
                    let code = min_rotation(word, neighbors);
                    if (code as usize) < FINE_BINS {
                        acc[code as usize] += 1;
                    }
                }
                acc
            },
        )
        .reduce(
            || vec![0u32; FINE_BINS],
            |mut a, b| {
                for (lhs, rhs) in a.iter_mut().zip(b) {
                    *lhs += rhs;
                }
                a
            },
        );

    normalize_counts(&counts)
}

/// Reduces an N-bit word to its rotation-invariant canonical code: the
/// minimum unsigned value over all N cyclic rotations.
fn min_rotation(word: u32, bits: u32) -> u32 {
    let mask = (1u32 << bits) - 1;
    (0..bits)
        .map(|i| ((word << i) | (word >> (bits - i))) & mask)
        .min()
        .unwrap_or(word & mask)
}
