//! Stratified-jitter seed placement
//!
//! The grid is split into `n × n` cells (`n = floor(sqrt(density * 100))`);
//! each cell receives one seed at its centre plus a uniform jitter of up to
//! half a cell on each axis, clamped into `[0, width-1] × [0, height-1]`.
//!
//! Randomness goes through [`RandomSource`] so callers can pin the sequence.

use super::Point;
use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;

/// Source of uniform jitter samples
pub trait RandomSource {
    /// Uniform sample in `[low, high]`
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

fn sample_range<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

impl RandomSource for StdRng {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        sample_range(self, low, high)
    }
}

impl RandomSource for ThreadRng {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        sample_range(self, low, high)
    }
}

/// Replays a fixed list of fractions in `[0, 1]`, cycling when exhausted
///
/// A fraction `f` maps to `low + f * (high - low)`, so `0.5` always lands on
/// the centre of the requested range.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    fractions: Vec<f64>,
    next: usize,
}

impl FixedSequence {
    pub fn new(fractions: Vec<f64>) -> Self {
        Self { fractions, next: 0 }
    }

    /// Always returns the centre of the range (no jitter)
    pub fn centered() -> Self {
        Self::new(vec![0.5])
    }
}

impl RandomSource for FixedSequence {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if self.fractions.is_empty() {
            return low + 0.5 * (high - low);
        }
        let f = self.fractions[self.next % self.fractions.len()].clamp(0.0, 1.0);
        self.next += 1;
        low + f * (high - low)
    }
}

/// Number of seed cells per axis for a density value
pub fn seed_grid_size(density: f64) -> usize {
    if density.is_finite() && density > 0.0 {
        (density * 100.0).sqrt().floor() as usize
    } else {
        0
    }
}

/// Lay out one jittered seed per grid cell, row by row
///
/// Each seed draws its x jitter, then its y jitter, from `rng`.
pub fn plan_seeds<R: RandomSource + ?Sized>(
    width: usize,
    height: usize,
    density: f64,
    rng: &mut R,
) -> Vec<Point> {
    let grid_size = seed_grid_size(density);
    if grid_size == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let x_step = width as f64 / grid_size as f64;
    let y_step = height as f64 / grid_size as f64;
    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;

    let mut seeds = Vec::with_capacity(grid_size * grid_size);
    for row in 0..grid_size {
        for col in 0..grid_size {
            let cx = (col as f64 + 0.5) * x_step;
            let cy = (row as f64 + 0.5) * y_step;
            let jx = rng.uniform(-x_step / 2.0, x_step / 2.0);
            let jy = rng.uniform(-y_step / 2.0, y_step / 2.0);
            seeds.push(Point::new(
                (cx + jx).clamp(0.0, max_x),
                (cy + jy).clamp(0.0, max_y),
            ));
        }
    }
    seeds
}
