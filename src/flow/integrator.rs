//! Streamline tracing
//!
//! Euler integration along the normalized gradient with three stopping rules:
//! leaving the interior `[0, width-1) × [0, height-1)`, re-entering an integer
//! cell already visited by this trace, or reaching a near-flat region.
//! Traces that end up with too few points are dropped here, at the source.

use super::{Point, Polyline};
use crate::field::Field;
use std::collections::HashSet;

/// A trace must have more than this many points to be kept
pub const MIN_POINTS: usize = 10;

/// Added to the speed before normalizing
const NORMALIZE_EPSILON: f64 = 1e-8;

/// Integration parameters for a single trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceParams {
    /// Step length in grid units
    pub step_size: f64,
    /// Maximum number of integration steps
    pub max_length: usize,
    /// Gradient magnitude below which tracing stops
    pub min_speed: f64,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            step_size: 2.0,
            max_length: 1000,
            min_speed: 0.001,
        }
    }
}

/// Trace a streamline forward from `seed`
///
/// Returns the full path including the seed, or an empty polyline when the
/// trace has `MIN_POINTS` points or fewer. Deterministic for a given input.
pub fn trace(seed: Point, field: &Field, params: &TraceParams) -> Polyline {
    let x_limit = (field.width() - 1) as f64;
    let y_limit = (field.height() - 1) as f64;

    // Cells entered by this trace; grows with the path, not with the grid
    let capacity = params.max_length.min(4096) + 1;
    let mut visited: HashSet<(usize, usize)> = HashSet::with_capacity(capacity);
    let mut points = Vec::with_capacity(capacity);
    points.push(seed);

    let (mut x, mut y) = (seed.x, seed.y);

    for _ in 0..params.max_length {
        // Strictly below width-1 / height-1 so the 2×2 lookup stays in bounds
        if !(x >= 0.0 && x < x_limit && y >= 0.0 && y < y_limit) {
            break;
        }

        if !visited.insert((x.floor() as usize, y.floor() as usize)) {
            break;
        }

        let (u, v) = field.gradient(x, y);
        let speed = (u * u + v * v).sqrt();
        if speed < params.min_speed {
            break;
        }

        let norm = speed + NORMALIZE_EPSILON;
        x += u / norm * params.step_size;
        y += v / norm * params.step_size;
        points.push(Point::new(x, y));
    }

    if points.len() > MIN_POINTS {
        points
    } else {
        Vec::new()
    }
}
