//! Streamline construction
//!
//! Structure:
//! - `integrator.rs`: traces one streamline from a seed
//! - `smoother.rs`: Catmull-Rom densification of a polyline
//! - `seeds.rs`: stratified-jitter seed layout and the random-source seam
//! - `generator.rs`: runs trace → smooth → color over every seed

pub mod generator;
pub mod integrator;
pub mod seeds;
pub mod smoother;

pub use generator::{generate, CancelToken, Generation, GenerationStats, StyledStreamline};
pub use integrator::{trace, TraceParams, MIN_POINTS};
pub use seeds::{plan_seeds, seed_grid_size, FixedSequence, RandomSource};
pub use smoother::smooth;

/// A position in grid coordinates (not necessarily integer)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Ordered sequence of points along a streamline
pub type Polyline = Vec<Point>;
