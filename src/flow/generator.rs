//! Streamline set generation
//!
//! 1. Plan jittered seeds (sequential, so the random sequence is fixed)
//! 2. Trace every seed in parallel; empty traces are dropped
//! 3. Optionally smooth each surviving path
//! 4. Color and size every segment from the field at the segment midpoint
//!
//! Results are collected in seed order, so for a given field, parameter set
//! and random sequence the output is fully determined.

use super::integrator::trace;
use super::seeds::{plan_seeds, RandomSource};
use super::smoother::smooth;
use super::{Point, Polyline};
use crate::color::{speed_color, ColorScheme, Rgba};
use crate::config::RenderParameters;
use crate::error::{FlowError, Result};
use crate::field::Field;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation flag, checked between seeds
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A streamline ready for drawing: one color and width per segment
#[derive(Debug, Clone, PartialEq)]
pub struct StyledStreamline {
    pub points: Polyline,
    /// `colors[i]` styles the segment `points[i] → points[i + 1]`
    pub colors: Vec<Rgba>,
    pub widths: Vec<f64>,
}

impl StyledStreamline {
    pub fn segment_count(&self) -> usize {
        self.colors.len()
    }

    /// Segments as `(from, to, color, width)`
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point, Rgba, f64)> + '_ {
        self.points
            .windows(2)
            .zip(self.colors.iter().zip(self.widths.iter()))
            .map(|(pair, (color, width))| (pair[0], pair[1], *color, *width))
    }
}

/// Summary of one generation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationStats {
    pub seeds: usize,
    pub kept: usize,
    pub discarded: usize,
    /// Total points across kept streamlines
    pub points: usize,
}

/// Output of one generation pass
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub streamlines: Vec<StyledStreamline>,
    pub stats: GenerationStats,
}

/// Generate the full styled streamline set for `field`
///
/// Returns `FlowError::Cancelled` if `cancel` fires before all seeds are
/// processed; no partial result is produced.
pub fn generate<R: RandomSource + ?Sized>(
    field: &Field,
    params: &RenderParameters,
    rng: &mut R,
    cancel: &CancelToken,
) -> Result<Generation> {
    let start = Instant::now();
    let seeds = plan_seeds(field.width(), field.height(), params.density, rng);
    let trace_params = params.trace_params();

    log::debug!(
        "Tracing {} seeds (step {}, max length {}, smooth {})",
        seeds.len(),
        trace_params.step_size,
        trace_params.max_length,
        params.smooth
    );

    let traced: Vec<Option<StyledStreamline>> = seeds
        .par_iter()
        .map(|seed| {
            if cancel.is_cancelled() {
                return Err(FlowError::Cancelled);
            }
            let raw = trace(*seed, field, &trace_params);
            if raw.is_empty() {
                return Ok(None);
            }
            let points = if params.smooth { smooth(&raw) } else { raw };
            Ok(Some(style_streamline(points, field, params)))
        })
        .collect::<Result<Vec<_>>>()?;

    let streamlines: Vec<StyledStreamline> = traced.into_iter().flatten().collect();
    let stats = GenerationStats {
        seeds: seeds.len(),
        kept: streamlines.len(),
        discarded: seeds.len() - streamlines.len(),
        points: streamlines.iter().map(|s| s.points.len()).sum(),
    };

    log::info!(
        "Generated {} streamlines from {} seeds ({} discarded, {} points) in {:.3}s",
        stats.kept,
        stats.seeds,
        stats.discarded,
        stats.points,
        start.elapsed().as_secs_f64()
    );

    Ok(Generation { streamlines, stats })
}

/// Attach per-segment colors and widths sampled at segment midpoints
pub fn style_streamline(
    points: Polyline,
    field: &Field,
    params: &RenderParameters,
) -> StyledStreamline {
    let style = params.depth_style();
    let segments = points.len().saturating_sub(1);
    let mut colors = Vec::with_capacity(segments);
    let mut widths = Vec::with_capacity(segments);

    for pair in points.windows(2) {
        let mid = pair[0].midpoint(&pair[1]);
        let depth = field.depth_at(mid.x, mid.y);
        let color = match style.scheme {
            ColorScheme::Speed => speed_color(field.speed_at(mid.x, mid.y), field.max_speed()),
            _ => style.color(depth),
        };
        colors.push(color);
        widths.push(params.segment_width(style.oriented(depth)));
    }

    StyledStreamline {
        points,
        colors,
        widths,
    }
}
