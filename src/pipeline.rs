//! Shared generation pipeline
//!
//! Used by the session (interactive regeneration) and by both binaries.
//!
//! The pipeline:
//! 1. Builds a [`Field`] from a validated grid
//! 2. Plans seeds with a seeded or entropy-backed `StdRng`
//! 3. Traces, smooths and styles every streamline
//! 4. Serializes the result to SVG
//!
//! Generation is CPU bound; the async entry point moves it onto tokio's
//! blocking pool so the calling task stays responsive.

use crate::config::RenderParameters;
use crate::error::{FlowError, Result};
use crate::export::svg_document;
use crate::field::{derive_flow_grid, DepthMap, Field, FlowGrid};
use crate::flow::{generate, CancelToken, Generation, GenerationStats};
use crate::timing;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Run one generation pass with the RNG chosen by `params.seed`
pub fn run_generation(
    field: &Field,
    params: &RenderParameters,
    cancel: &CancelToken,
) -> Result<Generation> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate(field, params, &mut rng, cancel)
}

/// Run a generation pass on the blocking pool
///
/// The parameters are moved in as a snapshot. A panicking worker surfaces as
/// `FlowError::Join`.
pub async fn generate_async(
    field: Arc<Field>,
    params: RenderParameters,
    cancel: CancelToken,
) -> Result<Generation> {
    tokio::task::spawn_blocking(move || run_generation(&field, &params, &cancel))
        .await
        .map_err(|e| FlowError::Join(e.to_string()))?
}

/// Grid → SVG document, the full batch render
pub fn render_svg(grid: &FlowGrid, params: &RenderParameters) -> Result<(String, GenerationStats)> {
    let t0 = timing::time_start("render_svg");

    let field = Field::new(grid)?;
    let t1 = timing::time_delta("Field built", t0, t0);

    let generation = run_generation(&field, params, &CancelToken::new())?;
    let t2 = timing::time_delta("Streamlines generated", t0, t1);

    let svg = svg_document(
        field.width(),
        field.height(),
        &generation.streamlines,
        &params.svg_options(),
    );
    timing::time_delta("SVG serialized", t0, t2);

    Ok((svg, generation.stats))
}

/// Depth map → flow grid JSON
pub fn analyze_depth_map(map: &DepthMap, blur_size: usize) -> Result<String> {
    let t0 = timing::time_start("analyze_depth_map");
    let grid = derive_flow_grid(map, blur_size)?;
    let t1 = timing::time_delta("Gradient derived", t0, t0);
    let json = grid.to_json()?;
    timing::time_delta("Flow grid serialized", t0, t1);
    Ok(json)
}
