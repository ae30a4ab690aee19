//! depthflow - render a flow-field grid to an engraving-ready SVG
//!
//! Usage:
//! ```bash
//! depthflow --grid flow.json [--config render.json] [--set name=value ...] [--output out.svg]
//! ```
//!
//! `--config` is a flat JSON object of render properties; `--set` overrides a
//! single property after the file is applied. Set `RUST_LOG=debug` for phase
//! timings.

use anyhow::{bail, Context};
use depthflow::properties::PropertyReader;
use depthflow::timing;
use depthflow::{RenderParameters, Session};
use std::path::PathBuf;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Debug, Default)]
struct CliArgs {
    grid: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    overrides: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    println!("depthflow v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;

    let grid_path = match cli.grid.as_ref() {
        Some(path) => path,
        None => {
            eprintln!("Usage: depthflow --grid <flow.json> [--config <render.json>] [--set name=value] [--output <out.svg>]");
            std::process::exit(2);
        }
    };

    let t0 = timing::time_start("depthflow");

    // Configuration: file first, then --set overrides
    let mut props = match cli.config.as_ref() {
        Some(path) => PropertyReader::from_path(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => PropertyReader::empty(),
    };
    for (name, value) in &cli.overrides {
        props.set(name, value.as_str());
    }
    let params = RenderParameters::from_properties(&props);
    println!(
        "Scheme: {}, density: {}, step: {}, smooth: {}",
        params.color_scheme, params.density, params.step_size, params.smooth
    );

    // Load
    let mut session = Session::new(params);
    session
        .load_path(grid_path)
        .with_context(|| format!("Failed to load grid {}", grid_path.display()))?;
    let t1 = timing::time_delta("Grid loaded", t0, t0);

    // Generate
    session.spawn_generation()?;
    session.wait().await.context("Generation failed")?;
    let t2 = timing::time_delta("Streamlines generated", t0, t1);

    if let Some(stats) = session.stats() {
        println!(
            "✓ {} streamlines ({} seeds, {} discarded, {} points)",
            stats.kept, stats.seeds, stats.discarded, stats.points
        );
    }

    // Export
    let svg = session.export_svg()?;
    match cli.output.as_ref() {
        Some(path) => {
            std::fs::write(path, &svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote {}", path.display());
        }
        None => print!("{}", svg),
    }
    timing::time_delta("SVG exported", t0, t2);

    Ok(())
}

/// Parse command-line arguments
fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--grid" if i + 1 < args.len() => {
                cli.grid = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--config" if i + 1 < args.len() => {
                cli.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--output" | "-o" if i + 1 < args.len() => {
                cli.output = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--set" if i + 1 < args.len() => {
                let Some((name, value)) = args[i + 1].split_once('=') else {
                    bail!("Expected name=value after --set, got '{}'", args[i + 1]);
                };
                cli.overrides
                    .push((name.trim().to_string(), value.trim().to_string()));
                i += 2;
            }
            other => {
                log::warn!("Ignoring unrecognized argument '{}'", other);
                i += 1;
            }
        }
    }
    Ok(cli)
}
