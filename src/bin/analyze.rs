//! depthflow-analyze - derive a flow-field grid from a depth map
//!
//! Reads `{width, height, depth}` JSON and writes `{width, height, U, V, depth}`
//! JSON, ready for `depthflow --grid`.
//!
//! Usage:
//! ```bash
//! depthflow-analyze --depth depth.json [--blur-size 15] [--output flow.json]
//! ```

use anyhow::Context;
use depthflow::field::DepthMap;
use depthflow::pipeline;
use depthflow::properties::PropertyReader;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut depth_path: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut props = PropertyReader::empty();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--depth" if i + 1 < args.len() => {
                depth_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--blur-size" if i + 1 < args.len() => {
                props.set("blur.size", args[i + 1].as_str());
                i += 2;
            }
            "--output" | "-o" if i + 1 < args.len() => {
                output = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            other => {
                log::warn!("Ignoring unrecognized argument '{}'", other);
                i += 1;
            }
        }
    }

    let Some(depth_path) = depth_path else {
        eprintln!("Usage: depthflow-analyze --depth <depth.json> [--blur-size N] [--output <flow.json>]");
        std::process::exit(2);
    };

    let text = std::fs::read_to_string(&depth_path)
        .with_context(|| format!("Failed to read {}", depth_path.display()))?;
    let map = DepthMap::from_json(&text)
        .with_context(|| format!("Invalid depth map {}", depth_path.display()))?;

    let blur_size = props.get_usize("blur.size");
    log::info!(
        "Analyzing {}x{} depth map (blur {})",
        map.width,
        map.height,
        blur_size
    );
    let json = pipeline::analyze_depth_map(&map, blur_size)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
