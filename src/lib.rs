//! Depth-colored streamline renderer
//!
//! Turns a discretized flow field (per-cell U/V gradient plus a depth scalar)
//! into smooth streamlines whose segments are colored by depth, and exports
//! them as SVG paths for laser engraving.
//!
//! Module organization:
//! - `field`: input grid, bilinear sampler, depth map → gradient derivation
//! - `flow`: integrator, smoother, seed planner and the generation pass
//! - `color`: depth and speed color mapping
//! - `export`: SVG path data and documents
//! - `properties` / `config`: render properties and their defaults
//! - `session` / `pipeline`: session state and off-thread generation

pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod field;
pub mod flow;
pub mod pipeline;
pub mod properties;
pub mod session;
pub mod timing;

pub use config::RenderParameters;
pub use error::{FlowError, Result};
pub use session::{GenerationStatus, Session};
