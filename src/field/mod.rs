//! Flow-field data and sampling
//!
//! Structure:
//! - `grid.rs`: JSON input contract and flat scalar grids
//! - `sampler.rs`: [`Field`], bilinear queries over U/V/depth/speed
//! - `gradient.rs`: depth map → (U, V) derivation

pub mod gradient;
pub mod grid;
pub mod sampler;

pub use gradient::{derive_flow_grid, DepthMap};
pub use grid::{FlowGrid, ScalarGrid};
pub use sampler::Field;
