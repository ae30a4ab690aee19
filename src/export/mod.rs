//! Vector export of streamline sets

pub mod svg;

pub use svg::{path_data, svg_document, SvgOptions, SvgUnit};
