//! Render configuration from properties
//!
//! Configuration is loaded from render properties (defined in
//! render_properties.json). All default values come from that file through
//! `PropertyReader`; nothing here hardcodes a fallback.

use crate::color::{ColorScheme, DepthStyle};
use crate::error::Result;
use crate::export::{SvgOptions, SvgUnit};
use crate::flow::TraceParams;
use crate::properties::PropertyReader;
use std::path::Path;

/// Exponent of the depth → width curve
const WIDTH_CURVE_POWER: f64 = 2.2;

/// Snapshot of every parameter that drives a render
///
/// A generation pass reads one snapshot; later edits never affect a pass
/// already in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParameters {
    /// Seed density; `floor(sqrt(density * 100))` cells per axis
    pub density: f64,

    /// Integration step in grid units
    pub step_size: f64,

    /// Maximum integration steps per streamline
    pub max_length: usize,

    /// Gradient magnitude below which a trace stops
    pub min_speed: f64,

    /// Fixed stroke width (also used for export)
    pub line_width: f64,

    pub color_scheme: ColorScheme,

    /// Exponent of the deep-region emphasis curve
    pub depth_power: f64,

    pub emphasize_deep: bool,

    /// Swap near and far before coloring
    pub invert_depth: bool,

    /// Catmull-Rom resampling of traced paths
    pub smooth: bool,

    /// Scale segment widths with depth between `width_min` and `width_max`
    pub variable_width: bool,
    pub width_min: f64,
    pub width_max: f64,

    /// Jitter seed; `None` draws from entropy
    pub seed: Option<u64>,

    /// Gaussian kernel size for depth map analysis (0 disables the blur)
    pub blur_size: usize,

    pub export_units: SvgUnit,

    /// Color exported strokes instead of plain black
    pub export_colored: bool,
}

impl RenderParameters {
    /// Create parameters from render properties
    ///
    /// Every value is validated by the reader; invalid values are logged and
    /// replaced by the registry default.
    pub fn from_properties(props: &PropertyReader) -> Self {
        // Density 0 is legal (no seeds)
        let density = props.get_f64_in_range("density", 0.0, 10_000.0);

        // Step and limits
        let step_size = props.get_f64_in_range("step.size", 1e-6, 1_000.0);
        let max_length = props.get_usize("max.length");
        let min_speed = props.get_f64_in_range("min.speed", 0.0, f64::MAX);

        // Appearance
        let line_width = props.get_f64_in_range("line.width", 0.0, 1_000.0);
        let color_scheme = ColorScheme::parse(&props.get_enum("color.scheme")).unwrap_or_default();
        let depth_power = props.get_f64_in_range("depth.power", 1e-6, 100.0);
        let emphasize_deep = props.get_bool("emphasize.deep");
        let invert_depth = props.get_bool("invert.depth");
        let smooth = props.get_bool("smooth");

        // Variable width: an inverted range falls back to the defaults
        let variable_width = props.get_bool("variable.width");
        let mut width_min = props.get_f64_in_range("width.min", 0.0, 1_000.0);
        let mut width_max = props.get_f64_in_range("width.max", 0.0, 1_000.0);
        if width_min > width_max {
            log::warn!(
                "width.min ({}) exceeds width.max ({}). Using defaults",
                width_min,
                width_max
            );
            let defaults = PropertyReader::empty();
            width_min = defaults.get_f64("width.min");
            width_max = defaults.get_f64("width.max");
        }

        let seed = props.get_optional_u64("seed");
        let blur_size = props.get_usize("blur.size");

        // Export
        let export_units = SvgUnit::parse(&props.get_enum("export.units"));
        let export_colored = props.get_bool("export.colored");

        Self {
            density,
            step_size,
            max_length,
            min_speed,
            line_width,
            color_scheme,
            depth_power,
            emphasize_deep,
            invert_depth,
            smooth,
            variable_width,
            width_min,
            width_max,
            seed,
            blur_size,
            export_units,
            export_colored,
        }
    }

    /// Parse a flat JSON object of property values
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_properties(&PropertyReader::from_json(json)?))
    }

    /// Read a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_properties(&PropertyReader::from_path(path)?))
    }

    pub fn trace_params(&self) -> TraceParams {
        TraceParams {
            step_size: self.step_size,
            max_length: self.max_length,
            min_speed: self.min_speed,
        }
    }

    pub fn depth_style(&self) -> DepthStyle {
        DepthStyle {
            scheme: self.color_scheme,
            emphasize_deep: self.emphasize_deep,
            power: self.depth_power,
            invert: self.invert_depth,
        }
    }

    pub fn svg_options(&self) -> SvgOptions {
        SvgOptions {
            units: self.export_units,
            line_width: self.line_width,
            colored: self.export_colored,
            variable_width: self.variable_width,
        }
    }

    /// Stroke width for a segment at (already oriented) `depth`
    ///
    /// With `variable_width` the width follows
    /// `width_min + (width_max - width_min) * (1 - depth)^2.2`.
    pub fn segment_width(&self, depth: f64) -> f64 {
        if !self.variable_width {
            return self.line_width;
        }
        let depth = if depth.is_nan() { 0.0 } else { depth.clamp(0.0, 1.0) };
        self.width_min + (self.width_max - self.width_min) * (1.0 - depth).powf(WIDTH_CURVE_POWER)
    }
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self::from_properties(&PropertyReader::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_registry() {
        let p = RenderParameters::default();
        assert_eq!(p.density, 4.0);
        assert_eq!(p.step_size, 2.0);
        assert_eq!(p.max_length, 1000);
        assert_eq!(p.min_speed, 0.001);
        assert_eq!(p.line_width, 1.5);
        assert_eq!(p.color_scheme, ColorScheme::Ocean);
        assert_eq!(p.depth_power, 1.5);
        assert!(p.emphasize_deep);
        assert!(!p.invert_depth);
        assert!(p.smooth);
        assert!(!p.variable_width);
        assert_eq!(p.seed, None);
        assert_eq!(p.blur_size, 15);
        assert_eq!(p.export_units, SvgUnit::Px);
        assert!(!p.export_colored);
    }

    #[test]
    fn test_from_json_overrides() {
        let p = RenderParameters::from_json(
            r#"{"density": 2, "color.scheme": "rainbow", "smooth": false, "seed": "7", "export.units": "mm"}"#,
        )
        .unwrap();
        assert_eq!(p.density, 2.0);
        assert_eq!(p.color_scheme, ColorScheme::Rainbow);
        assert!(!p.smooth);
        assert_eq!(p.seed, Some(7));
        assert_eq!(p.export_units, SvgUnit::Mm);
        // untouched values keep defaults
        assert_eq!(p.step_size, 2.0);
    }

    #[test]
    fn test_unknown_scheme_keeps_default() {
        let p = RenderParameters::from_json(r#"{"color.scheme": "nonexistent"}"#).unwrap();
        assert_eq!(p.color_scheme, ColorScheme::Ocean);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let p = RenderParameters::from_json(r#"{"step.size": -1, "density": -3}"#).unwrap();
        assert_eq!(p.step_size, 2.0);
        assert_eq!(p.density, 4.0);
    }

    #[test]
    fn test_inverted_width_range_falls_back() {
        let p = RenderParameters::from_json(r#"{"width.min": 5, "width.max": 1}"#).unwrap();
        assert_eq!(p.width_min, 0.3);
        assert_eq!(p.width_max, 2.5);
    }

    #[test]
    fn test_segment_width() {
        let mut p = RenderParameters::default();
        assert_eq!(p.segment_width(0.2), 1.5);
        p.variable_width = true;
        assert!((p.segment_width(0.0) - 2.5).abs() < 1e-12);
        assert!((p.segment_width(1.0) - 0.3).abs() < 1e-12);
        let mid = p.segment_width(0.5);
        assert!((mid - (0.3 + 2.2 * 0.5f64.powf(2.2))).abs() < 1e-12);
        assert!((p.segment_width(7.0) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_derived_views() {
        let p = RenderParameters::from_json(r#"{"invert.depth": true, "line.width": 0.8}"#).unwrap();
        let style = p.depth_style();
        assert!(style.invert);
        assert_eq!(style.scheme, ColorScheme::Ocean);
        assert_eq!(p.svg_options().line_width, 0.8);
        assert!(!p.svg_options().variable_width);
        assert_eq!(p.trace_params().max_length, 1000);
    }
}
