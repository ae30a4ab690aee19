//! SVG serialization for laser engraving
//!
//! Structure:
//! - `path_data`: `M x0 y0 L x1 y1 ...` with two-decimal coordinates
//! - `svg_document`: one `<path>` per streamline inside a root element whose
//!   `width`/`height` carry a unit suffix and whose `viewBox` matches the
//!   grid dimensions, so one grid cell maps to one unit

use crate::color::Rgba;
use crate::flow::{Point, StyledStreamline};
use std::fmt::Write;

/// Unit suffix for the document width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvgUnit {
    #[default]
    Px,
    Mm,
}

impl SvgUnit {
    /// Parse from string value
    ///
    /// Validation happens in `PropertyReader::get_enum`; anything else maps to px.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "mm" => Self::Mm,
            _ => Self::Px,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Mm => "mm",
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgOptions {
    pub units: SvgUnit,
    pub line_width: f64,
    /// Stroke with the middle segment's color instead of black
    pub colored: bool,
    /// Stroke each path with the mean of its segment widths instead of `line_width`
    pub variable_width: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            units: SvgUnit::Px,
            line_width: 1.5,
            colored: false,
            variable_width: false,
        }
    }
}

/// Path data for one polyline; `None` when there is nothing to draw
pub fn path_data(points: &[Point]) -> Option<String> {
    if points.len() < 2 {
        return None;
    }

    let mut d = String::with_capacity(points.len() * 16);
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        let _ = write!(d, "{} {:.2} {:.2}", cmd, p.x, p.y);
    }
    Some(d)
}

fn stroke_for(line: &StyledStreamline, options: &SvgOptions) -> Rgba {
    if !options.colored {
        return Rgba::rgb(0, 0, 0);
    }
    line.colors
        .get(line.colors.len() / 2)
        .copied()
        .unwrap_or(Rgba::rgb(0, 0, 0))
}

fn stroke_width_for(line: &StyledStreamline, options: &SvgOptions) -> f64 {
    if !options.variable_width || line.widths.is_empty() {
        return options.line_width;
    }
    line.widths.iter().sum::<f64>() / line.widths.len() as f64
}

/// Full SVG document for a streamline set on a `width × height` grid
pub fn svg_document(
    width: usize,
    height: usize,
    lines: &[StyledStreamline],
    options: &SvgOptions,
) -> String {
    let unit = options.units.suffix();
    let mut svg = String::new();

    let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}{unit}" height="{h}{unit}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height,
        unit = unit
    );

    let mut written = 0usize;
    for line in lines {
        let Some(d) = path_data(&line.points) else {
            continue;
        };
        let stroke = stroke_for(line, options);
        let _ = write!(
            svg,
            r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{:.3}" stroke-linecap="round" stroke-linejoin="round""#,
            d,
            stroke.to_hex(),
            stroke_width_for(line, options)
        );
        if !stroke.is_opaque() {
            let _ = write!(svg, r#" stroke-opacity="{:.3}""#, stroke.a);
        }
        let _ = writeln!(svg, "/>");
        written += 1;
    }

    svg.push_str("</svg>\n");
    log::debug!(
        "SVG export: {} of {} streamlines written ({}x{}{})",
        written,
        lines.len(),
        width,
        height,
        unit
    );
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: Vec<Point>, colors: Vec<Rgba>) -> StyledStreamline {
        let widths = vec![1.0; colors.len()];
        StyledStreamline {
            points,
            colors,
            widths,
        }
    }

    #[test]
    fn test_path_data_format() {
        let d = path_data(&[
            Point::new(0.0, 0.0),
            Point::new(1.234, 5.678),
            Point::new(10.0, 2.005),
        ])
        .unwrap();
        assert!(d.starts_with("M 0.00 0.00 L 1.23 5.68 L 10.00 "));
    }

    #[test]
    fn test_short_paths_skipped() {
        assert_eq!(path_data(&[]), None);
        assert_eq!(path_data(&[Point::new(1.0, 1.0)]), None);
    }

    #[test]
    fn test_document_header_carries_units() {
        let svg = svg_document(
            640,
            480,
            &[],
            &SvgOptions {
                units: SvgUnit::Mm,
                ..SvgOptions::default()
            },
        );
        assert!(svg.contains(r#"width="640mm""#));
        assert!(svg.contains(r#"height="480mm""#));
        assert!(svg.contains(r#"viewBox="0 0 640 480""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_one_path_per_drawable_streamline() {
        let lines = vec![
            line(
                vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                vec![Rgba::rgb(10, 20, 30)],
            ),
            line(vec![Point::new(3.0, 3.0)], vec![]),
            line(
                vec![Point::new(2.0, 0.0), Point::new(2.0, 4.0), Point::new(3.0, 5.0)],
                vec![Rgba::rgb(1, 1, 1), Rgba::rgb(2, 2, 2)],
            ),
        ];
        let svg = svg_document(10, 10, &lines, &SvgOptions::default());
        assert_eq!(svg.matches("<path").count(), 2);
        assert_eq!(svg.matches(r##"stroke="#000000""##).count(), 2);
        assert!(svg.contains(r#"stroke-width="1.500""#));
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r#"width="10px""#));
    }

    #[test]
    fn test_colored_export_uses_middle_segment() {
        let lines = vec![line(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(3.0, 0.0),
            ],
            vec![
                Rgba::rgb(255, 0, 0),
                Rgba::rgb(0, 255, 0),
                Rgba::rgb(0, 0, 255),
            ],
        )];
        let options = SvgOptions {
            colored: true,
            ..SvgOptions::default()
        };
        let svg = svg_document(4, 4, &lines, &options);
        assert!(svg.contains(r##"stroke="#00ff00""##));
        assert!(!svg.contains("stroke-opacity"));
    }

    #[test]
    fn test_translucent_stroke_sets_opacity() {
        let lines = vec![line(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec![Rgba::rgba(255, 255, 255, 0.25)],
        )];
        let options = SvgOptions {
            colored: true,
            ..SvgOptions::default()
        };
        let svg = svg_document(2, 2, &lines, &options);
        assert!(svg.contains(r#"stroke-opacity="0.250""#));
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(SvgUnit::parse("mm"), SvgUnit::Mm);
        assert_eq!(SvgUnit::parse(" MM "), SvgUnit::Mm);
        assert_eq!(SvgUnit::parse("px"), SvgUnit::Px);
        assert_eq!(SvgUnit::parse("furlongs"), SvgUnit::Px);
    }

    #[test]
    fn test_variable_width_uses_mean_segment_width() {
        let mut thick = line(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)],
            vec![Rgba::rgb(0, 0, 0); 2],
        );
        thick.widths = vec![0.5, 2.0];
        let lines = vec![thick];

        let fixed = svg_document(3, 3, &lines, &SvgOptions::default());
        assert!(fixed.contains(r#"stroke-width="1.500""#));

        let options = SvgOptions {
            variable_width: true,
            ..SvgOptions::default()
        };
        let svg = svg_document(3, 3, &lines, &options);
        assert!(svg.contains(r#"stroke-width="1.250""#));
    }
}
