//! Flow-field input contract
//!
//! The upstream depth analyzer produces a JSON document with integer
//! `width`/`height` and three row-major 2D arrays (`U`, `V`, `depth`),
//! indexed `[row][col]` = `[y][x]`. This module parses and validates that
//! document; [`crate::field::Field`] is built from the validated result.

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw flow-field grid as exchanged with the analyzer stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowGrid {
    pub width: usize,
    pub height: usize,
    #[serde(rename = "U")]
    pub u: Vec<Vec<f64>>,
    #[serde(rename = "V")]
    pub v: Vec<Vec<f64>>,
    pub depth: Vec<Vec<f64>>,
}

impl FlowGrid {
    /// Build a grid from already-shaped arrays, validating dimensions
    pub fn new(
        width: usize,
        height: usize,
        u: Vec<Vec<f64>>,
        v: Vec<Vec<f64>>,
        depth: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let grid = Self {
            width,
            height,
            u,
            v,
            depth,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Parse a grid from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let grid: FlowGrid = serde_json::from_str(json)
            .map_err(|e| FlowError::InvalidInputFormat(format!("Failed to parse grid: {}", e)))?;
        grid.validate()?;
        log::debug!("Parsed flow grid {}x{}", grid.width, grid.height);
        Ok(grid)
    }

    /// Read and parse a grid JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::info!("Loading flow grid from {}", path.display());
        Self::from_json(&json)
    }

    /// Serialize back to the analyzer JSON format
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(FlowError::from)
    }

    /// Check that all three arrays are `height` rows of `width` finite values
    pub fn validate(&self) -> Result<()> {
        for (name, array) in [("U", &self.u), ("V", &self.v), ("depth", &self.depth)] {
            if array.len() != self.height {
                return Err(FlowError::InvalidInputFormat(format!(
                    "'{}' has {} rows, expected height {}",
                    name,
                    array.len(),
                    self.height
                )));
            }
            for (row_idx, row) in array.iter().enumerate() {
                if row.len() != self.width {
                    return Err(FlowError::InvalidInputFormat(format!(
                        "'{}' row {} has {} columns, expected width {}",
                        name,
                        row_idx,
                        row.len(),
                        self.width
                    )));
                }
                if let Some(col) = row.iter().position(|value| !value.is_finite()) {
                    return Err(FlowError::InvalidInputFormat(format!(
                        "'{}' has a non-finite value at [{}][{}]",
                        name, row_idx, col
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Row-major scalar grid with flat storage
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl ScalarGrid {
    /// Flatten nested rows; caller guarantees the shape
    pub(crate) fn from_rows(width: usize, height: usize, rows: &[Vec<f64>]) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for row in rows {
            values.extend_from_slice(row);
        }
        Self {
            width,
            height,
            values,
        }
    }

    pub(crate) fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at integer cell `(x, y)`
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Rows as nested vectors (JSON shape)
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values
            .chunks(self.width.max(1))
            .map(|row| row.to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_json(width: usize, height: usize) -> String {
        let row = vec![0.5; width];
        let rows = vec![row; height];
        serde_json::json!({
            "width": width,
            "height": height,
            "U": rows,
            "V": rows,
            "depth": rows,
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_grid() {
        let grid = FlowGrid::from_json(&grid_json(3, 2)).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.u[1][2], 0.5);
    }

    #[test]
    fn test_parse_garbage_is_invalid_format() {
        let err = FlowGrid::from_json("{not json").unwrap_err();
        assert!(matches!(err, FlowError::InvalidInputFormat(_)));
    }

    #[test]
    fn test_missing_field_is_invalid_format() {
        let err = FlowGrid::from_json(r#"{"width": 2, "height": 2, "U": [[0,0],[0,0]]}"#)
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidInputFormat(_)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let json = r#"{
            "width": 2, "height": 2,
            "U": [[0, 0], [0]],
            "V": [[0, 0], [0, 0]],
            "depth": [[0, 0], [0, 0]]
        }"#;
        let err = FlowGrid::from_json(json).unwrap_err();
        match err {
            FlowError::InvalidInputFormat(msg) => assert!(msg.contains("'U' row 1")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_height_mismatch_rejected() {
        let json = r#"{
            "width": 2, "height": 3,
            "U": [[0, 0], [0, 0], [0, 0]],
            "V": [[0, 0], [0, 0], [0, 0]],
            "depth": [[0, 0], [0, 0]]
        }"#;
        assert!(matches!(
            FlowGrid::from_json(json),
            Err(FlowError::InvalidInputFormat(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_uppercase_keys() {
        let grid = FlowGrid::from_json(&grid_json(2, 2)).unwrap();
        let json = grid.to_json().unwrap();
        assert!(json.contains("\"U\""));
        assert!(json.contains("\"V\""));
        assert_eq!(FlowGrid::from_json(&json).unwrap(), grid);
    }

    #[test]
    fn test_scalar_grid_indexing() {
        let grid = ScalarGrid::from_rows(3, 2, &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(grid.get(0, 0), 1.0);
        assert_eq!(grid.get(2, 0), 3.0);
        assert_eq!(grid.get(1, 1), 5.0);
        assert_eq!(grid.to_rows()[1], vec![4.0, 5.0, 6.0]);
    }
}
