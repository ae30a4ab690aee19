//! Continuous sampling of a discrete flow field
//!
//! [`Field`] owns the U/V/depth grids plus the derived speed grid and answers
//! real-valued coordinate queries with bilinear interpolation. It is immutable
//! after construction; loading a new grid replaces the whole instance.

use super::grid::{FlowGrid, ScalarGrid};
use crate::error::{FlowError, Result};

/// Immutable, continuously queryable flow field
#[derive(Debug, Clone)]
pub struct Field {
    width: usize,
    height: usize,
    u: ScalarGrid,
    v: ScalarGrid,
    depth: ScalarGrid,
    /// `sqrt(U² + V²)` per cell
    speed: ScalarGrid,
    max_speed: f64,
}

impl Field {
    /// Build a field from a validated input grid
    ///
    /// Fails with `InvalidGridDimensions` when either dimension is below 2,
    /// since the 2×2 interpolation neighbourhood would not exist.
    pub fn new(grid: &FlowGrid) -> Result<Self> {
        if grid.width < 2 || grid.height < 2 {
            return Err(FlowError::InvalidGridDimensions {
                width: grid.width,
                height: grid.height,
            });
        }
        grid.validate()?;

        let (width, height) = (grid.width, grid.height);
        let u = ScalarGrid::from_rows(width, height, &grid.u);
        let v = ScalarGrid::from_rows(width, height, &grid.v);
        let depth = ScalarGrid::from_rows(width, height, &grid.depth);
        let speed = ScalarGrid::from_fn(width, height, |x, y| {
            let (gu, gv) = (u.get(x, y), v.get(x, y));
            (gu * gu + gv * gv).sqrt()
        });
        let max_speed = speed.values().iter().cloned().fold(0.0_f64, f64::max);

        log::debug!(
            "Field built: {}x{}, max speed {:.6}",
            width,
            height,
            max_speed
        );

        Ok(Self {
            width,
            height,
            u,
            v,
            depth,
            speed,
            max_speed,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Derived speed grid
    pub fn speed_grid(&self) -> &ScalarGrid {
        &self.speed
    }

    pub fn depth_grid(&self) -> &ScalarGrid {
        &self.depth
    }

    /// Interpolated gradient `(u, v)` at a real-valued position
    pub fn gradient(&self, x: f64, y: f64) -> (f64, f64) {
        (self.sample(&self.u, x, y), self.sample(&self.v, x, y))
    }

    /// Interpolated depth at a real-valued position
    pub fn depth_at(&self, x: f64, y: f64) -> f64 {
        self.sample(&self.depth, x, y)
    }

    /// Interpolated speed at a real-valued position
    pub fn speed_at(&self, x: f64, y: f64) -> f64 {
        self.sample(&self.speed, x, y)
    }

    /// Bilinear blend of the 2×2 neighbourhood around `(x, y)`.
    ///
    /// Inputs are clamped to `[0, width-1] × [0, height-1]`; the cell origin is
    /// clamped to `[0, width-2] × [0, height-2]` so `(ix+1, iy+1)` always exists.
    fn sample(&self, grid: &ScalarGrid, x: f64, y: f64) -> f64 {
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let x = clamp_coord(x, max_x);
        let y = clamp_coord(y, max_y);

        let ix = (x.floor() as usize).min(self.width - 2);
        let iy = (y.floor() as usize).min(self.height - 2);
        let fx = x - ix as f64;
        let fy = y - iy as f64;

        let v00 = grid.get(ix, iy);
        let v10 = grid.get(ix + 1, iy);
        let v01 = grid.get(ix, iy + 1);
        let v11 = grid.get(ix + 1, iy + 1);

        (1.0 - fx) * (1.0 - fy) * v00
            + fx * (1.0 - fy) * v10
            + (1.0 - fx) * fy * v01
            + fx * fy * v11
    }
}

/// Clamp into `[0, max]`; NaN collapses to 0
fn clamp_coord(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> (f64, f64, f64)) -> FlowGrid {
        let mut u = vec![vec![0.0; width]; height];
        let mut v = vec![vec![0.0; width]; height];
        let mut depth = vec![vec![0.0; width]; height];
        for y in 0..height {
            for x in 0..width {
                let (gu, gv, d) = f(x, y);
                u[y][x] = gu;
                v[y][x] = gv;
                depth[y][x] = d;
            }
        }
        FlowGrid::new(width, height, u, v, depth).unwrap()
    }

    fn irregular_grid() -> FlowGrid {
        grid_from_fn(5, 4, |x, y| {
            let (xf, yf) = (x as f64, y as f64);
            (xf * 0.7 - yf * 1.3 + 0.2, (xf * yf).sin(), (xf + 2.0 * yf) / 11.0)
        })
    }

    #[test]
    fn test_exact_at_integer_coordinates() {
        let grid = irregular_grid();
        let field = Field::new(&grid).unwrap();
        for y in 0..grid.height {
            for x in 0..grid.width {
                let (u, v) = field.gradient(x as f64, y as f64);
                assert_eq!(u, grid.u[y][x], "U at ({}, {})", x, y);
                assert_eq!(v, grid.v[y][x], "V at ({}, {})", x, y);
                assert_eq!(field.depth_at(x as f64, y as f64), grid.depth[y][x]);
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint() {
        let grid = grid_from_fn(2, 2, |x, y| ((x + 2 * y) as f64, 0.0, 0.0));
        let field = Field::new(&grid).unwrap();
        // corners 0, 1, 2, 3 -> centre is their mean
        let (u, _) = field.gradient(0.5, 0.5);
        assert!((u - 1.5).abs() < 1e-12);
        let (u, _) = field.gradient(0.25, 0.0);
        assert!((u - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_clamps_to_boundary() {
        let field = Field::new(&irregular_grid()).unwrap();
        assert_eq!(field.gradient(-3.0, 1.5), field.gradient(0.0, 1.5));
        assert_eq!(field.gradient(99.0, 1.5), field.gradient(4.0, 1.5));
        assert_eq!(field.depth_at(2.2, -7.0), field.depth_at(2.2, 0.0));
        assert_eq!(field.depth_at(2.2, 50.0), field.depth_at(2.2, 3.0));
        assert_eq!(field.speed_at(-1.0, -1.0), field.speed_at(0.0, 0.0));
        assert_eq!(field.speed_at(10.0, 10.0), field.speed_at(4.0, 3.0));
    }

    #[test]
    fn test_speed_derivation() {
        let grid = irregular_grid();
        let field = Field::new(&grid).unwrap();
        let mut max = 0.0_f64;
        for y in 0..grid.height {
            for x in 0..grid.width {
                let expected = (grid.u[y][x].powi(2) + grid.v[y][x].powi(2)).sqrt();
                assert!((field.speed_grid().get(x, y) - expected).abs() < 1e-12);
                max = max.max(expected);
            }
        }
        assert!((field.max_speed() - max).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_dimensions_rejected() {
        let grid = FlowGrid::new(1, 1, vec![vec![1.0]], vec![vec![0.0]], vec![vec![0.5]]).unwrap();
        match Field::new(&grid) {
            Err(FlowError::InvalidGridDimensions { width, height }) => {
                assert_eq!((width, height), (1, 1));
            }
            other => panic!("expected InvalidGridDimensions, got {:?}", other),
        }

        let wide = FlowGrid::new(3, 1, vec![vec![0.0; 3]], vec![vec![0.0; 3]], vec![vec![0.0; 3]])
            .unwrap();
        assert!(matches!(
            Field::new(&wide),
            Err(FlowError::InvalidGridDimensions { .. })
        ));
    }

    #[test]
    fn test_nan_coordinate_clamps_to_origin() {
        let field = Field::new(&irregular_grid()).unwrap();
        assert_eq!(field.depth_at(f64::NAN, 0.0), field.depth_at(0.0, 0.0));
    }
}
