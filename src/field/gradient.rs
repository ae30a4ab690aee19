//! Depth map → flow field derivation
//!
//! Flow runs downhill, from shallow (high depth values) towards deep (low
//! values): the depth map is optionally Gaussian-blurred, differentiated with
//! 5×5 Sobel kernels, and negated (`U = -∂x`, `V = -∂y`).
//!
//! Borders use reflect-101 extension (`dcb|abcd|cba`).

use super::grid::{FlowGrid, ScalarGrid};
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// 5-tap Sobel derivative kernel
const SOBEL_DERIV: [f64; 5] = [-1.0, -2.0, 0.0, 2.0, 1.0];
/// 5-tap Sobel smoothing kernel
const SOBEL_SMOOTH: [f64; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];

/// Depth-only input: what the depth estimator hands to the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthMap {
    pub width: usize,
    pub height: usize,
    pub depth: Vec<Vec<f64>>,
}

impl DepthMap {
    pub fn from_json(json: &str) -> Result<Self> {
        let map: DepthMap = serde_json::from_str(json).map_err(|e| {
            FlowError::InvalidInputFormat(format!("Failed to parse depth map: {}", e))
        })?;
        map.validate()?;
        Ok(map)
    }

    /// Check that `depth` is `height` rows of `width` finite values
    pub fn validate(&self) -> Result<()> {
        if self.depth.len() != self.height {
            return Err(FlowError::InvalidInputFormat(format!(
                "depth has {} rows, expected height {}",
                self.depth.len(),
                self.height
            )));
        }
        for (row_idx, row) in self.depth.iter().enumerate() {
            if row.len() != self.width {
                return Err(FlowError::InvalidInputFormat(format!(
                    "depth row {} has {} columns, expected width {}",
                    row_idx,
                    row.len(),
                    self.width
                )));
            }
            if let Some(col) = row.iter().position(|value| !value.is_finite()) {
                return Err(FlowError::InvalidInputFormat(format!(
                    "depth has a non-finite value at [{}][{}]",
                    row_idx, col
                )));
            }
        }
        Ok(())
    }
}

/// Compute the flow grid (U, V, depth) for a depth map
///
/// `blur_size` is the Gaussian kernel size; even sizes are bumped to the next
/// odd value and 0 disables blurring. The returned depth is the unblurred input.
pub fn derive_flow_grid(map: &DepthMap, blur_size: usize) -> Result<FlowGrid> {
    if map.width == 0 || map.height == 0 {
        return Err(FlowError::InvalidGridDimensions {
            width: map.width,
            height: map.height,
        });
    }
    map.validate()?;

    let depth = ScalarGrid::from_rows(map.width, map.height, &map.depth);
    let blurred = if blur_size > 0 {
        let ksize = if blur_size % 2 == 1 {
            blur_size
        } else {
            blur_size + 1
        };
        let kernel = gaussian_kernel(ksize);
        separable_filter(&depth, &kernel, &kernel)
    } else {
        depth.clone()
    };

    let grad_x = separable_filter(&blurred, &SOBEL_DERIV, &SOBEL_SMOOTH);
    let grad_y = separable_filter(&blurred, &SOBEL_SMOOTH, &SOBEL_DERIV);

    let negate = |grid: &ScalarGrid| {
        ScalarGrid::from_fn(grid.width(), grid.height(), |x, y| -grid.get(x, y)).to_rows()
    };

    log::debug!(
        "Derived flow field {}x{} (blur {})",
        map.width,
        map.height,
        blur_size
    );

    FlowGrid::new(
        map.width,
        map.height,
        negate(&grad_x),
        negate(&grad_y),
        depth.to_rows(),
    )
}

/// Normalized Gaussian kernel; sigma follows the kernel-size rule of thumb
/// `0.3 * ((k - 1) * 0.5 - 1) + 0.8`
fn gaussian_kernel(ksize: usize) -> Vec<f64> {
    let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (ksize / 2) as f64;
    let mut kernel: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Reflect-101 index into `[0, n)`
fn reflect_101(mut i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

/// Correlate with `kx` along rows, then `ky` along columns
fn separable_filter(src: &ScalarGrid, kx: &[f64], ky: &[f64]) -> ScalarGrid {
    let (w, h) = (src.width(), src.height());
    let rx = (kx.len() / 2) as isize;
    let ry = (ky.len() / 2) as isize;

    let horizontal = ScalarGrid::from_fn(w, h, |x, y| {
        kx.iter()
            .enumerate()
            .map(|(i, k)| k * src.get(reflect_101(x as isize + i as isize - rx, w), y))
            .sum()
    });

    ScalarGrid::from_fn(w, h, |x, y| {
        ky.iter()
            .enumerate()
            .map(|(i, k)| k * horizontal.get(x, reflect_101(y as isize + i as isize - ry, h)))
            .sum()
    })
}
