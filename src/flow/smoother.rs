//! Catmull-Rom densification
//!
//! Each segment `p1 → p2` is resampled with the uniform Catmull-Rom cubic
//! using its outer neighbours `p0`/`p3` (the segment's own endpoints stand in
//! at the ends of the path). Longer segments get more samples:
//!
//! | segment length | t step |
//! |---|---|
//! | `< 5` | 0.2 |
//! | `5 .. 20` | 0.15 |
//! | `>= 20` | 0.1 |
//!
//! The sample at `t = 1` of the final segment is not emitted.

use super::{Point, Polyline};

/// Sampling step for a segment of length `len`
fn t_step(len: f64) -> f64 {
    if len < 5.0 {
        0.2
    } else if len < 20.0 {
        0.15
    } else {
        0.1
    }
}

/// Number of samples `t = k * step` with `t < 1`
fn sample_count(step: f64) -> usize {
    (1.0 / step - 1e-9).ceil() as usize
}

#[inline]
fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Resample a polyline into a denser, smooth curve
///
/// Polylines with fewer than two points are returned unchanged.
pub fn smooth(points: &[Point]) -> Polyline {
    if points.len() < 2 {
        return points.to_vec();
    }

    let n = points.len();
    let mut out = Vec::with_capacity(n * 10);

    for i in 0..n - 1 {
        let p1 = points[i];
        let p2 = points[i + 1];
        let p0 = if i > 0 { points[i - 1] } else { p1 };
        let p3 = if i + 2 < n { points[i + 2] } else { p2 };

        let step = t_step(p1.distance(&p2));
        for k in 0..sample_count(step) {
            let t = k as f64 * step;
            out.push(Point::new(
                catmull_rom(p0.x, p1.x, p2.x, p3.x, t),
                catmull_rom(p0.y, p1.y, p2.y, p3.y, t),
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivial_inputs_pass_through() {
        assert!(smooth(&[]).is_empty());
        let single = [Point::new(3.0, 4.0)];
        assert_eq!(smooth(&single), single.to_vec());
    }

    #[test]
    fn test_sample_counts_per_tier() {
        assert_eq!(sample_count(t_step(1.0)), 5);
        assert_eq!(sample_count(t_step(5.0)), 7);
        assert_eq!(sample_count(t_step(19.9)), 7);
        assert_eq!(sample_count(t_step(20.0)), 10);
    }

    #[test]
    fn test_two_point_line_stays_on_segment() {
        let line = [Point::new(0.0, 0.0), Point::new(4.0, 0.0)];
        let out = smooth(&line);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], line[0]);
        for p in &out {
            assert!(p.y.abs() < 1e-12);
            assert!(p.x >= 0.0 && p.x < 4.0);
        }
        // strictly increasing along the segment
        for pair in out.windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
    }

    #[test]
    fn test_interpolates_input_vertices() {
        let path = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(4.0, 0.0),
            Point::new(6.0, 2.0),
        ];
        let out = smooth(&path);
        // t = 0 samples land exactly on p1 of every segment
        let mut idx = 0;
        for i in 0..path.len() - 1 {
            let p = out[idx];
            assert!((p.x - path[i].x).abs() < 1e-12);
            assert!((p.y - path[i].y).abs() < 1e-12);
            idx += sample_count(t_step(path[i].distance(&path[i + 1])));
        }
        assert_eq!(idx, out.len());
    }

    #[test]
    fn test_long_segments_sampled_densely() {
        let line = [Point::new(0.0, 0.0), Point::new(30.0, 0.0), Point::new(31.0, 0.0)];
        let out = smooth(&line);
        assert_eq!(out.len(), 10 + 5);
    }

    #[test]
    fn test_output_preserves_order() {
        let path: Vec<Point> = (0..12)
            .map(|i| Point::new(i as f64 * 2.0, (i as f64 * 0.7).sin()))
            .collect();
        let out = smooth(&path);
        for pair in out.windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
    }
}
