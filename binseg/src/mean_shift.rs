//! Spatial-color mean-shift filtering.
//!
//! Each pixel, visited in row-major order, is repeatedly replaced by the mean of
//! the window pixels whose color lies within `color_radius` of its own, until
//! the move falls to `epsilon` or the per-pixel iteration budget is spent.
//!
//! In `UpdateMode::InPlace` the window is read from the grid being filtered, so
//! a pixel sees the already-shifted colors of the pixels visited before it in
//! the same pass. Results depend on the visiting order; that is part of the
//! filter's definition. `UpdateMode::Snapshot` reads every neighbor from the
//! unfiltered input instead.

use log::{debug, info};

use crate::error::{Result, SegmentError};
use crate::grid::{color_diff, Color, ColorGrid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Single buffer: later pixels read earlier pixels' results.
    #[default]
    InPlace,
    /// Neighbors come from the input; results go to a separate buffer.
    Snapshot,
}

impl UpdateMode {
    /// Unknown names fall back to `InPlace`.
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "snapshot" | "simultaneous" | "jacobi" => Self::Snapshot,
            _ => Self::InPlace,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanShiftParams {
    /// `hs`: the window spans `trunc(x - hs/2)..=trunc(x + hs/2)` on each axis.
    pub spatial_radius: f64,
    /// `hc`: neighbors must lie strictly closer than this in RGB.
    pub color_radius: f64,
    pub epsilon: f64,
    pub max_iterations_per_pixel: usize,
    pub mode: UpdateMode,
}

impl MeanShiftParams {
    /// Validates the raw parameters. Non-positive radii are accepted (they
    /// degenerate to a no-op filter); a negative iteration budget is not.
    pub fn new(spatial_radius: f64, color_radius: f64, epsilon: f64, max_iterations_per_pixel: i64) -> Result<Self> {
        for (name, v) in [("spatial_radius", spatial_radius), ("color_radius", color_radius), ("epsilon", epsilon)] {
            if !v.is_finite() {
                return Err(SegmentError::InvalidParameter { name, reason: format!("must be finite, got {v}") });
            }
        }
        let max_iterations_per_pixel = usize::try_from(max_iterations_per_pixel).map_err(|_| SegmentError::InvalidParameter {
            name: "max_iterations_per_pixel",
            reason: format!("must be >= 0, got {max_iterations_per_pixel}"),
        })?;
        Ok(Self { spatial_radius, color_radius, epsilon, max_iterations_per_pixel, mode: UpdateMode::InPlace })
    }

    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Inclusive window `[trunc(pos - hs/2), trunc(pos + hs/2)]` clipped to
    /// `0..len`; `None` when nothing is left (negative `hs`).
    fn window_bounds(&self, pos: usize, len: usize) -> Option<(usize, usize)> {
        let reach = self.spatial_radius / 2.0;
        let lo = ((pos as f64 - reach) as i64).max(0);
        let hi = ((pos as f64 + reach) as i64).min(len as i64 - 1);
        if lo > hi { None } else { Some((lo as usize, hi as usize)) }
    }
}

/// Per-run counters, logged at the end of `filter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanShiftStats {
    /// Pixels whose color changed at least once.
    pub shifted_pixels: usize,
    /// Total replacements over all pixels.
    pub total_steps: usize,
    /// Pixels that stopped because the budget ran out.
    pub exhausted_pixels: usize,
}

/// Filters `image` and returns a grid of the same size.
pub fn filter(image: &ColorGrid, params: &MeanShiftParams) -> Result<ColorGrid> {
    filter_with_stats(image, params).map(|(grid, _)| grid)
}

pub fn filter_with_stats(image: &ColorGrid, params: &MeanShiftParams) -> Result<(ColorGrid, MeanShiftStats)> {
    image.ensure_non_empty()?;
    let mut out = image.clone();
    let mut stats = MeanShiftStats::default();

    for row in 0..image.rows() {
        for col in 0..image.cols() {
            // the grid the window reads from
            let source = match params.mode {
                UpdateMode::InPlace => &out,
                UpdateMode::Snapshot => image,
            };
            let (color, steps, exhausted) = shift_pixel(source, row, col, params);
            if steps > 0 {
                stats.shifted_pixels += 1;
                stats.total_steps += steps;
                out.set(row, col, color);
            }
            if exhausted {
                stats.exhausted_pixels += 1;
            }
        }
    }

    info!(
        "mean-shift: {} pixels shifted, {} steps, {} hit the iteration cap",
        stats.shifted_pixels, stats.total_steps, stats.exhausted_pixels
    );
    Ok((out, stats))
}

/// Runs one pixel's trajectory and returns `(final color, steps, budget exhausted)`.
///
/// The pixel's own evolving color stands in for `source[row, col]`, which
/// matches writing it back after every step when `source` is the output grid.
fn shift_pixel(source: &ColorGrid, row: usize, col: usize, params: &MeanShiftParams) -> (Color, usize, bool) {
    let mut current = source.get(row, col);
    let mut mean = window_mean(source, row, col, current, params);
    let mut k = 0usize;
    while color_diff(current, mean) > params.epsilon && k < params.max_iterations_per_pixel {
        current = mean;
        mean = window_mean(source, row, col, current, params);
        k += 1;
    }
    let exhausted = k == params.max_iterations_per_pixel && color_diff(current, mean) > params.epsilon;
    if k > 0 {
        debug!("pixel ({row}, {col}) settled after {k} steps");
    }
    (current, k, exhausted)
}

/// Mean of the window colors closer than `color_radius` to `center`,
/// truncated to whole channel values; `center` itself when nothing qualifies.
///
/// `(row, col)` is read as `center` rather than from `source`.
fn window_mean(source: &ColorGrid, row: usize, col: usize, center: Color, params: &MeanShiftParams) -> Color {
    let (Some((r0, r1)), Some((c0, c1))) =
        (params.window_bounds(row, source.rows()), params.window_bounds(col, source.cols()))
    else {
        return center;
    };

    let mut sum = Color::default();
    let mut n = 0usize;
    for a in r0..=r1 {
        for b in c0..=c1 {
            let p = if a == row && b == col { center } else { source.get(a, b) };
            if color_diff(center, p) < params.color_radius {
                sum = sum.add(p);
                n += 1;
            }
        }
    }
    if n == 0 { center } else { sum.div(n as f64).trunc() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PixelGrid;

    fn gray(v: f64) -> Color {
        Color::new(v, v, v)
    }

    #[test]
    fn window_reaches_one_further_on_the_low_side_for_odd_radius() {
        let p = |hs| MeanShiftParams::new(hs, 10.0, 1.0, 5).expect("params");
        assert_eq!(p(3.0).window_bounds(2, 4), Some((0, 3)));
        assert_eq!(p(1.0).window_bounds(1, 4), Some((0, 1)));
        assert_eq!(p(4.0).window_bounds(2, 4), Some((0, 3)));
        assert_eq!(p(3.0).window_bounds(0, 1), Some((0, 0)));
        assert_eq!(p(0.0).window_bounds(2, 4), Some((2, 2)));
        assert_eq!(p(-3.0).window_bounds(2, 4), None);
    }

    #[test]
    fn window_mean_uses_truncated_bounds() {
        let grid = PixelGrid::from_vec(1, 4, vec![gray(200.0), gray(0.0), gray(0.0), gray(0.0)]).expect("grid");
        let wide = MeanShiftParams::new(3.0, 1000.0, 1.0, 5).expect("params");
        assert_eq!(window_mean(&grid, 0, 2, grid.get(0, 2), &wide), gray(50.0));
        let narrow = MeanShiftParams::new(1.0, 1000.0, 1.0, 5).expect("params");
        assert_eq!(window_mean(&grid, 0, 1, grid.get(0, 1), &narrow), gray(100.0));
    }

    #[test]
    fn window_mean_truncates() {
        let grid = PixelGrid::from_vec(1, 2, vec![gray(0.0), gray(3.0)]).expect("grid");
        let params = MeanShiftParams::new(2.0, 100.0, 1.0, 5).expect("params");
        assert_eq!(window_mean(&grid, 0, 0, grid.get(0, 0), &params), gray(1.0));
    }
}
