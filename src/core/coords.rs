use serde::{Deserialize, Serialize};

use crate::core::types::{DisplaySeries, PlotBox, XMode};

/// Maps a timestamp position into plot-space X.
///
/// A zero-width domain collapses onto the left edge of the plot area.
#[must_use]
pub fn x_from_timestamp(position: f64, domain: (f64, f64), plot_box: PlotBox) -> f64 {
    let (min, max) = domain;
    let span = max - min;
    let left = plot_box.plot_left();
    let width = plot_box.plot_right() - left;
    if span == 0.0 || !span.is_finite() {
        return left;
    }
    left + (position - min) / span * width
}

/// Maps an ordinal index within `[first, last]` into plot-space X.
///
/// The denominator floors at one so a single-point domain stays finite.
#[must_use]
pub fn x_from_ordinal(index: f64, domain: (f64, f64), plot_box: PlotBox) -> f64 {
    let (first, last) = domain;
    let left = plot_box.plot_left();
    let width = plot_box.plot_right() - left;
    let denominator = (last - first).max(1.0);
    left + (index - first) / denominator * width
}

/// Maps a price into plot-space Y; higher prices sit closer to the top.
///
/// A degenerate domain maps every price onto the bottom edge.
#[must_use]
pub fn y_from_price(value: f64, domain: (f64, f64), plot_box: PlotBox) -> f64 {
    let (min, max) = domain;
    let span = max - min;
    let top = plot_box.plot_top();
    let bottom = plot_box.plot_bottom();
    if span == 0.0 || !span.is_finite() {
        return bottom;
    }
    bottom - (value - min) / span * (bottom - top)
}

/// Pixel coordinates for every point of a series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPositions {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl PixelPositions {
    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// True when both coordinate arrays describe exactly `count` points.
    #[must_use]
    pub fn matches_len(&self, count: usize) -> bool {
        self.xs.len() == count && self.ys.len() == count
    }
}

/// Computes pixel coordinates from the series' own domains.
#[must_use]
pub fn precompute_positions(series: &DisplaySeries, plot_box: PlotBox) -> PixelPositions {
    let count = series.points.len();
    let mut xs = Vec::with_capacity(count);
    let mut ys = Vec::with_capacity(count);
    let last_index = count.saturating_sub(1) as f64;

    for (index, point) in series.points.iter().enumerate() {
        let x = match series.x_mode {
            XMode::Ordinal => x_from_ordinal(index as f64, (0.0, last_index), plot_box),
            XMode::Timestamp => x_from_timestamp(point.position, series.x_axis.domain, plot_box),
        };
        xs.push(x);
        ys.push(y_from_price(point.value, series.y_axis.domain, plot_box));
    }

    PixelPositions { xs, ys }
}

/// Index of the x closest to `px` in an ascending array.
///
/// Equidistant neighbours resolve to the lower index.
#[must_use]
pub fn nearest_index(px: f64, xs: &[f64]) -> Option<usize> {
    if xs.is_empty() || !px.is_finite() {
        return None;
    }
    let upper = xs.partition_point(|x| *x < px);
    if upper == 0 {
        return Some(0);
    }
    if upper >= xs.len() {
        return Some(xs.len() - 1);
    }
    let lower = upper - 1;
    if (px - xs[lower]).abs() <= (xs[upper] - px).abs() {
        Some(lower)
    } else {
        Some(upper)
    }
}

/// Absolute and relative change between two prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDelta {
    pub delta: f64,
    /// Percent change; zero when the starting price is zero.
    pub pct: f64,
}

#[must_use]
pub fn delta_and_percent(start: f64, end: f64) -> PriceDelta {
    let delta = end - start;
    let pct = if start == 0.0 { 0.0 } else { delta / start * 100.0 };
    PriceDelta { delta, pct }
}
