use std::fmt::Write as _;

use crate::core::coords::{PixelPositions, precompute_positions};
use crate::core::types::{DisplaySeries, PlotBox};
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderedGeometryProvider, SvgPathGeometry};

/// Rendering library that paints the price line.
///
/// Hosts receive the full series on every change and may expose the
/// positions they drew through [`RenderedGeometryProvider`].
pub trait ChartHost: RenderedGeometryProvider {
    fn plot_line_series(&mut self, series: &DisplaySeries) -> ChartResult<()>;

    /// Measured plot box after layout, when the host can report one.
    fn measure_plot_box(&self) -> Option<PlotBox> {
        None
    }
}

fn validate_series(series: &DisplaySeries) -> ChartResult<()> {
    if series
        .points
        .iter()
        .any(|point| !point.position.is_finite() || !point.value.is_finite())
    {
        return Err(ChartError::InvalidData(
            "series points must be finite".to_owned(),
        ));
    }
    Ok(())
}

/// No-op host used by tests and headless usage.
///
/// It still validates series content and never reports rendered geometry.
#[derive(Debug, Default)]
pub struct NullChartHost {
    pub plot_count: usize,
    pub last_point_count: usize,
    pub plot_box: Option<PlotBox>,
}

impl RenderedGeometryProvider for NullChartHost {
    fn rendered_positions(&self) -> Option<PixelPositions> {
        None
    }
}

impl ChartHost for NullChartHost {
    fn plot_line_series(&mut self, series: &DisplaySeries) -> ChartResult<()> {
        validate_series(series)?;
        self.plot_count += 1;
        self.last_point_count = series.len();
        Ok(())
    }

    fn measure_plot_box(&self) -> Option<PlotBox> {
        self.plot_box
    }
}

/// Headless host that emits SVG path data the way a browser line renderer would.
///
/// Coordinates are rounded to `precision` decimals, so the read-back positions
/// can differ slightly from the idealized mapping.
#[derive(Debug, Clone)]
pub struct SvgLineHost {
    plot_box: PlotBox,
    precision: usize,
    path_data: String,
}

impl SvgLineHost {
    #[must_use]
    pub fn new(plot_box: PlotBox) -> Self {
        Self {
            plot_box,
            precision: 2,
            path_data: String::new(),
        }
    }

    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn set_plot_box(&mut self, plot_box: PlotBox) {
        self.plot_box = plot_box;
    }

    #[must_use]
    pub fn path_data(&self) -> &str {
        &self.path_data
    }
}

impl RenderedGeometryProvider for SvgLineHost {
    fn rendered_positions(&self) -> Option<PixelPositions> {
        SvgPathGeometry::parse(&self.path_data).rendered_positions()
    }
}

impl ChartHost for SvgLineHost {
    fn plot_line_series(&mut self, series: &DisplaySeries) -> ChartResult<()> {
        validate_series(series)?;
        self.path_data.clear();
        if !self.plot_box.is_drawable() {
            return Ok(());
        }
        let positions = precompute_positions(series, self.plot_box);
        for (index, (x, y)) in positions.xs.iter().zip(&positions.ys).enumerate() {
            let command = if index == 0 { 'M' } else { 'L' };
            write!(
                self.path_data,
                "{command}{x:.precision$},{y:.precision$}",
                precision = self.precision
            )
            .map_err(|error| ChartError::InvalidData(format!("path write failed: {error}")))?;
        }
        Ok(())
    }

    fn measure_plot_box(&self) -> Option<PlotBox> {
        Some(self.plot_box)
    }
}
