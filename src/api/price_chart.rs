use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::core::range::RangeKey;
use crate::core::series::{RangeStats, SeriesTransformer, range_change};
use crate::core::types::{DisplaySeries, PlotBox, PricePoint};
use crate::error::ChartResult;
use crate::interaction::{FrameRequestId, InteractionHost, RoiEngine, RoiMeasurement};
use crate::render::{ChartHost, GeometrySource, OverlayFrame};

use super::{ChartConfig, ChartSnapshot};

/// One interactive price chart: series shaping, host rendering and the ROI
/// overlay wired together.
///
/// Data flows from [`PriceChart::set_series`] through the transformer to the
/// chart host; after each host render pass, [`PriceChart::on_render_pass`]
/// reads back the drawn geometry for hit-testing.
pub struct PriceChart<C: ChartHost, H: InteractionHost> {
    chart_host: C,
    transformer: SeriesTransformer,
    roi: RoiEngine<H>,
    live_price: Option<f64>,
}

impl<C: ChartHost, H: InteractionHost> PriceChart<C, H> {
    pub fn new(chart_host: C, interaction_host: H, config: ChartConfig) -> ChartResult<Self> {
        config.validate()?;
        let transformer =
            SeriesTransformer::new(config.calendar).with_options(config.transform);
        Ok(Self {
            chart_host,
            transformer,
            roi: RoiEngine::new(config.roi, interaction_host),
            live_price: None,
        })
    }

    /// Transforms `points` for `range`, hands the result to the host and
    /// refreshes the overlay geometry.
    pub fn set_series(
        &mut self,
        points: &[PricePoint],
        range: RangeKey,
        reference: DateTime<Utc>,
        live_price: Option<f64>,
    ) -> ChartResult<&DisplaySeries> {
        let series =
            self.transformer
                .transform_with_live_price(points, live_price, range, reference);
        self.chart_host.plot_line_series(&series)?;
        debug!(
            range = %range,
            input_count = points.len(),
            point_count = series.len(),
            "series plotted"
        );
        self.live_price = live_price;
        self.roi.set_series(series);
        self.on_render_pass();
        Ok(self.roi.series())
    }

    /// Same as [`Self::set_series`] with a textual range key.
    pub fn set_series_for_key(
        &mut self,
        points: &[PricePoint],
        range: &str,
        reference: DateTime<Utc>,
        live_price: Option<f64>,
    ) -> ChartResult<&DisplaySeries> {
        let range = RangeKey::parse(range)?;
        self.set_series(points, range, reference, live_price)
    }

    pub fn set_plot_box(&mut self, plot_box: PlotBox) -> ChartResult<()> {
        plot_box.validate()?;
        self.roi.set_plot_box(plot_box);
        Ok(())
    }

    /// Adopts the plot box reported by the host; returns `false` when the host
    /// has none or reports an invalid one.
    pub fn measure_plot_box(&mut self) -> bool {
        match self.chart_host.measure_plot_box() {
            Some(plot_box) if plot_box.validate().is_ok() => {
                self.roi.set_plot_box(plot_box);
                true
            }
            _ => false,
        }
    }

    /// Re-reads rendered geometry after the host drew or resized.
    pub fn on_render_pass(&mut self) -> GeometrySource {
        let rendered = self.chart_host.rendered_positions();
        self.roi.set_rendered_positions(rendered);
        let source = self.roi.geometry_source();
        trace!(?source, "render pass geometry refreshed");
        source
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.roi.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.roi.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self) -> Option<RoiMeasurement> {
        self.roi.pointer_up()
    }

    pub fn pointer_cancel(&mut self) {
        self.roi.pointer_cancel();
    }

    pub fn pointer_leave_window(&mut self) {
        self.roi.pointer_leave_window();
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.roi.key_down(key)
    }

    pub fn animation_frame(&mut self, id: FrameRequestId) {
        self.roi.animation_frame(id);
    }

    #[must_use]
    pub fn overlay_frame(&self) -> OverlayFrame {
        self.roi.overlay_frame()
    }

    #[must_use]
    pub fn series(&self) -> &DisplaySeries {
        self.roi.series()
    }

    #[must_use]
    pub fn range_stats(&self) -> RangeStats {
        range_change(self.roi.series(), self.live_price)
    }

    #[must_use]
    pub fn roi(&self) -> &RoiEngine<H> {
        &self.roi
    }

    #[must_use]
    pub fn chart_host(&self) -> &C {
        &self.chart_host
    }

    pub fn chart_host_mut(&mut self) -> &mut C {
        &mut self.chart_host
    }

    #[must_use]
    pub fn interaction_host(&self) -> &H {
        self.roi.host()
    }

    #[must_use]
    pub fn snapshot(&self) -> ChartSnapshot {
        let series = self.roi.series();
        ChartSnapshot {
            range: series.range,
            x_mode: series.x_mode,
            point_count: series.len(),
            plot_box: self.roi.plot_box(),
            geometry_source: self.roi.geometry_source(),
            phase: self.roi.phase(),
            selection: self.roi.selection(),
            hover_index: self.roi.hover_index(),
            measurement: self.roi.measurement(),
            range_stats: self.range_stats(),
        }
    }

    /// Tears down interaction state; also runs when the chart is dropped.
    pub fn unmount(&mut self) {
        self.roi.unmount();
    }
}
