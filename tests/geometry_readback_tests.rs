use approx::assert_abs_diff_eq;
use chrono::{DateTime, TimeZone, Utc};
use pricechart_roi::ChartConfig;
use pricechart_roi::ChartResult;
use pricechart_roi::PriceChart;
use pricechart_roi::core::{
    DisplaySeries, PixelPositions, PlotBox, PricePoint, RangeKey, precompute_positions,
};
use pricechart_roi::interaction::NullInteractionHost;
use pricechart_roi::render::{
    ChartHost, GeometrySource, RenderedGeometryProvider, SvgLineHost, SvgPathGeometry,
};

fn plot_box() -> PlotBox {
    PlotBox::new(500.0, 300.0).with_padding(40.0, 60.0, 10.0, 30.0)
}

fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 12, 18, 0, 0)
        .single()
        .expect("valid reference")
}

fn session_points(closes: &[f64]) -> Vec<PricePoint> {
    let open = Utc
        .with_ymd_and_hms(2024, 6, 12, 14, 0, 0)
        .single()
        .expect("valid open")
        .timestamp_millis();
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| PricePoint::new(open + i as i64 * 3_600_000, *close))
        .collect()
}

#[derive(Debug, Default)]
struct TruncatingHost {
    last: Option<PixelPositions>,
}

impl RenderedGeometryProvider for TruncatingHost {
    fn rendered_positions(&self) -> Option<PixelPositions> {
        self.last.clone()
    }
}

impl ChartHost for TruncatingHost {
    fn plot_line_series(&mut self, series: &DisplaySeries) -> ChartResult<()> {
        let mut positions = precompute_positions(series, plot_box());
        positions.xs.pop();
        positions.ys.pop();
        self.last = Some(positions);
        Ok(())
    }
}

#[test]
fn path_parser_reads_move_line_and_cubic_end_points() {
    let geometry = SvgPathGeometry::parse("M40,270L140,10.5C1,2,3,4,240,100Z");
    assert_eq!(geometry.xs(), &[40.0, 140.0, 240.0]);
    assert_eq!(geometry.ys(), &[270.0, 10.5, 100.0]);
}

#[test]
fn path_parser_skips_unsupported_commands() {
    let geometry = SvgPathGeometry::parse("M0,0H50V20L10,10");
    assert_eq!(geometry.xs(), &[0.0, 10.0]);
    assert_eq!(geometry.ys(), &[0.0, 10.0]);
}

#[test]
fn path_parser_handles_compact_number_syntax() {
    let geometry = SvgPathGeometry::parse("M1e2-5L.5.5");
    assert_eq!(geometry.xs(), &[100.0, 0.5]);
    assert_eq!(geometry.ys(), &[-5.0, 0.5]);
}

#[test]
fn empty_path_reports_no_rendered_geometry() {
    let geometry = SvgPathGeometry::parse("");
    assert!(geometry.is_empty());
    assert!(geometry.rendered_positions().is_none());
}

#[test]
fn svg_host_geometry_is_preferred_after_render_pass() {
    let host = SvgLineHost::new(plot_box());
    let mut chart =
        PriceChart::new(host, NullInteractionHost, ChartConfig::default()).expect("chart init");
    assert!(chart.measure_plot_box());

    chart
        .set_series(
            &session_points(&[90.0, 100.0, 110.0, 120.0]),
            RangeKey::FiveDays,
            reference(),
            None,
        )
        .expect("series plotted");
    assert!(chart.chart_host().path_data().starts_with("M40.00,"));
    assert_eq!(chart.roi().geometry_source(), GeometrySource::Rendered);

    let computed = precompute_positions(chart.series(), plot_box());
    let rendered = chart.roi().positions();
    assert_eq!(rendered.len(), computed.len());
    for (drawn, ideal) in rendered.xs.iter().zip(&computed.xs) {
        assert_abs_diff_eq!(*drawn, *ideal, epsilon = 0.005);
    }
    for (drawn, ideal) in rendered.ys.iter().zip(&computed.ys) {
        assert_abs_diff_eq!(*drawn, *ideal, epsilon = 0.005);
    }
}

#[test]
fn coarse_rounding_still_drives_hit_testing() {
    let host = SvgLineHost::new(plot_box()).with_precision(0);
    let mut chart =
        PriceChart::new(host, NullInteractionHost, ChartConfig::default()).expect("chart init");
    chart.measure_plot_box();
    chart
        .set_series(
            &session_points(&[90.0, 100.0, 110.0, 120.0]),
            RangeKey::FiveDays,
            reference(),
            None,
        )
        .expect("series plotted");

    assert_eq!(chart.on_render_pass(), GeometrySource::Rendered);
    // 173.33 is drawn at 173.
    assert_eq!(chart.roi().positions().xs[1], 173.0);

    chart.pointer_down(440.0, 150.0);
    chart.pointer_move(175.0, 150.0);
    let measurement = chart.pointer_up().expect("measurement");
    assert_eq!((measurement.older_index, measurement.newer_index), (1, 3));
}

#[test]
fn mismatched_rendered_geometry_falls_back_to_computed() {
    let mut chart = PriceChart::new(
        TruncatingHost::default(),
        NullInteractionHost,
        ChartConfig::default(),
    )
    .expect("chart init");
    chart.set_plot_box(plot_box()).expect("valid plot box");
    chart
        .set_series(
            &session_points(&[90.0, 100.0, 110.0]),
            RangeKey::FiveDays,
            reference(),
            None,
        )
        .expect("series plotted");

    assert_eq!(chart.on_render_pass(), GeometrySource::Computed);
    assert_eq!(chart.roi().positions().xs, vec![40.0, 240.0, 440.0]);
}

#[test]
fn empty_or_undrawable_plots_leave_no_path() {
    let mut host = SvgLineHost::new(plot_box());
    let series = DisplaySeries::empty(RangeKey::FiveDays);
    host.plot_line_series(&series).expect("empty series plotted");
    assert!(host.path_data().is_empty());

    host.set_plot_box(PlotBox::new(0.0, 0.0));
    host.plot_line_series(&series).expect("empty series plotted");
    assert!(host.rendered_positions().is_none());
}
