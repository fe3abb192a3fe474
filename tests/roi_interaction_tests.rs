use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use pricechart_roi::core::{DisplayPoint, DisplaySeries, PixelPositions, PlotBox, RangeKey};
use pricechart_roi::interaction::{
    FrameRequestId, InteractionHost, RoiConfig, RoiEngine, RoiPhase, Zone, classify_zone,
};
use pricechart_roi::render::{GeometrySource, TooltipKind};

#[derive(Debug, Default)]
struct HostLog {
    text_selection_enabled: bool,
    dragging_marker: bool,
    tooltip_suppressed: bool,
    window_listeners: bool,
    next_frame: u64,
    requested: Vec<FrameRequestId>,
    cancelled: Vec<FrameRequestId>,
}

#[derive(Debug, Clone)]
struct RecordingHost {
    log: Rc<RefCell<HostLog>>,
    frames: bool,
}

impl RecordingHost {
    fn new(frames: bool) -> (Self, Rc<RefCell<HostLog>>) {
        let log = Rc::new(RefCell::new(HostLog {
            text_selection_enabled: true,
            ..HostLog::default()
        }));
        (
            Self {
                log: Rc::clone(&log),
                frames,
            },
            log,
        )
    }
}

impl InteractionHost for RecordingHost {
    fn set_text_selection_enabled(&mut self, enabled: bool) {
        self.log.borrow_mut().text_selection_enabled = enabled;
    }

    fn set_dragging_marker(&mut self, active: bool) {
        self.log.borrow_mut().dragging_marker = active;
    }

    fn set_native_tooltip_suppressed(&mut self, suppressed: bool) {
        self.log.borrow_mut().tooltip_suppressed = suppressed;
    }

    fn set_window_listeners(&mut self, active: bool) {
        self.log.borrow_mut().window_listeners = active;
    }

    fn request_animation_frame(&mut self) -> Option<FrameRequestId> {
        if !self.frames {
            return None;
        }
        let mut log = self.log.borrow_mut();
        log.next_frame += 1;
        let id = FrameRequestId(log.next_frame);
        log.requested.push(id);
        Some(id)
    }

    fn cancel_animation_frame(&mut self, id: FrameRequestId) {
        self.log.borrow_mut().cancelled.push(id);
    }
}

fn plot_box() -> PlotBox {
    PlotBox::new(500.0, 300.0).with_padding(40.0, 60.0, 10.0, 30.0)
}

fn series(range: RangeKey, values: &[f64]) -> DisplaySeries {
    let mut series = DisplaySeries::empty(range);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    series.y_axis.domain = (min - 10.0, max + 10.0);
    series.points = values
        .iter()
        .enumerate()
        .map(|(i, value)| DisplayPoint {
            position: i as f64,
            value: *value,
            time_label: format!("t{i}"),
            tooltip_label: format!("t{i}"),
            original_timestamp: Some(1_000 * i as i64),
        })
        .collect();
    series
}

fn engine(frames: bool) -> (RoiEngine<RecordingHost>, Rc<RefCell<HostLog>>) {
    let (host, log) = RecordingHost::new(frames);
    let mut engine = RoiEngine::new(RoiConfig::default(), host);
    engine.set_plot_box(plot_box());
    engine.set_series(series(RangeKey::FiveDays, &[90.0, 100.0, 110.0, 120.0, 115.0]));
    (engine, log)
}

// Ordinal xs for 5 points over the plot area: 40, 140, 240, 340, 440.

#[test]
fn zones_follow_edge_width_and_right_padding() {
    assert_eq!(classify_zone(10.0, plot_box(), 60.0), Zone::Left);
    assert_eq!(classify_zone(59.9, plot_box(), 60.0), Zone::Left);
    assert_eq!(classify_zone(60.0, plot_box(), 60.0), Zone::Middle);
    assert_eq!(classify_zone(440.0, plot_box(), 60.0), Zone::Middle);
    assert_eq!(classify_zone(440.1, plot_box(), 60.0), Zone::Right);

    let narrow = PlotBox::new(500.0, 300.0).with_padding(40.0, 12.0, 10.0, 30.0);
    assert_eq!(classify_zone(480.0, narrow, 60.0), Zone::Middle);
    assert_eq!(classify_zone(490.0, narrow, 60.0), Zone::Right);
}

#[test]
fn left_edge_pointer_down_pins_first_index_without_dragging() {
    let (mut engine, log) = engine(false);
    engine.pointer_down(10.0, 150.0);

    assert_eq!(engine.phase(), RoiPhase::Idle);
    assert_eq!(engine.hover_index(), Some(0));
    assert_eq!(engine.selection().current_zone, Some(Zone::Left));
    assert!(log.borrow().tooltip_suppressed);
    assert!(!log.borrow().dragging_marker);

    let frame = engine.overlay_frame();
    let hover = frame.tooltip(TooltipKind::Hover).expect("hover tooltip");
    assert_eq!(hover.value, "$90.00");
    assert_eq!(frame.rects.len(), 1);
}

#[test]
fn right_edge_pointer_down_pins_last_index() {
    let (mut engine, _log) = engine(false);
    engine.pointer_down(470.0, 150.0);
    assert_eq!(engine.hover_index(), Some(4));
    assert!(!engine.is_dragging());
}

#[test]
fn middle_pointer_down_outside_plot_area_is_ignored() {
    let (mut engine, log) = engine(false);
    engine.pointer_down(200.0, 5.0);
    assert!(!engine.is_dragging());
    assert!(log.borrow().text_selection_enabled);
}

#[test]
fn right_to_left_drag_reorders_chronologically() {
    let (mut engine, log) = engine(false);
    engine.pointer_down(340.0, 150.0);
    assert_eq!(engine.phase(), RoiPhase::Dragging);
    assert_eq!(engine.selection().start_index, Some(3));
    assert!(log.borrow().dragging_marker);
    assert!(!log.borrow().text_selection_enabled);
    assert!(log.borrow().window_listeners);

    engine.pointer_move(150.0, 150.0);
    assert_eq!(engine.selection().end_index, Some(1));

    let live = engine.measurement().expect("live measurement");
    assert_eq!((live.older_index, live.newer_index), (1, 3));

    let measurement = engine.pointer_up().expect("final measurement");
    assert_eq!(measurement.older_index, 1);
    assert_eq!(measurement.newer_index, 3);
    assert_abs_diff_eq!(measurement.delta, 20.0, epsilon = 1e-12);
    assert_abs_diff_eq!(measurement.pct, 20.0, epsilon = 1e-12);
    assert_eq!(measurement.summary_label(), "+$20.00 (+20.00%)");

    assert_eq!(engine.phase(), RoiPhase::Idle);
    assert_eq!(engine.selection().start_index, None);
    let log = log.borrow();
    assert!(!log.dragging_marker);
    assert!(log.text_selection_enabled);
    assert!(!log.tooltip_suppressed);
    assert!(!log.window_listeners);
}

#[test]
fn timestamp_mode_orders_by_recovered_timestamp() {
    let (host, _log) = RecordingHost::new(false);
    let mut engine = RoiEngine::new(RoiConfig::default(), host);
    let mut data = series(RangeKey::OneMonth, &[100.0, 80.0, 60.0]);
    data.x_axis.domain = (0.0, 2.0);
    for point in &mut data.points {
        point.position = point.original_timestamp.unwrap_or_default() as f64 / 1_000.0;
    }
    engine.set_plot_box(plot_box());
    engine.set_series(data);

    engine.pointer_down(440.0, 150.0);
    engine.pointer_move(80.0, 150.0);
    let measurement = engine.pointer_up().expect("measurement");
    assert_eq!((measurement.older_index, measurement.newer_index), (0, 2));
    assert_eq!(measurement.summary_label(), "-$40.00 (-40.00%)");
}

#[test]
fn moves_into_edge_zones_do_not_update_the_drag() {
    let (mut engine, _log) = engine(false);
    engine.pointer_down(240.0, 150.0);
    engine.pointer_move(20.0, 150.0);
    assert_eq!(engine.selection().end_index, Some(2));
    assert_eq!(engine.selection().current_zone, Some(Zone::Left));
    engine.pointer_move(470.0, 150.0);
    assert_eq!(engine.selection().end_index, Some(2));
    assert!(engine.is_dragging());
}

#[test]
fn escape_cancels_drag_and_clears_dragging_marker() {
    let (mut engine, log) = engine(false);
    engine.pointer_down(240.0, 150.0);
    assert!(log.borrow().dragging_marker);

    assert!(engine.key_down("Escape"));
    assert_eq!(engine.phase(), RoiPhase::Idle);
    assert_eq!(engine.selection().start_index, None);
    assert_eq!(engine.selection().end_index, None);
    assert!(!log.borrow().dragging_marker);
    assert!(log.borrow().text_selection_enabled);
    assert!(engine.pointer_up().is_none());
    assert!(!engine.key_down("Escape"));
}

#[test]
fn cancel_and_window_leave_end_the_drag() {
    let (mut engine, log) = engine(false);
    engine.pointer_down(240.0, 150.0);
    engine.pointer_cancel();
    assert!(!engine.is_dragging());
    assert!(!log.borrow().dragging_marker);

    engine.pointer_down(240.0, 150.0);
    engine.pointer_leave_window();
    assert!(!engine.is_dragging());
    assert!(!log.borrow().dragging_marker);
}

#[test]
fn drag_updates_are_coalesced_per_animation_frame() {
    let (mut engine, log) = engine(true);
    engine.pointer_down(440.0, 150.0);

    engine.pointer_move(340.0, 150.0);
    engine.pointer_move(240.0, 150.0);
    assert_eq!(engine.selection().end_index, Some(4));
    assert_eq!(log.borrow().requested, vec![FrameRequestId(1), FrameRequestId(2)]);
    assert_eq!(log.borrow().cancelled, vec![FrameRequestId(1)]);

    engine.animation_frame(FrameRequestId(1));
    assert_eq!(engine.selection().end_index, Some(4));
    engine.animation_frame(FrameRequestId(2));
    assert_eq!(engine.selection().end_index, Some(2));
    assert_eq!(engine.pending_frame(), None);
}

#[test]
fn pointer_up_flushes_pending_frame_update() {
    let (mut engine, log) = engine(true);
    engine.pointer_down(440.0, 150.0);
    engine.pointer_move(140.0, 150.0);
    let measurement = engine.pointer_up().expect("measurement");
    assert_eq!((measurement.older_index, measurement.newer_index), (1, 4));
    assert_eq!(log.borrow().cancelled, vec![FrameRequestId(1)]);
}

#[test]
fn idle_move_outside_container_clears_hover() {
    let (mut engine, log) = engine(false);
    engine.pointer_move(20.0, 150.0);
    assert_eq!(engine.hover_index(), Some(0));
    assert!(log.borrow().tooltip_suppressed);

    engine.pointer_move(-5.0, 150.0);
    assert_eq!(engine.hover_index(), None);
    assert_eq!(engine.selection().current_zone, None);
    assert!(!log.borrow().tooltip_suppressed);
}

#[test]
fn idle_move_in_middle_releases_native_tooltip() {
    let (mut engine, log) = engine(false);
    engine.pointer_move(470.0, 150.0);
    assert_eq!(engine.hover_index(), Some(4));
    engine.pointer_move(240.0, 150.0);
    assert_eq!(engine.hover_index(), None);
    assert!(!log.borrow().tooltip_suppressed);
}

#[test]
fn drop_mid_drag_reverts_host_side_effects() {
    let (mut engine, log) = engine(true);
    engine.pointer_down(240.0, 150.0);
    engine.pointer_move(340.0, 150.0);
    drop(engine);

    let log = log.borrow();
    assert!(!log.dragging_marker);
    assert!(log.text_selection_enabled);
    assert!(!log.tooltip_suppressed);
    assert!(!log.window_listeners);
    assert_eq!(log.cancelled, vec![FrameRequestId(1)]);
}

#[test]
fn unmounted_engine_ignores_pointer_input() {
    let (mut engine, _log) = engine(false);
    engine.unmount();
    engine.unmount();
    engine.pointer_down(240.0, 150.0);
    assert!(!engine.is_dragging());
    assert!(engine.overlay_frame().is_empty());
}

#[test]
fn overlay_is_empty_for_degenerate_geometry() {
    let (host, _log) = RecordingHost::new(false);
    let mut engine = RoiEngine::new(RoiConfig::default(), host);
    engine.set_series(series(RangeKey::FiveDays, &[1.0, 2.0, 3.0]));
    assert!(engine.overlay_frame().is_empty());

    engine.set_plot_box(PlotBox::new(0.0, 300.0));
    engine.pointer_down(200.0, 100.0);
    assert!(!engine.is_dragging());
    assert!(engine.overlay_frame().is_empty());

    engine.set_plot_box(plot_box());
    engine.set_series(series(RangeKey::FiveDays, &[1.0]));
    engine.pointer_move(20.0, 100.0);
    assert!(engine.overlay_frame().is_empty());
}

#[test]
fn roi_overlay_draws_guides_connector_markers_and_tooltip() {
    let (mut engine, _log) = engine(false);
    engine.pointer_down(140.0, 150.0);
    engine.pointer_move(340.0, 150.0);

    let frame = engine.overlay_frame();
    frame.validate().expect("valid overlay");
    assert_eq!(frame.lines.len(), 3);
    assert_eq!(frame.circles.len(), 2);
    assert_eq!(frame.lines[0].y1, 10.0);
    assert_eq!(frame.lines[0].y2, 270.0);

    let tooltip = frame.tooltip(TooltipKind::Roi).expect("roi tooltip");
    assert_eq!(tooltip.caption, "t1 - t3");
    assert_eq!(tooltip.value, "+$20.00 (+20.00%)");
    assert!(tooltip.left >= 40.0 && tooltip.left + tooltip.width <= 440.0);
    assert!(tooltip.top >= 10.0 && tooltip.top + tooltip.height <= 270.0);
}

#[test]
fn rendered_positions_win_only_with_matching_length() {
    let (mut engine, _log) = engine(false);
    let rendered = PixelPositions {
        xs: vec![41.0, 141.0, 241.0, 341.0, 441.0],
        ys: vec![200.0, 180.0, 160.0, 140.0, 150.0],
    };
    engine.set_rendered_positions(Some(rendered.clone()));
    assert_eq!(engine.geometry_source(), GeometrySource::Rendered);
    assert_eq!(engine.positions(), &rendered);

    engine.set_rendered_positions(Some(rendered.clone()));
    assert_eq!(engine.positions(), &rendered);

    let short = PixelPositions {
        xs: vec![1.0, 2.0],
        ys: vec![1.0, 2.0],
    };
    engine.set_rendered_positions(Some(short));
    assert_eq!(engine.geometry_source(), GeometrySource::Computed);
    assert_eq!(engine.positions().xs[0], 40.0);
}

#[test]
fn replacing_series_cancels_active_drag() {
    let (mut engine, log) = engine(false);
    engine.pointer_down(240.0, 150.0);
    engine.set_series(series(RangeKey::FiveDays, &[1.0, 2.0]));
    assert!(!engine.is_dragging());
    assert!(!log.borrow().dragging_marker);
}
