use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::coords::{PixelPositions, delta_and_percent, nearest_index, precompute_positions};
use crate::core::range::RangeKey;
use crate::core::types::{DisplaySeries, PlotBox, XMode};
use crate::interaction::session::{DragSession, FrameRequestId, InteractionHost, restore_host};
use crate::interaction::tooltip::{place_hover_tooltip, place_roi_tooltip};
use crate::interaction::zone::{Zone, classify_zone, right_zone_width};
use crate::render::{
    CirclePrimitive, Color, GeometrySource, LinePrimitive, OverlayFrame, RectPrimitive,
    TooltipBox, TooltipKind, resolve_positions,
};

pub const GAIN_COLOR: Color = Color::from_rgb8(0x10, 0xB9, 0x81);
pub const LOSS_COLOR: Color = Color::from_rgb8(0xEF, 0x44, 0x44);
pub const GUIDE_COLOR: Color = Color::from_rgb8(0x4B, 0x55, 0x63);
const EDGE_SHADE_COLOR: Color = Color::from_rgb8(0x27, 0x27, 0x2A).with_alpha(0.10);

/// Tuning for the ROI overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiConfig {
    /// Width of the left edge strip; also caps the right strip.
    pub edge_zone_width: f64,
    pub marker_radius: f64,
    pub tooltip_width: f64,
    pub tooltip_height: f64,
    /// Gap between the newer point and the measurement tooltip.
    pub tooltip_offset: f64,
    /// Coalesce drag updates to one per animation frame.
    pub throttle_to_frames: bool,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            edge_zone_width: 60.0,
            marker_radius: 4.0,
            tooltip_width: 160.0,
            tooltip_height: 56.0,
            tooltip_offset: 8.0,
            throttle_to_frames: true,
        }
    }
}

impl RoiConfig {
    #[must_use]
    pub fn with_edge_zone_width(mut self, width: f64) -> Self {
        self.edge_zone_width = width;
        self
    }

    #[must_use]
    pub fn with_throttle_to_frames(mut self, enabled: bool) -> Self {
        self.throttle_to_frames = enabled;
        self
    }

    fn tooltip_size(self) -> (f64, f64) {
        (self.tooltip_width, self.tooltip_height)
    }
}

/// Drag state owned by one chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DragSelection {
    pub active: bool,
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    pub current_zone: Option<Zone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoiPhase {
    Idle,
    Dragging,
}

/// Price change between two selected points, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiMeasurement {
    pub older_index: usize,
    pub newer_index: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub delta: f64,
    pub pct: f64,
}

impl RoiMeasurement {
    /// Orders `first`/`second` chronologically and measures the change.
    ///
    /// Ordinal series compare indices; timestamp series compare the recovered
    /// timestamps, since a drag may run right to left.
    #[must_use]
    pub fn between(series: &DisplaySeries, first: usize, second: usize) -> Option<Self> {
        let (older_index, newer_index) = match series.x_mode {
            XMode::Ordinal => (first.min(second), first.max(second)),
            XMode::Timestamp => {
                let first_time = series.timestamp_at(first)?;
                let second_time = series.timestamp_at(second)?;
                if first_time > second_time {
                    (second, first)
                } else {
                    (first, second)
                }
            }
        };
        let start_price = series.points.get(older_index)?.value;
        let end_price = series.points.get(newer_index)?.value;
        let change = delta_and_percent(start_price, end_price);
        Some(Self {
            older_index,
            newer_index,
            start_price,
            end_price,
            delta: change.delta,
            pct: change.pct,
        })
    }

    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.delta >= 0.0
    }

    fn sign(&self) -> char {
        if self.is_gain() { '+' } else { '-' }
    }

    /// Signed dollar change, e.g. `+$20.00` or `-$3.10`.
    #[must_use]
    pub fn delta_label(&self) -> String {
        format!("{}${:.2}", self.sign(), self.delta.abs())
    }

    #[must_use]
    pub fn pct_label(&self) -> String {
        format!("{}{:.2}%", self.sign(), self.pct.abs())
    }

    #[must_use]
    pub fn summary_label(&self) -> String {
        format!("{} ({})", self.delta_label(), self.pct_label())
    }
}

/// Pointer-driven region-of-interest state machine for one chart.
///
/// Coordinates passed to the pointer handlers are container-relative pixels.
/// Drag side effects on the host are reverted on every exit path, including
/// [`Drop`].
#[derive(Debug)]
pub struct RoiEngine<H: InteractionHost> {
    config: RoiConfig,
    host: H,
    series: DisplaySeries,
    plot_box: PlotBox,
    rendered: Option<PixelPositions>,
    positions: PixelPositions,
    geometry_source: GeometrySource,
    selection: DragSelection,
    hover_index: Option<usize>,
    session: Option<DragSession>,
    pending_frame: Option<FrameRequestId>,
    pending_end_index: Option<usize>,
    tooltip_suppressed: bool,
    mounted: bool,
}

impl<H: InteractionHost> RoiEngine<H> {
    #[must_use]
    pub fn new(config: RoiConfig, host: H) -> Self {
        Self {
            config,
            host,
            series: DisplaySeries::empty(RangeKey::OneDay),
            plot_box: PlotBox::default(),
            rendered: None,
            positions: PixelPositions::default(),
            geometry_source: GeometrySource::Computed,
            selection: DragSelection::default(),
            hover_index: None,
            session: None,
            pending_frame: None,
            pending_end_index: None,
            tooltip_suppressed: false,
            mounted: true,
        }
    }

    #[must_use]
    pub fn config(&self) -> RoiConfig {
        self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn series(&self) -> &DisplaySeries {
        &self.series
    }

    #[must_use]
    pub fn plot_box(&self) -> PlotBox {
        self.plot_box
    }

    /// Positions currently used for hit-testing and drawing.
    #[must_use]
    pub fn positions(&self) -> &PixelPositions {
        &self.positions
    }

    #[must_use]
    pub fn geometry_source(&self) -> GeometrySource {
        self.geometry_source
    }

    #[must_use]
    pub fn selection(&self) -> DragSelection {
        self.selection
    }

    #[must_use]
    pub fn hover_index(&self) -> Option<usize> {
        self.hover_index
    }

    #[must_use]
    pub fn phase(&self) -> RoiPhase {
        if self.selection.active {
            RoiPhase::Dragging
        } else {
            RoiPhase::Idle
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.selection.active
    }

    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameRequestId> {
        self.pending_frame
    }

    #[must_use]
    pub fn is_native_tooltip_suppressed(&self) -> bool {
        self.tooltip_suppressed
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Replaces the series; an in-flight drag is cancelled and stale
    /// read-back geometry is discarded.
    pub fn set_series(&mut self, series: DisplaySeries) {
        if self.selection.active {
            self.end_drag("series replaced");
        }
        self.hover_index = None;
        self.series = series;
        self.rendered = None;
        self.refresh_positions();
    }

    pub fn set_plot_box(&mut self, plot_box: PlotBox) {
        self.plot_box = plot_box;
        self.refresh_positions();
    }

    /// Stores positions read back after a render pass.
    ///
    /// Calling this repeatedly with the same input leaves the engine unchanged.
    pub fn set_rendered_positions(&mut self, rendered: Option<PixelPositions>) {
        self.rendered = rendered;
        self.refresh_positions();
    }

    fn refresh_positions(&mut self) {
        let computed = if self.plot_box.is_drawable() {
            precompute_positions(&self.series, self.plot_box)
        } else {
            PixelPositions::default()
        };
        let (positions, source) =
            resolve_positions(self.rendered.clone(), computed, self.series.len());
        self.positions = positions;
        self.geometry_source = source;
        if self
            .hover_index
            .is_some_and(|index| index >= self.positions.len())
        {
            self.hover_index = None;
        }
    }

    fn is_interactive(&self) -> bool {
        self.mounted
            && self.plot_box.is_drawable()
            && !self.series.is_empty()
            && self.positions.matches_len(self.series.len())
    }

    fn set_tooltip_suppressed(&mut self, suppressed: bool) {
        if self.tooltip_suppressed != suppressed {
            self.tooltip_suppressed = suppressed;
            self.host.set_native_tooltip_suppressed(suppressed);
        }
    }

    fn edge_index(&self, zone: Zone) -> Option<usize> {
        match zone {
            Zone::Left => Some(0),
            Zone::Right => self.series.len().checked_sub(1),
            Zone::Middle => None,
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if self.selection.active || !self.is_interactive() {
            return;
        }
        let zone = classify_zone(x, self.plot_box, self.config.edge_zone_width);
        if zone.is_edge() {
            if !self.plot_box.container_contains(x, y) {
                return;
            }
            self.selection.current_zone = Some(zone);
            self.hover_index = self.edge_index(zone);
            self.set_tooltip_suppressed(true);
            trace!(?zone, hover_index = ?self.hover_index, "edge zone pinned");
            return;
        }

        if !self.plot_box.plot_contains(x, y) {
            return;
        }
        let Some(index) = nearest_index(x, &self.positions.xs) else {
            return;
        };
        self.selection = DragSelection {
            active: true,
            start_index: Some(index),
            end_index: Some(index),
            current_zone: Some(Zone::Middle),
        };
        self.hover_index = None;
        self.session = Some(DragSession::acquire(&mut self.host));
        self.set_tooltip_suppressed(true);
        debug!(start_index = index, "roi drag started");
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.mounted {
            return;
        }
        if self.selection.active {
            let zone = classify_zone(x, self.plot_box, self.config.edge_zone_width);
            self.selection.current_zone = Some(zone);
            if zone.is_edge() {
                return;
            }
            if let Some(index) = nearest_index(x, &self.positions.xs) {
                self.schedule_end_index(index);
            }
            return;
        }

        if !self.plot_box.container_contains(x, y) {
            self.selection.current_zone = None;
            self.hover_index = None;
            self.set_tooltip_suppressed(false);
            return;
        }
        if !self.is_interactive() {
            return;
        }
        let zone = classify_zone(x, self.plot_box, self.config.edge_zone_width);
        self.selection.current_zone = Some(zone);
        self.hover_index = self.edge_index(zone);
        self.set_tooltip_suppressed(zone.is_edge());
    }

    fn schedule_end_index(&mut self, index: usize) {
        if !self.config.throttle_to_frames {
            self.selection.end_index = Some(index);
            return;
        }
        if let Some(stale) = self.pending_frame.take() {
            self.host.cancel_animation_frame(stale);
        }
        match self.host.request_animation_frame() {
            Some(id) => {
                self.pending_frame = Some(id);
                self.pending_end_index = Some(index);
            }
            None => {
                self.pending_end_index = None;
                self.selection.end_index = Some(index);
            }
        }
    }

    /// Runs a scheduled frame callback; stale ids are ignored.
    pub fn animation_frame(&mut self, id: FrameRequestId) {
        if self.pending_frame != Some(id) {
            trace!(?id, "ignoring stale animation frame");
            return;
        }
        self.pending_frame = None;
        if let Some(index) = self.pending_end_index.take() {
            if self.selection.active {
                self.selection.end_index = Some(index);
            }
        }
    }

    /// Ends the drag and returns the final measurement, if one was active.
    pub fn pointer_up(&mut self) -> Option<RoiMeasurement> {
        if !self.selection.active {
            return None;
        }
        if let Some(index) = self.pending_end_index.take() {
            self.selection.end_index = Some(index);
        }
        let measurement = self.measurement();
        self.end_drag("pointer up");
        measurement
    }

    pub fn pointer_cancel(&mut self) {
        if self.selection.active {
            self.end_drag("pointer cancel");
        }
    }

    pub fn pointer_leave_window(&mut self) {
        if self.selection.active {
            self.end_drag("pointer left window");
        }
    }

    /// Handles a key press; returns `true` when it cancelled a drag.
    pub fn key_down(&mut self, key: &str) -> bool {
        if key == "Escape" && self.selection.active {
            self.end_drag("escape");
            return true;
        }
        false
    }

    fn end_drag(&mut self, reason: &'static str) {
        if let Some(stale) = self.pending_frame.take() {
            self.host.cancel_animation_frame(stale);
        }
        self.pending_end_index = None;
        self.selection = DragSelection::default();
        match self.session.take() {
            Some(session) => session.release(&mut self.host),
            None => restore_host(&mut self.host),
        }
        self.set_tooltip_suppressed(false);
        debug!(reason, "roi drag ended");
    }

    /// Tears down the engine; safe to call mid-drag and more than once.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        if let Some(stale) = self.pending_frame.take() {
            self.host.cancel_animation_frame(stale);
        }
        self.pending_end_index = None;
        self.selection = DragSelection::default();
        self.hover_index = None;
        match self.session.take() {
            Some(session) => session.release(&mut self.host),
            None => restore_host(&mut self.host),
        }
        self.tooltip_suppressed = false;
        self.host.set_native_tooltip_suppressed(false);
        self.mounted = false;
        debug!("roi engine unmounted");
    }

    /// Measurement for the active drag selection.
    #[must_use]
    pub fn measurement(&self) -> Option<RoiMeasurement> {
        if !self.selection.active {
            return None;
        }
        let start = self.selection.start_index?;
        let end = self.selection.end_index?;
        RoiMeasurement::between(&self.series, start, end)
    }

    /// Overlay scene for the current state; empty when geometry is unusable.
    #[must_use]
    pub fn overlay_frame(&self) -> OverlayFrame {
        let frame = OverlayFrame::new(self.plot_box);
        if !self.mounted
            || !self.plot_box.is_drawable()
            || self.series.len() < 2
            || !self.positions.matches_len(self.series.len())
        {
            return frame;
        }

        let frame = self.push_edge_shading(frame);
        if self.selection.active {
            return self.push_roi(frame);
        }
        self.push_hover(frame)
    }

    fn push_edge_shading(&self, frame: OverlayFrame) -> OverlayFrame {
        let height = self.plot_box.height;
        match self.selection.current_zone {
            Some(Zone::Left) => frame.with_rect(RectPrimitive::new(
                0.0,
                0.0,
                self.config.edge_zone_width,
                height,
                EDGE_SHADE_COLOR,
            )),
            Some(Zone::Right) => {
                let width = right_zone_width(self.plot_box, self.config.edge_zone_width);
                if width > 0.0 {
                    frame.with_rect(RectPrimitive::new(
                        self.plot_box.width - width,
                        0.0,
                        width,
                        height,
                        EDGE_SHADE_COLOR,
                    ))
                } else {
                    frame
                }
            }
            Some(Zone::Middle) | None => frame,
        }
    }

    fn guide(&self, x: f64, alpha: f64) -> LinePrimitive {
        LinePrimitive::new(
            x,
            self.plot_box.plot_top(),
            x,
            self.plot_box.plot_bottom(),
            1.0,
            GUIDE_COLOR.with_alpha(alpha),
        )
    }

    fn push_roi(&self, frame: OverlayFrame) -> OverlayFrame {
        let Some(measurement) = self.measurement() else {
            return frame;
        };
        let (older, newer) = (measurement.older_index, measurement.newer_index);
        let (x1, y1) = (self.positions.xs[older], self.positions.ys[older]);
        let (x2, y2) = (self.positions.xs[newer], self.positions.ys[newer]);
        let accent = if measurement.is_gain() {
            GAIN_COLOR
        } else {
            LOSS_COLOR
        };
        let placement = place_roi_tooltip(
            x2,
            y1,
            y2,
            self.plot_box,
            self.config.tooltip_size(),
            self.config.tooltip_offset,
        );
        let caption = format!(
            "{} - {}",
            self.series.points[older].time_label, self.series.points[newer].time_label
        );
        let radius = self.config.marker_radius;

        frame
            .with_line(self.guide(x1, 0.6))
            .with_line(self.guide(x2, 0.6))
            .with_line(LinePrimitive::new(x1, y1, x2, y2, 1.0, accent.with_alpha(0.6)))
            .with_circle(CirclePrimitive::marker(x1, y1, radius, accent))
            .with_circle(CirclePrimitive::marker(x2, y2, radius, accent))
            .with_tooltip(TooltipBox {
                kind: TooltipKind::Roi,
                left: placement.left,
                top: placement.top,
                width: self.config.tooltip_width,
                height: self.config.tooltip_height,
                caption,
                value: measurement.summary_label(),
                accent,
            })
    }

    fn push_hover(&self, frame: OverlayFrame) -> OverlayFrame {
        let Some(index) = self.hover_index else {
            return frame;
        };
        let (Some(&x), Some(&y), Some(point)) = (
            self.positions.xs.get(index),
            self.positions.ys.get(index),
            self.series.points.get(index),
        ) else {
            return frame;
        };
        let placement = place_hover_tooltip(x, y, self.plot_box, self.config.tooltip_size());

        frame
            .with_line(self.guide(x, 0.5))
            .with_circle(CirclePrimitive::marker(
                x,
                y,
                self.config.marker_radius,
                GAIN_COLOR,
            ))
            .with_tooltip(TooltipBox {
                kind: TooltipKind::Hover,
                left: placement.left,
                top: placement.top,
                width: self.config.tooltip_width,
                height: self.config.tooltip_height,
                caption: point.time_label.clone(),
                value: format!("${:.2}", point.value),
                accent: GAIN_COLOR,
            })
    }
}

impl<H: InteractionHost> Drop for RoiEngine<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
