use crate::core::types::PlotBox;

/// Distance the hover tooltip sits above its point.
pub const HOVER_TOOLTIP_RISE: f64 = 70.0;
/// Distance below the point used when the tooltip would leave the top edge.
pub const HOVER_TOOLTIP_DROP: f64 = 20.0;

/// Top-left corner of a tooltip in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
}

/// Places the measurement tooltip right of the newer point, above the higher one.
///
/// The box is clamped inside the plot area; a plot area smaller than the
/// tooltip pins it to the top-left plot corner.
#[must_use]
pub fn place_roi_tooltip(
    newer_x: f64,
    older_y: f64,
    newer_y: f64,
    plot_box: PlotBox,
    size: (f64, f64),
    offset: f64,
) -> TooltipPlacement {
    let (width, height) = size;
    let left = newer_x + offset;
    let top = older_y.min(newer_y) - offset - height;
    TooltipPlacement {
        left: left
            .min(plot_box.plot_right() - width)
            .max(plot_box.plot_left()),
        top: top
            .min(plot_box.plot_bottom() - height)
            .max(plot_box.plot_top()),
    }
}

/// Places the edge-hover tooltip centred on the point.
#[must_use]
pub fn place_hover_tooltip(
    x: f64,
    y: f64,
    plot_box: PlotBox,
    size: (f64, f64),
) -> TooltipPlacement {
    let (width, _) = size;
    let half = width / 2.0;
    let mut center = x;
    if center - half < 0.0 {
        center = half;
    }
    if center + half > plot_box.width {
        center = plot_box.width - half;
    }
    let mut top = y - HOVER_TOOLTIP_RISE;
    if top < 0.0 {
        top = y + HOVER_TOOLTIP_DROP;
    }
    TooltipPlacement {
        left: center - half,
        top,
    }
}
