use serde::{Deserialize, Serialize};

use crate::core::types::PlotBox;
use crate::error::{ChartError, ChartResult};
use crate::render::{CirclePrimitive, Color, LinePrimitive, RectPrimitive};

/// What a tooltip box is describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TooltipKind {
    /// Measurement between the two dragged points.
    Roi,
    /// Pinned edge-zone hover.
    Hover,
}

/// Positioned tooltip with a caption line and a value line.
///
/// `left`/`top` is the top-left corner in container pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipBox {
    pub kind: TooltipKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub caption: String,
    pub value: String,
    pub accent: Color,
}

impl TooltipBox {
    pub fn validate(&self) -> ChartResult<()> {
        let geometry = [self.left, self.top, self.width, self.height];
        if geometry.iter().any(|value| !value.is_finite()) {
            return Err(ChartError::InvalidData(
                "tooltip geometry must be finite".to_owned(),
            ));
        }
        if self.value.is_empty() {
            return Err(ChartError::InvalidData(
                "tooltip value must not be empty".to_owned(),
            ));
        }
        self.accent.validate()
    }
}

/// Overlay scene for one interaction state, drawn above the host's line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub plot_box: PlotBox,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub circles: Vec<CirclePrimitive>,
    pub tooltips: Vec<TooltipBox>,
}

impl OverlayFrame {
    #[must_use]
    pub fn new(plot_box: PlotBox) -> Self {
        Self {
            plot_box,
            lines: Vec::new(),
            rects: Vec::new(),
            circles: Vec::new(),
            tooltips: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_line(mut self, line: LinePrimitive) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    #[must_use]
    pub fn with_circle(mut self, circle: CirclePrimitive) -> Self {
        self.circles.push(circle);
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: TooltipBox) -> Self {
        self.tooltips.push(tooltip);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.plot_box.validate()?;
        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for circle in &self.circles {
            circle.validate()?;
        }
        for tooltip in &self.tooltips {
            tooltip.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.rects.is_empty()
            && self.circles.is_empty()
            && self.tooltips.is_empty()
    }

    #[must_use]
    pub fn tooltip(&self, kind: TooltipKind) -> Option<&TooltipBox> {
        self.tooltips.iter().find(|tooltip| tooltip.kind == kind)
    }
}
