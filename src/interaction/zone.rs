use serde::{Deserialize, Serialize};

use crate::core::types::PlotBox;

/// Horizontal strip of the container a pointer falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Left,
    Right,
    Middle,
}

impl Zone {
    #[must_use]
    pub fn is_edge(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Width of the right edge strip: never wider than the box's right padding.
#[must_use]
pub fn right_zone_width(plot_box: PlotBox, edge_zone_width: f64) -> f64 {
    edge_zone_width.min(plot_box.padding_right).max(0.0)
}

/// Classifies a container-relative X coordinate.
///
/// `Left` when `x < edge_zone_width`; `Right` when `x` lies past
/// `width - min(edge_zone_width, padding_right)`; `Middle` otherwise.
#[must_use]
pub fn classify_zone(x: f64, plot_box: PlotBox, edge_zone_width: f64) -> Zone {
    let right_start = plot_box.width - right_zone_width(plot_box, edge_zone_width);
    if x < edge_zone_width {
        Zone::Left
    } else if x > right_start {
        Zone::Right
    } else {
        Zone::Middle
    }
}
