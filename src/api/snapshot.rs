use serde::{Deserialize, Serialize};

use crate::core::range::RangeKey;
use crate::core::series::RangeStats;
use crate::core::types::{PlotBox, XMode};
use crate::interaction::{DragSelection, RoiMeasurement, RoiPhase};
use crate::render::GeometrySource;

/// Serializable view of a chart's interaction state, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub range: RangeKey,
    pub x_mode: XMode,
    pub point_count: usize,
    pub plot_box: PlotBox,
    pub geometry_source: GeometrySource,
    pub phase: RoiPhase,
    pub selection: DragSelection,
    pub hover_index: Option<usize>,
    pub measurement: Option<RoiMeasurement>,
    pub range_stats: RangeStats,
}
