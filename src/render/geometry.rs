use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::coords::PixelPositions;

/// Read-back of the pixel positions a renderer actually drew.
///
/// Implementations return `None` when the geometry is unavailable; callers
/// fall back to computed positions.
pub trait RenderedGeometryProvider {
    fn rendered_positions(&self) -> Option<PixelPositions>;
}

/// Where the positions driving the overlay came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometrySource {
    Rendered,
    #[default]
    Computed,
}

/// Prefers rendered positions when they describe exactly `point_count` points.
#[must_use]
pub fn resolve_positions(
    rendered: Option<PixelPositions>,
    computed: PixelPositions,
    point_count: usize,
) -> (PixelPositions, GeometrySource) {
    match rendered {
        Some(rendered) if rendered.matches_len(point_count) => {
            (rendered, GeometrySource::Rendered)
        }
        Some(rendered) => {
            debug!(
                rendered_x_count = rendered.xs.len(),
                rendered_y_count = rendered.ys.len(),
                point_count,
                "rendered geometry length mismatch; using computed positions"
            );
            (computed, GeometrySource::Computed)
        }
        None => (computed, GeometrySource::Computed),
    }
}
