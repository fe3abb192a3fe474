mod frame;
mod geometry;
mod host;
mod primitives;
mod svg_path;

pub use frame::{OverlayFrame, TooltipBox, TooltipKind};
pub use geometry::{GeometrySource, RenderedGeometryProvider, resolve_positions};
pub use host::{ChartHost, NullChartHost, SvgLineHost};
pub use primitives::{CirclePrimitive, Color, LinePrimitive, RectPrimitive};
pub use svg_path::SvgPathGeometry;
