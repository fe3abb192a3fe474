//! Pointer-driven region-of-interest measurement over a rendered series.

pub mod roi;
pub mod session;
pub mod tooltip;
pub mod zone;

pub use roi::{
    DragSelection, GAIN_COLOR, GUIDE_COLOR, LOSS_COLOR, RoiConfig, RoiEngine, RoiMeasurement,
    RoiPhase,
};
pub use session::{DragSession, FrameRequestId, InteractionHost, NullInteractionHost};
pub use tooltip::{TooltipPlacement, place_hover_tooltip, place_roi_tooltip};
pub use zone::{Zone, classify_zone, right_zone_width};
