//! pricechart-roi: range-aware price series shaping and pointer-driven
//! region-of-interest measurement for market charts.
//!
//! The crate is split into layers: `core` turns raw closes into display-ready
//! series and pixel coordinates, `interaction` runs the drag state machine,
//! `render` defines the seam to the external rendering library, and `api`
//! wires them into one chart facade.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, PriceChart};
pub use error::{ChartError, ChartResult};
