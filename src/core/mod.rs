pub mod calendar;
pub mod coords;
pub mod label_format;
pub mod primitives;
pub mod range;
pub mod series;
pub mod ticks;
pub mod types;

pub use calendar::{ExchangeTimeZone, SessionWindow, TradingCalendar};
pub use coords::{
    PixelPositions, PriceDelta, delta_and_percent, nearest_index, precompute_positions,
    x_from_ordinal, x_from_timestamp, y_from_price,
};
pub use range::{
    Lookback, RangeDescriptor, RangeKey, SamplingInterval, data_interval_for, describe,
    has_same_data_interval, is_intraday, optimal_tick_count, time_window,
};
pub use series::{
    RangeStats, SeriesTransformer, TransformOptions, canonicalize_points, range_change, transform,
};
pub use ticks::{
    LabeledTicks, NiceTicks, compute_nice_ticks, format_tick_labels, label_ticks_distinct,
};
pub use types::{
    AxisSpec, DisplayPoint, DisplaySeries, PlotBox, PricePoint, RawQuote, Rect, TimeValue, XMode,
    ingest_quotes,
};
