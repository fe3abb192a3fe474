use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::decimal_to_f64;
use crate::core::range::{RangeKey, SamplingInterval};
use crate::error::{ChartError, ChartResult};

/// Raw close sample delivered by a market-data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Milliseconds since the unix epoch.
    pub timestamp_ms: i64,
    pub close: f64,
}

impl PricePoint {
    #[must_use]
    pub fn new(timestamp_ms: i64, close: f64) -> Self {
        Self {
            timestamp_ms,
            close,
        }
    }

    pub fn from_decimal_time(time: DateTime<Utc>, close: Decimal) -> ChartResult<Self> {
        Ok(Self {
            timestamp_ms: time.timestamp_millis(),
            close: decimal_to_f64(close, "close")?,
        })
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.close.is_finite()
    }
}

/// Time value as delivered upstream, classified once at ingestion.
///
/// Intraday providers send instants, daily providers send civil dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TimeValue {
    Instant { millis: i64 },
    CivilDate { year: i32, month: u32, day: u32 },
}

impl TimeValue {
    /// Resolves to epoch milliseconds; civil dates map to UTC midnight.
    pub fn to_timestamp_ms(self) -> ChartResult<i64> {
        match self {
            Self::Instant { millis } => Ok(millis),
            Self::CivilDate { year, month, day } => NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc().timestamp_millis())
                .ok_or_else(|| {
                    ChartError::InvalidData(format!(
                        "civil date {year:04}-{month:02}-{day:02} is not a valid date"
                    ))
                }),
        }
    }
}

/// Upstream quote before ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub time: TimeValue,
    pub close: f64,
}

/// Converts tagged upstream quotes into price points.
///
/// Invalid civil dates are reported instead of silently dropped; non-finite
/// closes pass through and are filtered by the series transformer.
pub fn ingest_quotes(quotes: &[RawQuote]) -> ChartResult<Vec<PricePoint>> {
    quotes
        .iter()
        .map(|quote| {
            Ok(PricePoint::new(
                quote.time.to_timestamp_ms()?,
                quote.close,
            ))
        })
        .collect()
}

/// How display positions relate to time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XMode {
    /// Position is the epoch-millisecond timestamp.
    Timestamp,
    /// Position is a dense `0..N-1` index; calendar gaps are collapsed.
    Ordinal,
}

/// Axis-aligned rectangle in container pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }
}

/// Drawable rectangle of the chart host inside its container.
///
/// `width`/`height` are the container size; paddings separate the container
/// edges from the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBox {
    pub width: f64,
    pub height: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
}

impl Default for PlotBox {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl PlotBox {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding_left: 0.0,
            padding_right: 0.0,
            padding_top: 0.0,
            padding_bottom: 0.0,
        }
    }

    #[must_use]
    pub const fn with_padding(mut self, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        self.padding_left = left;
        self.padding_right = right;
        self.padding_top = top;
        self.padding_bottom = bottom;
        self
    }

    /// Derives a plot box from measured container and plot-area rectangles.
    pub fn from_rects(container: Rect, plot_area: Rect) -> ChartResult<Self> {
        let plot_box = Self {
            width: container.width,
            height: container.height,
            padding_left: plot_area.left - container.left,
            padding_right: container.right() - plot_area.right(),
            padding_top: plot_area.top - container.top,
            padding_bottom: container.bottom() - plot_area.bottom(),
        };
        plot_box.validate()?;
        Ok(plot_box)
    }

    pub fn validate(self) -> ChartResult<()> {
        let values = [
            self.width,
            self.height,
            self.padding_left,
            self.padding_right,
            self.padding_top,
            self.padding_bottom,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ChartError::InvalidData(
                "plot box values must be finite".to_owned(),
            ));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ChartError::InvalidPlotBox {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// True when the box can host an overlay.
    #[must_use]
    pub fn is_drawable(self) -> bool {
        self.validate().is_ok() && self.width > 0.0 && self.height > 0.0
    }

    #[must_use]
    pub fn plot_left(self) -> f64 {
        self.padding_left
    }

    #[must_use]
    pub fn plot_right(self) -> f64 {
        self.width - self.padding_right
    }

    #[must_use]
    pub fn plot_top(self) -> f64 {
        self.padding_top
    }

    #[must_use]
    pub fn plot_bottom(self) -> f64 {
        self.height - self.padding_bottom
    }

    /// Inclusive hit-test against the plot area.
    #[must_use]
    pub fn plot_contains(self, x: f64, y: f64) -> bool {
        x >= self.plot_left()
            && x <= self.plot_right()
            && y >= self.plot_top()
            && y <= self.plot_bottom()
    }

    /// Inclusive hit-test against the whole container.
    #[must_use]
    pub fn container_contains(self, x: f64, y: f64) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }
}

/// One screen-ready sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    /// Timestamp in ms or ordinal index, depending on [`XMode`].
    pub position: f64,
    pub value: f64,
    pub time_label: String,
    pub tooltip_label: String,
    pub original_timestamp: Option<i64>,
}

/// Domain, tick values and their labels for one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub domain: (f64, f64),
    pub ticks: Vec<f64>,
    pub tick_labels: Vec<String>,
}

impl AxisSpec {
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            domain: (0.0, 0.0),
            ticks: Vec::new(),
            tick_labels: Vec::new(),
        }
    }
}

/// Display-ready series handed to the chart host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySeries {
    pub range: RangeKey,
    pub x_mode: XMode,
    pub is_intraday: bool,
    pub sampling_interval: SamplingInterval,
    pub points: Vec<DisplayPoint>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    /// Step used for Y ticks; zero for an empty series.
    pub tick_step: f64,
    /// First ordinal index of each session date (ordinal mode only).
    pub session_boundaries: Vec<usize>,
}

impl DisplaySeries {
    /// Well-defined "no data" series.
    #[must_use]
    pub fn empty(range: RangeKey) -> Self {
        let descriptor = range.descriptor();
        Self {
            range,
            x_mode: range.x_mode(),
            is_intraday: descriptor.is_intraday,
            sampling_interval: descriptor.sampling_interval,
            points: Vec::new(),
            x_axis: AxisSpec::zeroed(),
            y_axis: AxisSpec::zeroed(),
            tick_step: 0.0,
            session_boundaries: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn timestamp_at(&self, index: usize) -> Option<i64> {
        let point = self.points.get(index)?;
        match self.x_mode {
            XMode::Ordinal => point.original_timestamp,
            XMode::Timestamp => point
                .original_timestamp
                .or(Some(point.position as i64)),
        }
    }
}
