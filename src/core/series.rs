use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::calendar::TradingCalendar;
use crate::core::coords::{delta_and_percent, nearest_index};
use crate::core::label_format::{format_axis_label, format_time_label, format_tooltip_label};
use crate::core::range::{RangeKey, optimal_tick_count};
use crate::core::ticks::{
    compute_nice_ticks, flat_buffer, format_flat_label, label_ticks_distinct, labels_are_distinct,
};
use crate::core::types::{AxisSpec, DisplayPoint, DisplaySeries, PricePoint, XMode};

/// Minimum price move that counts as a new live quote.
pub const LIVE_PRICE_EPSILON: f64 = 0.001;

/// Tunables for [`SeriesTransformer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Number of trading sessions kept by the 5-session range.
    pub session_count: usize,
    /// Drop intraday samples outside the regular session window.
    pub regular_session_only: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            session_count: 5,
            regular_session_only: false,
        }
    }
}

/// Turns raw price points into a [`DisplaySeries`] for one range.
///
/// The transformer holds configuration only; identical inputs always yield
/// identical output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesTransformer {
    calendar: TradingCalendar,
    options: TransformOptions,
}

impl SeriesTransformer {
    #[must_use]
    pub fn new(calendar: TradingCalendar) -> Self {
        Self {
            calendar,
            options: TransformOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    #[must_use]
    pub fn options(&self) -> TransformOptions {
        self.options
    }

    #[must_use]
    pub fn transform(
        &self,
        points: &[PricePoint],
        range: RangeKey,
        reference: DateTime<Utc>,
    ) -> DisplaySeries {
        self.transform_with_live_price(points, None, range, reference)
    }

    /// Same as [`Self::transform`], folding in a live quote taken at `reference`.
    #[must_use]
    pub fn transform_with_live_price(
        &self,
        points: &[PricePoint],
        live_price: Option<f64>,
        range: RangeKey,
        reference: DateTime<Utc>,
    ) -> DisplaySeries {
        let mut retained = canonicalize_points(points);

        if self.options.regular_session_only && range.descriptor().is_intraday {
            let before = retained.len();
            retained = self.calendar.filter_regular_session(&retained);
            trace!(before, after = retained.len(), "regular-session filter");
        }

        if range.x_mode() == XMode::Ordinal {
            let today = self.calendar.time_zone.local_date(reference);
            let sessions = self
                .calendar
                .select_last_n_sessions(today, self.options.session_count);
            retained = self.calendar.filter_to_sessions(&retained, &sessions);
            debug!(
                range = %range,
                sessions = sessions.len(),
                retained = retained.len(),
                "filtered series to recent sessions"
            );
        }

        if let Some(live) = live_price {
            apply_live_price(&mut retained, live, reference.timestamp_millis());
        }

        if retained.is_empty() {
            return DisplaySeries::empty(range);
        }

        self.build_series(&retained, range, reference)
    }

    fn build_series(
        &self,
        retained: &[PricePoint],
        range: RangeKey,
        reference: DateTime<Utc>,
    ) -> DisplaySeries {
        let descriptor = range.descriptor();
        let x_mode = range.x_mode();
        let zone = self.calendar.time_zone;

        let points: Vec<DisplayPoint> = retained
            .iter()
            .enumerate()
            .map(|(index, point)| DisplayPoint {
                position: match x_mode {
                    XMode::Ordinal => index as f64,
                    XMode::Timestamp => point.timestamp_ms as f64,
                },
                value: point.close,
                time_label: format_time_label(point.timestamp_ms, range, reference, zone),
                tooltip_label: format_tooltip_label(point.timestamp_ms, range, zone),
                original_timestamp: Some(point.timestamp_ms),
            })
            .collect();

        let (y_axis, tick_step) = build_y_axis(retained, range);
        let x_axis = build_x_axis(retained, &points, range, reference, &self.calendar);
        let session_boundaries = match x_mode {
            XMode::Ordinal => session_boundaries(retained, &self.calendar),
            XMode::Timestamp => Vec::new(),
        };

        DisplaySeries {
            range,
            x_mode,
            is_intraday: descriptor.is_intraday,
            sampling_interval: descriptor.sampling_interval,
            points,
            x_axis,
            y_axis,
            tick_step,
            session_boundaries,
        }
    }
}

/// Transforms with the default trading calendar.
#[must_use]
pub fn transform(
    points: &[PricePoint],
    range: RangeKey,
    reference: DateTime<Utc>,
) -> DisplaySeries {
    SeriesTransformer::default().transform(points, range, reference)
}

/// Drops non-finite closes, sorts by time and keeps the last sample per timestamp.
#[must_use]
pub fn canonicalize_points(points: &[PricePoint]) -> Vec<PricePoint> {
    let mut finite: Vec<PricePoint> = points.iter().copied().filter(|p| p.is_finite()).collect();
    let dropped_count = points.len() - finite.len();
    finite.sort_by_key(|point| point.timestamp_ms);

    let mut deduped: Vec<PricePoint> = Vec::with_capacity(finite.len());
    let mut duplicate_count = 0_usize;
    for point in finite {
        if let Some(last) = deduped.last_mut() {
            if last.timestamp_ms == point.timestamp_ms {
                *last = point;
                duplicate_count += 1;
                continue;
            }
        }
        deduped.push(point);
    }

    if dropped_count > 0 || duplicate_count > 0 {
        warn!(
            dropped_count,
            duplicate_count,
            canonical_count = deduped.len(),
            "canonicalized price points"
        );
    }
    deduped
}

fn apply_live_price(retained: &mut Vec<PricePoint>, live: f64, reference_ms: i64) {
    if !live.is_finite() {
        return;
    }
    let Some(last) = retained.last_mut() else {
        return;
    };
    if (last.close - live).abs() <= LIVE_PRICE_EPSILON {
        return;
    }
    if reference_ms > last.timestamp_ms {
        retained.push(PricePoint::new(reference_ms, live));
    } else {
        last.close = live;
    }
    trace!(live, "applied live price");
}

fn build_y_axis(retained: &[PricePoint], range: RangeKey) -> (AxisSpec, f64) {
    let min = retained
        .iter()
        .map(|point| OrderedFloat(point.close))
        .min()
        .map_or(0.0, |value| value.0);
    let max = retained
        .iter()
        .map(|point| OrderedFloat(point.close))
        .max()
        .map_or(0.0, |value| value.0);

    if min == max {
        let buffer = flat_buffer(min);
        let axis = AxisSpec {
            domain: (min - buffer, max + buffer),
            ticks: vec![min],
            tick_labels: vec![format_flat_label(min)],
        };
        return (axis, buffer / 2.0);
    }

    let target = optimal_tick_count(range, retained.len());
    let nice = compute_nice_ticks(min, max, target);
    let labeled = label_ticks_distinct(&nice.ticks, nice.step);
    let axis = AxisSpec {
        domain: nice.domain,
        ticks: labeled.ticks,
        tick_labels: labeled.labels,
    };
    (axis, labeled.step)
}

/// Evenly spaced position ticks, thinned until their labels are distinct.
fn build_x_axis(
    retained: &[PricePoint],
    points: &[DisplayPoint],
    range: RangeKey,
    reference: DateTime<Utc>,
    calendar: &TradingCalendar,
) -> AxisSpec {
    let positions: Vec<f64> = points.iter().map(|point| point.position).collect();
    let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
        return AxisSpec::zeroed();
    };
    let label_at = |index: usize| {
        format_axis_label(
            retained[index].timestamp_ms,
            range,
            reference,
            calendar.time_zone,
        )
    };

    if positions.len() > 1 && last > first {
        let mut count = optimal_tick_count(range, positions.len()).min(positions.len());
        while count >= 2 {
            let step = (last - first) / (count - 1) as f64;
            let ticks: Vec<f64> = (0..count).map(|i| first + step * i as f64).collect();
            let tick_labels: Vec<String> = ticks
                .iter()
                .map(|tick| nearest_index(*tick, &positions).map_or_else(String::new, label_at))
                .collect();
            if labels_are_distinct(&tick_labels) {
                return AxisSpec {
                    domain: (first, last),
                    ticks,
                    tick_labels,
                };
            }
            count -= 1;
        }
    }

    AxisSpec {
        domain: (first, last),
        ticks: vec![first],
        tick_labels: vec![label_at(0)],
    }
}

fn session_boundaries(retained: &[PricePoint], calendar: &TradingCalendar) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut previous = None;
    for (index, point) in retained.iter().enumerate() {
        let date = calendar.local_date_of(point.timestamp_ms);
        if date != previous {
            boundaries.push(index);
            previous = date;
        }
    }
    boundaries
}

/// Change across a range, preferring a live quote for the latest price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeStats {
    pub old_price: Option<f64>,
    pub new_price: Option<f64>,
    pub abs: Option<f64>,
    pub pct: Option<f64>,
}

#[must_use]
pub fn range_change(series: &DisplaySeries, live_price: Option<f64>) -> RangeStats {
    let old_price = series.points.first().map(|point| point.value);
    let new_price = live_price
        .filter(|price| price.is_finite())
        .or_else(|| series.points.last().map(|point| point.value));

    match (old_price, new_price) {
        (Some(old), Some(new)) => {
            let change = delta_and_percent(old, new);
            RangeStats {
                old_price,
                new_price,
                abs: Some(change.delta),
                pct: Some(change.pct),
            }
        }
        _ => RangeStats {
            old_price,
            new_price,
            abs: None,
            pct: None,
        },
    }
}
