use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::calendar::ExchangeTimeZone;
use crate::core::types::XMode;
use crate::error::{ChartError, ChartResult};

/// Minimum tick count handed to any axis.
pub const MIN_TICK_COUNT: usize = 3;

/// Display range offered by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RangeKey {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "MAX")]
    Max,
}

impl RangeKey {
    pub const ALL: [RangeKey; 9] = [
        RangeKey::OneDay,
        RangeKey::FiveDays,
        RangeKey::OneMonth,
        RangeKey::ThreeMonths,
        RangeKey::SixMonths,
        RangeKey::YearToDate,
        RangeKey::OneYear,
        RangeKey::FiveYears,
        RangeKey::Max,
    ];

    /// Parses a range key; `1YR`/`5YR` are accepted as upstream aliases.
    pub fn parse(input: &str) -> ChartResult<Self> {
        match input.trim() {
            "1D" => Ok(Self::OneDay),
            "5D" => Ok(Self::FiveDays),
            "1M" => Ok(Self::OneMonth),
            "3M" => Ok(Self::ThreeMonths),
            "6M" => Ok(Self::SixMonths),
            "YTD" => Ok(Self::YearToDate),
            "1Y" | "1YR" => Ok(Self::OneYear),
            "5Y" | "5YR" => Ok(Self::FiveYears),
            "MAX" => Ok(Self::Max),
            other => Err(ChartError::UnknownRange(other.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.descriptor().label
    }

    #[must_use]
    pub fn descriptor(self) -> &'static RangeDescriptor {
        // Catalog order matches `RangeKey::ALL`.
        &RANGE_CATALOG[self as usize]
    }

    /// Ordinal positioning collapses weekend gaps for the 5-session range.
    #[must_use]
    pub fn x_mode(self) -> XMode {
        if self == Self::FiveDays {
            XMode::Ordinal
        } else {
            XMode::Timestamp
        }
    }
}

impl fmt::Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeKey {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Upstream sampling resolution requested for a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplingInterval {
    OneMinute,
    FifteenMinutes,
    OneDay,
    OneWeek,
    OneMonth,
}

impl SamplingInterval {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1min",
            Self::FifteenMinutes => "15min",
            Self::OneDay => "1day",
            Self::OneWeek => "1week",
            Self::OneMonth => "1month",
        }
    }

    /// Nominal duration; a month counts as 30 days.
    #[must_use]
    pub fn duration_ms(self) -> i64 {
        const MINUTE: i64 = 60 * 1_000;
        const DAY: i64 = 24 * 60 * MINUTE;
        match self {
            Self::OneMinute => MINUTE,
            Self::FifteenMinutes => 15 * MINUTE,
            Self::OneDay => DAY,
            Self::OneWeek => 7 * DAY,
            Self::OneMonth => 30 * DAY,
        }
    }
}

/// How far back a range reaches from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookback {
    Days(u32),
    YearToDate,
}

/// Static description of one display range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeDescriptor {
    pub key: RangeKey,
    pub label: &'static str,
    pub tick_count_target: usize,
    pub is_intraday: bool,
    pub sampling_interval: SamplingInterval,
    pub lookback: Lookback,
}

const fn descriptor(
    key: RangeKey,
    label: &'static str,
    tick_count_target: usize,
    is_intraday: bool,
    sampling_interval: SamplingInterval,
    lookback: Lookback,
) -> RangeDescriptor {
    RangeDescriptor {
        key,
        label,
        tick_count_target,
        is_intraday,
        sampling_interval,
        lookback,
    }
}

static RANGE_CATALOG: [RangeDescriptor; 9] = [
    descriptor(RangeKey::OneDay, "1D", 7, true, SamplingInterval::OneMinute, Lookback::Days(1)),
    descriptor(
        RangeKey::FiveDays,
        "5D",
        6,
        true,
        SamplingInterval::FifteenMinutes,
        Lookback::Days(14),
    ),
    descriptor(RangeKey::OneMonth, "1M", 8, false, SamplingInterval::OneDay, Lookback::Days(45)),
    descriptor(
        RangeKey::ThreeMonths,
        "3M",
        8,
        false,
        SamplingInterval::OneDay,
        Lookback::Days(110),
    ),
    descriptor(
        RangeKey::SixMonths,
        "6M",
        6,
        false,
        SamplingInterval::OneDay,
        Lookback::Days(220),
    ),
    descriptor(
        RangeKey::YearToDate,
        "YTD",
        6,
        false,
        SamplingInterval::OneDay,
        Lookback::YearToDate,
    ),
    descriptor(RangeKey::OneYear, "1Y", 6, false, SamplingInterval::OneDay, Lookback::Days(400)),
    descriptor(
        RangeKey::FiveYears,
        "5Y",
        6,
        false,
        SamplingInterval::OneWeek,
        Lookback::Days(5 * 365 + 30),
    ),
    descriptor(
        RangeKey::Max,
        "MAX",
        6,
        false,
        SamplingInterval::OneMonth,
        Lookback::Days(20 * 365),
    ),
];

/// Looks up a range by its textual key.
pub fn describe(range: &str) -> ChartResult<&'static RangeDescriptor> {
    RangeKey::parse(range).map(RangeKey::descriptor)
}

#[must_use]
pub fn data_interval_for(range: RangeKey) -> SamplingInterval {
    range.descriptor().sampling_interval
}

#[must_use]
pub fn is_intraday(range: RangeKey) -> bool {
    range.descriptor().is_intraday
}

#[must_use]
pub fn has_same_data_interval(left: RangeKey, right: RangeKey) -> bool {
    data_interval_for(left) == data_interval_for(right)
}

/// Tick count for a range, reduced on sparse data so labels do not overlap.
#[must_use]
pub fn optimal_tick_count(range: RangeKey, sample_count: usize) -> usize {
    let base = range.descriptor().tick_count_target;
    if sample_count < base * 2 {
        return (sample_count / 2).max(MIN_TICK_COUNT);
    }
    base
}

/// Fetch window `[start_ms, end_ms]` ending at `now`.
///
/// 1D starts at local midnight, YTD at local January 1st; other ranges
/// subtract their lookback.
#[must_use]
pub fn time_window(range: RangeKey, now: DateTime<Utc>, zone: ExchangeTimeZone) -> (i64, i64) {
    let end = now.timestamp_millis();
    let local_today = zone.local_date(now);
    let start = match range.descriptor().lookback {
        Lookback::YearToDate => NaiveDate::from_ymd_opt(local_today.year(), 1, 1)
            .map(|date| zone.local_midnight_utc_ms(date))
            .unwrap_or(end),
        Lookback::Days(_) if range == RangeKey::OneDay => zone.local_midnight_utc_ms(local_today),
        Lookback::Days(days) => (now - Duration::days(i64::from(days))).timestamp_millis(),
    };
    (start, end)
}
