use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc,
    Weekday,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::primitives::millis_to_utc;
use crate::core::types::PricePoint;

/// Time zone the exchange's civil calendar is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExchangeTimeZone {
    Utc,
    FixedOffsetMinutes {
        minutes: i16,
    },
    /// America/New_York with the post-2007 US daylight-saving rules.
    #[default]
    UsEastern,
}

impl ExchangeTimeZone {
    /// UTC offset in effect at `instant`.
    #[must_use]
    pub fn offset_at(self, instant: DateTime<Utc>) -> FixedOffset {
        let minutes = match self {
            Self::Utc => 0,
            Self::FixedOffsetMinutes { minutes } => i32::from(minutes),
            Self::UsEastern => {
                if us_eastern_dst_active(instant) {
                    -4 * 60
                } else {
                    -5 * 60
                }
            }
        };
        FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    #[must_use]
    pub fn to_local(self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset_at(instant))
    }

    #[must_use]
    pub fn local_date(self, instant: DateTime<Utc>) -> NaiveDate {
        self.to_local(instant).date_naive()
    }

    /// Epoch milliseconds of local midnight starting `date`.
    #[must_use]
    pub fn local_midnight_utc_ms(self, date: NaiveDate) -> i64 {
        let naive_midnight = date.and_time(NaiveTime::MIN);
        // Offsets only change at 02:00 local, so the offset of the previous
        // evening's instant is already correct for midnight.
        let as_utc = naive_midnight.and_utc();
        let offset = self.offset_at(as_utc - Duration::hours(12));
        (naive_midnight - Duration::seconds(i64::from(offset.local_minus_utc())))
            .and_utc()
            .timestamp_millis()
    }
}

/// US daylight saving under the 2007 rules: second Sunday of March to first
/// Sunday of November, switching at 02:00 local.
///
/// Earlier years get the same rule, so pre-2007 instants near the old
/// April/October switch dates can be off by one hour.
fn us_eastern_dst_active(instant: DateTime<Utc>) -> bool {
    let year = instant.year();
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)
        .and_then(|date| date.and_hms_opt(7, 0, 0));
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)
        .and_then(|date| date.and_hms_opt(6, 0, 0));
    match (start, end) {
        (Some(start), Some(end)) => {
            let naive = instant.naive_utc();
            naive >= start && naive < end
        }
        _ => false,
    }
}

/// Regular trading session in exchange-local time, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionWindow {
    pub open_hour: u8,
    pub open_minute: u8,
    pub close_hour: u8,
    pub close_minute: u8,
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            open_hour: 9,
            open_minute: 30,
            close_hour: 16,
            close_minute: 0,
        }
    }
}

impl SessionWindow {
    #[must_use]
    pub fn open_minute_of_day(self) -> u16 {
        u16::from(self.open_hour) * 60 + u16::from(self.open_minute)
    }

    #[must_use]
    pub fn close_minute_of_day(self) -> u16 {
        u16::from(self.close_hour) * 60 + u16::from(self.close_minute)
    }

    #[must_use]
    pub fn contains_minute(self, minute_of_day: u16) -> bool {
        minute_of_day >= self.open_minute_of_day() && minute_of_day <= self.close_minute_of_day()
    }
}

/// Weekday/session calendar used to clean intraday series.
///
/// Exchange holidays and early closes are not modelled unless listed in
/// `holidays`; the default list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingCalendar {
    pub time_zone: ExchangeTimeZone,
    pub session: SessionWindow,
    pub holidays: Vec<NaiveDate>,
    /// Below this many retained points the session filter retries wider.
    pub min_filtered_points: usize,
    /// Minimum number of most-recent raw points considered on retry.
    pub widened_window: usize,
}

impl Default for TradingCalendar {
    fn default() -> Self {
        Self {
            time_zone: ExchangeTimeZone::default(),
            session: SessionWindow::default(),
            holidays: Vec::new(),
            min_filtered_points: 10,
            widened_window: 50,
        }
    }
}

impl TradingCalendar {
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: ExchangeTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    #[must_use]
    pub fn with_holidays(mut self, holidays: Vec<NaiveDate>) -> Self {
        self.holidays = holidays;
        self
    }

    #[must_use]
    pub fn local_date_of(&self, timestamp_ms: i64) -> Option<NaiveDate> {
        millis_to_utc(timestamp_ms).map(|instant| self.time_zone.local_date(instant))
    }

    #[must_use]
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    /// True iff the instant falls on a trading day inside the regular session.
    #[must_use]
    pub fn is_within_session(&self, timestamp_ms: i64) -> bool {
        let Some(instant) = millis_to_utc(timestamp_ms) else {
            return false;
        };
        let local = self.time_zone.to_local(instant);
        if !self.is_trading_day(local.date_naive()) {
            return false;
        }
        let minute_of_day = (local.hour() * 60 + local.minute()) as u16;
        self.session.contains_minute(minute_of_day)
    }

    /// Most recent `n` trading dates up to and including `from`, ascending.
    #[must_use]
    pub fn select_last_n_sessions(&self, from: NaiveDate, n: usize) -> IndexSet<NaiveDate> {
        let mut collected = Vec::new();
        let max_steps = n.saturating_mul(7) + self.holidays.len() + 7;
        let mut cursor = Some(from);
        for _ in 0..max_steps {
            if collected.len() >= n {
                break;
            }
            let Some(date) = cursor else {
                break;
            };
            if self.is_trading_day(date) {
                collected.push(date);
            }
            cursor = date.pred_opt();
        }
        collected.reverse();
        collected.into_iter().collect()
    }

    /// Keeps points whose local date is one of `sessions`, ascending by time.
    ///
    /// When fewer than `min_filtered_points` survive, the filter retries once
    /// over the most recent raw points with the same session dates. The retry
    /// result is used only if it retains more points, and never holds a date
    /// outside `sessions`.
    #[must_use]
    pub fn filter_to_sessions(
        &self,
        points: &[PricePoint],
        sessions: &IndexSet<NaiveDate>,
    ) -> Vec<PricePoint> {
        let mut filtered: Vec<PricePoint> = points
            .iter()
            .copied()
            .filter(|point| {
                self.local_date_of(point.timestamp_ms)
                    .is_some_and(|date| sessions.contains(&date))
            })
            .collect();

        if filtered.len() < self.min_filtered_points && !points.is_empty() {
            let window = self.widened_window.max(filtered.len() + 20);
            let mut recent: Vec<PricePoint> = points.to_vec();
            recent.sort_by(|left, right| right.timestamp_ms.cmp(&left.timestamp_ms));
            recent.truncate(window);
            let widened: Vec<PricePoint> = recent
                .into_iter()
                .filter(|point| {
                    self.local_date_of(point.timestamp_ms)
                        .is_some_and(|date| sessions.contains(&date))
                })
                .collect();

            if widened.len() > filtered.len() {
                warn!(
                    session_count = sessions.len(),
                    strict_count = filtered.len(),
                    widened_count = widened.len(),
                    "session filter widened to most recent points"
                );
                filtered = widened;
            } else {
                debug!(
                    strict_count = filtered.len(),
                    "session filter retry found no additional points"
                );
            }
        }

        filtered.sort_by_key(|point| point.timestamp_ms);
        filtered
    }

    /// Keeps points inside the regular session window.
    #[must_use]
    pub fn filter_regular_session(&self, points: &[PricePoint]) -> Vec<PricePoint> {
        points
            .iter()
            .copied()
            .filter(|point| self.is_within_session(point.timestamp_ms))
            .collect()
    }
}
