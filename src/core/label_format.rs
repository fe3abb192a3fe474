use chrono::{DateTime, Datelike, Utc};

use crate::core::calendar::ExchangeTimeZone;
use crate::core::primitives::millis_to_utc;
use crate::core::range::RangeKey;

const TIME_OF_DAY: &str = "%-I:%M %p";
const MONTH_DAY: &str = "%b %-d";
const MONTH_DAY_TIME: &str = "%b %-d, %-I:%M %p";
const MONTH_DAY_YEAR: &str = "%b %-d, %Y";

/// Label pattern selected for one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLabelPattern {
    TimeOfDay,
    MonthDayTime,
    MonthDay,
    MonthDayYear,
}

impl TimeLabelPattern {
    fn format_str(self) -> &'static str {
        match self {
            Self::TimeOfDay => TIME_OF_DAY,
            Self::MonthDayTime => MONTH_DAY_TIME,
            Self::MonthDay => MONTH_DAY,
            Self::MonthDayYear => MONTH_DAY_YEAR,
        }
    }
}

/// Resolves the per-point label pattern.
///
/// Monthly to year-to-date ranges only append the year when the point's
/// local year differs from the reference instant's local year.
#[must_use]
pub fn resolve_time_label_pattern(
    range: RangeKey,
    point_year: i32,
    reference_year: i32,
) -> TimeLabelPattern {
    match range {
        RangeKey::OneDay => TimeLabelPattern::TimeOfDay,
        RangeKey::FiveDays => TimeLabelPattern::MonthDayTime,
        RangeKey::OneMonth | RangeKey::ThreeMonths | RangeKey::SixMonths | RangeKey::YearToDate => {
            if point_year == reference_year {
                TimeLabelPattern::MonthDay
            } else {
                TimeLabelPattern::MonthDayYear
            }
        }
        RangeKey::OneYear | RangeKey::FiveYears | RangeKey::Max => TimeLabelPattern::MonthDayYear,
    }
}

/// Formats the point label for `range` in exchange-local time.
#[must_use]
pub fn format_time_label(
    timestamp_ms: i64,
    range: RangeKey,
    reference: DateTime<Utc>,
    zone: ExchangeTimeZone,
) -> String {
    let Some(instant) = millis_to_utc(timestamp_ms) else {
        return String::new();
    };
    let local = zone.to_local(instant);
    let reference_year = zone.to_local(reference).year();
    let pattern = resolve_time_label_pattern(range, local.year(), reference_year);
    local.format(pattern.format_str()).to_string()
}

/// Tooltip label: time of day for intraday ranges, full date otherwise.
#[must_use]
pub fn format_tooltip_label(timestamp_ms: i64, range: RangeKey, zone: ExchangeTimeZone) -> String {
    let Some(instant) = millis_to_utc(timestamp_ms) else {
        return String::new();
    };
    let pattern = if range.descriptor().is_intraday {
        TimeLabelPattern::TimeOfDay
    } else {
        TimeLabelPattern::MonthDayYear
    };
    zone.to_local(instant).format(pattern.format_str()).to_string()
}

/// Axis tick label; the 5-session axis shows dates only.
#[must_use]
pub fn format_axis_label(
    timestamp_ms: i64,
    range: RangeKey,
    reference: DateTime<Utc>,
    zone: ExchangeTimeZone,
) -> String {
    if range != RangeKey::FiveDays {
        return format_time_label(timestamp_ms, range, reference, zone);
    }
    let Some(instant) = millis_to_utc(timestamp_ms) else {
        return String::new();
    };
    zone.to_local(instant).format(MONTH_DAY).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{format_time_label, format_tooltip_label};
    use crate::core::calendar::ExchangeTimeZone;
    use crate::core::range::RangeKey;

    fn ms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .expect("valid time")
            .timestamp_millis()
    }

    #[test]
    fn monthly_labels_append_year_only_for_other_years() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid");
        let zone = ExchangeTimeZone::Utc;
        assert_eq!(
            format_time_label(ms(2024, 3, 4, 15, 0), RangeKey::ThreeMonths, reference, zone),
            "Mar 4"
        );
        assert_eq!(
            format_time_label(ms(2023, 12, 29, 15, 0), RangeKey::SixMonths, reference, zone),
            "Dec 29, 2023"
        );
        assert_eq!(
            format_time_label(ms(2024, 3, 4, 15, 0), RangeKey::OneYear, reference, zone),
            "Mar 4, 2024"
        );
    }

    #[test]
    fn intraday_labels_use_exchange_local_clock() {
        let reference = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid");
        let zone = ExchangeTimeZone::UsEastern;
        // 13:30 UTC is 09:30 EDT.
        assert_eq!(
            format_time_label(ms(2024, 6, 3, 13, 30), RangeKey::OneDay, reference, zone),
            "9:30 AM"
        );
        assert_eq!(
            format_time_label(ms(2024, 6, 3, 20, 0), RangeKey::FiveDays, reference, zone),
            "Jun 3, 4:00 PM"
        );
        assert_eq!(
            format_tooltip_label(ms(2024, 6, 3, 20, 0), RangeKey::OneMonth, zone),
            "Jun 3, 2024"
        );
    }
}
