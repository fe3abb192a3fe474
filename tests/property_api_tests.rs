use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use pricechart_roi::core::{
    PlotBox, PricePoint, RangeKey, TradingCalendar, canonicalize_points, compute_nice_ticks,
    label_ticks_distinct, nearest_index, transform, x_from_ordinal, y_from_price,
};
use proptest::prelude::*;

fn last_weekdays(from: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut cursor = from;
    while dates.len() < count {
        if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(cursor);
        }
        cursor -= Duration::days(1);
    }
    dates.reverse();
    dates
}

proptest! {
    #[test]
    fn ordinal_positions_map_back_to_their_index(
        count in 2usize..200,
        width in 200.0f64..2_000.0,
        padding_left in 0.0f64..80.0,
        padding_right in 0.0f64..80.0
    ) {
        let plot_box =
            PlotBox::new(width, 400.0).with_padding(padding_left, padding_right, 10.0, 30.0);
        let domain = (0.0, (count - 1) as f64);
        let xs: Vec<f64> = (0..count)
            .map(|index| x_from_ordinal(index as f64, domain, plot_box))
            .collect();

        for (index, x) in xs.iter().enumerate() {
            prop_assert_eq!(nearest_index(*x, &xs), Some(index));
        }
        prop_assert!((xs[0] - plot_box.plot_left()).abs() <= 1e-9);
        prop_assert!((xs[count - 1] - plot_box.plot_right()).abs() <= 1e-9);
    }

    #[test]
    fn price_axis_labels_stay_distinct(
        min in -100_000.0f64..100_000.0,
        span in prop_oneof![1e-7f64..1e-5, 0.01f64..100_000.0],
        target in 3usize..9
    ) {
        let nice = compute_nice_ticks(min, min + span, target);
        prop_assert!(nice.ticks.len() >= 2);
        let labeled = label_ticks_distinct(&nice.ticks, nice.step);
        prop_assert!(!labeled.ticks.is_empty());
        prop_assert_eq!(labeled.ticks.len(), labeled.labels.len());
        let labels = &labeled.labels;
        for (index, label) in labels.iter().enumerate() {
            prop_assert!(!labels[..index].contains(label), "duplicate label {}", label);
        }
    }

    #[test]
    fn transform_ignores_input_order_and_duplicates(
        raw in prop::collection::vec((0i64..5_000, 1.0f64..1_000.0), 0..120)
    ) {
        let base = Utc
            .with_ymd_and_hms(2024, 1, 2, 15, 0, 0)
            .single()
            .expect("valid base")
            .timestamp_millis();
        let reference = Utc
            .with_ymd_and_hms(2024, 6, 12, 18, 0, 0)
            .single()
            .expect("valid reference");
        let points: Vec<PricePoint> = raw
            .iter()
            .map(|(offset, close)| PricePoint::new(base + offset * 3_600_000, *close))
            .collect();

        let canonical = canonicalize_points(&points);
        prop_assert_eq!(&canonicalize_points(&canonical), &canonical);
        prop_assert_eq!(
            transform(&points, RangeKey::OneYear, reference),
            transform(&canonical, RangeKey::OneYear, reference)
        );
    }

    #[test]
    fn five_day_series_is_dense_over_last_five_weekdays(
        days in 5u32..20,
        per_day in 3i64..9
    ) {
        let first = Utc
            .with_ymd_and_hms(2024, 6, 3, 14, 0, 0)
            .single()
            .expect("valid start");
        let mut points = Vec::new();
        for day in 0..days {
            for slot in 0..per_day {
                let at = first + Duration::days(i64::from(day)) + Duration::minutes(15 * slot);
                points.push(PricePoint::new(at.timestamp_millis(), 100.0 + f64::from(day)));
            }
        }
        let last_day = first + Duration::days(i64::from(days - 1));
        let reference = last_day + Duration::hours(6) + Duration::minutes(30);

        let series = transform(&points, RangeKey::FiveDays, reference);
        prop_assert_eq!(series.len(), 5 * per_day as usize);
        for (index, point) in series.points.iter().enumerate() {
            prop_assert_eq!(point.position, index as f64);
        }

        let calendar = TradingCalendar::default();
        let mut dates: Vec<NaiveDate> = series
            .points
            .iter()
            .filter_map(|point| point.original_timestamp)
            .filter_map(|timestamp| calendar.local_date_of(timestamp))
            .collect();
        dates.dedup();
        prop_assert_eq!(dates, last_weekdays(last_day.date_naive(), 5));
    }

    #[test]
    fn price_domain_ends_map_to_plot_edges(
        low in -10_000.0f64..10_000.0,
        span in 0.001f64..10_000.0,
        fraction in 0.0f64..1.0
    ) {
        let plot_box = PlotBox::new(640.0, 360.0).with_padding(40.0, 60.0, 12.0, 28.0);
        let domain = (low, low + span);
        prop_assert_eq!(y_from_price(low, domain, plot_box), plot_box.plot_bottom());
        let top = y_from_price(low + span, domain, plot_box);
        prop_assert!((top - plot_box.plot_top()).abs() <= 1e-5);

        let inside = y_from_price(low + span * fraction, domain, plot_box);
        prop_assert!(inside <= plot_box.plot_bottom() + 1e-9);
        prop_assert!(inside >= plot_box.plot_top() - 1e-5);
    }
}
