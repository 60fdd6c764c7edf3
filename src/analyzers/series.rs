//! Chart series: trips per day, the hour × weekday heatmap, and trips per
//! payment type per day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::filter::{DateRange, HourRange, iso_day_of_week};
use crate::tables::{DailyAggregate, DailyHourAggregate, HourDowAggregate, PaymentHourAggregate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub trips: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub hour: u8,
    pub day_of_week: u8,
    pub trips: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentPoint {
    pub date: NaiveDate,
    pub payment_type: String,
    pub trips: f64,
}

/// One point per date, ascending. Expects rows already filtered and
/// redistributed.
pub fn daily_series(rows: &[DailyAggregate]) -> Vec<DailyPoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        *by_date.entry(row.date).or_default() += row.trip_count;
    }

    by_date
        .into_iter()
        .map(|(date, trips)| DailyPoint { date, trips })
        .collect()
}

/// Trips per (weekday, hour) inside `hours`, ordered by weekday then hour.
pub fn hour_dow_heatmap(hour_dow: &[HourDowAggregate], hours: HourRange) -> Vec<HeatmapCell> {
    let mut cells: BTreeMap<(u8, u8), f64> = BTreeMap::new();
    for row in hour_dow {
        if (1..=7).contains(&row.day_of_week) && hours.contains(row.hour) {
            *cells.entry((row.day_of_week, row.hour)).or_default() += row.trip_count;
        }
    }

    cells
        .into_iter()
        .map(|((day_of_week, hour), trips)| HeatmapCell {
            hour,
            day_of_week,
            trips,
        })
        .collect()
}

/// Heatmap from already filtered daily-hour rows, so it follows the date
/// range as well as the hour range. Same ordering as [`hour_dow_heatmap`].
pub fn daily_hour_heatmap(rows: &[DailyHourAggregate]) -> Vec<HeatmapCell> {
    let mut cells: BTreeMap<(u8, u8), f64> = BTreeMap::new();
    for row in rows {
        *cells
            .entry((iso_day_of_week(row.date), row.hour))
            .or_default() += row.trip_count;
    }

    cells
        .into_iter()
        .map(|((day_of_week, hour), trips)| HeatmapCell {
            hour,
            day_of_week,
            trips,
        })
        .collect()
}

/// Trips per (date, payment type) inside both ranges, ordered by date then
/// payment type.
pub fn payment_series(
    payments: &[PaymentHourAggregate],
    dates: DateRange,
    hours: HourRange,
) -> Vec<PaymentPoint> {
    let mut grouped: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    for row in payments {
        if dates.contains(row.date) && hours.contains(row.hour) {
            *grouped.entry((row.date, row.payment_type.as_str())).or_default() += row.trip_count;
        }
    }

    grouped
        .into_iter()
        .map(|((date, payment_type), trips)| PaymentPoint {
            date,
            payment_type: payment_type.to_string(),
            trips,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn payment(d: &str, hour: u8, payment_type: &str, trips: f64) -> PaymentHourAggregate {
        PaymentHourAggregate {
            date: date(d),
            hour,
            payment_type: payment_type.to_string(),
            trip_count: trips,
        }
    }

    #[test]
    fn test_daily_series_sums_and_sorts() {
        let row = |d: &str, trips: f64| DailyAggregate {
            date: date(d),
            trip_count: trips,
            revenue_total: 0.0,
            fare_sum: 0.0,
            tip_sum: 0.0,
            distance_sum: 0.0,
        };
        let series = daily_series(&[
            row("2025-06-03", 5.0),
            row("2025-06-02", 2.0),
            row("2025-06-03", 1.5),
        ]);
        assert_eq!(
            series,
            vec![
                DailyPoint {
                    date: date("2025-06-02"),
                    trips: 2.0
                },
                DailyPoint {
                    date: date("2025-06-03"),
                    trips: 6.5
                },
            ]
        );
    }

    #[test]
    fn test_heatmap_respects_hour_range() {
        let hd = |day_of_week: u8, hour: u8, trip_count: f64| HourDowAggregate {
            day_of_week,
            hour,
            trip_count,
        };
        let cells = hour_dow_heatmap(
            &[hd(2, 9, 4.0), hd(1, 8, 100.0), hd(1, 20, 50.0), hd(1, 8, 1.0)],
            HourRange::new(6, 12).unwrap(),
        );
        assert_eq!(
            cells,
            vec![
                HeatmapCell {
                    hour: 8,
                    day_of_week: 1,
                    trips: 101.0
                },
                HeatmapCell {
                    hour: 9,
                    day_of_week: 2,
                    trips: 4.0
                },
            ]
        );
    }

    #[test]
    fn test_daily_hour_heatmap_uses_iso_weekday_of_date() {
        let dh = |d: &str, hour: u8, trips: f64| DailyHourAggregate {
            date: date(d),
            hour,
            trip_count: trips,
            revenue_total: 0.0,
            fare_sum: 0.0,
            tip_sum: 0.0,
            distance_sum: 0.0,
        };
        // 2025-06-03 and 2025-06-10 are both Tuesdays.
        let cells = daily_hour_heatmap(&[
            dh("2025-06-10", 9, 10.0),
            dh("2025-06-02", 8, 200.0),
            dh("2025-06-03", 9, 50.0),
        ]);
        assert_eq!(
            cells,
            vec![
                HeatmapCell {
                    hour: 8,
                    day_of_week: 1,
                    trips: 200.0
                },
                HeatmapCell {
                    hour: 9,
                    day_of_week: 2,
                    trips: 60.0
                },
            ]
        );
    }

    #[test]
    fn test_payment_series_filters_both_ranges() {
        let payments = vec![
            payment("2025-06-02", 8, "credit_card", 10.0),
            payment("2025-06-02", 9, "credit_card", 5.0),
            payment("2025-06-02", 8, "cash", 3.0),
            payment("2025-06-02", 23, "cash", 100.0),
            payment("2025-07-01", 8, "cash", 100.0),
        ];
        let dates = DateRange::new(date("2025-06-01"), date("2025-06-30")).unwrap();
        let series = payment_series(&payments, dates, HourRange::new(6, 12).unwrap());

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].payment_type, "cash");
        assert_eq!(series[0].trips, 3.0);
        assert_eq!(series[1].payment_type, "credit_card");
        assert_eq!(series[1].trips, 15.0);
    }
}
