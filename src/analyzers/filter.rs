//! Date/hour filtering and hour-ratio redistribution.
//!
//! The daily table has no hour column and the hour table has no date column.
//! To make the daily series respect an hour filter, each day is scaled by the
//! share of its weekday's trips that fall inside the selected hours.
//!
//! When the per-date, per-hour table is available none of this is needed:
//! its rows are filtered on both ranges directly.
//!
//! Day-of-week numbering is ISO 8601 throughout (Monday = 1 … Sunday = 7),
//! the same convention the upstream job uses when writing `day_of_week`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analyzers::utility::safe_div;
use crate::error::{DashboardError, Result};
use crate::tables::{DailyAggregate, DailyHourAggregate, HourDowAggregate};

/// Inclusive calendar date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DashboardError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidFilter(format!(
                "date range starts at {start} after it ends at {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Inclusive pickup-hour range within `0..=23`, never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHourRange")]
pub struct HourRange {
    min_hour: u8,
    max_hour: u8,
}

#[derive(Deserialize)]
struct RawHourRange {
    min_hour: u8,
    max_hour: u8,
}

impl TryFrom<RawHourRange> for HourRange {
    type Error = DashboardError;

    fn try_from(raw: RawHourRange) -> Result<Self> {
        HourRange::new(raw.min_hour, raw.max_hour)
    }
}

impl Default for HourRange {
    fn default() -> Self {
        Self::ALL_DAY
    }
}

impl HourRange {
    pub const ALL_DAY: HourRange = HourRange {
        min_hour: 0,
        max_hour: 23,
    };

    pub fn new(min_hour: u8, max_hour: u8) -> Result<Self> {
        if max_hour > 23 {
            return Err(DashboardError::InvalidFilter(format!(
                "hour {max_hour} is outside 0..=23"
            )));
        }
        if min_hour > max_hour {
            return Err(DashboardError::InvalidFilter(format!(
                "hour range {min_hour}..={max_hour} selects no hours"
            )));
        }
        Ok(Self { min_hour, max_hour })
    }

    pub fn min_hour(&self) -> u8 {
        self.min_hour
    }

    pub fn max_hour(&self) -> u8 {
        self.max_hour
    }

    pub fn contains(&self, hour: u8) -> bool {
        self.min_hour <= hour && hour <= self.max_hour
    }
}

/// ISO weekday number of `date`: Monday = 1 … Sunday = 7.
pub fn iso_day_of_week(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Per-weekday share of trips inside an hour range. Ephemeral: computed
/// once per filter change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatioByDow([f64; 7]);

impl RatioByDow {
    /// Ratio for ISO weekday `dow` (1..=7). Out-of-range days have ratio 0.
    pub fn get(&self, dow: u8) -> f64 {
        match dow {
            1..=7 => self.0[usize::from(dow - 1)],
            _ => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.0.iter().enumerate().map(|(i, r)| (i as u8 + 1, *r))
    }
}

/// Computes, for each weekday, `selected / total` trips where `selected`
/// counts only hours in `hours`. A weekday with no trips (or no rows at all)
/// gets 0; results are clamped to `[0, 1]` against inconsistent upstream data.
pub fn compute_ratio_by_dow(hour_dow: &[HourDowAggregate], hours: HourRange) -> RatioByDow {
    let mut total = [0.0; 7];
    let mut selected = [0.0; 7];

    for row in valid_rows(hour_dow) {
        let i = usize::from(row.day_of_week - 1);
        total[i] += row.trip_count;
        if hours.contains(row.hour) {
            selected[i] += row.trip_count;
        }
    }

    RatioByDow(std::array::from_fn(|i| {
        safe_div(selected[i], total[i]).clamp(0.0, 1.0)
    }))
}

/// Share of all trips that fall inside `hours`, ignoring the weekday.
///
/// Coarser than [`compute_ratio_by_dow`]. It is applied to tables with no
/// time dimension at all (the zone totals), where scaling every row by the
/// same factor changes magnitudes but never the ranking order.
pub fn global_hour_ratio(hour_dow: &[HourDowAggregate], hours: HourRange) -> f64 {
    let (selected, total) = valid_rows(hour_dow).fold((0.0, 0.0), |(sel, tot), row| {
        let sel = if hours.contains(row.hour) {
            sel + row.trip_count
        } else {
            sel
        };
        (sel, tot + row.trip_count)
    });
    safe_div(selected, total).clamp(0.0, 1.0)
}

/// Keeps the daily rows inside `dates` and scales each one by its weekday's
/// ratio. Rows outside the range are dropped, not zeroed.
pub fn filter_and_redistribute(
    daily: &[DailyAggregate],
    dates: DateRange,
    ratios: &RatioByDow,
) -> Vec<DailyAggregate> {
    daily
        .iter()
        .filter(|row| dates.contains(row.date))
        .map(|row| row.scaled(ratios.get(iso_day_of_week(row.date))))
        .collect()
}

/// How the daily figures were made to respect the hour filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyStrategy {
    /// Filtered from the per-date, per-hour table.
    Exact,
    /// Daily totals scaled by their weekday's hour ratio.
    Redistributed,
}

/// Keeps the daily-hour rows inside both ranges.
pub fn filter_daily_hours(
    rows: &[DailyHourAggregate],
    dates: DateRange,
    hours: HourRange,
) -> Vec<DailyHourAggregate> {
    rows.iter()
        .filter(|row| dates.contains(row.date) && hours.contains(row.hour))
        .cloned()
        .collect()
}

/// Sums daily-hour rows into one daily row per date, ascending by date.
pub fn collapse_to_days(rows: &[DailyHourAggregate]) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();
    for row in rows {
        days.entry(row.date)
            .and_modify(|day| {
                day.trip_count += row.trip_count;
                day.revenue_total += row.revenue_total;
                day.fare_sum += row.fare_sum;
                day.tip_sum += row.tip_sum;
                day.distance_sum += row.distance_sum;
            })
            .or_insert_with(|| row.to_daily());
    }
    days.into_values().collect()
}

fn valid_rows(hour_dow: &[HourDowAggregate]) -> impl Iterator<Item = &HourDowAggregate> {
    hour_dow.iter().filter(|row| {
        let ok = (1..=7).contains(&row.day_of_week) && row.hour <= 23;
        if !ok {
            warn!(
                day_of_week = row.day_of_week,
                hour = row.hour,
                "Ignoring hour/day-of-week row outside the ISO domain"
            );
        }
        ok
    })
}
