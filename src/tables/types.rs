//! Row types of the aggregate tables produced by the upstream batch job.
//!
//! Additive measures are `f64` because redistribution scales them by a ratio.

use chrono::NaiveDate;
use serde::Serialize;

use super::frame::{AggregateRow, Cells};
use crate::error::Result;

/// One row per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub trip_count: f64,
    pub revenue_total: f64,
    pub fare_sum: f64,
    pub tip_sum: f64,
    pub distance_sum: f64,
}

impl DailyAggregate {
    /// Returns a copy with every additive field multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            date: self.date,
            trip_count: self.trip_count * factor,
            revenue_total: self.revenue_total * factor,
            fare_sum: self.fare_sum * factor,
            tip_sum: self.tip_sum * factor,
            distance_sum: self.distance_sum * factor,
        }
    }
}

impl AggregateRow for DailyAggregate {
    const FIELDS: &'static [&'static str] = &[
        "date",
        "trip_count",
        "revenue_total",
        "fare_sum",
        "tip_sum",
        "distance_sum",
    ];

    fn from_cells(cells: &Cells<'_>) -> Result<Self> {
        Ok(Self {
            date: cells.date(0)?,
            trip_count: cells.number(1)?,
            revenue_total: cells.number(2)?,
            fare_sum: cells.number(3)?,
            tip_sum: cells.number(4)?,
            distance_sum: cells.number(5)?,
        })
    }
}

/// Per (date, pickup hour) totals. Optional; when present the daily figures
/// are filtered exactly instead of redistributed by weekday ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHourAggregate {
    pub date: NaiveDate,
    /// 0..=23
    pub hour: u8,
    pub trip_count: f64,
    pub revenue_total: f64,
    pub fare_sum: f64,
    pub tip_sum: f64,
    pub distance_sum: f64,
}

impl DailyHourAggregate {
    /// The same measures without the hour.
    pub fn to_daily(&self) -> DailyAggregate {
        DailyAggregate {
            date: self.date,
            trip_count: self.trip_count,
            revenue_total: self.revenue_total,
            fare_sum: self.fare_sum,
            tip_sum: self.tip_sum,
            distance_sum: self.distance_sum,
        }
    }
}

impl AggregateRow for DailyHourAggregate {
    const FIELDS: &'static [&'static str] = &[
        "date",
        "hour",
        "trip_count",
        "revenue_total",
        "fare_sum",
        "tip_sum",
        "distance_sum",
    ];

    fn from_cells(cells: &Cells<'_>) -> Result<Self> {
        Ok(Self {
            date: cells.date(0)?,
            hour: cells.small_int(1)?,
            trip_count: cells.number(2)?,
            revenue_total: cells.number(3)?,
            fare_sum: cells.number(4)?,
            tip_sum: cells.number(5)?,
            distance_sum: cells.number(6)?,
        })
    }
}

/// Trips per (ISO day of week, hour) pair, collapsed over the whole period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourDowAggregate {
    /// Monday = 1 … Sunday = 7.
    pub day_of_week: u8,
    /// 0..=23
    pub hour: u8,
    pub trip_count: f64,
}

impl AggregateRow for HourDowAggregate {
    const FIELDS: &'static [&'static str] = &["day_of_week", "hour", "trip_count"];

    fn from_cells(cells: &Cells<'_>) -> Result<Self> {
        Ok(Self {
            day_of_week: cells.small_int(0)?,
            hour: cells.small_int(1)?,
            trip_count: cells.number(2)?,
        })
    }
}

/// Per-zone totals with no time dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAggregate {
    pub borough: String,
    pub zone_name: String,
    pub trip_count: f64,
    pub revenue_total: f64,
}

impl AggregateRow for ZoneAggregate {
    const FIELDS: &'static [&'static str] = &["borough", "zone_name", "trip_count", "revenue_total"];

    fn from_cells(cells: &Cells<'_>) -> Result<Self> {
        Ok(Self {
            borough: cells.text(0),
            zone_name: cells.text(1),
            trip_count: cells.number(2)?,
            revenue_total: cells.number(3)?,
        })
    }
}

/// Per-zone totals split by pickup hour. Optional; enables exact zone ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneHourAggregate {
    pub borough: String,
    pub zone_name: String,
    pub hour: u8,
    pub trip_count: f64,
    pub revenue_total: f64,
}

impl AggregateRow for ZoneHourAggregate {
    const FIELDS: &'static [&'static str] =
        &["borough", "zone_name", "hour", "trip_count", "revenue_total"];

    fn from_cells(cells: &Cells<'_>) -> Result<Self> {
        Ok(Self {
            borough: cells.text(0),
            zone_name: cells.text(1),
            hour: cells.small_int(2)?,
            trip_count: cells.number(3)?,
            revenue_total: cells.number(4)?,
        })
    }
}

/// Trips per (date, hour, payment type). Optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentHourAggregate {
    pub date: NaiveDate,
    pub hour: u8,
    pub payment_type: String,
    pub trip_count: f64,
}

impl AggregateRow for PaymentHourAggregate {
    const FIELDS: &'static [&'static str] = &["date", "hour", "payment_type", "trip_count"];

    fn from_cells(cells: &Cells<'_>) -> Result<Self> {
        Ok(Self {
            date: cells.date(0)?,
            hour: cells.small_int(1)?,
            payment_type: cells.text(2),
            trip_count: cells.number(3)?,
        })
    }
}
