//! Aggregate tables: row types, decoding, and the memoizing loader.

pub mod decode;
pub mod frame;
pub mod loader;
pub mod types;

use chrono::NaiveDate;

pub use loader::TableLoader;
pub use types::{
    DailyAggregate, DailyHourAggregate, HourDowAggregate, PaymentHourAggregate, ZoneAggregate,
    ZoneHourAggregate,
};

/// The unfiltered inputs of one dashboard render.
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub daily: Vec<DailyAggregate>,
    pub hour_dow: Vec<HourDowAggregate>,
    pub zones: Vec<ZoneAggregate>,
    /// When present, KPIs, the daily series and the heatmap are exact.
    pub daily_hours: Option<Vec<DailyHourAggregate>>,
    /// When present, zone rankings are exact instead of ratio-scaled.
    pub zone_hours: Option<Vec<ZoneHourAggregate>>,
    pub payments: Option<Vec<PaymentHourAggregate>>,
}

impl SourceTables {
    /// First and last date of the daily table, or `None` when it is empty.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.daily.iter().map(|r| r.date).min()?;
        let last = self.daily.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str) -> DailyAggregate {
        DailyAggregate {
            date: date.parse().unwrap(),
            trip_count: 1.0,
            revenue_total: 0.0,
            fare_sum: 0.0,
            tip_sum: 0.0,
            distance_sum: 0.0,
        }
    }

    #[test]
    fn test_date_span() {
        let tables = SourceTables {
            daily: vec![day("2025-07-31"), day("2025-06-01"), day("2025-06-15")],
            ..Default::default()
        };
        assert_eq!(
            tables.date_span(),
            Some(("2025-06-01".parse().unwrap(), "2025-07-31".parse().unwrap()))
        );
        assert_eq!(SourceTables::default().date_span(), None);
    }
}
