use serde::Serialize;

use crate::analyzers::utility::{safe_div, sum_by};
use crate::tables::DailyAggregate;

/// Headline numbers for the filtered period.
///
/// Averages are weighted by the underlying sums (Σ fare / Σ trips), never
/// averages of daily averages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KpiSummary {
    /// Real-valued: redistributed trip counts are products of a ratio.
    pub trips: f64,
    pub revenue: f64,
    pub avg_fare: f64,
    /// Tips as a fraction of fares (0.18 = 18%).
    pub avg_tip_pct: f64,
    pub avg_distance: f64,
}

impl KpiSummary {
    /// Trip count rounded for display.
    pub fn trips_rounded(&self) -> u64 {
        self.trips.round().max(0.0) as u64
    }
}

/// Sums the filtered rows into a [`KpiSummary`]. Any zero denominator
/// yields 0 for the affected average.
pub fn aggregate_kpis(rows: &[DailyAggregate]) -> KpiSummary {
    let trips = sum_by(rows, |r| r.trip_count);
    let fare_sum = sum_by(rows, |r| r.fare_sum);

    KpiSummary {
        trips,
        revenue: sum_by(rows, |r| r.revenue_total),
        avg_fare: safe_div(fare_sum, trips),
        avg_tip_pct: safe_div(sum_by(rows, |r| r.tip_sum), fare_sum),
        avg_distance: safe_div(sum_by(rows, |r| r.distance_sum), trips),
    }
}
