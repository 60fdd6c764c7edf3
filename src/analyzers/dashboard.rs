use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzers::filter::{
    DailyStrategy, DateRange, HourRange, RatioByDow, collapse_to_days, compute_ratio_by_dow,
    filter_and_redistribute, filter_daily_hours, global_hour_ratio,
};
use crate::analyzers::kpi::{KpiSummary, aggregate_kpis};
use crate::analyzers::ranking::{ZoneMapValue, ZoneRanking, ZoneSources, rank_zones, zone_map_values};
use crate::analyzers::series::{
    DailyPoint, HeatmapCell, PaymentPoint, daily_hour_heatmap, daily_series, hour_dow_heatmap,
    payment_series,
};
use crate::tables::SourceTables;

/// Rows in the zone ranking table unless asked otherwise.
pub const DEFAULT_TOP_N: usize = 20;

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Everything the user can change between renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub date_range: DateRange,
    #[serde(default)]
    pub hour_range: HourRange,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl FilterParams {
    pub fn new(date_range: DateRange, hour_range: HourRange) -> Self {
        Self {
            date_range,
            hour_range,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// A fully computed dashboard, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub schema_version: u8,
    pub filters: FilterParams,
    /// Whether KPIs, the daily series and the heatmap are exact.
    pub daily_strategy: DailyStrategy,
    pub kpis: KpiSummary,
    /// `kpis.trips` rounded for display.
    pub trips_display: u64,
    /// Index 0 is Monday, index 6 is Sunday.
    pub ratio_by_dow: RatioByDow,
    pub global_hour_ratio: f64,
    pub daily_series: Vec<DailyPoint>,
    pub heatmap: Vec<HeatmapCell>,
    pub ranking: ZoneRanking,
    pub zone_map: Vec<ZoneMapValue>,
    /// Absent when the source has no payment table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<PaymentPoint>>,
}

/// Computes every dashboard view from the unfiltered tables.
///
/// Pure: the same tables and parameters always give the same dashboard.
#[tracing::instrument(skip(tables), fields(
    start = %params.date_range.start(),
    end = %params.date_range.end(),
    min_hour = params.hour_range.min_hour(),
    max_hour = params.hour_range.max_hour(),
))]
pub fn build_dashboard(tables: &SourceTables, params: &FilterParams) -> Dashboard {
    let hours = params.hour_range;

    let ratio_by_dow = compute_ratio_by_dow(&tables.hour_dow, hours);
    let (daily_strategy, rows, heatmap) = match tables.daily_hours.as_deref() {
        Some(daily_hours) => {
            let selected = filter_daily_hours(daily_hours, params.date_range, hours);
            (
                DailyStrategy::Exact,
                collapse_to_days(&selected),
                daily_hour_heatmap(&selected),
            )
        }
        None => (
            DailyStrategy::Redistributed,
            filter_and_redistribute(&tables.daily, params.date_range, &ratio_by_dow),
            hour_dow_heatmap(&tables.hour_dow, hours),
        ),
    };
    let kpis = aggregate_kpis(&rows);

    let zones = ZoneSources {
        zones: &tables.zones,
        zone_hours: tables.zone_hours.as_deref(),
        hour_dow: &tables.hour_dow,
    };

    let dashboard = Dashboard {
        schema_version: 1,
        filters: *params,
        daily_strategy,
        kpis,
        trips_display: kpis.trips_rounded(),
        ratio_by_dow,
        global_hour_ratio: global_hour_ratio(&tables.hour_dow, hours),
        daily_series: daily_series(&rows),
        heatmap,
        ranking: rank_zones(zones, hours, params.top_n),
        zone_map: zone_map_values(zones, hours),
        payments: tables
            .payments
            .as_deref()
            .map(|p| payment_series(p, params.date_range, hours)),
    };

    info!(
        days = dashboard.daily_series.len(),
        trips = dashboard.trips_display,
        revenue = dashboard.kpis.revenue,
        daily_strategy = ?dashboard.daily_strategy,
        strategy = ?dashboard.ranking.strategy,
        "Dashboard computed"
    );
    dashboard
}
