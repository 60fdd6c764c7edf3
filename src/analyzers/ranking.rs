//! Zone ranking table and choropleth values.
//!
//! Zone totals have no time dimension, so an hour filter can only be honoured
//! exactly when the optional zone-by-hour table exists. Otherwise every zone
//! is scaled by the global hour ratio, which leaves the order untouched.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::analyzers::filter::{HourRange, global_hour_ratio};
use crate::tables::{HourDowAggregate, ZoneAggregate, ZoneHourAggregate};

/// How zone figures were made to respect the hour filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStrategy {
    /// Summed from the zone-by-hour table, restricted to the hour range.
    Exact,
    /// Zone totals scaled by the global hour ratio.
    UniformRatio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRank {
    pub borough: String,
    pub zone_name: String,
    pub trips: f64,
    pub revenue_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRanking {
    pub strategy: RankingStrategy,
    /// Factor applied to zone totals; 1.0 for [`RankingStrategy::Exact`].
    pub ratio: f64,
    pub zones: Vec<ZoneRank>,
}

/// One choropleth value, keyed by zone name for matching against GeoJSON
/// feature properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneMapValue {
    pub zone_name: String,
    pub trips: f64,
}

/// Inputs shared by the ranking and the map.
#[derive(Debug, Clone, Copy)]
pub struct ZoneSources<'a> {
    pub zones: &'a [ZoneAggregate],
    pub zone_hours: Option<&'a [ZoneHourAggregate]>,
    pub hour_dow: &'a [HourDowAggregate],
}

/// Ranks zones by hour-filtered trips, descending, keeping the top `top_n`.
///
/// Ties are broken by zone name, then borough, so output is deterministic.
/// Zones with an empty borough or zone name are dropped.
pub fn rank_zones(sources: ZoneSources<'_>, hours: HourRange, top_n: usize) -> ZoneRanking {
    let (strategy, ratio, mut zones) = zone_totals(sources, hours);

    zones.sort_by(compare_rank);
    zones.truncate(top_n);

    debug!(?strategy, ratio, ranked = zones.len(), "Zone ranking computed");
    ZoneRanking {
        strategy,
        ratio,
        zones,
    }
}

/// Per-zone trip totals for every zone, sorted by zone name.
pub fn zone_map_values(sources: ZoneSources<'_>, hours: HourRange) -> Vec<ZoneMapValue> {
    let (_, _, zones) = zone_totals(sources, hours);

    let mut by_name: BTreeMap<String, f64> = BTreeMap::new();
    for zone in zones {
        *by_name.entry(zone.zone_name).or_default() += zone.trips;
    }

    by_name
        .into_iter()
        .map(|(zone_name, trips)| ZoneMapValue { zone_name, trips })
        .collect()
}

fn zone_totals(sources: ZoneSources<'_>, hours: HourRange) -> (RankingStrategy, f64, Vec<ZoneRank>) {
    let mut grouped: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
    let mut add = |borough: &str, zone_name: &str, trips: f64, revenue: f64| {
        if borough.is_empty() || zone_name.is_empty() {
            return;
        }
        let entry = grouped
            .entry((borough.to_string(), zone_name.to_string()))
            .or_default();
        entry.0 += trips;
        entry.1 += revenue;
    };

    let (strategy, ratio) = match sources.zone_hours {
        Some(zone_hours) => {
            for row in zone_hours.iter().filter(|r| hours.contains(r.hour)) {
                add(&row.borough, &row.zone_name, row.trip_count, row.revenue_total);
            }
            (RankingStrategy::Exact, 1.0)
        }
        None => {
            let ratio = global_hour_ratio(sources.hour_dow, hours);
            for row in sources.zones {
                add(
                    &row.borough,
                    &row.zone_name,
                    row.trip_count * ratio,
                    row.revenue_total * ratio,
                );
            }
            (RankingStrategy::UniformRatio, ratio)
        }
    };

    let zones = grouped
        .into_iter()
        .map(|((borough, zone_name), (trips, revenue_total))| ZoneRank {
            borough,
            zone_name,
            trips,
            revenue_total,
        })
        .collect();
    (strategy, ratio, zones)
}

fn compare_rank(a: &ZoneRank, b: &ZoneRank) -> Ordering {
    b.trips
        .total_cmp(&a.trips)
        .then_with(|| a.zone_name.cmp(&b.zone_name))
        .then_with(|| a.borough.cmp(&b.borough))
}
