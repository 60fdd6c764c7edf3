//! Output formatting and persistence for computed dashboards.
//!
//! Supports a log summary, JSON to a file, stdout or S3, and a CSV export of
//! the zone ranking table.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::dashboard::Dashboard;
use crate::analyzers::ranking::ZoneRanking;
use csv::WriterBuilder;

/// Logs the headline KPIs and the top of the ranking.
pub fn log_summary(dashboard: &Dashboard) {
    let kpis = &dashboard.kpis;
    info!(
        strategy = ?dashboard.daily_strategy,
        trips = dashboard.trips_display,
        revenue = %format!("{:.2}", kpis.revenue),
        avg_fare = %format!("{:.2}", kpis.avg_fare),
        avg_tip_pct = %format!("{:.1}%", kpis.avg_tip_pct * 100.0),
        avg_distance = %format!("{:.2}", kpis.avg_distance),
        "KPIs"
    );

    for (rank, zone) in dashboard.ranking.zones.iter().take(5).enumerate() {
        info!(
            rank = rank + 1,
            borough = %zone.borough,
            zone = %zone.zone_name,
            trips = zone.trips.round() as u64,
            "Top zone"
        );
    }
    debug!("{:#?}", dashboard.ratio_by_dow);
}

/// Serializes a dashboard as pretty-printed JSON.
pub fn to_json(dashboard: &Dashboard) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(dashboard)?)
}

/// Writes the dashboard JSON to `path`, or to stdout when `path` is `-`.
pub fn write_json(path: &str, dashboard: &Dashboard) -> Result<()> {
    let body = to_json(dashboard)?;

    if path == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&body)?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body).with_context(|| format!("writing dashboard to {path}"))?;
    info!(path, "Dashboard written");
    Ok(())
}

#[derive(Serialize)]
struct RankingRecord<'a> {
    rank: usize,
    borough: &'a str,
    zone_name: &'a str,
    trips: f64,
    revenue_total: f64,
}

const RANKING_HEADER: [&str; 5] = ["rank", "borough", "zone_name", "trips", "revenue_total"];

/// Writes the ranking table to a CSV file, replacing any existing file.
/// The header is written even when the ranking is empty.
pub fn write_ranking_csv(path: &str, ranking: &ZoneRanking) -> Result<()> {
    debug!(path, rows = ranking.zones.len(), "Writing ranking CSV");

    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(RANKING_HEADER)?;

    for (i, zone) in ranking.zones.iter().enumerate() {
        writer.serialize(RankingRecord {
            rank: i + 1,
            borough: &zone.borough,
            zone_name: &zone.zone_name,
            trips: zone.trips,
            revenue_total: zone.revenue_total,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Serializes a value to JSON and uploads it to an S3 bucket with `application/json` content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
) -> Result<()> {
    let body = serde_json::to_vec(value)?;

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body.into())
        .content_type("application/json")
        .send()
        .await
        .with_context(|| format!("uploading s3://{bucket}/{key}"))?;

    info!(bucket, key, "Dashboard uploaded");
    Ok(())
}
