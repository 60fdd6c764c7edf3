//! CLI entry point for the taxi dashboard tool.
//!
//! Loads the pre-aggregated trip tables from S3 or a local directory, applies
//! date and hour filters, and writes the computed dashboard as JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use taxi_dash::analyzers::dashboard::{DEFAULT_TOP_N, FilterParams, build_dashboard};
use taxi_dash::analyzers::filter::{DateRange, HourRange};
use taxi_dash::batch::parse_batch;
use taxi_dash::config::SourceConfig;
use taxi_dash::output::{log_summary, write_json, write_json_to_s3, write_ranking_csv};
use taxi_dash::store::client_from_env;
use taxi_dash::tables::{SourceTables, TableLoader};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "taxi_dash")]
#[command(about = "Filter pre-aggregated taxi trip tables into dashboard data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one dashboard for a date and hour range
    Report {
        /// Table location: s3://bucket/prefix or a local directory (default: TAXI_SOURCE)
        #[arg(short, long)]
        source: Option<String>,

        /// First pickup date, inclusive (default: first date in the data)
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<NaiveDate>,

        /// Last pickup date, inclusive (default: last date in the data)
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<NaiveDate>,

        /// First pickup hour, inclusive
        #[arg(long, default_value_t = 0)]
        hour_min: u8,

        /// Last pickup hour, inclusive
        #[arg(long, default_value_t = 23)]
        hour_max: u8,

        /// Number of zones in the ranking table
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,

        /// File to write the dashboard JSON to ("-" for stdout)
        #[arg(short, long, default_value = "-")]
        output: String,

        /// Optional: also write the ranking table to this CSV file
        #[arg(long)]
        ranking_csv: Option<String>,

        /// Optional: S3 bucket to upload the dashboard JSON to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Object key used with --s3-bucket
        #[arg(long, default_value = "dashboards/latest.json")]
        s3_key: String,
    },
    /// Compute one dashboard per filter set in a JSON file, loading tables once
    Batch {
        /// JSON array of {"name", "date_range", "hour_range", "top_n"} objects
        #[arg(short, long)]
        filters: String,

        /// Table location: s3://bucket/prefix or a local directory (default: TAXI_SOURCE)
        #[arg(short, long)]
        source: Option<String>,

        /// Directory to write one <name>.json per filter set
        #[arg(short = 'd', long, default_value = "dashboards")]
        output_dir: String,
    },
    /// Load every table and report row counts and the covered date span
    Tables {
        /// Table location: s3://bucket/prefix or a local directory (default: TAXI_SOURCE)
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/taxi_dash.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("taxi_dash.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    // A failed load or invalid filter halts the render; nothing is retried.
    if let Err(e) = run(cli.command).await {
        error!(error = %format!("{e:#}"), "Render halted");
        return Err(e);
    }

    Ok(())
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Report {
            source,
            start,
            end,
            hour_min,
            hour_max,
            top_n,
            output,
            ranking_csv,
            s3_bucket,
            s3_key,
        } => {
            let tables = load_tables(source.as_deref()).await?;

            let date_range = resolve_date_range(&tables, start, end)?;
            let params = FilterParams {
                date_range,
                hour_range: HourRange::new(hour_min, hour_max)?,
                top_n,
            };

            let dashboard = build_dashboard(&tables, &params);
            log_summary(&dashboard);
            write_json(&output, &dashboard)?;

            if let Some(path) = ranking_csv {
                write_ranking_csv(&path, &dashboard.ranking)?;
            }

            if let Some(bucket) = s3_bucket {
                let s3 = client_from_env().await;
                write_json_to_s3(&s3, &bucket, &s3_key, &dashboard).await?;
            }
        }
        Commands::Batch {
            filters,
            source,
            output_dir,
        } => {
            let content = std::fs::read_to_string(&filters)
                .with_context(|| format!("reading filter file {filters}"))?;
            let entries = parse_batch(&content)
                .with_context(|| format!("parsing filter file {filters}"))?;

            let config = SourceConfig::from_env(source.as_deref());
            info!(source = %config.location, sets = entries.len(), "Starting batch");
            let mut loader = TableLoader::new(config.location.open().await);

            for entry in &entries {
                // Each render reloads through the cache, never through storage.
                let tables = loader.load_sources(&config.layout).await?;
                let dashboard = build_dashboard(&tables, &entry.params);
                write_json(&format!("{}/{}.json", output_dir, entry.name), &dashboard)?;
            }

            info!(
                output_dir,
                cached_tables = loader.cached_tables(),
                "Batch complete"
            );
        }
        Commands::Tables { source } => {
            let tables = load_tables(source.as_deref()).await?;
            match tables.date_span() {
                Some((first, last)) => info!(%first, %last, "Daily table date span"),
                None => info!("Daily table is empty"),
            }
        }
    }

    Ok(())
}

/// Loads every table from the configured (or overridden) source.
#[tracing::instrument]
async fn load_tables(source: Option<&str>) -> Result<SourceTables> {
    let config = SourceConfig::from_env(source);
    info!(source = %config.location, "Loading aggregate tables");

    let mut loader = TableLoader::new(config.location.open().await);
    Ok(loader.load_sources(&config.layout).await?)
}

/// Fills in missing range ends from the data's own span.
fn resolve_date_range(
    tables: &SourceTables,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange> {
    let span = tables.date_span();
    let start = start
        .or(span.map(|(first, _)| first))
        .context("no start date given and the daily table is empty")?;
    let end = end
        .or(span.map(|(_, last)| last))
        .context("no end date given and the daily table is empty")?;
    Ok(DateRange::new(start, end)?)
}
