use taxi_dash::analyzers::dashboard::{FilterParams, build_dashboard};
use taxi_dash::analyzers::filter::{
    DailyStrategy, DateRange, HourRange, compute_ratio_by_dow, filter_and_redistribute,
};
use taxi_dash::analyzers::ranking::RankingStrategy;
use taxi_dash::batch::parse_batch;
use taxi_dash::config::TableLayout;
use taxi_dash::error::DashboardError;
use taxi_dash::store::LocalStore;
use taxi_dash::tables::{SourceTables, TableLoader};

fn fixture_root() -> String {
    format!("{}/tests/fixtures/agg_v3", env!("CARGO_MANIFEST_DIR"))
}

fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

fn june_mornings() -> FilterParams {
    FilterParams::new(
        DateRange::new(date("2025-06-01"), date("2025-06-30")).unwrap(),
        HourRange::new(6, 12).unwrap(),
    )
}

fn without_daily_hours() -> TableLayout {
    TableLayout {
        daily_hour: "agg_daily_hour_not_written".to_string(),
        ..TableLayout::default()
    }
}

async fn load(layout: &TableLayout) -> SourceTables {
    let mut loader = TableLoader::new(Box::new(LocalStore::new(fixture_root())));
    loader.load_sources(layout).await.expect("Failed to load fixtures")
}

#[tokio::test]
async fn test_load_fixture_tables() {
    let tables = load(&TableLayout::default()).await;

    // part-0.csv plus the gzipped part-1, with the _SUCCESS marker skipped.
    assert_eq!(tables.daily.len(), 5);
    assert_eq!(tables.hour_dow.len(), 9);
    assert_eq!(tables.zones.len(), 5);
    assert_eq!(tables.daily_hours.as_ref().map(Vec::len), Some(10));
    assert_eq!(tables.zone_hours.as_ref().map(Vec::len), Some(7));
    assert_eq!(tables.payments.as_ref().map(Vec::len), Some(5));
    assert_eq!(
        tables.date_span(),
        Some((date("2025-06-02"), date("2025-06-08")))
    );
}

#[tokio::test]
async fn test_full_pipeline_redistributed_by_weekday() {
    let tables = load(&without_daily_hours()).await;
    let dashboard = build_dashboard(&tables, &june_mornings());
    assert_eq!(dashboard.daily_strategy, DailyStrategy::Redistributed);

    // Mon 300*2/3 + Tue 200*1/4 + Wed 100*1 + Sat 400*0 + Sun 100*1/2
    assert!((dashboard.kpis.trips - 400.0).abs() < 1e-9);
    assert!((dashboard.kpis.revenue - 4250.0).abs() < 1e-9);
    assert!((dashboard.kpis.avg_fare - 8.5).abs() < 1e-9);
    assert!((dashboard.kpis.avg_tip_pct - 635.0 / 3400.0).abs() < 1e-9);
    assert_eq!(dashboard.trips_display, 400);

    assert_eq!(dashboard.daily_series.len(), 5);
    assert_eq!(dashboard.daily_series[3].date, date("2025-06-07"));
    assert_eq!(dashboard.daily_series[3].trips, 0.0);

    assert_eq!(dashboard.ranking.strategy, RankingStrategy::Exact);
    let names: Vec<_> = dashboard
        .ranking
        .zones
        .iter()
        .map(|z| z.zone_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Upper East Side South", "Midtown Center", "Park Slope", "JFK Airport"]
    );

    let payments = dashboard.payments.expect("payment table present");
    assert_eq!(payments.len(), 3);
    assert_eq!(payments[0].payment_type, "cash");
    assert_eq!(payments[0].trips, 20.0);

    assert!((dashboard.global_hour_ratio - 165.0 / 410.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_full_pipeline_exact_from_daily_hours() {
    let tables = load(&TableLayout::default()).await;
    let dashboard = build_dashboard(&tables, &june_mornings());

    assert_eq!(dashboard.daily_strategy, DailyStrategy::Exact);
    // 06-02 h8, 06-03 h9, 06-04 h10, 06-07 h11, 06-08 h7 and 06-10 h9.
    assert!((dashboard.kpis.trips - 460.0).abs() < 1e-9);
    assert!((dashboard.kpis.revenue - 5000.0).abs() < 1e-9);
    assert!((dashboard.kpis.avg_fare - 4000.0 / 460.0).abs() < 1e-9);
    assert!((dashboard.kpis.avg_tip_pct - 726.0 / 4000.0).abs() < 1e-9);
    assert!((dashboard.kpis.avg_distance - 1540.0 / 460.0).abs() < 1e-9);
    assert_eq!(dashboard.trips_display, 460);

    let days: Vec<_> = dashboard
        .daily_series
        .iter()
        .map(|p| (p.date, p.trips))
        .collect();
    assert_eq!(
        days,
        vec![
            (date("2025-06-02"), 200.0),
            (date("2025-06-03"), 50.0),
            (date("2025-06-04"), 100.0),
            (date("2025-06-07"), 40.0),
            (date("2025-06-08"), 60.0),
            (date("2025-06-10"), 10.0),
        ]
    );

    let cells: Vec<_> = dashboard
        .heatmap
        .iter()
        .map(|c| (c.day_of_week, c.hour, c.trips))
        .collect();
    assert_eq!(
        cells,
        vec![(1, 8, 200.0), (2, 9, 60.0), (3, 10, 100.0), (6, 11, 40.0), (7, 7, 60.0)]
    );

    // A first-week range drops the 06-10 Tuesday from the heatmap.
    let first_week = FilterParams::new(
        DateRange::new(date("2025-06-02"), date("2025-06-08")).unwrap(),
        HourRange::new(6, 12).unwrap(),
    );
    let dashboard = build_dashboard(&tables, &first_week);
    assert_eq!(dashboard.heatmap[1].trips, 50.0);
}

#[tokio::test]
async fn test_uniform_ratio_fallback_keeps_order() {
    let layout = TableLayout {
        zone_hour: "agg_zone_hour_not_written".to_string(),
        ..TableLayout::default()
    };
    let tables = load(&layout).await;
    assert!(tables.zone_hours.is_none());

    let filtered = build_dashboard(&tables, &june_mornings());
    let mut all_day = june_mornings();
    all_day.hour_range = HourRange::ALL_DAY;
    let unfiltered = build_dashboard(&tables, &all_day);

    assert_eq!(filtered.ranking.strategy, RankingStrategy::UniformRatio);
    assert!((filtered.ranking.ratio - 165.0 / 410.0).abs() < 1e-12);

    let order = |d: &taxi_dash::analyzers::dashboard::Dashboard| {
        d.ranking
            .zones
            .iter()
            .map(|z| z.zone_name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&filtered), order(&unfiltered));
    assert_eq!(
        order(&filtered),
        vec!["Midtown Center", "Upper East Side South", "JFK Airport", "Park Slope"]
    );
}

#[tokio::test]
async fn test_full_hour_range_is_identity_on_fixtures() {
    let tables = load(&TableLayout::default()).await;
    let range = DateRange::new(date("2025-06-03"), date("2025-06-07")).unwrap();

    let ratios = compute_ratio_by_dow(&tables.hour_dow, HourRange::ALL_DAY);
    let out = filter_and_redistribute(&tables.daily, range, &ratios);

    let expected: Vec<_> = tables
        .daily
        .iter()
        .filter(|r| range.contains(r.date))
        .collect();
    assert_eq!(out.len(), expected.len());
    for (got, want) in out.iter().zip(expected) {
        assert_eq!(got.date, want.date);
        assert!((got.trip_count - want.trip_count).abs() < 1e-9);
        assert!((got.revenue_total - want.revenue_total).abs() < 1e-9);
        assert!((got.distance_sum - want.distance_sum).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_missing_required_table_halts() {
    let layout = TableLayout {
        daily: "agg_daily_not_written".to_string(),
        ..TableLayout::default()
    };
    let mut loader = TableLoader::new(Box::new(LocalStore::new(fixture_root())));

    let err = loader.load_sources(&layout).await.unwrap_err();
    assert!(
        matches!(err, DashboardError::MissingData { ref table } if table == "agg_daily_not_written")
    );
}

#[tokio::test]
async fn test_schema_mismatch_halts() {
    let root = std::env::temp_dir().join("taxi_dash_schema_mismatch");
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(root.join("agg_daily")).unwrap();
    std::fs::write(
        root.join("agg_daily/part-0.csv"),
        "date,trip_count,revenue_total,tip_sum,distance_sum\n2025-06-02,1,1,1,1\n",
    )
    .unwrap();

    let mut loader = TableLoader::new(Box::new(LocalStore::new(&root)));
    let err = loader.load_sources(&TableLayout::default()).await.unwrap_err();
    assert!(matches!(err, DashboardError::SchemaMismatch { ref field, .. } if field == "fare_sum"));

    std::fs::remove_dir_all(&root).unwrap();
}

#[tokio::test]
async fn test_batch_filters_reuse_cached_tables() {
    let content = std::fs::read_to_string(format!(
        "{}/tests/fixtures/filters.json",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();
    let entries = parse_batch(&content).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "june_morning");
    assert_eq!(entries[1].params.hour_range, HourRange::ALL_DAY);
    assert_eq!(entries[1].params.top_n, 3);

    let mut loader = TableLoader::new(Box::new(LocalStore::new(fixture_root())));
    let layout = TableLayout::default();
    let mut trips = Vec::new();
    for entry in &entries {
        let tables = loader.load_sources(&layout).await.unwrap();
        trips.push(build_dashboard(&tables, &entry.params).trips_display);
    }

    assert_eq!(loader.cached_tables(), 6);
    assert_eq!(trips, vec![460, 1100]);
}
