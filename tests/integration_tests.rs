use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use taxi_trip_stats::charts::{AxisScale, gap_dates, trend_chart};
use taxi_trip_stats::error::PipelineError;
use taxi_trip_stats::output::read_tables;
use taxi_trip_stats::pipeline::{self, PipelineConfig};
use taxi_trip_stats::progress::NullObserver;
use taxi_trip_stats::source::RecordSource;
use taxi_trip_stats::stats::Statistic;

const HEADER: &str = "VendorID,tpep_pickup_datetime,tpep_dropoff_datetime,passenger_count,trip_distance,fare_amount,tip_amount,total_amount";

// 2019-01: one erroneous 2003 pickup plus in-range trips, two of them on
// 2019-01-05 with fares [10, 20] and tips [1, 3]. No trips on 2019-01-06.
const SOURCE_2019: &str = "\
1,2003-06-15 08:00:00,2003-06-15 08:30:00,1,3.0,12.0,2.0,14.0
1,2019-01-05 10:00:00,2019-01-05 10:20:00,1,2.5,10.0,1.0,11.0
2,2019-01-05 11:00:00,2019-01-05 11:30:00,2,4.0,20.0,3.0,23.0
1,2019-01-07 09:00:00,2019-01-07 09:45:00,1,6.0,25.0,4.0,29.0
";

const SOURCE_2020: &str = "\
2,2020-01-03 14:00:00,2020-01-03 14:25:00,1,3.5,14.0,2.0,16.0
1,2020-01-04 15:00:00,2020-01-04 15:40:00,3,7.0,28.0,5.0,33.0
";

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn setup(name: &str) -> (PipelineConfig, PathBuf) {
    let base = std::env::temp_dir().join(format!("taxi_trip_stats_it_{name}"));
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(&base).unwrap();

    let file_2019 = base.join("yellow_tripdata_2019-01.csv");
    let file_2020 = base.join("yellow_tripdata_2020-01.csv");
    fs::write(&file_2019, format!("{HEADER}\n{SOURCE_2019}")).unwrap();
    fs::write(&file_2020, format!("{HEADER}\n{SOURCE_2020}")).unwrap();

    let config = PipelineConfig {
        sources: vec![
            RecordSource::new("2019-01 NYC taxi data", file_2019.display().to_string()),
            RecordSource::new("2020-01 NYC taxi data", file_2020.display().to_string()),
        ],
        output_dir: base.join("tables"),
    };

    (config, base)
}

#[tokio::test]
async fn test_full_pipeline_aggregates_and_filters() {
    let (config, base) = setup("full");

    let written = pipeline::run(&config, &NullObserver).await.unwrap();
    assert_eq!(written.len(), 2);

    let tables = read_tables(&config.output_dir).unwrap();
    let mean = tables.iter().find(|t| t.statistic == Statistic::Mean).unwrap();

    // source order then date order within each source
    let dates: Vec<NaiveDate> = mean.rows.iter().map(|r| r.trip_date).collect();
    assert_eq!(
        dates,
        vec![
            date("2019-01-05"),
            date("2019-01-07"),
            date("2020-01-03"),
            date("2020-01-04"),
        ]
    );

    // the 2003 record contributed to no output row
    assert!(!dates.contains(&date("2003-06-15")));

    let jan5 = &mean.rows[0];
    assert_eq!(jan5.fare_amount, 15.0);
    assert_eq!(jan5.tip_amount, 2.0);
    assert_eq!(jan5.passenger_count, 1.5);
    assert_eq!(jan5.trip_duration, 1500.0);

    // single-trip day: median equals the trip itself
    let median = tables
        .iter()
        .find(|t| t.statistic == Statistic::Median)
        .unwrap();
    assert_eq!(median.rows[1].fare_amount, 25.0);

    fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let (config, base) = setup("idempotent");

    pipeline::run(&config, &NullObserver).await.unwrap();
    let first_mean = fs::read(config.output_dir.join("trip_date_mean.csv")).unwrap();
    let first_median = fs::read(config.output_dir.join("trip_date_median.csv")).unwrap();

    pipeline::run(&config, &NullObserver).await.unwrap();
    let second_mean = fs::read(config.output_dir.join("trip_date_mean.csv")).unwrap();
    let second_median = fs::read(config.output_dir.join("trip_date_median.csv")).unwrap();

    assert_eq!(first_mean, second_mean);
    assert_eq!(first_median, second_median);

    fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn test_trend_chart_from_persisted_tables() {
    let (config, base) = setup("chart");

    pipeline::run(&config, &NullObserver).await.unwrap();
    let tables = read_tables(&config.output_dir).unwrap();

    let chart = trend_chart(&tables, AxisScale::Linear);
    assert_eq!(chart.series.len(), 10);

    // table spans 2019-01-05..=2020-01-04; observed days are exactly four
    let gaps = gap_dates(tables.last().unwrap());
    assert!(gaps.contains(&date("2019-01-06")));
    assert!(gaps.contains(&date("2019-06-15")));
    assert!(!gaps.contains(&date("2019-01-07")));

    let range_days = (date("2020-01-04") - date("2019-01-05")).num_days() + 1;
    assert_eq!(gaps.len() as i64, range_days - 4);
    assert_eq!(chart.gap_dates, gaps);

    fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn test_missing_column_aborts_without_writing() {
    let (mut config, base) = setup("schema");

    // rewrite the second source without tip_amount
    let broken = base.join("broken.csv");
    fs::write(
        &broken,
        "tpep_pickup_datetime,tpep_dropoff_datetime,passenger_count,trip_distance,fare_amount\n",
    )
    .unwrap();
    config.sources[1] = RecordSource::new("2020-01", broken.display().to_string());

    let err = pipeline::run(&config, &NullObserver).await.unwrap_err();
    assert!(matches!(err, PipelineError::SchemaMismatch { .. }));

    // the run failed before the write step, so no table exists
    assert!(!config.output_dir.join("trip_date_mean.csv").exists());

    fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn test_unreadable_source_aborts_run() {
    let (mut config, base) = setup("unavailable");
    config.sources[0] = RecordSource::new("2019-01", base.join("gone.csv").display().to_string());

    let err = pipeline::run(&config, &NullObserver).await.unwrap_err();
    assert!(matches!(err, PipelineError::SourceUnavailable { .. }));

    fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn test_bad_period_label_rejected_before_fetch() {
    let (mut config, base) = setup("label");
    config.sources[0].label = "january".to_string();

    let err = pipeline::run(&config, &NullObserver).await.unwrap_err();
    assert!(matches!(err, PipelineError::BadPeriodLabel(_)));

    fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn test_source_with_no_surviving_rows_is_not_an_error() {
    let (mut config, base) = setup("empty");

    // every pickup outside 2021-03: zero aggregated rows for that source
    let stale = base.join("stale.csv");
    fs::write(
        &stale,
        format!("{HEADER}\n1,2003-06-15 08:00:00,2003-06-15 08:30:00,1,3.0,12.0,2.0,14.0\n"),
    )
    .unwrap();
    config.sources.push(RecordSource::new(
        "2021-03",
        stale.display().to_string(),
    ));

    pipeline::run(&config, &NullObserver).await.unwrap();

    let tables = read_tables(&config.output_dir).unwrap();
    let observed: BTreeSet<NaiveDate> = tables[0].rows.iter().map(|r| r.trip_date).collect();
    assert_eq!(observed.len(), 4);
    assert!(observed.iter().all(|d| d.format("%Y").to_string() != "2021"));

    fs::remove_dir_all(&base).unwrap();
}
