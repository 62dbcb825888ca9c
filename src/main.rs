//! CLI entry point for the taxi trip statistics pipeline.
//!
//! Provides subcommands for running the batch aggregation over one or more
//! monthly trip files and for building chart series JSON from the persisted
//! tables.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use taxi_trip_stats::charts::{AxisScale, ChartKind, build_chart};
use taxi_trip_stats::output::read_tables;
use taxi_trip_stats::pipeline::{self, PipelineConfig};
use taxi_trip_stats::progress::TracingObserver;
use taxi_trip_stats::source::RecordSource;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_SOURCES: [(&str, &str); 2] = [
    (
        "2019-01 NYC taxi data",
        "https://s3.amazonaws.com/nyc-tlc/trip+data/yellow_tripdata_2019-01.csv",
    ),
    (
        "2020-01 NYC taxi data",
        "https://s3.amazonaws.com/nyc-tlc/trip+data/yellow_tripdata_2020-01.csv",
    ),
];

#[derive(Parser)]
#[command(name = "taxi_trip_stats")]
#[command(about = "Aggregate monthly trip records into daily statistics and chart series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, clean, and aggregate all sources, then write one table per statistic
    Aggregate {
        /// Record source as "LABEL=URL_OR_PATH"; label must start with YYYY-MM.
        /// Repeatable; defaults to the 2019-01 and 2020-01 NYC TLC files.
        #[arg(short, long = "source", value_name = "LABEL=LOCATION")]
        sources: Vec<String>,

        /// Directory to write the per-statistic tables to
        #[arg(short, long, default_value = "tables")]
        output_dir: PathBuf,
    },
    /// Build chart series JSON from previously written tables
    Chart {
        /// Which chart to build
        #[arg(value_enum)]
        kind: ChartKindArg,

        /// Directory holding the per-statistic tables
        #[arg(short, long, default_value = "tables")]
        tables_dir: PathBuf,

        /// Y-axis scale hint for the trend chart
        #[arg(short, long, value_enum, default_value_t = ScaleArg::Linear)]
        scale: ScaleArg,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartKindArg {
    Trend,
    Correlation,
}

impl From<ChartKindArg> for ChartKind {
    fn from(arg: ChartKindArg) -> Self {
        match arg {
            ChartKindArg::Trend => ChartKind::Trend,
            ChartKindArg::Correlation => ChartKind::Correlation,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ScaleArg {
    Linear,
    Log,
}

impl From<ScaleArg> for AxisScale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Linear => AxisScale::Linear,
            ScaleArg::Log => AxisScale::Logarithmic,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/taxi_trip_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("taxi_trip_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            sources,
            output_dir,
        } => {
            let sources = if sources.is_empty() {
                DEFAULT_SOURCES
                    .iter()
                    .map(|(label, location)| RecordSource::new(*label, *location))
                    .collect()
            } else {
                sources
                    .iter()
                    .map(|s| parse_source_arg(s))
                    .collect::<Result<Vec<_>>>()?
            };

            let config = PipelineConfig {
                sources,
                output_dir,
            };
            pipeline::run(&config, &TracingObserver).await?;
        }
        Commands::Chart {
            kind,
            tables_dir,
            scale,
            output,
        } => {
            let tables = read_tables(&tables_dir)?;
            let chart = build_chart(kind.into(), &tables, scale.into());
            let json = serde_json::to_string_pretty(&chart)?;

            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("writing chart JSON to {}", path.display()))?,
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

/// Parses a `LABEL=LOCATION` source argument.
fn parse_source_arg(arg: &str) -> Result<RecordSource> {
    let Some((label, location)) = arg.split_once('=') else {
        bail!("source must be LABEL=LOCATION, got {arg:?}");
    };
    Ok(RecordSource::new(label, location))
}
