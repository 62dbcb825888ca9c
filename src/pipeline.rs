//! Run-to-completion batch orchestration.
//!
//! Sources are processed strictly in sequence: load, clean, aggregate one
//! source fully before the next begins. Per-statistic accumulation lists are
//! the only state crossing source boundaries, and tables are written only
//! after every source succeeded, so a failed run never touches existing
//! output. Re-running is idempotent (writes replace wholesale); two
//! concurrent runs against one destination are the caller's problem to
//! prevent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::aggregate::{AggregatedRow, aggregate_by_date};
use crate::cleaner::clean_records;
use crate::error::PipelineError;
use crate::loader::load_source;
use crate::output::{AggregateTable, merge_rows, write_table};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::source::RecordSource;
use crate::stats::Statistic;

/// Everything a run needs: the sources to process and where tables land.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sources: Vec<RecordSource>,
    pub output_dir: PathBuf,
}

/// Runs the full pipeline and returns the paths of the written tables.
///
/// Any error aborts the run before the write step; see [`PipelineError`].
pub async fn run(
    config: &PipelineConfig,
    observer: &dyn ProgressObserver,
) -> Result<Vec<PathBuf>, PipelineError> {
    let total = config.sources.len();
    let mut batches: BTreeMap<Statistic, Vec<Vec<AggregatedRow>>> = BTreeMap::new();

    // Period labels are config; reject bad ones before any fetch happens.
    for source in &config.sources {
        source.period()?;
    }

    for (index, source) in config.sources.iter().enumerate() {
        observer.notify(ProgressEvent::SourceStarted {
            label: &source.label,
            index,
            total,
        });

        let period = source.period()?;
        let raw = load_source(source).await?;
        let cleaned = clean_records(raw, &period);
        debug!(label = %source.label, rows = cleaned.len(), "source cleaned");

        for statistic in Statistic::ALL {
            let rows = aggregate_by_date(&cleaned, statistic);
            batches.entry(statistic).or_default().push(rows);
        }

        observer.notify(ProgressEvent::SourceCompleted {
            label: &source.label,
            cleaned_rows: cleaned.len(),
        });
    }

    observer.notify(ProgressEvent::AggregationDone { sources: total });

    ensure_output_dir(&config.output_dir)?;

    let mut written = Vec::new();
    for (statistic, source_batches) in batches {
        let table = AggregateTable {
            statistic,
            rows: merge_rows(source_batches),
        };
        let path = write_table(&config.output_dir, &table)?;
        observer.notify(ProgressEvent::WriteComplete {
            statistic,
            path: &path,
        });
        written.push(path);
    }

    observer.notify(ProgressEvent::RunCompleted { sources: total });
    Ok(written)
}

fn ensure_output_dir(dir: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::WriteFailure {
        path: dir.display().to_string(),
        cause: e.into(),
    })
}
