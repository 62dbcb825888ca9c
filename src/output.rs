//! Merge and persistence of aggregated tables.
//!
//! One CSV table per statistic tag, written wholesale on every run. The
//! persisted tables are the only hand-off between the batch pipeline and the
//! chart-building path; the two never share in-memory state.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::aggregate::AggregatedRow;
use crate::error::PipelineError;
use crate::stats::Statistic;

/// The durable per-statistic table: merged rows from every source, in
/// source-processing order. Written once per run, read many times.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub statistic: Statistic,
    pub rows: Vec<AggregatedRow>,
}

/// Filename of the persisted table for one statistic tag.
pub fn table_filename(statistic: Statistic) -> String {
    format!("trip_date_{}.csv", statistic.label())
}

/// Concatenates per-source row batches in processing order.
///
/// Pure concatenation: no re-sorting and no re-aggregation across sources,
/// so a date covered by two sources stays as two rows.
pub fn merge_rows(batches: Vec<Vec<AggregatedRow>>) -> Vec<AggregatedRow> {
    batches.into_iter().flatten().collect()
}

/// Writes a table to `<dir>/trip_date_<tag>.csv`, replacing any existing
/// file. Returns the path written.
pub fn write_table(dir: &Path, table: &AggregateTable) -> Result<PathBuf, PipelineError> {
    let path = dir.join(table_filename(table.statistic));
    let failure = |cause: csv::Error| PipelineError::WriteFailure {
        path: path.display().to_string(),
        cause,
    };

    // from_path truncates, so a re-run overwrites rather than appends
    let mut writer = csv::Writer::from_path(&path).map_err(failure)?;
    for row in &table.rows {
        writer.serialize(row).map_err(failure)?;
    }
    writer.flush().map_err(|e| failure(e.into()))?;

    info!(path = %path.display(), rows = table.rows.len(), "table written");
    Ok(path)
}

/// Reads one persisted table back for chart building.
pub fn read_table(dir: &Path, statistic: Statistic) -> Result<AggregateTable, PipelineError> {
    let path = dir.join(table_filename(statistic));
    let unavailable = |cause: Box<dyn std::error::Error + Send + Sync>| {
        PipelineError::SourceUnavailable {
            location: path.display().to_string(),
            cause,
        }
    };

    let file = File::open(&path).map_err(|e| unavailable(Box::new(e)))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: AggregatedRow = result.map_err(|e| unavailable(Box::new(e)))?;
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "table loaded");
    Ok(AggregateTable { statistic, rows })
}

/// Reads every statistic's table from `dir`, in [`Statistic::ALL`] order.
pub fn read_tables(dir: &Path) -> Result<Vec<AggregateTable>, PipelineError> {
    Statistic::ALL
        .iter()
        .map(|&statistic| read_table(dir, statistic))
        .collect()
}
