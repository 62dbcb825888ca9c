//! Structured progress reporting for pipeline runs.
//!
//! The pipeline notifies an observer at fixed checkpoints instead of printing
//! directly, so callers choose whether events are logged, displayed, or
//! ignored. This channel is observability only, not part of the data
//! contract.

use std::path::Path;

use tracing::info;

use crate::stats::Statistic;

/// A checkpoint reached during a pipeline run.
#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent<'a> {
    SourceStarted {
        label: &'a str,
        index: usize,
        total: usize,
    },
    SourceCompleted {
        label: &'a str,
        cleaned_rows: usize,
    },
    AggregationDone {
        sources: usize,
    },
    WriteComplete {
        statistic: Statistic,
        path: &'a Path,
    },
    RunCompleted {
        sources: usize,
    },
}

pub trait ProgressObserver {
    fn notify(&self, event: ProgressEvent<'_>);
}

/// Logs each checkpoint as an `info!` line.
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn notify(&self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::SourceStarted {
                label,
                index,
                total,
            } => {
                if index == 0 {
                    info!(label, total, "loading file");
                } else {
                    info!(label, loaded = index, total, "loading next file");
                }
            }
            ProgressEvent::SourceCompleted {
                label,
                cleaned_rows,
            } => {
                info!(label, cleaned_rows, "source completed");
            }
            ProgressEvent::AggregationDone { sources } => {
                info!(sources, "aggregation done");
            }
            ProgressEvent::WriteComplete { statistic, path } => {
                info!(statistic = %statistic, path = %path.display(), "file saved");
            }
            ProgressEvent::RunCompleted { sources } => {
                info!(sources, "FINISHED: all sources outputted");
            }
        }
    }
}

/// Discards every checkpoint.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn notify(&self, _event: ProgressEvent<'_>) {}
}
