//! Error taxonomy for the aggregation pipeline.
//!
//! Every variant is fatal for the run: the merge step assumes all configured
//! sources succeeded, so there is no partial-success mode. Output tables are
//! written only after every source has been loaded, cleaned, and aggregated,
//! which means a failed run leaves previously existing tables untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The record source (URL or local file) could not be opened or fetched.
    #[error("source unavailable: {location}")]
    SourceUnavailable {
        location: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// One or more required columns are absent from the source header row.
    #[error("schema mismatch: missing required columns {missing:?}")]
    SchemaMismatch { missing: Vec<String> },

    /// The destination table file could not be created or written.
    #[error("write failure: {path}")]
    WriteFailure {
        path: String,
        #[source]
        cause: csv::Error,
    },

    /// A source's period label does not start with a parseable `YYYY-MM`.
    #[error("bad period label: {0:?}")]
    BadPeriodLabel(String),
}
