//! Period filtering and column derivation for raw record batches.

use chrono::NaiveDate;
use tracing::debug;

use crate::loader::RawRecord;
use crate::source::Period;

/// A trip after cleaning: pickup truncated to a calendar date, dropoff
/// replaced by the derived duration.
///
/// `trip_duration` is signed seconds; dropoff earlier than pickup yields a
/// negative value, which is preserved as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub trip_date: NaiveDate,
    pub trip_distance: f64,
    pub passenger_count: f64,
    pub fare_amount: f64,
    pub tip_amount: f64,
    pub trip_duration: f64,
}

/// Filters a batch to its owning period and derives per-trip columns.
///
/// Real TLC extracts carry erroneous pickups dated decades outside the file's
/// month (2003, 2088, ...); any pickup whose date falls outside the period's
/// inclusive bounds is removed, never clamped. Removing every row is not an
/// error; the empty batch simply aggregates to nothing.
pub fn clean_records(records: Vec<RawRecord>, period: &Period) -> Vec<CleanedRecord> {
    let input = records.len();

    let cleaned: Vec<CleanedRecord> = records
        .into_iter()
        .filter(|r| period.contains(r.pickup_datetime.date()))
        .map(|r| CleanedRecord {
            trip_date: r.pickup_datetime.date(),
            trip_distance: r.trip_distance,
            passenger_count: r.passenger_count,
            fare_amount: r.fare_amount,
            tip_amount: r.tip_amount,
            trip_duration: (r.dropoff_datetime - r.pickup_datetime).num_seconds() as f64,
        })
        .collect();

    debug!(
        input,
        kept = cleaned.len(),
        removed = input - cleaned.len(),
        "period filter applied"
    );

    cleaned
}
