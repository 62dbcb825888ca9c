//! Per-day aggregation of cleaned records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cleaner::CleanedRecord;
use crate::stats::Statistic;

/// One aggregated day within one source: the selected statistic of every
/// numeric column across all trips sharing that `trip_date`.
///
/// Before merge there is one row per (date, source); merge keeps rows from
/// different sources separate even when dates collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub trip_date: NaiveDate,
    pub trip_distance: f64,
    pub passenger_count: f64,
    pub fare_amount: f64,
    pub tip_amount: f64,
    pub trip_duration: f64,
}

/// The numeric columns carried through aggregation. `trip_date` is the group
/// key and is never aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    TripDistance,
    PassengerCount,
    FareAmount,
    TipAmount,
    TripDuration,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 5] = [
        NumericColumn::TripDistance,
        NumericColumn::PassengerCount,
        NumericColumn::FareAmount,
        NumericColumn::TipAmount,
        NumericColumn::TripDuration,
    ];

    /// Title-case words for series naming ("Fare Amount").
    pub fn title(&self) -> &'static str {
        match self {
            NumericColumn::TripDistance => "Trip Distance",
            NumericColumn::PassengerCount => "Passenger Count",
            NumericColumn::FareAmount => "Fare Amount",
            NumericColumn::TipAmount => "Tip Amount",
            NumericColumn::TripDuration => "Trip Duration",
        }
    }

    pub fn value(&self, row: &AggregatedRow) -> f64 {
        match self {
            NumericColumn::TripDistance => row.trip_distance,
            NumericColumn::PassengerCount => row.passenger_count,
            NumericColumn::FareAmount => row.fare_amount,
            NumericColumn::TipAmount => row.tip_amount,
            NumericColumn::TripDuration => row.trip_duration,
        }
    }
}

/// Groups records by `trip_date` and computes `statistic` per numeric column.
///
/// Returns one row per distinct date, ascending. Empty input yields an empty
/// result, never an error. Output depends only on the multiset of records
/// per date, not their order.
pub fn aggregate_by_date(records: &[CleanedRecord], statistic: Statistic) -> Vec<AggregatedRow> {
    let mut groups: BTreeMap<NaiveDate, Vec<&CleanedRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.trip_date).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(trip_date, group)| {
            let column = |f: fn(&CleanedRecord) -> f64| {
                let values: Vec<f64> = group.iter().map(|r| f(r)).collect();
                statistic.apply(&values)
            };

            AggregatedRow {
                trip_date,
                trip_distance: column(|r| r.trip_distance),
                passenger_count: column(|r| r.passenger_count),
                fare_amount: column(|r| r.fare_amount),
                tip_amount: column(|r| r.tip_amount),
                trip_duration: column(|r| r.trip_duration),
            }
        })
        .collect()
}
