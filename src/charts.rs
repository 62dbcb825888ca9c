//! Chart series construction from persisted aggregate tables.
//!
//! Builds the structures the presentation layer renders: multi-line trend
//! series per (statistic, column) pair and fare/tip correlation scatters per
//! statistic, each carrying a calendar gap set so rendering can suppress
//! day ranges with no data instead of stretching lines across them.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::NumericColumn;
use crate::output::AggregateTable;

/// Y-axis scale hint. Logarithmic is presentation-only: series values are
/// never log-transformed, and zero or negative values under log scale are
/// the renderer's hazard to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Trend,
    Correlation,
}

/// One line on the trend chart: a statistic of one column over time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// One scatter on the correlation chart: fare vs tip per aggregated day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    /// Hover-label template identifying each point as a fare/tip pair.
    pub hover_template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub series: Vec<LineSeries>,
    pub gap_dates: BTreeSet<NaiveDate>,
    pub y_scale: AxisScale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationChart {
    pub series: Vec<ScatterSeries>,
    pub gap_dates: BTreeSet<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Chart {
    Trend(TrendChart),
    Correlation(CorrelationChart),
}

/// Computes the calendar days missing from `reference`: every date between
/// the earliest and latest observed date (inclusive) that has no row.
///
/// The reference table is an explicit parameter; callers decide which table
/// anchors the chart's x-axis. Every in-range date lands in exactly one of
/// {observed, gap}.
pub fn gap_dates(reference: &AggregateTable) -> BTreeSet<NaiveDate> {
    let observed: BTreeSet<NaiveDate> = reference.rows.iter().map(|r| r.trip_date).collect();

    let (Some(&first), Some(&last)) = (observed.first(), observed.last()) else {
        return BTreeSet::new();
    };

    let mut gaps = BTreeSet::new();
    let mut day = first;
    while day <= last {
        if !observed.contains(&day) {
            gaps.insert(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    gaps
}

/// Builds the trend chart: one line per (statistic, numeric column) pair,
/// named `"<Statistic> <Column>"`, e.g. "Mean Fare Amount".
///
/// All tables are assumed to span the same date range; the gap set is taken
/// from the last table referenced and applied to the whole chart.
pub fn trend_chart(tables: &[AggregateTable], y_scale: AxisScale) -> TrendChart {
    let mut series = Vec::new();
    for table in tables {
        for column in NumericColumn::ALL {
            series.push(LineSeries {
                name: format!("{} {}", table.statistic.title(), column.title()),
                points: table
                    .rows
                    .iter()
                    .map(|row| (row.trip_date, column.value(row)))
                    .collect(),
            });
        }
    }

    let gap_dates = tables.last().map(gap_dates).unwrap_or_default();

    TrendChart {
        series,
        gap_dates,
        y_scale,
    }
}

/// Builds the correlation chart: one fare/tip scatter per statistic, with
/// the gap set attached for its date-based axis context.
pub fn correlation_chart(tables: &[AggregateTable]) -> CorrelationChart {
    let series = tables
        .iter()
        .map(|table| ScatterSeries {
            name: format!("{} Fare vs Tip", table.statistic.title()),
            points: table
                .rows
                .iter()
                .map(|row| (row.fare_amount, row.tip_amount))
                .collect(),
            hover_template: "fare $%{x:.2f}<br>tip $%{y:.2f}".to_string(),
        })
        .collect();

    let gap_dates = tables.last().map(gap_dates).unwrap_or_default();

    CorrelationChart { series, gap_dates }
}

/// Dispatches on chart kind. `y_scale` only applies to the trend chart.
pub fn build_chart(kind: ChartKind, tables: &[AggregateTable], y_scale: AxisScale) -> Chart {
    match kind {
        ChartKind::Trend => Chart::Trend(trend_chart(tables, y_scale)),
        ChartKind::Correlation => Chart::Correlation(correlation_chart(tables)),
    }
}
