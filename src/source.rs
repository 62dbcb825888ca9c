//! Record source descriptors and calendar-period bounds.

use chrono::NaiveDate;

use crate::error::PipelineError;

/// One raw input: where to get it and which calendar month it covers.
///
/// The period label's first seven characters are parsed as `YYYY-MM`; the
/// rest is free-form description (e.g. `"2019-01 NYC taxi data"`).
#[derive(Debug, Clone)]
pub struct RecordSource {
    pub label: String,
    pub location: String,
}

impl RecordSource {
    pub fn new(label: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            location: location.into(),
        }
    }

    pub fn period(&self) -> Result<Period, PipelineError> {
        Period::from_label(&self.label)
    }
}

/// Inclusive first/last day of one calendar month. Used only as a filter
/// bound for pickup timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl Period {
    /// Derives the month bounds from a label whose prefix is `YYYY-MM`.
    pub fn from_label(label: &str) -> Result<Self, PipelineError> {
        let bad = || PipelineError::BadPeriodLabel(label.to_string());

        let year_month = label.get(0..7).ok_or_else(bad)?;
        let (year, month) = year_month.split_once('-').ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;

        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(bad)?;
        let last_day = next_month.pred_opt().ok_or_else(bad)?;

        Ok(Self {
            first_day,
            last_day,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_from_plain_label() {
        let p = Period::from_label("2019-01").unwrap();
        assert_eq!(p.first_day, date(2019, 1, 1));
        assert_eq!(p.last_day, date(2019, 1, 31));
    }

    #[test]
    fn test_period_from_descriptive_label() {
        let p = Period::from_label("2020-01 NYC taxi data").unwrap();
        assert_eq!(p.first_day, date(2020, 1, 1));
        assert_eq!(p.last_day, date(2020, 1, 31));
    }

    #[test]
    fn test_period_december_rolls_year() {
        let p = Period::from_label("2019-12").unwrap();
        assert_eq!(p.last_day, date(2019, 12, 31));
    }

    #[test]
    fn test_period_leap_february() {
        let p = Period::from_label("2020-02").unwrap();
        assert_eq!(p.last_day, date(2020, 2, 29));
    }

    #[test]
    fn test_period_bad_labels() {
        assert!(Period::from_label("taxi").is_err());
        assert!(Period::from_label("2019/01").is_err());
        assert!(Period::from_label("2019-13").is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let p = Period::from_label("2019-01").unwrap();
        assert!(p.contains(date(2019, 1, 1)));
        assert!(p.contains(date(2019, 1, 31)));
        assert!(!p.contains(date(2018, 12, 31)));
        assert!(!p.contains(date(2019, 2, 1)));
    }
}
