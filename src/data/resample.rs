//! Data frequency resampling
//!
//! Aggregates daily rows into calendar-month means. Each output row is
//! labelled with the last day of its month.

use crate::data::table::{ColumnKind, ExchangeRateTable, Series};
use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use log::debug;

/// Trait for resampling a table to a lower frequency
pub trait Resampler {
    fn resample(&self, table: &ExchangeRateTable) -> Result<ExchangeRateTable>;
}

/// Running mean over the present values of one column within a period
#[derive(Debug, Default, Clone, Copy)]
struct MeanAggregator {
    sum: f64,
    count: usize,
}

impl MeanAggregator {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn build(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Daily to monthly mean resampler
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyMeans;

impl MonthlyMeans {
    /// Create new resampler
    pub fn new() -> Self {
        Self
    }

    /// Last calendar day of the month containing `date`
    pub fn month_end(date: NaiveDate) -> NaiveDate {
        let (year, month) = if date.month() == 12 {
            (date.year() + 1, 1)
        } else {
            (date.year(), date.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first| first.pred_opt())
            .unwrap_or(date)
    }

    /// Contiguous row ranges sharing a (year, month); input must be date-sorted
    fn group_by_month(dates: &[NaiveDate]) -> Vec<(NaiveDate, std::ops::Range<usize>)> {
        let mut groups = Vec::new();
        let mut start = 0;

        for i in 1..=dates.len() {
            let boundary = i == dates.len()
                || (dates[i].year(), dates[i].month())
                    != (dates[start].year(), dates[start].month());
            if boundary {
                groups.push((Self::month_end(dates[start]), start..i));
                start = i;
            }
        }

        groups
    }
}

impl Resampler for MonthlyMeans {
    fn resample(&self, table: &ExchangeRateTable) -> Result<ExchangeRateTable> {
        if table.is_empty() {
            return ExchangeRateTable::new(
                Vec::new(),
                table
                    .columns()
                    .iter()
                    .map(|s| Series::new(s.name.clone(), ColumnKind::Float, Vec::new()))
                    .collect(),
            );
        }

        let groups = Self::group_by_month(table.dates());
        debug!(
            "Resampling {} daily rows into {} months",
            table.shape().0,
            groups.len()
        );

        let dates = groups.iter().map(|(label, _)| *label).collect();
        let columns = table
            .columns()
            .iter()
            .map(|series| {
                let values = groups
                    .iter()
                    .map(|(_, range)| {
                        let mut agg = MeanAggregator::default();
                        for &v in &series.values[range.clone()] {
                            agg.add(v);
                        }
                        agg.build()
                    })
                    .collect();
                Series::new(series.name.clone(), ColumnKind::Float, values)
            })
            .collect();

        ExchangeRateTable::new(dates, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(MonthlyMeans::month_end(d(2020, 2, 10)), d(2020, 2, 29));
        assert_eq!(MonthlyMeans::month_end(d(2021, 2, 1)), d(2021, 2, 28));
        assert_eq!(MonthlyMeans::month_end(d(2021, 12, 5)), d(2021, 12, 31));
        assert_eq!(MonthlyMeans::month_end(d(2021, 4, 30)), d(2021, 4, 30));
    }

    #[test]
    fn test_monthly_means() {
        let table = ExchangeRateTable::new(
            vec![d(2020, 1, 2), d(2020, 1, 3), d(2020, 2, 3), d(2020, 2, 4), d(2020, 2, 5)],
            vec![Series::new(
                "USDINR Curncy",
                ColumnKind::Integer,
                vec![Some(70.0), Some(72.0), Some(71.0), None, Some(73.0)],
            )],
        )
        .unwrap();

        let monthly = MonthlyMeans::new().resample(&table).unwrap();
        assert_eq!(monthly.dates(), &[d(2020, 1, 31), d(2020, 2, 29)]);

        let series = monthly.column("USDINR Curncy").unwrap();
        assert_eq!(series.kind, ColumnKind::Float);
        assert_relative_eq!(series.values[0].unwrap(), 71.0);
        assert_relative_eq!(series.values[1].unwrap(), 72.0);
    }

    #[test]
    fn test_gap_months_not_filled() {
        let table = ExchangeRateTable::new(
            vec![d(2020, 1, 15), d(2020, 4, 15)],
            vec![Series::from_values("A", &[1.0, 2.0])],
        )
        .unwrap();

        let monthly = MonthlyMeans::new().resample(&table).unwrap();
        assert_eq!(monthly.dates(), &[d(2020, 1, 31), d(2020, 4, 30)]);
    }

    #[test]
    fn test_all_missing_month_is_missing() {
        let table = ExchangeRateTable::new(
            vec![d(2020, 1, 15), d(2020, 2, 15)],
            vec![Series::new("A", ColumnKind::Float, vec![None, Some(2.0)])],
        )
        .unwrap();

        let monthly = MonthlyMeans::new().resample(&table).unwrap();
        assert_eq!(monthly.column("A").unwrap().values, vec![None, Some(2.0)]);
    }

    #[test]
    fn test_empty_table() {
        let table =
            ExchangeRateTable::new(Vec::new(), vec![Series::from_values("A", &[])]).unwrap();
        let monthly = MonthlyMeans::new().resample(&table).unwrap();
        assert_eq!(monthly.shape(), (0, 1));
    }
}
