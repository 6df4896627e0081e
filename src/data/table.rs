//! Date-indexed table of exchange rate series
//!
//! One row per trading day, one column per currency pair. Values are kept
//! column-major since every downstream consumer (correlation, resampling,
//! causality) walks whole series at a time.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source dtype of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Float,
    Integer,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Float => write!(f, "float64"),
            ColumnKind::Integer => write!(f, "int64"),
        }
    }
}

/// A single named series aligned with the table's dates
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Create a series with an explicit kind
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Float series with no missing values
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, ColumnKind::Float, values.iter().copied().map(Some).collect())
    }

    /// Number of values, missing included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of present (non-missing) values
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Number of missing values
    pub fn null_count(&self) -> usize {
        self.len() - self.non_null_count()
    }
}

/// Per-column line of the table summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub non_null: usize,
}

/// Concise structural summary of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub rows: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub columns: Vec<ColumnInfo>,
    pub float_columns: usize,
    pub integer_columns: usize,
}

/// Exchange rate table indexed by date
///
/// Rows are ordered by date. Missing cells and duplicate dates are allowed
/// here and surfaced by [`crate::quality::QualityReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Series>,
}

impl ExchangeRateTable {
    /// Build a table, sorting rows by date
    ///
    /// Every series must have one value per date. The sort is stable so rows
    /// sharing a date keep their input order.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<Series>) -> Result<Self> {
        for series in &columns {
            if series.len() != dates.len() {
                return Err(AnalysisError::DataError(format!(
                    "Column '{}' has {} values, expected {}",
                    series.name,
                    series.len(),
                    dates.len()
                )));
            }
        }

        for (i, series) in columns.iter().enumerate() {
            if columns[..i].iter().any(|s| s.name == series.name) {
                return Err(AnalysisError::DataError(format!(
                    "Duplicate column name '{}'",
                    series.name
                )));
            }
        }

        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        if order.iter().enumerate().all(|(pos, &i)| pos == i) {
            return Ok(Self { dates, columns });
        }

        let sorted_dates = order.iter().map(|&i| dates[i]).collect();
        let sorted_columns = columns
            .into_iter()
            .map(|s| Series {
                values: order.iter().map(|&i| s.values[i]).collect(),
                ..s
            })
            .collect();

        Ok(Self {
            dates: sorted_dates,
            columns: sorted_columns,
        })
    }

    /// Row dates, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// All columns in table order
    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Series> {
        self.columns
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Whether a column named `name` exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|s| s.name == name)
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.dates.len(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First and last date
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Values of one row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<Option<f64>>> {
        if index >= self.dates.len() {
            return None;
        }
        Some(self.columns.iter().map(|s| s.values[index]).collect())
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> ExchangeRateTable {
        self.slice(0, n.min(self.dates.len()))
    }

    /// Last `n` rows
    pub fn tail(&self, n: usize) -> ExchangeRateTable {
        let len = self.dates.len();
        self.slice(len.saturating_sub(n), len)
    }

    /// Keep only the named columns, in the given order
    pub fn select(&self, names: &[&str]) -> Result<ExchangeRateTable> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            dates: self.dates.clone(),
            columns,
        })
    }

    fn slice(&self, start: usize, end: usize) -> ExchangeRateTable {
        Self {
            dates: self.dates[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|s| Series {
                    name: s.name.clone(),
                    kind: s.kind,
                    values: s.values[start..end].to_vec(),
                })
                .collect(),
        }
    }

    /// Structural summary, the equivalent of a dataframe `info()`
    pub fn summary(&self) -> TableSummary {
        let columns: Vec<ColumnInfo> = self
            .columns
            .iter()
            .map(|s| ColumnInfo {
                name: s.name.clone(),
                kind: s.kind,
                non_null: s.non_null_count(),
            })
            .collect();

        let range = self.date_range();
        TableSummary {
            rows: self.dates.len(),
            start: range.map(|(s, _)| s),
            end: range.map(|(_, e)| e),
            float_columns: columns.iter().filter(|c| c.kind == ColumnKind::Float).count(),
            integer_columns: columns.iter().filter(|c| c.kind == ColumnKind::Integer).count(),
            columns,
        }
    }
}

impl fmt::Display for ExchangeRateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", "Dates")?;
        for series in &self.columns {
            write!(f, " {:>14}", truncate(&series.name, 14))?;
        }
        writeln!(f)?;

        for (i, date) in self.dates.iter().enumerate() {
            write!(f, "{:<12}", date.format("%Y-%m-%d"))?;
            for series in &self.columns {
                match series.values[i] {
                    Some(v) => write!(f, " {:>14.4}", v)?,
                    None => write!(f, " {:>14}", "NaN")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn truncate(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> ExchangeRateTable {
        ExchangeRateTable::new(
            vec![d(2020, 1, 3), d(2020, 1, 1), d(2020, 1, 2)],
            vec![
                Series::new("A", ColumnKind::Float, vec![Some(3.0), Some(1.0), None]),
                Series::new("B", ColumnKind::Integer, vec![Some(30.0), Some(10.0), Some(20.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_sorted_by_date() {
        let table = sample();
        assert_eq!(table.dates(), &[d(2020, 1, 1), d(2020, 1, 2), d(2020, 1, 3)]);
        assert_eq!(table.column("A").unwrap().values, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(
            table.column("B").unwrap().values,
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn test_missing_column_is_lookup_error() {
        let table = sample();
        match table.column("USDINR Curncy") {
            Err(AnalysisError::ColumnNotFound(name)) => assert_eq!(name, "USDINR Curncy"),
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = ExchangeRateTable::new(
            vec![d(2020, 1, 1)],
            vec![Series::from_values("A", &[1.0, 2.0])],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = ExchangeRateTable::new(
            vec![d(2020, 1, 1)],
            vec![Series::from_values("A", &[1.0]), Series::from_values("A", &[2.0])],
        );
        assert!(matches!(result, Err(AnalysisError::DataError(_))));
    }

    #[test]
    fn test_head_tail_and_shape() {
        let table = sample();
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.head(2).dates(), &[d(2020, 1, 1), d(2020, 1, 2)]);
        assert_eq!(table.tail(1).dates(), &[d(2020, 1, 3)]);
        assert_eq!(table.head(10).shape(), (3, 2));
        assert_eq!(table.tail(0).shape(), (0, 2));
    }

    #[test]
    fn test_summary_counts_kinds_and_nulls() {
        let summary = sample().summary();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.float_columns, 1);
        assert_eq!(summary.integer_columns, 1);
        assert_eq!(summary.columns[0].non_null, 2);
        assert_eq!(summary.start, Some(d(2020, 1, 1)));
        assert_eq!(summary.end, Some(d(2020, 1, 3)));
    }

    #[test]
    fn test_select_preserves_requested_order() {
        let table = sample().select(&["B", "A"]).unwrap();
        assert_eq!(table.column_names(), vec!["B", "A"]);
        assert!(sample().select(&["C"]).is_err());
    }
}
