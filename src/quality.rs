//! Data quality checks
//!
//! Counts missing cells and duplicated rows. Reporting only: the table is
//! never modified.

use crate::data::table::ExchangeRateTable;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Missing-value count for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Result of a quality check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub rows: usize,
    pub columns: usize,
    pub missing_by_column: Vec<MissingCount>,
    pub total_missing: usize,
    /// Rows whose values repeat an earlier row (date excluded)
    pub duplicate_rows: usize,
    /// Rows whose date repeats an earlier row's date
    pub duplicate_dates: usize,
}

impl QualityReport {
    /// Run every check over `table`
    pub fn check(table: &ExchangeRateTable) -> Self {
        let (rows, columns) = table.shape();

        let missing_by_column: Vec<MissingCount> = table
            .columns()
            .iter()
            .map(|s| MissingCount {
                column: s.name.clone(),
                missing: s.null_count(),
            })
            .collect();
        let total_missing = missing_by_column.iter().map(|m| m.missing).sum();

        let duplicate_rows = count_duplicate_rows(table);
        let duplicate_dates = table.dates().windows(2).filter(|w| w[0] == w[1]).count();

        let report = Self {
            rows,
            columns,
            missing_by_column,
            total_missing,
            duplicate_rows,
            duplicate_dates,
        };

        if report.is_clean() {
            info!("Quality check passed: {} rows, {} columns", rows, columns);
        } else {
            warn!(
                "Quality check: {} missing values, {} duplicate rows, {} duplicate dates",
                total_missing, duplicate_rows, duplicate_dates
            );
        }

        report
    }

    /// No missing values and no duplicates
    pub fn is_clean(&self) -> bool {
        self.total_missing == 0 && self.duplicate_rows == 0 && self.duplicate_dates == 0
    }

    /// Missing count for one column
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.missing_by_column
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.missing)
    }
}

// Missing cells compare equal to each other, matching dataframe semantics.
fn count_duplicate_rows(table: &ExchangeRateTable) -> usize {
    let mut seen: HashSet<Vec<Option<u64>>> = HashSet::with_capacity(table.shape().0);
    let mut duplicates = 0;

    for i in 0..table.shape().0 {
        let key: Vec<Option<u64>> = table
            .columns()
            .iter()
            .map(|s| s.values[i].map(f64::to_bits))
            .collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }

    duplicates
}
