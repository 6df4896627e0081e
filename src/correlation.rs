//! Correlation matrix and thresholded correlation scan
//!
//! The matrix is derived from the table on demand. The scanner picks out the
//! columns whose absolute Pearson correlation with a reference column
//! exceeds a threshold.

use crate::data::table::ExchangeRateTable;
use crate::error::{AnalysisError, Result};
use crate::stats::pearson_pairwise;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Default reference series
pub const DEFAULT_REFERENCE: &str = "USDINR Curncy";

/// Default correlation threshold
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Square, symmetric matrix of pairwise Pearson correlations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Compute the matrix over the named columns
    ///
    /// Each coefficient uses the rows where both columns are present.
    pub fn compute(table: &ExchangeRateTable, columns: &[&str]) -> Result<Self> {
        let series = columns
            .iter()
            .map(|name| table.column(name))
            .collect::<Result<Vec<_>>>()?;

        let n = series.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson_pairwise(&series[i].values, &series[j].values);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        debug!("Computed {}x{} correlation matrix", n, n);
        Ok(Self {
            labels: columns.iter().map(|s| s.to_string()).collect(),
            values,
        })
    }

    /// Compute the matrix over every column of the table
    pub fn compute_all(table: &ExchangeRateTable) -> Result<Self> {
        Self::compute(table, &table.column_names())
    }

    /// Column labels in matrix order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of labelled columns
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.labels
            .iter()
            .position(|l| l == name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Coefficient at (a, b)
    pub fn get(&self, a: &str, b: &str) -> Result<f64> {
        Ok(self.values[self.index_of(a)?][self.index_of(b)?])
    }

    /// Coefficient by position
    pub fn at(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied()
    }

    /// One column of the matrix as (label, coefficient) pairs
    pub fn column(&self, name: &str) -> Result<Vec<(&str, f64)>> {
        let idx = self.index_of(name)?;
        Ok(self
            .labels
            .iter()
            .zip(&self.values)
            .map(|(label, row)| (label.as_str(), row[idx]))
            .collect())
    }

    /// Matrix rows in label order
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }
}

/// A column correlated with the reference above the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub name: String,
    pub coefficient: f64,
}

/// Filters columns by correlation against a reference column
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationScanner {
    reference: String,
    threshold: f64,
}

impl CorrelationScanner {
    /// Scanner against `reference` with the default threshold
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the absolute correlation threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Reference column name
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Threshold a correlation must exceed
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Columns with |corr(c, reference)| > threshold, in table order
    ///
    /// The reference column itself qualifies whenever the threshold is
    /// below one.
    pub fn scan(&self, table: &ExchangeRateTable) -> Result<Vec<CorrelatedPair>> {
        let reference = table.column(&self.reference)?;

        let pairs: Vec<CorrelatedPair> = table
            .columns()
            .iter()
            .map(|s| CorrelatedPair {
                name: s.name.clone(),
                coefficient: pearson_pairwise(&s.values, &reference.values),
            })
            .filter(|p| self.passes(p.coefficient))
            .collect();

        info!(
            "{} columns correlate with {} above {}",
            pairs.len(),
            self.reference,
            self.threshold
        );
        Ok(pairs)
    }

    /// Same filter over an already computed matrix
    pub fn scan_matrix(&self, matrix: &CorrelationMatrix) -> Result<Vec<CorrelatedPair>> {
        Ok(matrix
            .column(&self.reference)?
            .into_iter()
            .filter(|(_, r)| self.passes(*r))
            .map(|(name, coefficient)| CorrelatedPair {
                name: name.to_string(),
                coefficient,
            })
            .collect())
    }

    // NaN never passes
    fn passes(&self, coefficient: f64) -> bool {
        coefficient.abs() > self.threshold
    }
}

impl Default for CorrelationScanner {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE)
    }
}
