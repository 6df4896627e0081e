//! CSV loading for exchange rate tables
//!
//! Reads a wide CSV: one date column plus one numeric column per currency
//! pair. Columns that are not entirely numeric are skipped.

use crate::data::table::{ColumnKind, ExchangeRateTable, Series};
use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// CSV layout description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvFormat {
    pub date_column: String,
    /// chrono format string for the date column
    pub date_format: String,
    pub delimiter: u8,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            date_column: "Dates".to_string(),
            date_format: "%d-%m-%y".to_string(),
            delimiter: b',',
        }
    }
}

/// Reader producing [`ExchangeRateTable`]s from CSV input
#[derive(Debug, Clone, Default)]
pub struct RateTableReader {
    format: CsvFormat,
}

impl RateTableReader {
    /// Create new reader with default format
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom format
    pub fn with_format(format: CsvFormat) -> Self {
        Self { format }
    }

    /// Current CSV layout
    pub fn format(&self) -> &CsvFormat {
        &self.format
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &Path) -> Result<ExchangeRateTable> {
        info!("Loading exchange rates from {}", path.display());
        let rdr = ReaderBuilder::new()
            .delimiter(self.format.delimiter)
            .trim(Trim::All)
            .from_path(path)?;
        self.read(rdr)
    }

    /// Load CSV content from any reader
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<ExchangeRateTable> {
        let rdr = ReaderBuilder::new()
            .delimiter(self.format.delimiter)
            .trim(Trim::All)
            .from_reader(reader);
        self.read(rdr)
    }

    fn read<R: Read>(&self, mut rdr: csv::Reader<R>) -> Result<ExchangeRateTable> {
        let headers = rdr.headers()?.clone();
        let date_idx = Self::find_column(&headers, &self.format.date_column)?;

        let mut dates = Vec::new();
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

        for (index, result) in rdr.records().enumerate() {
            let record = result?;
            // File line: header is line 1
            let row = index + 2;

            let date_str = record.get(date_idx).ok_or_else(|| AnalysisError::ParseError {
                row,
                message: "missing date".to_string(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, &self.format.date_format).map_err(
                |e| AnalysisError::ParseError {
                    row,
                    message: format!(
                        "invalid date '{}' for format '{}': {}",
                        date_str, self.format.date_format, e
                    ),
                },
            )?;
            dates.push(date);

            for (col, cells) in raw.iter_mut().enumerate() {
                if col != date_idx {
                    cells.push(record.get(col).unwrap_or("").to_string());
                }
            }
        }

        let mut columns = Vec::new();
        for (col, cells) in raw.into_iter().enumerate() {
            if col == date_idx {
                continue;
            }
            let name = &headers[col];
            match parse_numeric_column(&cells) {
                Some((kind, values)) => columns.push(Series::new(name, kind, values)),
                None => warn!("Skipping non-numeric column '{}'", name),
            }
        }

        debug!("Parsed {} rows, {} numeric columns", dates.len(), columns.len());
        let table = ExchangeRateTable::new(dates, columns)?;
        if let Some((start, end)) = table.date_range() {
            info!(
                "Loaded {} rows x {} columns ({} to {})",
                table.shape().0,
                table.shape().1,
                start,
                end
            );
        }
        Ok(table)
    }

    fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
    }
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("na")
}

/// Parse a column, returning `None` if any present cell is not a number
fn parse_numeric_column(cells: &[String]) -> Option<(ColumnKind, Vec<Option<f64>>)> {
    let mut kind = ColumnKind::Integer;
    let mut values = Vec::with_capacity(cells.len());

    for cell in cells {
        if is_missing(cell) {
            // pandas promotes an int column with gaps to float
            kind = ColumnKind::Float;
            values.push(None);
            continue;
        }
        if cell.parse::<i64>().is_err() {
            kind = ColumnKind::Float;
        }
        values.push(Some(cell.parse::<f64>().ok()?));
    }

    Some((kind, values))
}
