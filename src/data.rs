//! Data loading and preparation
//!
//! - `table`: the date-indexed exchange rate table
//! - `loader`: CSV reader
//! - `resample`: daily to monthly aggregation

pub mod loader;
pub mod resample;
pub mod table;

pub use loader::{CsvFormat, RateTableReader};
pub use resample::{MonthlyMeans, Resampler};
pub use table::{ColumnInfo, ColumnKind, ExchangeRateTable, Series, TableSummary};
