//! # em-fx-scan
//!
//! Correlation and Granger causality analysis of emerging-market currency
//! pairs against a reference series.
//!
//! The pipeline loads a wide CSV of daily rates, checks it for gaps and
//! duplicates, scans every column for strong correlation with the reference,
//! aggregates to monthly means for charting, and runs a fixed-lag Granger
//! test over a curated list of column pairs.
//!
//! ## Example
//!
//! ```rust,no_run
//! use em_fx_scan::prelude::*;
//! use std::path::Path;
//!
//! let table = RateTableReader::new().load_csv(Path::new("EM_basket_pairs.csv"))?;
//!
//! let correlated = CorrelationScanner::new("USDINR Curncy")
//!     .with_threshold(0.8)
//!     .scan(&table)?;
//!
//! let report = CausalityScanner::default().scan(&table)?;
//! for pair in report.significant() {
//!     println!("{}", pair);
//! }
//! # Ok::<(), em_fx_scan::error::AnalysisError>(())
//! ```

pub mod causality;
pub mod config;
pub mod correlation;
pub mod data;
pub mod error;
pub mod granger;
pub mod plot;
pub mod quality;
pub mod report;
pub mod stats;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::causality::{CausalityReport, CausalityResult, CausalityScanner, SeriesPair};
    pub use crate::config::AnalysisConfig;
    pub use crate::correlation::{CorrelatedPair, CorrelationMatrix, CorrelationScanner};
    pub use crate::data::{ExchangeRateTable, MonthlyMeans, RateTableReader, Resampler, Series};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::granger::{GrangerResult, GrangerTest};
    pub use crate::quality::QualityReport;
    pub use crate::report::{Analysis, AnalysisReport};
}
