//! Analysis configuration
//!
//! Every field defaults to the constants of the USDINR study, so an empty
//! config file is valid.

use crate::causality::{CausalityScanner, SeriesPair};
use crate::correlation::{CorrelationScanner, DEFAULT_REFERENCE, DEFAULT_THRESHOLD};
use crate::data::loader::CsvFormat;
use crate::error::{AnalysisError, Result};
use crate::granger::{DEFAULT_ALPHA, DEFAULT_LAG};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column every other series is compared against
    pub reference: String,
    pub threshold: f64,
    pub max_lag: usize,
    pub alpha: f64,
    pub pairs: Vec<SeriesPair>,
    pub date_column: String,
    pub date_format: String,
    /// Where SVG charts go; nothing is rendered when unset
    pub plot_dir: Option<PathBuf>,
    /// Columns to chart monthly; the correlated set when empty
    pub plot_columns: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let format = CsvFormat::default();
        Self {
            reference: DEFAULT_REFERENCE.to_string(),
            threshold: DEFAULT_THRESHOLD,
            max_lag: DEFAULT_LAG,
            alpha: DEFAULT_ALPHA,
            pairs: SeriesPair::defaults(),
            date_column: format.date_column,
            date_format: format.date_format,
            plot_dir: None,
            plot_columns: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    #[cfg(feature = "cli")]
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| AnalysisError::ConfigError(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(AnalysisError::ConfigError(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::ConfigError(format!(
                "alpha must be within (0, 1), got {}",
                self.alpha
            )));
        }
        if self.max_lag == 0 {
            return Err(AnalysisError::ConfigError("max_lag must be at least 1".to_string()));
        }
        if self.reference.is_empty() {
            return Err(AnalysisError::ConfigError("reference column is empty".to_string()));
        }
        Ok(())
    }

    /// CSV layout for the loader
    pub fn csv_format(&self) -> CsvFormat {
        CsvFormat {
            date_column: self.date_column.clone(),
            date_format: self.date_format.clone(),
            ..CsvFormat::default()
        }
    }

    /// Correlation scanner with the configured reference and threshold
    pub fn correlation_scanner(&self) -> CorrelationScanner {
        CorrelationScanner::new(self.reference.clone()).with_threshold(self.threshold)
    }

    /// Causality scanner with the configured pairs, lag and alpha
    pub fn causality_scanner(&self) -> CausalityScanner {
        CausalityScanner::new(self.pairs.clone())
            .with_lag(self.max_lag)
            .with_alpha(self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference, "USDINR Curncy");
        assert_eq!(config.max_lag, 1);
        assert_eq!(config.pairs.len(), 9);
        assert!(config.plot_dir.is_none());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad_threshold = AnalysisConfig {
            threshold: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(bad_threshold.validate().is_err());

        let bad_alpha = AnalysisConfig {
            alpha: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(bad_alpha.validate().is_err());

        let bad_lag = AnalysisConfig {
            max_lag: 0,
            ..AnalysisConfig::default()
        };
        assert!(bad_lag.validate().is_err());
    }

    #[test]
    fn test_scanners_follow_config() {
        let config = AnalysisConfig {
            threshold: 0.6,
            max_lag: 2,
            alpha: 0.1,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.correlation_scanner().threshold(), 0.6);
        let causality = config.causality_scanner();
        assert_eq!(causality.lag(), 2);
        assert_eq!(causality.alpha(), 0.1);
        assert_eq!(config.csv_format().date_format, "%d-%m-%y");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_from_toml() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            reference = "USDBRL Curncy"
            threshold = 0.7
            plot_dir = "charts"

            [[pairs]]
            candidate = "USDMXN Curncy"
            reference = "USDBRL Curncy"
            "#,
        )
        .unwrap();

        assert_eq!(config.reference, "USDBRL Curncy");
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.pairs, vec![SeriesPair::new("USDMXN Curncy", "USDBRL Curncy")]);
        assert_eq!(config.plot_dir, Some(PathBuf::from("charts")));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_from_toml_invalid() {
        assert!(AnalysisConfig::from_toml_str("alpha = 2.0").is_err());
        assert!(AnalysisConfig::from_toml_str("threshold = \"high\"").is_err());
    }
}
