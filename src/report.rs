//! End-to-end analysis run
//!
//! Ties the pipeline stages together over one loaded table and collects their
//! outputs into a serializable report.

use crate::causality::CausalityReport;
use crate::config::AnalysisConfig;
use crate::correlation::{CorrelatedPair, CorrelationMatrix};
use crate::data::resample::{MonthlyMeans, Resampler};
use crate::data::table::{ExchangeRateTable, TableSummary};
use crate::error::Result;
use crate::plot;
use crate::quality::QualityReport;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: TableSummary,
    pub quality: QualityReport,
    pub reference: String,
    pub threshold: f64,
    pub correlated: Vec<CorrelatedPair>,
    pub causality: CausalityReport,
    /// Monthly rows produced by resampling
    pub monthly_rows: usize,
    pub charts: Vec<PathBuf>,
}

impl AnalysisReport {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of the correlated columns
    pub fn correlated_names(&self) -> Vec<&str> {
        self.correlated.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Pipeline over one table with one configuration
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    /// Create an analysis, validating `config`
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Correlation matrix over every numeric column
    pub fn correlation_matrix(&self, table: &ExchangeRateTable) -> Result<CorrelationMatrix> {
        CorrelationMatrix::compute_all(table)
    }

    /// Quality checks, both scans and monthly resampling over `table`
    pub fn run(&self, table: &ExchangeRateTable) -> Result<AnalysisReport> {
        let summary = table.summary();
        let quality = QualityReport::check(table);

        let matrix = self.correlation_matrix(table)?;
        let correlated = self.config.correlation_scanner().scan_matrix(&matrix)?;

        let monthly = MonthlyMeans::new().resample(table)?;
        let charts = match &self.config.plot_dir {
            Some(dir) => self.render(&matrix, &monthly, &correlated, dir)?,
            None => Vec::new(),
        };

        let causality = self.config.causality_scanner().scan(table)?;

        info!(
            "Analysis complete: {} correlated, {} causal at alpha={}",
            correlated.len(),
            causality.significant().len(),
            self.config.alpha
        );

        Ok(AnalysisReport {
            summary,
            quality,
            reference: self.config.reference.clone(),
            threshold: self.config.threshold,
            correlated,
            causality,
            monthly_rows: monthly.shape().0,
            charts,
        })
    }

    fn render(
        &self,
        matrix: &CorrelationMatrix,
        monthly: &ExchangeRateTable,
        correlated: &[CorrelatedPair],
        dir: &std::path::Path,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let heatmap = dir.join("correlation_matrix.svg");
        plot::render_heatmap(matrix, Some(&self.config.reference), &heatmap)?;

        let columns: Vec<&str> = if self.config.plot_columns.is_empty() {
            correlated.iter().map(|p| p.name.as_str()).collect()
        } else {
            self.config.plot_columns.iter().map(String::as_str).collect()
        };

        let mut charts = vec![heatmap];
        charts.extend(plot::render_monthly_charts(monthly, &columns, dir)?);
        Ok(charts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::causality::SeriesPair;
    use crate::data::table::Series;
    use chrono::{Duration, NaiveDate};

    fn table() -> ExchangeRateTable {
        let n = 90;
        let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let dates = (0..n).map(|i| start + Duration::days(i)).collect();
        let base: Vec<f64> = (0..n).map(|i| 40.0 + i as f64 * 0.1 + ((i * 7) % 5) as f64 * 0.3).collect();
        let follower: Vec<f64> = base.iter().map(|v| v * 2.0 + 1.0).collect();
        let wobble: Vec<f64> = (0..n).map(|i| ((i * 13) % 11) as f64).collect();
        ExchangeRateTable::new(
            dates,
            vec![
                Series::from_values("REF", &base),
                Series::from_values("FOLLOW", &follower),
                Series::from_values("WOBBLE", &wobble),
            ],
        )
        .unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            reference: "REF".to_string(),
            pairs: vec![SeriesPair::new("WOBBLE", "REF")],
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_run_without_plots() {
        let report = Analysis::new(config()).unwrap().run(&table()).unwrap();
        assert_eq!(report.correlated_names(), vec!["REF", "FOLLOW"]);
        assert_eq!(report.monthly_rows, 3);
        assert_eq!(report.causality.len(), 1);
        assert!(report.charts.is_empty());
        assert!(report.quality.is_clean());
    }

    #[test]
    fn test_run_with_plots() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            plot_dir: Some(dir.path().to_path_buf()),
            ..config()
        };
        let report = Analysis::new(config).unwrap().run(&table()).unwrap();
        assert_eq!(report.charts.len(), 3);
        assert!(report.charts.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_report_json() {
        let report = Analysis::new(config()).unwrap().run(&table()).unwrap();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["reference"], "REF");
        assert_eq!(value["causality"]["lag"], 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            alpha: 1.5,
            ..config()
        };
        assert!(Analysis::new(config).is_err());
    }
}
