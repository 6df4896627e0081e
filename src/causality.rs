//! Causality scan over a curated list of column pairs
//!
//! Each pair is (candidate, reference): the test asks whether lagged values
//! of the candidate help predict the reference.

use crate::correlation::DEFAULT_REFERENCE;
use crate::data::table::ExchangeRateTable;
use crate::error::{AnalysisError, Result};
use crate::granger::{GrangerResult, GrangerTest, DEFAULT_ALPHA, DEFAULT_LAG};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidates tested against the default reference
pub const DEFAULT_CANDIDATES: [&str; 9] = [
    "USDCOP Curncy",
    "USDMXN Curncy",
    "USDBRL Curncy",
    "USDHUF Curncy",
    "USDIDR Curncy",
    "USDRON Curncy",
    "USDCNH Curncy",
    "USDZAR Curncy",
    "USDRUB Curncy",
];

/// Ordered (candidate, reference) column pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesPair {
    pub candidate: String,
    pub reference: String,
}

impl SeriesPair {
    /// Pair testing whether `candidate` helps predict `reference`
    pub fn new(candidate: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            reference: reference.into(),
        }
    }

    /// Parse `CANDIDATE:REFERENCE`
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((c, r)) if !c.trim().is_empty() && !r.trim().is_empty() => {
                Ok(Self::new(c.trim(), r.trim()))
            }
            _ => Err(AnalysisError::ConfigError(format!(
                "invalid pair '{}', expected CANDIDATE:REFERENCE",
                s
            ))),
        }
    }

    /// The default curated pairs
    pub fn defaults() -> Vec<SeriesPair> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|c| SeriesPair::new(*c, DEFAULT_REFERENCE))
            .collect()
    }
}

impl fmt::Display for SeriesPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.candidate, self.reference)
    }
}

/// Outcome of the test for one pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalityResult {
    pub pair: SeriesPair,
    /// Result at the scan lag
    pub result: GrangerResult,
    /// Results at every lag up to the scan lag
    pub by_lag: Vec<GrangerResult>,
    pub rejects_null: bool,
}

impl CausalityResult {
    /// F-test p-value at the scan lag
    pub fn p_value(&self) -> f64 {
        self.result.p_value()
    }
}

/// All pair results of a scan, in scan order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalityReport {
    pub lag: usize,
    pub alpha: f64,
    pub results: Vec<CausalityResult>,
}

impl CausalityReport {
    /// Pairs rejecting the null at the scan's alpha
    pub fn significant(&self) -> Vec<&SeriesPair> {
        self.rejected_at(self.alpha)
    }

    /// Pairs whose p-value falls below `alpha`
    pub fn rejected_at(&self, alpha: f64) -> Vec<&SeriesPair> {
        self.results
            .iter()
            .filter(|r| r.result.rejects_null(alpha))
            .map(|r| &r.pair)
            .collect()
    }

    /// Result for one pair, if it was scanned
    pub fn get(&self, candidate: &str, reference: &str) -> Option<&CausalityResult> {
        self.results
            .iter()
            .find(|r| r.pair.candidate == candidate && r.pair.reference == reference)
    }

    /// Number of pairs tested
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Runs a fixed-lag Granger test over a list of column pairs
#[derive(Debug, Clone, PartialEq)]
pub struct CausalityScanner {
    pairs: Vec<SeriesPair>,
    lag: usize,
    alpha: f64,
}

impl Default for CausalityScanner {
    fn default() -> Self {
        Self::new(SeriesPair::defaults())
    }
}

impl CausalityScanner {
    /// Scanner over `pairs` with the default lag and alpha
    pub fn new(pairs: Vec<SeriesPair>) -> Self {
        Self {
            pairs,
            lag: DEFAULT_LAG,
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Set the lag
    pub fn with_lag(mut self, lag: usize) -> Self {
        self.lag = lag;
        self
    }

    /// Set the significance level
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Pairs in scan order
    pub fn pairs(&self) -> &[SeriesPair] {
        &self.pairs
    }

    /// Lag used for decisions
    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Significance level
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Test every pair in order
    ///
    /// Fails on the first pair naming a column the table lacks.
    pub fn scan(&self, table: &ExchangeRateTable) -> Result<CausalityReport> {
        let test = GrangerTest::new(self.lag);
        let mut results = Vec::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            let candidate = table.column(&pair.candidate)?;
            let reference = table.column(&pair.reference)?;

            let by_lag = test.test_up_to(&candidate.values, &reference.values)?;
            let result = by_lag
                .last()
                .cloned()
                .ok_or_else(|| AnalysisError::ConfigError("lag must be at least 1".to_string()))?;
            let rejects_null = result.rejects_null(self.alpha);

            debug!(
                "{}: F={:.4} p={:.4} reject={}",
                pair, result.f_test.statistic, result.f_test.p_value, rejects_null
            );
            results.push(CausalityResult {
                pair: pair.clone(),
                result,
                by_lag,
                rejects_null,
            });
        }

        let report = CausalityReport {
            lag: self.lag,
            alpha: self.alpha,
            results,
        };
        info!(
            "Causality scan: {} of {} pairs significant at alpha={}",
            report.significant().len(),
            report.len(),
            self.alpha
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Series;
    use chrono::{Duration, NaiveDate};

    fn noise(seed: u64, n: usize) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 11) as f64 / (1u64 << 53) as f64) - 0.5
            })
            .collect()
    }

    fn table() -> ExchangeRateTable {
        let n = 250;
        let start = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let dates = (0..n).map(|i| start + Duration::days(i as i64)).collect();

        let lead = noise(41, n);
        let unrelated = noise(43, n);
        let e = noise(47, n);
        let mut reference = vec![0.0; n];
        for t in 1..n {
            reference[t] = 0.5 * reference[t - 1] + lead[t - 1] + 0.05 * e[t];
        }

        ExchangeRateTable::new(
            dates,
            vec![
                Series::from_values("REF", &reference),
                Series::from_values("LEAD", &lead),
                Series::from_values("NOISE", &unrelated),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_scan_flags_leading_series() {
        let scanner = CausalityScanner::new(vec![
            SeriesPair::new("LEAD", "REF"),
            SeriesPair::new("NOISE", "REF"),
        ]);
        let report = scanner.scan(&table()).unwrap();

        assert_eq!(report.len(), 2);
        assert!(report.get("LEAD", "REF").unwrap().rejects_null);
        assert!(report.significant().contains(&&SeriesPair::new("LEAD", "REF")));
        assert!(
            report.get("LEAD", "REF").unwrap().p_value()
                < report.get("NOISE", "REF").unwrap().p_value()
        );
        assert_eq!(report.results[0].by_lag.len(), 1);
    }

    #[test]
    fn test_rejected_set_grows_with_alpha() {
        let scanner = CausalityScanner::new(vec![
            SeriesPair::new("LEAD", "REF"),
            SeriesPair::new("NOISE", "REF"),
            SeriesPair::new("REF", "NOISE"),
        ]);
        let report = scanner.scan(&table()).unwrap();

        assert!(report.rejected_at(0.0).is_empty());
        assert_eq!(report.rejected_at(1.0 + f64::EPSILON).len(), 3);

        let mut previous = 0;
        for alpha in [0.001, 0.01, 0.05, 0.1, 0.5, 0.9] {
            let rejected = report.rejected_at(alpha).len();
            assert!(rejected >= previous);
            previous = rejected;
        }
    }

    #[test]
    fn test_flat_candidate_does_not_abort_scan() {
        let base = table();
        let mut columns = base.columns().to_vec();
        columns.push(Series::from_values("FLAT", &vec![7.8; base.shape().0]));
        let table = ExchangeRateTable::new(base.dates().to_vec(), columns).unwrap();

        let scanner = CausalityScanner::new(vec![
            SeriesPair::new("LEAD", "REF"),
            SeriesPair::new("FLAT", "REF"),
        ]);
        let report = scanner.scan(&table).unwrap();

        assert_eq!(report.len(), 2);
        assert!(report.get("LEAD", "REF").unwrap().rejects_null);
        let flat = report.get("FLAT", "REF").unwrap();
        assert!(!flat.rejects_null);
        assert_eq!(flat.result.f_test.statistic, 0.0);
        assert!((flat.p_value() - 1.0).abs() < 1e-12);
        assert_eq!(report.significant(), vec![&SeriesPair::new("LEAD", "REF")]);
    }

    #[test]
    fn test_unknown_column_fails() {
        let scanner = CausalityScanner::new(vec![SeriesPair::new("USDZAR Curncy", "REF")]);
        let err = scanner.scan(&table()).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(ref c) if c == "USDZAR Curncy"));
    }

    #[test]
    fn test_scan_with_higher_lag() {
        let scanner = CausalityScanner::new(vec![SeriesPair::new("LEAD", "REF")]).with_lag(3);
        let report = scanner.scan(&table()).unwrap();
        let result = &report.results[0];
        assert_eq!(result.result.lag, 3);
        assert_eq!(result.by_lag.len(), 3);
    }

    #[test]
    fn test_pair_parse() {
        let pair = SeriesPair::parse("USDZAR Curncy:USDINR Curncy").unwrap();
        assert_eq!(pair, SeriesPair::new("USDZAR Curncy", "USDINR Curncy"));
        assert!(SeriesPair::parse("USDZAR Curncy").is_err());
        assert!(SeriesPair::parse(":USDINR Curncy").is_err());
    }

    #[test]
    fn test_default_pairs() {
        let pairs = SeriesPair::defaults();
        assert_eq!(pairs.len(), 9);
        assert!(pairs.iter().all(|p| p.reference == "USDINR Curncy"));
        assert_eq!(pairs[7].candidate, "USDZAR Curncy");
    }
}
