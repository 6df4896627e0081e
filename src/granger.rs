//! Bivariate Granger causality test
//!
//! Tests whether lagged values of a candidate series improve an
//! autoregression of a target series. For lag `p` over `nobs` aligned rows:
//!
//! - restricted:   `y_t ~ 1 + y_{t-1} .. y_{t-p}`
//! - unrestricted: `y_t ~ 1 + y_{t-1} .. y_{t-p} + x_{t-1} .. x_{t-p}`
//!
//! and compares the two fits with an F-test on the sum of squared residuals.
//! The chi-square and likelihood-ratio forms of the same comparison are
//! reported alongside.

use crate::error::{AnalysisError, Result};
use crate::stats::{complete_pairs, ols, OlsFit};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

/// Default lag
pub const DEFAULT_LAG: usize = 1;

/// Default significance level
pub const DEFAULT_ALPHA: f64 = 0.05;

/// One test statistic with its p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestStatistic {
    pub statistic: f64,
    pub p_value: f64,
    pub df_num: f64,
    /// Denominator degrees of freedom, F-test only
    pub df_denom: Option<f64>,
}

/// Result of a Granger test at one lag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrangerResult {
    pub lag: usize,
    pub nobs: usize,
    pub ssr_restricted: f64,
    pub ssr_unrestricted: f64,
    pub f_test: TestStatistic,
    pub chi2_test: TestStatistic,
    pub lr_test: TestStatistic,
}

impl GrangerResult {
    /// F-test p-value, the one used for decisions
    pub fn p_value(&self) -> f64 {
        self.f_test.p_value
    }

    /// Reject "no predictive contribution" at level `alpha`
    pub fn rejects_null(&self, alpha: f64) -> bool {
        self.f_test.p_value < alpha
    }
}

/// Granger causality test with a fixed maximum lag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrangerTest {
    max_lag: usize,
}

impl Default for GrangerTest {
    fn default() -> Self {
        Self::new(DEFAULT_LAG)
    }
}

impl GrangerTest {
    /// Create a test with maximum lag `max_lag`
    pub fn new(max_lag: usize) -> Self {
        Self { max_lag }
    }

    /// Maximum lag tested
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Observations needed for a test at `lag`
    pub fn min_observations(lag: usize) -> usize {
        // nobs = n - lag must leave at least one residual degree of freedom
        3 * lag + 2
    }

    /// Test at the configured lag whether `candidate` Granger-causes `target`
    ///
    /// Rows where either series is missing are dropped before lagging.
    pub fn test(&self, candidate: &[Option<f64>], target: &[Option<f64>]) -> Result<GrangerResult> {
        let (x, y) = complete_pairs(candidate, target);
        self.test_lag(&x, &y, self.max_lag)
    }

    /// Results for every lag from 1 to the configured maximum
    pub fn test_up_to(
        &self,
        candidate: &[Option<f64>],
        target: &[Option<f64>],
    ) -> Result<Vec<GrangerResult>> {
        let (x, y) = complete_pairs(candidate, target);
        (1..=self.max_lag)
            .map(|lag| self.test_lag(&x, &y, lag))
            .collect()
    }

    /// Test on complete, aligned slices at a single lag
    pub fn test_lag(&self, x: &[f64], y: &[f64], lag: usize) -> Result<GrangerResult> {
        if lag == 0 {
            return Err(AnalysisError::ConfigError("lag must be at least 1".to_string()));
        }
        if x.len() != y.len() {
            return Err(AnalysisError::DataError(format!(
                "series lengths differ: {} vs {}",
                x.len(),
                y.len()
            )));
        }

        let n = y.len();
        let required = Self::min_observations(lag);
        if n < required {
            return Err(AnalysisError::InsufficientData {
                required,
                available: n,
            });
        }

        let nobs = n - lag;
        let target: Vec<f64> = y[lag..].to_vec();
        let own_lags: Vec<Vec<f64>> = (1..=lag).map(|k| y[lag - k..n - k].to_vec()).collect();
        let cross_lags: Vec<Vec<f64>> = (1..=lag).map(|k| x[lag - k..n - k].to_vec()).collect();

        let restricted = fit(&target, &own_lags, "restricted")?;
        let unrestricted_regressors: Vec<Vec<f64>> =
            own_lags.into_iter().chain(cross_lags).collect();
        let unrestricted = match ols(&target, &unrestricted_regressors) {
            Some(full) => full,
            None => {
                // Candidate lags are collinear with the own lags: they add nothing
                warn!(
                    "Candidate lags are redundant at lag {}, treating as no contribution",
                    lag
                );
                OlsFit {
                    intercept: restricted.intercept,
                    coefficients: restricted
                        .coefficients
                        .iter()
                        .copied()
                        .chain(std::iter::repeat(0.0).take(lag))
                        .collect(),
                    ssr: restricted.ssr,
                    nobs: restricted.nobs,
                }
            }
        };

        let result = compare(lag, nobs, &restricted, &unrestricted)?;
        debug!(
            "Granger lag {}: F={:.4} p={:.4} (nobs={})",
            lag, result.f_test.statistic, result.f_test.p_value, nobs
        );
        Ok(result)
    }
}

fn fit(y: &[f64], regressors: &[Vec<f64>], model: &str) -> Result<OlsFit> {
    ols(y, regressors).ok_or_else(|| {
        AnalysisError::DataError(format!("{} model design matrix is singular", model))
    })
}

fn compare(
    lag: usize,
    nobs: usize,
    restricted: &OlsFit,
    unrestricted: &OlsFit,
) -> Result<GrangerResult> {
    let ssr_r = restricted.ssr;
    // Nested models: the unrestricted fit can only improve, up to rounding
    let ssr_u = unrestricted.ssr.min(ssr_r);
    let p = lag as f64;
    let n = nobs as f64;
    let df_resid = unrestricted.df_resid();

    let (f_stat, chi2_stat, lr_stat) = if ssr_u > 0.0 {
        (
            (ssr_r - ssr_u) / ssr_u / p * df_resid,
            n * (ssr_r - ssr_u) / ssr_u,
            n * (ssr_r / ssr_u).ln(),
        )
    } else if ssr_r > 0.0 {
        warn!("Unrestricted model fits exactly at lag {}", lag);
        (f64::INFINITY, f64::INFINITY, f64::INFINITY)
    } else {
        (0.0, 0.0, 0.0)
    };

    let f_dist = FisherSnedecor::new(p, df_resid)
        .map_err(|e| AnalysisError::DataError(format!("invalid F distribution: {}", e)))?;
    let chi2_dist = ChiSquared::new(p)
        .map_err(|e| AnalysisError::DataError(format!("invalid chi-square distribution: {}", e)))?;

    Ok(GrangerResult {
        lag,
        nobs,
        ssr_restricted: ssr_r,
        ssr_unrestricted: ssr_u,
        f_test: TestStatistic {
            statistic: f_stat,
            p_value: survival(&f_dist, f_stat),
            df_num: p,
            df_denom: Some(df_resid),
        },
        chi2_test: TestStatistic {
            statistic: chi2_stat,
            p_value: survival(&chi2_dist, chi2_stat),
            df_num: p,
            df_denom: None,
        },
        lr_test: TestStatistic {
            statistic: lr_stat,
            p_value: survival(&chi2_dist, lr_stat),
            df_num: p,
            df_denom: None,
        },
    })
}

fn survival<D: ContinuousCDF<f64, f64>>(dist: &D, statistic: f64) -> f64 {
    if statistic.is_infinite() {
        return 0.0;
    }
    dist.sf(statistic).clamp(0.0, 1.0)
}
