//! Statistical helpers
//!
//! Pearson correlation over paired observations and ordinary least squares
//! with an intercept, solved through the centered normal equations.

use statrs::statistics::{Data, Distribution};

/// Pairs where both sides are present
pub fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y.iter())
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

/// Pearson correlation coefficient
///
/// Returns `NaN` for fewer than two observations or a zero-variance input.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let x_data = Data::new(x[..n].to_vec());
    let y_data = Data::new(y[..n].to_vec());

    let (x_mean, y_mean) = match (x_data.mean(), y_data.mean()) {
        (Some(xm), Some(ym)) => (xm, ym),
        _ => return f64::NAN,
    };
    let (x_std, y_std) = match (x_data.std_dev(), y_data.std_dev()) {
        (Some(xs), Some(ys)) => (xs, ys),
        _ => return f64::NAN,
    };

    if x_std == 0.0 || y_std == 0.0 {
        return f64::NAN;
    }

    let covariance: f64 = x[..n]
        .iter()
        .zip(y[..n].iter())
        .map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>()
        / (n - 1) as f64;

    (covariance / (x_std * y_std)).clamp(-1.0, 1.0)
}

/// Pearson correlation over the rows where both series are present
pub fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let (xs, ys) = complete_pairs(x, y);
    pearson(&xs, &ys)
}

/// Fitted linear model `y = a + b . x`
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// Residual degrees of freedom, intercept included
    pub fn df_resid(&self) -> f64 {
        self.nobs as f64 - self.coefficients.len() as f64 - 1.0
    }
}

/// Ordinary least squares of `y` on an intercept plus `regressors`
///
/// Each regressor must have the same length as `y`. Returns `None` when the
/// design is rank deficient.
pub fn ols(y: &[f64], regressors: &[Vec<f64>]) -> Option<OlsFit> {
    let n = y.len();
    let k = regressors.len();
    if n == 0 || regressors.iter().any(|r| r.len() != n) {
        return None;
    }

    let mean = |v: &[f64]| v.iter().sum::<f64>() / n as f64;
    let y_mean = mean(y);
    let x_means: Vec<f64> = regressors.iter().map(|r| mean(r.as_slice())).collect();

    let centered: Vec<Vec<f64>> = regressors
        .iter()
        .zip(&x_means)
        .map(|(r, m)| r.iter().map(|v| v - m).collect())
        .collect();
    let y_c: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

    // Normal equations on centered data: (X'X) b = X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in i..k {
            let s: f64 = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = centered[i].iter().zip(&y_c).map(|(a, b)| a * b).sum();
    }

    let coefficients = solve(xtx, xty)?;
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_means)
            .map(|(b, m)| b * m)
            .sum::<f64>();

    let ssr = (0..n)
        .map(|t| {
            let fitted = intercept
                + coefficients
                    .iter()
                    .zip(regressors)
                    .map(|(b, r)| b * r[t])
                    .sum::<f64>();
            let residual = y[t] - fitted;
            residual * residual
        })
        .sum();

    Some(OlsFit {
        intercept,
        coefficients,
        ssr,
        nobs: n,
    })
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let k = b.len();
    let scale = a
        .iter()
        .enumerate()
        .map(|(i, row)| row[i].abs())
        .fold(0.0_f64, f64::max);
    let tolerance = scale * 1e-12;

    for col in 0..k {
        let pivot = (col..k).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= tolerance {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..k {
            let factor = a[row][col] / a[col][col];
            for c in col..k {
                a[row][c] -= factor * a[col][c];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; k];
    for row in (0..k).rev() {
        let tail: f64 = (row + 1..k).map(|c| a[row][c] * x[c]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
