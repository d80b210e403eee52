//! Risk score regression metrics.

use serde::Serialize;

use crate::training::r_squared_from_sums;

use super::{check_aligned, EvaluationError};

/// Rows whose absolute error falls within a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandCount {
    pub tolerance: f64,
    pub count: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    pub n: usize,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Mean absolute percentage error. Rows with a zero actual add 0.
    pub mape: f64,
    pub r_squared: f64,
    pub within_5: BandCount,
    pub within_10: BandCount,
}

impl RegressionReport {
    pub(crate) fn compute(actual: &[f32], predicted: &[f32]) -> Result<Self, EvaluationError> {
        check_aligned(actual.len(), predicted.len())?;
        let n = actual.len();
        let nf = n as f64;

        let mean_actual = actual.iter().map(|&a| a as f64).sum::<f64>() / nf;

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;
        let mut ss_tot = 0.0;
        let mut within_5 = 0;
        let mut within_10 = 0;
        for (&a, &p) in actual.iter().zip(predicted) {
            let (a, p) = (a as f64, p as f64);
            let err = (a - p).abs();
            abs_sum += err;
            sq_sum += err * err;
            if a != 0.0 {
                pct_sum += err / a.abs() * 100.0;
            }
            ss_tot += (a - mean_actual).powi(2);
            if err <= 5.0 {
                within_5 += 1;
            }
            if err <= 10.0 {
                within_10 += 1;
            }
        }

        let mse = sq_sum / nf;
        let band = |tolerance, count| BandCount {
            tolerance,
            count,
            fraction: count as f64 / nf,
        };
        Ok(Self {
            n,
            mae: abs_sum / nf,
            mse,
            rmse: mse.sqrt(),
            mape: pct_sum / nf,
            r_squared: r_squared_from_sums(sq_sum, ss_tot),
            within_5: band(5.0, within_5),
            within_10: band(10.0, within_10),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn small_example() {
        let report = RegressionReport::compute(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]).unwrap();
        assert_eq!(report.n, 3);
        assert_abs_diff_eq!(report.mae, 7.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.mse, 17.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.rmse, 2.380476, epsilon = 1e-5);
        // (20% + 10% + 10%) / 3
        assert_abs_diff_eq!(report.mape, 40.0 / 3.0, epsilon = 1e-9);
        // ss_tot = 200, ss_res = 17
        assert_abs_diff_eq!(report.r_squared, 1.0 - 17.0 / 200.0, epsilon = 1e-9);
        assert_eq!(report.within_5.count, 3);
        assert_eq!(report.within_5.fraction, 1.0);
    }

    #[test]
    fn zero_actual_counts_but_adds_nothing() {
        let report = RegressionReport::compute(&[0.0, 50.0], &[5.0, 25.0]).unwrap();
        assert_abs_diff_eq!(report.mape, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn tolerance_bands() {
        let report = RegressionReport::compute(&[0.0, 0.0, 0.0, 0.0], &[3.0, 5.0, 8.0, 20.0]).unwrap();
        assert_eq!(report.within_5.count, 2);
        assert_eq!(report.within_10.count, 3);
        assert_eq!(report.within_10.fraction, 0.75);
    }

    #[test]
    fn constant_actuals() {
        let exact = RegressionReport::compute(&[7.0, 7.0], &[7.0, 7.0]).unwrap();
        assert_eq!(exact.r_squared, 1.0);
        let off = RegressionReport::compute(&[7.0, 7.0], &[6.0, 8.0]).unwrap();
        assert_eq!(off.r_squared, 0.0);
    }
}
