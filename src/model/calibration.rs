//! Platt scaling of binary classifier margins.
//!
//! Fits `p = 1 / (1 + exp(A·m + B))` to training margins `m` by Newton's
//! method with backtracking line search on the regularized targets
//! `(N₊ + 1) / (N₊ + 2)` and `1 / (N₋ + 2)`.

use serde::{Deserialize, Serialize};

const MAX_ITER: usize = 100;
const MIN_STEP: f64 = 1e-10;
const SIGMA: f64 = 1e-12;
const EPS: f64 = 1e-5;

/// Sigmoid calibrator mapping a margin to a probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattCalibrator {
    pub a: f64,
    pub b: f64,
}

impl Default for PlattCalibrator {
    /// The plain logistic link, `p = sigmoid(m)`.
    fn default() -> Self {
        Self { a: -1.0, b: 0.0 }
    }
}

impl PlattCalibrator {
    /// Fit on margins and binary labels (`label > 0.5` is positive).
    ///
    /// Falls back to [`Default`] on empty input.
    pub fn fit(margins: &[f32], labels: &[f32]) -> Self {
        debug_assert_eq!(margins.len(), labels.len());
        if margins.is_empty() {
            return Self::default();
        }

        let n_pos = labels.iter().filter(|&&y| y > 0.5).count() as f64;
        let n_neg = labels.len() as f64 - n_pos;
        let hi = (n_pos + 1.0) / (n_pos + 2.0);
        let lo = 1.0 / (n_neg + 2.0);
        let targets: Vec<f64> = labels
            .iter()
            .map(|&y| if y > 0.5 { hi } else { lo })
            .collect();
        let margins: Vec<f64> = margins.iter().map(|&m| m as f64).collect();

        let mut a = 0.0;
        let mut b = ((n_neg + 1.0) / (n_pos + 1.0)).ln();
        let mut fval = objective(&margins, &targets, a, b);

        for _ in 0..MAX_ITER {
            let (mut h11, mut h22, mut h21) = (SIGMA, SIGMA, 0.0);
            let (mut g1, mut g2) = (0.0, 0.0);
            for (&m, &t) in margins.iter().zip(&targets) {
                let f_apb = m * a + b;
                let (p, q) = if f_apb >= 0.0 {
                    let e = (-f_apb).exp();
                    (e / (1.0 + e), 1.0 / (1.0 + e))
                } else {
                    let e = f_apb.exp();
                    (1.0 / (1.0 + e), e / (1.0 + e))
                };
                let d2 = p * q;
                h11 += m * m * d2;
                h22 += d2;
                h21 += m * d2;
                let d1 = t - p;
                g1 += m * d1;
                g2 += d1;
            }

            if g1.abs() < EPS && g2.abs() < EPS {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            let mut step = 1.0;
            while step >= MIN_STEP {
                let (na, nb) = (a + step * da, b + step * db);
                let nf = objective(&margins, &targets, na, nb);
                if nf < fval + 1e-4 * step * gd {
                    a = na;
                    b = nb;
                    fval = nf;
                    break;
                }
                step /= 2.0;
            }
            if step < MIN_STEP {
                log::debug!("platt line search stalled at a={a}, b={b}");
                break;
            }
        }

        Self { a, b }
    }

    /// Calibrated probability of the positive class.
    #[inline]
    pub fn apply(&self, margin: f32) -> f32 {
        let z = self.a * margin as f64 + self.b;
        (1.0 / (1.0 + z.exp())) as f32
    }
}

/// Negative log-likelihood, computed without overflow.
fn objective(margins: &[f64], targets: &[f64], a: f64, b: f64) -> f64 {
    margins
        .iter()
        .zip(targets)
        .map(|(&m, &t)| {
            let f_apb = m * a + b;
            if f_apb >= 0.0 {
                t * f_apb + (-f_apb).exp().ln_1p()
            } else {
                (t - 1.0) * f_apb + f_apb.exp().ln_1p()
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_is_logistic() {
        let cal = PlattCalibrator::default();
        assert_abs_diff_eq!(cal.apply(0.0), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(cal.apply(2.0), 0.880_797, epsilon = 1e-5);
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(PlattCalibrator::fit(&[], &[]), PlattCalibrator::default());
    }

    #[test]
    fn fit_is_monotone_increasing_in_margin() {
        let margins: Vec<f32> = (0..200).map(|i| (i as f32 - 100.0) / 20.0).collect();
        // Noisy labels: mostly positive for positive margins.
        let labels: Vec<f32> = margins
            .iter()
            .enumerate()
            .map(|(i, &m)| if (m > 0.0) ^ (i % 7 == 0) { 1.0 } else { 0.0 })
            .collect();
        let cal = PlattCalibrator::fit(&margins, &labels);

        assert!(cal.a < 0.0);
        let mut prev = 0.0;
        for m in [-5.0f32, -1.0, 0.0, 1.0, 5.0] {
            let p = cal.apply(m);
            assert!((0.0..=1.0).contains(&p));
            assert!(p > prev);
            prev = p;
        }
    }

    #[test]
    fn fit_recovers_balanced_midpoint() {
        let margins: Vec<f32> = (0..100).map(|i| (i as f32 - 49.5) / 10.0).collect();
        // Mirrored noise: row i and row 99 - i have opposite margins and labels.
        let labels: Vec<f32> = (0..100usize)
            .map(|i| {
                let positive = (i >= 50) ^ (i.min(99 - i) % 4 == 0);
                if positive { 1.0 } else { 0.0 }
            })
            .collect();
        let cal = PlattCalibrator::fit(&margins, &labels);
        assert_abs_diff_eq!(cal.apply(0.0), 0.5, epsilon = 1e-3);
    }
}
