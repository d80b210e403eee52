//! Classification metrics.

use std::cmp::Ordering;

use super::MetricFn;
use crate::model::PredictionKind;

// =============================================================================
// LogLoss (Binary Cross-Entropy)
// =============================================================================

/// Binary cross-entropy: -mean(y*log(p) + (1-y)*log(1-p))
///
/// Lower is better. Expects predictions to be probabilities in (0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogLoss;

impl MetricFn for LogLoss {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        const EPS: f64 = 1e-15;

        let sum: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &l)| {
                let p = (p as f64).clamp(EPS, 1.0 - EPS);
                let l = l as f64;
                -(l * p.ln() + (1.0 - l) * (1.0 - p).ln())
            })
            .sum();
        sum / predictions.len() as f64
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Probability
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "logloss"
    }
}

// =============================================================================
// Accuracy
// =============================================================================

/// Classification accuracy: proportion of correct predictions.
///
/// A probability strictly above `threshold` predicts the positive class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accuracy {
    pub threshold: f32,
}

impl Default for Accuracy {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl Accuracy {
    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl MetricFn for Accuracy {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let correct = predictions
            .iter()
            .zip(targets)
            .filter(|&(&p, &l)| (p > self.threshold) == (l > 0.5))
            .count();
        correct as f64 / predictions.len() as f64
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Probability
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

// =============================================================================
// AUC
// =============================================================================

/// Area under the ROC curve via the rank-sum statistic, ties averaged.
///
/// Returns 0.5 when only one class is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Auc;

impl MetricFn for Auc {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        let labels: Vec<bool> = targets.iter().map(|&l| l > 0.5).collect();
        roc_auc(predictions, &labels)
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Probability
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "auc"
    }
}

/// Rank-based AUC over `scores` with boolean labels.
pub(crate) fn roc_auc(scores: &[f32], labels: &[bool]) -> f64 {
    let n = scores.len().min(labels.len());
    let n_pos = labels[..n].iter().filter(|&&l| l).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    // Ascending ranks, 1-based; equal scores share their average rank.
    let mut rank_sum_pos = 0.0f64;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[order[j]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let pos_in_run = order[i..j].iter().filter(|&&idx| labels[idx]).count();
        rank_sum_pos += avg_rank * pos_in_run as f64;
        i = j;
    }

    let n_pos_f = n_pos as f64;
    (rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn logloss_confident_correct_is_small() {
        let ll = LogLoss.compute(&[0.99, 0.01], &[1.0, 0.0]);
        assert!(ll < 0.02);
        assert_abs_diff_eq!(LogLoss.compute(&[0.5], &[1.0]), std::f64::consts::LN_2, epsilon = 1e-9);
    }

    #[test]
    fn accuracy_threshold_is_strict() {
        let acc = Accuracy::default().compute(&[0.5, 0.9, 0.1, 0.6], &[0.0, 1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(acc, 0.75);
    }

    #[test]
    fn auc_perfect() {
        assert_abs_diff_eq!(Auc.compute(&[0.1, 0.2, 0.8, 0.9], &[0.0, 0.0, 1.0, 1.0]), 1.0);
    }

    #[test]
    fn auc_all_tied() {
        assert_abs_diff_eq!(Auc.compute(&[0.5; 4], &[1.0, 0.0, 1.0, 0.0]), 0.5);
    }

    #[test]
    fn auc_worst() {
        assert_abs_diff_eq!(Auc.compute(&[0.2, 0.3, 0.8, 0.9], &[1.0, 1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn auc_partial_tie() {
        // pos: 0.4, 0.8; neg: 0.4, 0.1 -> pairs: (0.4 vs 0.4)=0.5, (0.4 vs 0.1)=1, 0.8 beats both
        let auc = roc_auc(&[0.4, 0.8, 0.4, 0.1], &[true, true, false, false]);
        assert_abs_diff_eq!(auc, 3.5 / 4.0);
    }

    #[test]
    fn auc_single_class() {
        assert_eq!(roc_auc(&[0.1, 0.9], &[true, true]), 0.5);
    }
}
