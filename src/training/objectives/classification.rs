//! Classification objective functions.

use super::{debug_check_lengths, ObjectiveFn};
use crate::model::{PredictionKind, TaskKind};
use crate::training::GradsTuple;
use crate::utils::sigmoid;

// =============================================================================
// Logistic Loss
// =============================================================================

/// Logistic loss (log loss / binary cross-entropy) for binary classification.
///
/// Expects labels in {0, 1} and outputs log-odds.
/// - Loss: `-y*log(σ(pred)) - (1-y)*log(1-σ(pred))` where σ is sigmoid
/// - Gradient: `σ(pred) - y`
/// - Hessian: `σ(pred) * (1 - σ(pred))`, floored at `1e-6`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogisticLoss;

const HESS_MIN: f32 = 1e-6;

impl ObjectiveFn for LogisticLoss {
    fn compute_gradients_into(
        &self,
        predictions: &[f32],
        targets: &[f32],
        grad_hess: &mut [GradsTuple],
    ) {
        debug_check_lengths(predictions, targets, grad_hess);
        for ((pair, &pred), &y) in grad_hess.iter_mut().zip(predictions).zip(targets) {
            let p = sigmoid(pred as f64) as f32;
            pair.grad = p - y;
            pair.hess = (p * (1.0 - p)).max(HESS_MIN);
        }
    }

    /// Log-odds of the positive rate, with the rate clamped away from 0 and 1.
    fn compute_base_score(&self, targets: &[f32]) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let positives: f64 = targets.iter().map(|&t| t as f64).sum();
        let rate = (positives / targets.len() as f64).clamp(1e-6, 1.0 - 1e-6);
        (rate / (1.0 - rate)).ln() as f32
    }

    fn task_kind(&self) -> TaskKind {
        TaskKind::BinaryClassification
    }

    fn transform_prediction(&self, raw: f32) -> f32 {
        sigmoid(raw as f64) as f32
    }

    fn transformed_kind(&self) -> PredictionKind {
        PredictionKind::Probability
    }

    fn name(&self) -> &'static str {
        "binary_logistic"
    }
}
