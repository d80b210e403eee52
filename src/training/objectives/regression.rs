//! Regression objective functions.

use super::{debug_check_lengths, ObjectiveFn};
use crate::model::{PredictionKind, TaskKind};
use crate::training::GradsTuple;

// =============================================================================
// Squared Loss
// =============================================================================

/// Squared error loss (L2).
///
/// - Loss: `0.5 * (pred - y)²`
/// - Gradient: `pred - y`
/// - Hessian: `1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn compute_gradients_into(
        &self,
        predictions: &[f32],
        targets: &[f32],
        grad_hess: &mut [GradsTuple],
    ) {
        debug_check_lengths(predictions, targets, grad_hess);
        for ((pair, &p), &y) in grad_hess.iter_mut().zip(predictions).zip(targets) {
            pair.grad = p - y;
            pair.hess = 1.0;
        }
    }

    fn compute_base_score(&self, targets: &[f32]) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum: f64 = targets.iter().map(|&t| t as f64).sum();
        (sum / targets.len() as f64) as f32
    }

    fn task_kind(&self) -> TaskKind {
        TaskKind::Regression
    }

    fn transform_prediction(&self, raw: f32) -> f32 {
        raw
    }

    fn transformed_kind(&self) -> PredictionKind {
        PredictionKind::Value
    }

    fn name(&self) -> &'static str {
        "squared_error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gradients_are_residuals() {
        let preds = [1.0f32, 2.0, 3.0];
        let targets = [0.5f32, 2.0, 4.0];
        let mut gh = [GradsTuple::default(); 3];
        SquaredLoss.compute_gradients_into(&preds, &targets, &mut gh);

        assert_abs_diff_eq!(gh[0].grad, 0.5);
        assert_abs_diff_eq!(gh[1].grad, 0.0);
        assert_abs_diff_eq!(gh[2].grad, -1.0);
        assert!(gh.iter().all(|p| p.hess == 1.0));
    }

    #[test]
    fn base_score_is_mean() {
        assert_abs_diff_eq!(SquaredLoss.compute_base_score(&[10.0, 20.0, 60.0]), 30.0);
        assert_eq!(SquaredLoss.compute_base_score(&[]), 0.0);
    }
}
