//! Regression metrics.

use super::MetricFn;
use crate::model::PredictionKind;

fn squared_error_sum(predictions: &[f32], targets: &[f32]) -> f64 {
    predictions
        .iter()
        .zip(targets)
        .map(|(&p, &t)| {
            let diff = p as f64 - t as f64;
            diff * diff
        })
        .sum()
}

// =============================================================================
// RMSE
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
///
/// Lower is better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        Mse.compute(predictions, targets).sqrt()
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Value
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MSE
// =============================================================================

/// Mean Squared Error: mean((pred - label)²)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mse;

impl MetricFn for Mse {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        squared_error_sum(predictions, targets) / predictions.len() as f64
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Value
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mse"
    }
}

// =============================================================================
// MAE
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let sum: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| (p as f64 - t as f64).abs())
            .sum();
        sum / predictions.len() as f64
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Value
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// R²
// =============================================================================

/// Coefficient of determination: 1 - SS_res / SS_tot.
///
/// Constant targets give 1.0 for an exact fit and 0.0 otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RSquared;

impl MetricFn for RSquared {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let mean = targets.iter().map(|&t| t as f64).sum::<f64>() / targets.len() as f64;
        let ss_tot: f64 = targets.iter().map(|&t| (t as f64 - mean).powi(2)).sum();
        let ss_res = squared_error_sum(predictions, targets);
        r_squared_from_sums(ss_res, ss_tot)
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Value
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

pub(crate) fn r_squared_from_sums(ss_res: f64, ss_tot: f64) -> f64 {
    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}
