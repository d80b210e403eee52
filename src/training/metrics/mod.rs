//! Evaluation metrics for model quality.
//!
//! Metrics are separate from loss functions: a model is trained with one loss
//! but may be monitored and evaluated with different metrics.
//!
//! # Available Metrics
//!
//! ## Regression
//! - [`Rmse`]: Root Mean Squared Error
//! - [`Mae`]: Mean Absolute Error
//! - [`Mse`]: Mean Squared Error
//! - [`RSquared`]: Coefficient of determination
//!
//! ## Classification
//! - [`LogLoss`]: Binary cross-entropy
//! - [`Accuracy`]: Binary classification accuracy
//! - [`Auc`]: Area Under ROC Curve

mod classification;
mod regression;

pub use classification::{Accuracy, Auc, LogLoss};
pub use regression::{Mae, Mse, RSquared, Rmse};

pub(crate) use classification::roc_auc;
pub(crate) use regression::r_squared_from_sums;

use crate::model::PredictionKind;

// =============================================================================
// Metric Enum (Convenience wrapper)
// =============================================================================

/// A dynamically-dispatched metric function.
///
/// Each variant wraps its corresponding struct type directly, so selecting a
/// metric at runtime needs no generics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// No metric - skips evaluation entirely.
    ///
    /// The trainer then skips prediction transformation and disables early
    /// stopping.
    None,
    /// Root Mean Squared Error (regression).
    Rmse(Rmse),
    /// Mean Absolute Error (regression).
    Mae(Mae),
    /// Mean Squared Error (regression).
    Mse(Mse),
    /// Coefficient of determination (regression).
    RSquared(RSquared),
    /// Log Loss / Binary Cross-Entropy (binary classification).
    LogLoss(LogLoss),
    /// Accuracy (binary classification) with configurable threshold.
    Accuracy(Accuracy),
    /// Area Under ROC Curve (binary classification).
    Auc(Auc),
}

impl Default for Metric {
    fn default() -> Self {
        Self::Rmse(Rmse)
    }
}

impl Metric {
    pub fn none() -> Self {
        Self::None
    }

    pub fn rmse() -> Self {
        Self::Rmse(Rmse)
    }

    pub fn mae() -> Self {
        Self::Mae(Mae)
    }

    pub fn mse() -> Self {
        Self::Mse(Mse)
    }

    pub fn r_squared() -> Self {
        Self::RSquared(RSquared)
    }

    pub fn logloss() -> Self {
        Self::LogLoss(LogLoss)
    }

    /// Accuracy for binary classification with threshold 0.5.
    pub fn accuracy() -> Self {
        Self::Accuracy(Accuracy::default())
    }

    pub fn auc() -> Self {
        Self::Auc(Auc)
    }
}

impl MetricFn for Metric {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        match self {
            Self::None => f64::NAN,
            Self::Rmse(inner) => inner.compute(predictions, targets),
            Self::Mae(inner) => inner.compute(predictions, targets),
            Self::Mse(inner) => inner.compute(predictions, targets),
            Self::RSquared(inner) => inner.compute(predictions, targets),
            Self::LogLoss(inner) => inner.compute(predictions, targets),
            Self::Accuracy(inner) => inner.compute(predictions, targets),
            Self::Auc(inner) => inner.compute(predictions, targets),
        }
    }

    fn expected_prediction_kind(&self) -> PredictionKind {
        match self {
            Self::None => PredictionKind::Margin,
            Self::Rmse(inner) => inner.expected_prediction_kind(),
            Self::Mae(inner) => inner.expected_prediction_kind(),
            Self::Mse(inner) => inner.expected_prediction_kind(),
            Self::RSquared(inner) => inner.expected_prediction_kind(),
            Self::LogLoss(inner) => inner.expected_prediction_kind(),
            Self::Accuracy(inner) => inner.expected_prediction_kind(),
            Self::Auc(inner) => inner.expected_prediction_kind(),
        }
    }

    fn higher_is_better(&self) -> bool {
        match self {
            Self::None => false,
            Self::Rmse(inner) => inner.higher_is_better(),
            Self::Mae(inner) => inner.higher_is_better(),
            Self::Mse(inner) => inner.higher_is_better(),
            Self::RSquared(inner) => inner.higher_is_better(),
            Self::LogLoss(inner) => inner.higher_is_better(),
            Self::Accuracy(inner) => inner.higher_is_better(),
            Self::Auc(inner) => inner.higher_is_better(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::None => "<none>",
            Self::Rmse(inner) => inner.name(),
            Self::Mae(inner) => inner.name(),
            Self::Mse(inner) => inner.name(),
            Self::RSquared(inner) => inner.name(),
            Self::LogLoss(inner) => inner.name(),
            Self::Accuracy(inner) => inner.name(),
            Self::Auc(inner) => inner.name(),
        }
    }

    fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

// =============================================================================
// Metric Trait
// =============================================================================

/// A metric for evaluating model quality.
///
/// Unlike objectives (which compute gradients for optimization), metrics
/// compute scalar values for evaluation and monitoring. Predictions arrive in
/// the space named by [`expected_prediction_kind`](Self::expected_prediction_kind).
pub trait MetricFn: Send + Sync {
    /// Compute metric value over row-aligned predictions and targets.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64;

    /// What prediction space does this metric expect?
    fn expected_prediction_kind(&self) -> PredictionKind;

    /// Whether higher values indicate better performance.
    ///
    /// - `true`: Higher is better (accuracy, AUC, R²)
    /// - `false`: Lower is better (RMSE, MAE, logloss)
    fn higher_is_better(&self) -> bool;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;

    /// Whether this metric is enabled.
    ///
    /// When `false`, the trainer skips metric computation entirely.
    fn is_enabled(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn metric_none_disabled() {
        let metric = Metric::none();
        assert!(!metric.is_enabled());
        assert!(metric.compute(&[1.0], &[1.0]).is_nan());
        assert_eq!(metric.name(), "<none>");
    }

    #[test]
    fn enum_delegates_to_inner() {
        let preds = [12.0, 18.0, 33.0];
        let targets = [10.0, 20.0, 30.0];
        assert_abs_diff_eq!(
            Metric::mae().compute(&preds, &targets),
            Mae.compute(&preds, &targets)
        );
        assert_eq!(Metric::rmse().name(), "rmse");
        assert!(Metric::auc().higher_is_better());
        assert!(!Metric::logloss().higher_is_better());
        assert_eq!(
            Metric::logloss().expected_prediction_kind(),
            PredictionKind::Probability
        );
    }
}
