//! Objective (loss) functions for gradient boosting.
//!
//! Objectives compute per-row gradients and hessians of the loss with respect
//! to the raw prediction, the optimal constant starting score, and the
//! transform from raw margin to the semantic prediction.
//!
//! # Available Objectives
//!
//! - [`SquaredLoss`]: Standard squared error (L2 loss), for the risk score
//! - [`LogisticLoss`]: Binary log loss, for the approval decision

mod classification;
mod regression;

pub use classification::LogisticLoss;
pub use regression::SquaredLoss;

use crate::model::{PredictionKind, TaskKind};
use crate::training::GradsTuple;

// =============================================================================
// Objective Trait
// =============================================================================

/// An objective (loss) function for training gradient boosted models.
///
/// All slices are indexed by row and have the same length.
pub trait ObjectiveFn: Send + Sync {
    /// Compute gradients and hessians for the given raw predictions.
    fn compute_gradients_into(
        &self,
        predictions: &[f32],
        targets: &[f32],
        grad_hess: &mut [GradsTuple],
    );

    /// Optimal constant prediction before any trees are added.
    fn compute_base_score(&self, targets: &[f32]) -> f32;

    /// High-level task kind implied by this objective.
    fn task_kind(&self) -> TaskKind;

    /// Transform a raw margin into the objective's natural prediction space.
    fn transform_prediction(&self, raw: f32) -> f32;

    /// Semantic kind produced by [`transform_prediction`](Self::transform_prediction).
    fn transformed_kind(&self) -> PredictionKind;

    /// Name of the objective (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Objective Enum (Convenience wrapper)
// =============================================================================

/// Objective function enum for runtime selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Squared error loss (L2) for regression.
    SquaredLoss(SquaredLoss),
    /// Logistic loss for binary classification.
    LogisticLoss(LogisticLoss),
}

impl Default for Objective {
    fn default() -> Self {
        Self::SquaredLoss(SquaredLoss)
    }
}

impl Objective {
    pub fn squared() -> Self {
        Self::SquaredLoss(SquaredLoss)
    }

    pub fn logistic() -> Self {
        Self::LogisticLoss(LogisticLoss)
    }
}

impl ObjectiveFn for Objective {
    fn compute_gradients_into(
        &self,
        predictions: &[f32],
        targets: &[f32],
        grad_hess: &mut [GradsTuple],
    ) {
        match self {
            Self::SquaredLoss(inner) => inner.compute_gradients_into(predictions, targets, grad_hess),
            Self::LogisticLoss(inner) => inner.compute_gradients_into(predictions, targets, grad_hess),
        }
    }

    fn compute_base_score(&self, targets: &[f32]) -> f32 {
        match self {
            Self::SquaredLoss(inner) => inner.compute_base_score(targets),
            Self::LogisticLoss(inner) => inner.compute_base_score(targets),
        }
    }

    fn task_kind(&self) -> TaskKind {
        match self {
            Self::SquaredLoss(inner) => inner.task_kind(),
            Self::LogisticLoss(inner) => inner.task_kind(),
        }
    }

    fn transform_prediction(&self, raw: f32) -> f32 {
        match self {
            Self::SquaredLoss(inner) => inner.transform_prediction(raw),
            Self::LogisticLoss(inner) => inner.transform_prediction(raw),
        }
    }

    fn transformed_kind(&self) -> PredictionKind {
        match self {
            Self::SquaredLoss(inner) => inner.transformed_kind(),
            Self::LogisticLoss(inner) => inner.transformed_kind(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::SquaredLoss(inner) => inner.name(),
            Self::LogisticLoss(inner) => inner.name(),
        }
    }
}

#[inline]
fn debug_check_lengths(predictions: &[f32], targets: &[f32], grad_hess: &[GradsTuple]) {
    debug_assert_eq!(predictions.len(), targets.len());
    debug_assert_eq!(predictions.len(), grad_hess.len());
}
