//! Evaluation utilities for training.
//!
//! Provides the [`Evaluator`] component for computing metrics during training,
//! and [`MetricValue`] for wrapping computed metrics with metadata.

use ndarray::ArrayView2;
use serde::Serialize;

use crate::model::PredictionKind;

use super::metrics::MetricFn;
use super::objectives::ObjectiveFn;

// =============================================================================
// MetricValue
// =============================================================================

/// A computed metric value with metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    /// Name of the metric (e.g., "train-rmse", "valid-logloss").
    pub name: String,
    pub value: f64,
    /// Whether higher values are better (true for accuracy, false for RMSE).
    pub higher_is_better: bool,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }

    /// Returns true if this value is better than another.
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.higher_is_better {
            self.value > other.value
        } else {
            self.value < other.value
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}

// =============================================================================
// EvalSet
// =============================================================================

/// Named evaluation dataset: sample-major features plus targets.
#[derive(Debug, Clone, Copy)]
pub struct EvalSet<'a> {
    pub name: &'a str,
    pub features: ArrayView2<'a, f32>,
    pub targets: &'a [f32],
}

impl<'a> EvalSet<'a> {
    pub fn new(name: &'a str, features: ArrayView2<'a, f32>, targets: &'a [f32]) -> Self {
        Self {
            name,
            features,
            targets,
        }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Computes one metric over raw margins, transforming them first when the
/// metric expects values or probabilities.
pub struct Evaluator<'a, O: ObjectiveFn, M: MetricFn> {
    objective: &'a O,
    metric: &'a M,
    transform_buffer: Vec<f32>,
}

impl<'a, O: ObjectiveFn, M: MetricFn> Evaluator<'a, O, M> {
    pub fn new(objective: &'a O, metric: &'a M) -> Self {
        Self {
            objective,
            metric,
            transform_buffer: Vec::new(),
        }
    }

    pub fn higher_is_better(&self) -> bool {
        self.metric.higher_is_better()
    }

    pub fn metric_name(&self) -> &'static str {
        self.metric.name()
    }

    pub fn is_enabled(&self) -> bool {
        self.metric.is_enabled()
    }

    /// Compute the metric over raw margins.
    pub fn compute(&mut self, margins: &[f32], targets: &[f32]) -> f64 {
        if self.metric.expected_prediction_kind() == PredictionKind::Margin {
            return self.metric.compute(margins, targets);
        }
        self.transform_buffer.clear();
        self.transform_buffer
            .extend(margins.iter().map(|&m| self.objective.transform_prediction(m)));
        self.metric.compute(&self.transform_buffer, targets)
    }

    /// Compute the metric and wrap it as `"{dataset}-{metric}"`.
    pub fn compute_metric(&mut self, dataset: &str, margins: &[f32], targets: &[f32]) -> MetricValue {
        let value = self.compute(margins, targets);
        MetricValue::new(
            format!("{}-{}", dataset, self.metric.name()),
            value,
            self.metric.higher_is_better(),
        )
    }

    /// Evaluate the training set and every eval set for one round.
    ///
    /// The first entry is always the training metric, followed by one entry
    /// per eval set in order.
    pub fn evaluate_round(
        &mut self,
        train_margins: &[f32],
        train_targets: &[f32],
        eval_sets: &[EvalSet<'_>],
        eval_margins: &[Vec<f32>],
    ) -> Vec<MetricValue> {
        if !self.is_enabled() {
            return Vec::new();
        }
        let mut values = Vec::with_capacity(1 + eval_sets.len());
        values.push(self.compute_metric("train", train_margins, train_targets));
        for (set, margins) in eval_sets.iter().zip(eval_margins) {
            values.push(self.compute_metric(set.name, margins, set.targets));
        }
        values
    }

    /// Value monitored for early stopping: the requested eval set when
    /// present, otherwise the training metric.
    pub fn early_stop_value(metrics: &[MetricValue], eval_set_idx: usize) -> f64 {
        metrics
            .get(1 + eval_set_idx)
            .or_else(|| metrics.first())
            .map_or(f64::NAN, |m| m.value)
    }
}
