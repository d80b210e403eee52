//! GBDT Trainer for gradient boosting.
//!
//! This module provides the main training loop for gradient boosted decision
//! trees. It orchestrates binning, objective computation, row and column
//! sampling, tree growing, prediction updates, evaluation and early stopping.
//!
//! # Example
//!
//! ```ignore
//! use loanboost::training::{GBDTParams, GBDTTrainer, Rmse, SquaredLoss};
//!
//! let params = GBDTParams { n_trees: 50, ..Default::default() };
//! let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);
//! let forest = trainer.train(features.view(), &targets, &[])?;
//! ```

use ndarray::ArrayView2;
use thiserror::Error;

use crate::data::BinnedDataset;
use crate::repr::gbdt::{Forest, Tree};
use crate::training::callback::{EarlyStopAction, EarlyStopping};
use crate::training::eval::{EvalSet, Evaluator};
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::metrics::MetricFn;
use crate::training::objectives::ObjectiveFn;
use crate::training::sampling::{ColSampler, RowSampler};
use crate::training::Gradients;
use crate::utils::{run_with_threads, Parallelism};

use super::grower::{GrowerParams, TreeGrower};
use super::split::GainParams;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised before or during training.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    #[error("dataset has no feature columns")]
    NoFeatures,

    #[error("expected {expected} targets, found {found}")]
    TargetLengthMismatch { expected: usize, found: usize },

    #[error("target at row {row} is not finite")]
    NonFiniteTarget { row: usize },

    #[error("eval set `{name}`: {reason}")]
    InvalidEvalSet { name: String, reason: String },
}

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
///
/// Use struct construction with `..Default::default()` for convenient configuration.
#[derive(Clone, Debug)]
pub struct GBDTParams {
    // --- Boosting parameters ---
    /// Number of boosting rounds (trees to train).
    pub n_trees: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f32,

    // --- Tree structure ---
    /// Leaf budget for leaf-wise growth.
    pub max_leaves: u32,
    /// Optional depth cap.
    pub max_depth: Option<u32>,
    /// Gain computation parameters (regularization, min child weight, etc.).
    pub gain: GainParams,

    // --- Sampling ---
    /// Fraction of features offered to each tree.
    pub feature_fraction: f32,
    /// Fraction of rows used to grow each tree.
    pub bagging_fraction: f32,

    // --- Binning and resources ---
    /// Maximum histogram bins per feature (at most 256).
    pub max_bins: usize,
    /// Number of threads.
    ///
    /// - `0`: Use rayon's global thread pool
    /// - `1`: Sequential execution
    /// - `n > 1`: Dedicated pool with `n` threads
    pub n_threads: usize,

    // --- Early stopping ---
    /// Rounds without improvement before stopping. 0 disables early stopping.
    pub early_stopping_rounds: u32,
    /// Index of the eval set monitored for early stopping.
    pub early_stopping_eval_set: usize,

    /// Verbosity level for training output.
    pub verbosity: Verbosity,
    /// Random seed for sampling.
    pub seed: u64,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.1,
            max_leaves: 31,
            max_depth: None,
            gain: GainParams::default(),
            feature_fraction: 0.8,
            bagging_fraction: 0.8,
            max_bins: 255,
            n_threads: 0,
            early_stopping_rounds: 10,
            early_stopping_eval_set: 0,
            verbosity: Verbosity::default(),
            seed: 42,
        }
    }
}

impl GBDTParams {
    fn to_grower_params(&self) -> GrowerParams {
        GrowerParams {
            gain: self.gain.clone(),
            learning_rate: self.learning_rate,
            max_leaves: self.max_leaves,
            max_depth: self.max_depth,
        }
    }
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// Gradient boosted tree trainer, generic over objective and metric.
pub struct GBDTTrainer<O: ObjectiveFn, M: MetricFn> {
    objective: O,
    metric: M,
    params: GBDTParams,
}

impl<O: ObjectiveFn, M: MetricFn> GBDTTrainer<O, M> {
    pub fn new(objective: O, metric: M, params: GBDTParams) -> Self {
        Self {
            objective,
            metric,
            params,
        }
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    /// Train a forest on sample-major `features` (`[n_rows, n_features]`).
    ///
    /// When early stopping is active the returned forest is truncated to the
    /// round with the best monitored metric: the eval set at
    /// `early_stopping_eval_set` if present, otherwise the training metric.
    pub fn train(
        &self,
        features: ArrayView2<'_, f32>,
        targets: &[f32],
        eval_sets: &[EvalSet<'_>],
    ) -> Result<Forest, TrainError> {
        self.validate_inputs(features, targets, eval_sets)?;
        Ok(run_with_threads(self.params.n_threads, |parallelism| {
            self.train_inner(features, targets, eval_sets, parallelism)
        }))
    }

    fn validate_inputs(
        &self,
        features: ArrayView2<'_, f32>,
        targets: &[f32],
        eval_sets: &[EvalSet<'_>],
    ) -> Result<(), TrainError> {
        let (n_rows, n_features) = features.dim();
        if n_rows == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if n_features == 0 {
            return Err(TrainError::NoFeatures);
        }
        if targets.len() != n_rows {
            return Err(TrainError::TargetLengthMismatch {
                expected: n_rows,
                found: targets.len(),
            });
        }
        if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
            return Err(TrainError::NonFiniteTarget { row });
        }
        for set in eval_sets {
            let (rows, cols) = set.features.dim();
            if cols != n_features {
                return Err(TrainError::InvalidEvalSet {
                    name: set.name.to_string(),
                    reason: format!("expected {n_features} features, found {cols}"),
                });
            }
            if rows != set.targets.len() {
                return Err(TrainError::InvalidEvalSet {
                    name: set.name.to_string(),
                    reason: format!("{rows} rows but {} targets", set.targets.len()),
                });
            }
        }
        Ok(())
    }

    fn train_inner(
        &self,
        features: ArrayView2<'_, f32>,
        targets: &[f32],
        eval_sets: &[EvalSet<'_>],
        parallelism: Parallelism,
    ) -> Forest {
        let params = &self.params;
        let (n_rows, n_features) = features.dim();

        let dataset = BinnedDataset::from_features(features, params.max_bins, parallelism);

        let base_score = self.objective.compute_base_score(targets);
        let mut predictions = vec![base_score; n_rows];
        let mut gradients = Gradients::new(n_rows);
        let mut forest = Forest::new(base_score);

        let mut eval_predictions: Vec<Vec<f32>> = eval_sets
            .iter()
            .map(|set| vec![base_score; set.targets.len()])
            .collect();
        let mut row_buffer = vec![0.0f32; n_features];

        let row_sampler = RowSampler::new(n_rows, params.bagging_fraction, params.seed);
        let col_sampler = ColSampler::new(n_features, params.feature_fraction, params.seed);
        let mut grower = TreeGrower::new(n_rows, params.to_grower_params(), parallelism);

        let mut early_stopping = EarlyStopping::new(
            if self.metric.is_enabled() {
                params.early_stopping_rounds as usize
            } else {
                0
            },
            self.metric.higher_is_better(),
        );
        let mut best_n_trees = 0usize;

        let mut evaluator = Evaluator::new(&self.objective, &self.metric);
        let mut logger = TrainingLogger::new(params.verbosity);
        logger.start_training(params.n_trees as usize, self.objective.name());

        for round in 0..params.n_trees as usize {
            self.objective
                .compute_gradients_into(&predictions, targets, gradients.pairs_mut());

            let sampled = row_sampler.sample(round);
            let tree_features = col_sampler.sample_tree(round);
            let tree = grower.grow(&dataset, &gradients, sampled.as_deref(), &tree_features);

            if sampled.is_none() {
                grower.update_predictions_from_last_tree(&mut predictions);
            } else {
                tree.predict_binned_into(&dataset, &mut predictions);
            }

            for (set, preds) in eval_sets.iter().zip(eval_predictions.iter_mut()) {
                add_tree_predictions(&tree, set.features, preds, &mut row_buffer);
            }

            forest.push_tree(tree);

            let round_metrics =
                evaluator.evaluate_round(&predictions, targets, eval_sets, &eval_predictions);
            logger.log_metrics(round, &round_metrics);

            if early_stopping.is_enabled() {
                let value = Evaluator::<O, M>::early_stop_value(
                    &round_metrics,
                    params.early_stopping_eval_set,
                );
                match early_stopping.update(value) {
                    EarlyStopAction::Improved => best_n_trees = forest.n_trees(),
                    EarlyStopAction::Stop => {
                        logger.log_early_stopping(
                            round,
                            early_stopping.best_round(),
                            self.metric.name(),
                        );
                        break;
                    }
                    EarlyStopAction::Continue => {}
                }
            }
        }

        if early_stopping.is_enabled() && best_n_trees > 0 && best_n_trees < forest.n_trees() {
            forest.truncate(best_n_trees);
        }

        logger.finish_training(forest.n_trees());
        forest
    }
}

/// Add one tree's output to the running predictions of a sample-major matrix.
fn add_tree_predictions(
    tree: &Tree,
    features: ArrayView2<'_, f32>,
    predictions: &mut [f32],
    row_buffer: &mut [f32],
) {
    for (pred, row) in predictions.iter_mut().zip(features.outer_iter()) {
        match row.as_slice() {
            Some(values) => *pred += tree.predict_row(values),
            None => {
                for (dst, &src) in row_buffer.iter_mut().zip(row.iter()) {
                    *dst = src;
                }
                *pred += tree.predict_row(row_buffer);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::{LogLoss, Metric, Rmse};
    use crate::training::objectives::{LogisticLoss, SquaredLoss};
    use ndarray::Array2;

    fn linear_data(n: usize) -> (Array2<f32>, Vec<f32>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| ((i * (j + 3)) % 17) as f32 + j as f32);
        let y: Vec<f32> = x
            .outer_iter()
            .map(|row| 2.0 * row[0] - row[1] + 0.5 * row[2])
            .collect();
        (x, y)
    }

    fn small_params() -> GBDTParams {
        GBDTParams {
            n_trees: 30,
            learning_rate: 0.3,
            gain: GainParams {
                min_samples_leaf: 2,
                ..Default::default()
            },
            n_threads: 1,
            early_stopping_rounds: 0,
            ..Default::default()
        }
    }

    fn rmse(forest: &Forest, x: &Array2<f32>, y: &[f32]) -> f64 {
        let preds: Vec<f32> = x
            .outer_iter()
            .map(|row| forest.predict_row(row.as_slice().unwrap()))
            .collect();
        Rmse.compute(&preds, y)
    }

    #[test]
    fn params_default() {
        let params = GBDTParams::default();
        assert_eq!(params.n_trees, 100);
        assert_eq!(params.max_leaves, 31);
        assert_eq!(params.gain.min_samples_leaf, 20);
        assert_eq!(params.early_stopping_rounds, 10);
        assert_eq!(params.seed, 42);
    }

    #[test]
    fn training_reduces_error_below_base_score() {
        let (x, y) = linear_data(200);
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, small_params());
        let forest = trainer.train(x.view(), &y, &[]).unwrap();

        let base_only = Forest::new(forest.base_score());
        assert_eq!(forest.n_trees(), 30);
        assert!(rmse(&forest, &x, &y) < 0.5 * rmse(&base_only, &x, &y));
    }

    #[test]
    fn training_is_deterministic() {
        let (x, y) = linear_data(150);
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, small_params());
        let a = trainer.train(x.view(), &y, &[]).unwrap();
        let b = trainer.train(x.view(), &y, &[]).unwrap();
        for (ta, tb) in a.trees().zip(b.trees()) {
            assert_eq!(ta.leaf_values(), tb.leaf_values());
            assert_eq!(ta.split_thresholds(), tb.split_thresholds());
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let (x, y) = linear_data(150);
        let seq = GBDTTrainer::new(SquaredLoss, Rmse, small_params())
            .train(x.view(), &y, &[])
            .unwrap();
        let par = GBDTTrainer::new(
            SquaredLoss,
            Rmse,
            GBDTParams {
                n_threads: 2,
                ..small_params()
            },
        )
        .train(x.view(), &y, &[])
        .unwrap();
        for (ta, tb) in seq.trees().zip(par.trees()) {
            assert_eq!(ta.leaf_values(), tb.leaf_values());
        }
    }

    #[test]
    fn early_stopping_truncates_on_eval_set() {
        let (x, y) = linear_data(200);
        // Eval targets are the negated train targets, so fitting makes them worse.
        let eval_y: Vec<f32> = y.iter().map(|v| -v).collect();
        let eval = EvalSet::new("valid", x.view(), &eval_y);
        let params = GBDTParams {
            n_trees: 50,
            early_stopping_rounds: 3,
            ..small_params()
        };
        let forest = GBDTTrainer::new(SquaredLoss, Rmse, params)
            .train(x.view(), &y, &[eval])
            .unwrap();
        assert!(forest.n_trees() < 50);
    }

    #[test]
    fn disabled_metric_disables_early_stopping() {
        let (x, y) = linear_data(100);
        let params = GBDTParams {
            n_trees: 10,
            early_stopping_rounds: 1,
            ..small_params()
        };
        let forest = GBDTTrainer::new(SquaredLoss, Metric::none(), params)
            .train(x.view(), &y, &[])
            .unwrap();
        assert_eq!(forest.n_trees(), 10);
    }

    #[test]
    fn logistic_training_separates_classes() {
        let n = 200;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { i as f32 } else { (i % 7) as f32 });
        let y: Vec<f32> = (0..n).map(|i| if i >= n / 2 { 1.0 } else { 0.0 }).collect();
        let forest = GBDTTrainer::new(LogisticLoss, LogLoss, small_params())
            .train(x.view(), &y, &[])
            .unwrap();

        assert!(forest.predict_row(&[10.0, 3.0]) < 0.0);
        assert!(forest.predict_row(&[190.0, 3.0]) > 0.0);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, small_params());
        let empty = Array2::<f32>::zeros((0, 3));
        assert!(matches!(
            trainer.train(empty.view(), &[], &[]),
            Err(TrainError::EmptyDataset)
        ));

        let x = Array2::<f32>::zeros((3, 2));
        assert!(matches!(
            trainer.train(x.view(), &[1.0, 2.0], &[]),
            Err(TrainError::TargetLengthMismatch { expected: 3, found: 2 })
        ));
        assert!(matches!(
            trainer.train(x.view(), &[1.0, f32::NAN, 2.0], &[]),
            Err(TrainError::NonFiniteTarget { row: 1 })
        ));

        let bad_eval = Array2::<f32>::zeros((3, 5));
        let eval = EvalSet::new("valid", bad_eval.view(), &[0.0, 0.0, 0.0]);
        assert!(matches!(
            trainer.train(x.view(), &[1.0, 2.0, 3.0], &[eval]),
            Err(TrainError::InvalidEvalSet { .. })
        ));
    }
}
