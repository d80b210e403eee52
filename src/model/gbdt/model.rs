//! GBDT model implementation.
//!
//! High-level wrapper around [`Forest`] with training and prediction.
//! Access components via [`forest()`](GBDTModel::forest), [`meta()`](GBDTModel::meta),
//! and [`config()`](GBDTModel::config).

use ndarray::ArrayView2;

use crate::model::meta::ModelMeta;
use crate::repr::gbdt::Forest;
use crate::training::gbdt::{GBDTTrainer, TrainError};
use crate::training::{EvalSet, Metric, ObjectiveFn};

use super::GBDTConfig;

/// Trained gradient boosted tree model.
///
/// Immutable once built; every prediction method takes `&self`.
#[derive(Debug, Clone)]
pub struct GBDTModel {
    forest: Forest,
    meta: ModelMeta,
    config: GBDTConfig,
}

impl GBDTModel {
    /// Create a model from all its parts.
    ///
    /// Used when loading a persisted model.
    pub fn from_parts(forest: Forest, meta: ModelMeta, config: GBDTConfig) -> Self {
        Self {
            forest,
            meta,
            config,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn config(&self) -> &GBDTConfig {
        &self.config
    }

    /// Number of input features the model expects.
    pub fn n_features(&self) -> usize {
        self.meta.n_features
    }

    /// Set feature names.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.meta.feature_names = Some(names);
        self
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train a new model on sample-major `features` (`[n_rows, n_features]`).
    ///
    /// `eval_sets` are monitored with the configured metric; the first one
    /// drives early stopping when present.
    pub fn train(
        features: ArrayView2<'_, f32>,
        targets: &[f32],
        eval_sets: &[EvalSet<'_>],
        config: GBDTConfig,
    ) -> Result<Self, TrainError> {
        let metric = config.metric.unwrap_or(Metric::none());
        let trainer = GBDTTrainer::new(config.objective, metric, config.to_params());
        let forest = trainer.train(features, targets, eval_sets)?;

        let meta = ModelMeta {
            n_features: features.ncols(),
            task: config.objective.task_kind(),
            feature_names: None,
            best_iteration: Some(forest.n_trees()),
        };

        Ok(Self {
            forest,
            meta,
            config,
        })
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Raw additive score (log-odds for classification) of one row.
    #[inline]
    pub fn predict_raw_row(&self, features: &[f32]) -> f32 {
        debug_assert_eq!(features.len(), self.meta.n_features);
        self.forest.predict_row(features)
    }

    /// Prediction of one row in the objective's natural space.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.config
            .objective
            .transform_prediction(self.predict_raw_row(features))
    }

    /// Raw scores for every row of `features`.
    pub fn predict_raw(&self, features: ArrayView2<'_, f32>) -> Vec<f32> {
        features
            .rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                Some(slice) => self.predict_raw_row(slice),
                None => self.predict_raw_row(&row.to_vec()),
            })
            .collect()
    }

    /// Transformed predictions for every row of `features`.
    pub fn predict(&self, features: ArrayView2<'_, f32>) -> Vec<f32> {
        let objective = self.config.objective;
        self.predict_raw(features)
            .into_iter()
            .map(|raw| objective.transform_prediction(raw))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskKind;
    use crate::training::Objective;
    use ndarray::Array2;

    fn step_data(n: usize) -> (Array2<f32>, Vec<f32>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { i as f32 } else { (i % 3) as f32 });
        let y = (0..n).map(|i| if i < n / 2 { 1.0 } else { 5.0 }).collect();
        (x, y)
    }

    #[test]
    fn train_records_meta() {
        let (x, y) = step_data(100);
        let config = GBDTConfig::builder()
            .n_trees(10)
            .min_samples_leaf(5)
            .feature_fraction(1.0)
            .bagging_fraction(1.0)
            .n_threads(1)
            .build()
            .unwrap();
        let model = GBDTModel::train(x.view(), &y, &[], config).unwrap();

        assert_eq!(model.n_features(), 2);
        assert_eq!(model.meta().task, TaskKind::Regression);
        assert_eq!(model.meta().best_iteration, Some(model.forest().n_trees()));
        assert!(model.predict_raw_row(&[0.0, 0.0]) < model.predict_raw_row(&[99.0, 0.0]));
    }

    #[test]
    fn predict_matches_row_prediction() {
        let (x, y) = step_data(60);
        let labels: Vec<f32> = y.iter().map(|&v| if v > 2.0 { 1.0 } else { 0.0 }).collect();
        let config = GBDTConfig::builder()
            .objective(Objective::logistic())
            .n_trees(5)
            .min_samples_leaf(5)
            .n_threads(1)
            .build()
            .unwrap();
        let model = GBDTModel::train(x.view(), &labels, &[], config).unwrap();

        let batch = model.predict(x.view());
        for (i, row) in x.rows().into_iter().enumerate() {
            let p = model.predict_row(row.as_slice().unwrap());
            assert_eq!(batch[i], p);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn train_propagates_errors() {
        let x = Array2::<f32>::zeros((0, 3));
        let result = GBDTModel::train(x.view(), &[], &[], GBDTConfig::default());
        assert!(matches!(result, Err(TrainError::EmptyDataset)));
    }
}
