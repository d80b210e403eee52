//! The two model trainers and the models they produce.

use ndarray::ArrayView2;

use crate::evaluation::ConfusionMatrix;
use crate::model::{GBDTConfig, GBDTModel, PlattCalibrator};
use crate::training::{
    roc_auc, EvalSet, LogLoss, Mae, Metric, MetricFn, MetricValue, Mse, Objective, RSquared, Rmse,
    TrainError,
};

/// Uniform training contract shared by both ensemble members.
pub trait Trainer {
    type Model;

    /// Train on sample-major `features` with monitored evaluation sets.
    ///
    /// The first evaluation set drives early stopping.
    fn train_with_eval_sets(
        &self,
        features: ArrayView2<'_, f32>,
        labels: &[f32],
        eval_sets: &[EvalSet<'_>],
    ) -> Result<Self::Model, TrainError>;

    /// Train without evaluation sets; early stopping watches the training metric.
    fn train(&self, features: ArrayView2<'_, f32>, labels: &[f32]) -> Result<Self::Model, TrainError> {
        self.train_with_eval_sets(features, labels, &[])
    }

    /// Score `model` on labeled rows.
    fn evaluate(
        &self,
        model: &Self::Model,
        features: ArrayView2<'_, f32>,
        labels: &[f32],
    ) -> Vec<MetricValue>;
}

fn metric_value<M: MetricFn>(metric: M, predictions: &[f32], labels: &[f32]) -> MetricValue {
    MetricValue::new(
        metric.name(),
        metric.compute(predictions, labels),
        metric.higher_is_better(),
    )
}

// =============================================================================
// Risk score
// =============================================================================

/// Squared-loss regressor of the raw risk score.
#[derive(Debug, Clone)]
pub struct RiskScoreTrainer {
    config: GBDTConfig,
}

impl RiskScoreTrainer {
    /// Objective and metric are fixed to squared loss and RMSE.
    pub fn new(config: GBDTConfig) -> Self {
        Self {
            config: GBDTConfig {
                objective: Objective::squared(),
                metric: Some(Metric::rmse()),
                ..config
            },
        }
    }

    pub fn config(&self) -> &GBDTConfig {
        &self.config
    }
}

impl Default for RiskScoreTrainer {
    fn default() -> Self {
        Self::new(GBDTConfig::default())
    }
}

impl Trainer for RiskScoreTrainer {
    type Model = RiskScoreModel;

    fn train_with_eval_sets(
        &self,
        features: ArrayView2<'_, f32>,
        labels: &[f32],
        eval_sets: &[EvalSet<'_>],
    ) -> Result<RiskScoreModel, TrainError> {
        log::info!("training risk score model on {} rows", features.nrows());
        let model = GBDTModel::train(features, labels, eval_sets, self.config.clone())?;
        log::info!("risk score model: {} trees", model.forest().n_trees());
        Ok(RiskScoreModel::new(model))
    }

    fn evaluate(
        &self,
        model: &RiskScoreModel,
        features: ArrayView2<'_, f32>,
        labels: &[f32],
    ) -> Vec<MetricValue> {
        let predictions = model.predict(features);
        vec![
            metric_value(Rmse, &predictions, labels),
            metric_value(Mae, &predictions, labels),
            metric_value(Mse, &predictions, labels),
            metric_value(RSquared, &predictions, labels),
        ]
    }
}

/// Trained risk score regressor.
#[derive(Debug, Clone)]
pub struct RiskScoreModel {
    model: GBDTModel,
}

impl RiskScoreModel {
    pub fn new(model: GBDTModel) -> Self {
        Self { model }
    }

    pub fn with_feature_names(self, names: Vec<String>) -> Self {
        Self::new(self.model.with_feature_names(names))
    }

    pub fn gbdt(&self) -> &GBDTModel {
        &self.model
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// Risk score of one encoded row.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.model.predict_row(features)
    }

    pub fn predict(&self, features: ArrayView2<'_, f32>) -> Vec<f32> {
        self.model.predict(features)
    }
}

// =============================================================================
// Approval
// =============================================================================

/// Logistic-loss classifier of the approval label, Platt-calibrated.
#[derive(Debug, Clone)]
pub struct ApprovalTrainer {
    config: GBDTConfig,
}

impl ApprovalTrainer {
    /// Objective and metric are fixed to logistic loss and log loss.
    pub fn new(config: GBDTConfig) -> Self {
        Self {
            config: GBDTConfig {
                objective: Objective::logistic(),
                metric: Some(Metric::logloss()),
                ..config
            },
        }
    }

    pub fn config(&self) -> &GBDTConfig {
        &self.config
    }
}

impl Default for ApprovalTrainer {
    fn default() -> Self {
        Self::new(GBDTConfig::default())
    }
}

impl Trainer for ApprovalTrainer {
    type Model = ApprovalModel;

    fn train_with_eval_sets(
        &self,
        features: ArrayView2<'_, f32>,
        labels: &[f32],
        eval_sets: &[EvalSet<'_>],
    ) -> Result<ApprovalModel, TrainError> {
        log::info!("training approval model on {} rows", features.nrows());
        let model = GBDTModel::train(features, labels, eval_sets, self.config.clone())?;
        let margins = model.predict_raw(features);
        let calibrator = PlattCalibrator::fit(&margins, labels);
        log::info!(
            "approval model: {} trees, platt a={:.4} b={:.4}",
            model.forest().n_trees(),
            calibrator.a,
            calibrator.b
        );
        Ok(ApprovalModel::new(model, calibrator))
    }

    fn evaluate(
        &self,
        model: &ApprovalModel,
        features: ArrayView2<'_, f32>,
        labels: &[f32],
    ) -> Vec<MetricValue> {
        let margins = model.gbdt().predict_raw(features);
        let probabilities: Vec<f32> = margins.iter().map(|&m| model.probability(m)).collect();
        let actual: Vec<bool> = labels.iter().map(|&y| y > 0.5).collect();
        let predicted: Vec<bool> = margins.iter().map(|&m| ApprovalModel::decide(m)).collect();
        let cm = ConfusionMatrix::from_pairs(&actual, &predicted);

        vec![
            MetricValue::new("accuracy", cm.accuracy(), true),
            MetricValue::new("auc", roc_auc(&probabilities, &actual), true),
            MetricValue::new("f1", cm.f1(), true),
            MetricValue::new("precision", cm.precision(), true),
            MetricValue::new("recall", cm.recall(), true),
            MetricValue::new("negative_precision", cm.negative_precision(), true),
            MetricValue::new("negative_recall", cm.specificity(), true),
            metric_value(LogLoss, &probabilities, labels),
        ]
    }
}

/// Trained approval classifier.
///
/// The decision follows the raw margin (`margin > 0`); the probability is
/// the Platt-calibrated margin.
#[derive(Debug, Clone)]
pub struct ApprovalModel {
    model: GBDTModel,
    calibrator: PlattCalibrator,
}

impl ApprovalModel {
    pub fn new(model: GBDTModel, calibrator: PlattCalibrator) -> Self {
        Self { model, calibrator }
    }

    pub fn with_feature_names(self, names: Vec<String>) -> Self {
        Self::new(self.model.with_feature_names(names), self.calibrator)
    }

    pub fn gbdt(&self) -> &GBDTModel {
        &self.model
    }

    pub fn calibrator(&self) -> &PlattCalibrator {
        &self.calibrator
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// Raw log-odds of one encoded row.
    #[inline]
    pub fn margin(&self, features: &[f32]) -> f32 {
        self.model.predict_raw_row(features)
    }

    /// Calibrated approval probability of a margin.
    #[inline]
    pub fn probability(&self, margin: f32) -> f32 {
        self.calibrator.apply(margin)
    }

    #[inline]
    pub fn decide(margin: f32) -> bool {
        margin > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::FeatureEncoder;
    use crate::testing::synthetic_loans;

    fn small_config() -> GBDTConfig {
        GBDTConfig::builder()
            .n_trees(30)
            .min_samples_leaf(5)
            .build()
            .unwrap()
    }

    #[test]
    fn trainers_fix_objective_and_metric() {
        let risk = RiskScoreTrainer::new(
            GBDTConfig::builder()
                .objective(Objective::logistic())
                .build()
                .unwrap(),
        );
        assert_eq!(risk.config().objective, Objective::squared());
        assert_eq!(risk.config().metric, Some(Metric::rmse()));

        let approval = ApprovalTrainer::default();
        assert_eq!(approval.config().objective, Objective::logistic());
        assert_eq!(approval.config().metric, Some(Metric::logloss()));
        assert_eq!(approval.config().num_leaves, 31);
    }

    #[test]
    fn risk_model_learns_signal() {
        let records = synthetic_loans(400, 11);
        let encoder = FeatureEncoder::fit(&records).unwrap();
        let x = encoder.transform(&records);
        let y: Vec<f32> = records.iter().map(|r| r.risk_score).collect();

        let trainer = RiskScoreTrainer::new(small_config());
        let model = trainer.train(x.view(), &y).unwrap();
        assert_eq!(model.n_features(), encoder.n_features());

        let metrics = trainer.evaluate(&model, x.view(), &y);
        let names: Vec<&str> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["rmse", "mae", "mse", "r2"]);
        assert!(metrics[3].value > 0.5, "train r2 = {}", metrics[3].value);
    }

    #[test]
    fn approval_model_is_calibrated() {
        let records = synthetic_loans(400, 12);
        let encoder = FeatureEncoder::fit(&records).unwrap();
        let x = encoder.transform(&records);
        let y: Vec<f32> = records
            .iter()
            .map(|r| if r.loan_approved { 1.0 } else { 0.0 })
            .collect();

        let trainer = ApprovalTrainer::new(small_config());
        let model = trainer.train(x.view(), &y).unwrap();

        let row = encoder.transform_one(&records[0]);
        let p = model.probability(model.margin(&row));
        assert!((0.0..=1.0).contains(&p));
        // Calibration keeps the ordering of margins.
        assert!(model.probability(2.0) > model.probability(-2.0));

        let metrics = trainer.evaluate(&model, x.view(), &y);
        assert_eq!(metrics.len(), 8);
        assert_eq!(metrics[0].name, "accuracy");
        assert_eq!(metrics[7].name, "logloss");

        // Must beat always predicting the majority class.
        let positives = y.iter().filter(|&&v| v > 0.5).count() as f64;
        let majority = positives.max(y.len() as f64 - positives) / y.len() as f64;
        assert!(
            metrics[0].value > majority,
            "train accuracy {} vs majority rate {majority}",
            metrics[0].value
        );
        assert!(metrics[1].value > 0.8, "train auc = {}", metrics[1].value);
        assert!(metrics[4].value > 0.0, "train recall = {}", metrics[4].value);
    }
}
