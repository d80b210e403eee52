//! End-to-end training of the ensemble from a corpus file.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, LoanboostConfig};
use crate::encoding::{EncoderError, FeatureEncoder};
use crate::ensemble::{
    ApprovalTrainer, EnsembleError, EnsemblePredictor, RiskScoreTrainer, Trainer,
};
use crate::evaluation::{EvaluationError, EvaluationReport, MetricsEvaluator};
use crate::loan::{train_test_split, LoadError, LoanLoader, LoanRecord, SplitError};
use crate::training::{MetricValue, TrainError};
use crate::utils::run_with_threads;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error(transparent)]
    Train(#[from] TrainError),

    #[error(transparent)]
    Ensemble(#[from] EnsembleError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Everything a training run produces.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub predictor: EnsemblePredictor,
    pub n_train: usize,
    pub n_test: usize,
    /// Risk score trainer metrics on the test split.
    pub risk_metrics: Vec<MetricValue>,
    /// Approval trainer metrics on the test split.
    pub approval_metrics: Vec<MetricValue>,
    /// `None` when the test split is empty.
    pub report: Option<EvaluationReport>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline;

impl Pipeline {
    /// Load the configured corpus and train on it.
    pub fn run(config: &LoanboostConfig) -> Result<PipelineOutcome, PipelineError> {
        config.validate()?;
        let records = LoanLoader::new(config.numeric_parsing).load_path(&config.data_path)?;
        Self::run_on_records(config, records)
    }

    /// Split, encode, train both models and evaluate on the test split.
    pub fn run_on_records(
        config: &LoanboostConfig,
        records: Vec<LoanRecord>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let gbdt = config.gbdt_config().map_err(ConfigError::from)?;
        let (train, test) = train_test_split(&records, config.test_fraction, config.seed)?;
        log::info!("split {} records: {} train, {} test", records.len(), train.len(), test.len());

        let encoder = FeatureEncoder::fit(&train)?;
        let feature_names = encoder.feature_names();
        let x_train = encoder.transform(&train);
        let x_test = encoder.transform(&test);
        let (risk_train, approved_train) = labels(&train);
        let (risk_test, approved_test) = labels(&test);

        let risk_trainer = RiskScoreTrainer::new(gbdt.clone());
        let approval_trainer = ApprovalTrainer::new(gbdt);
        let risk = risk_trainer.train(x_train.view(), &risk_train)?;
        let approval = approval_trainer.train(x_train.view(), &approved_train)?;

        let (risk_metrics, approval_metrics) = if test.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            (
                risk_trainer.evaluate(&risk, x_test.view(), &risk_test),
                approval_trainer.evaluate(&approval, x_test.view(), &approved_test),
            )
        };
        for metric in risk_metrics.iter().chain(&approval_metrics) {
            log::info!("test {metric}");
        }

        let predictor = EnsemblePredictor::new(
            Arc::new(encoder),
            Arc::new(risk.with_feature_names(feature_names.clone())),
            Arc::new(approval.with_feature_names(feature_names)),
        )?;

        let report = if test.is_empty() {
            log::warn!("test split is empty, skipping evaluation");
            None
        } else {
            let predictions = run_with_threads(config.boosting.n_threads, |parallelism| {
                predictor.predict_batch_with(&test, parallelism)
            });
            Some(MetricsEvaluator::evaluate_predictions(&test, &predictions)?)
        };

        Ok(PipelineOutcome {
            predictor,
            n_train: train.len(),
            n_test: test.len(),
            risk_metrics,
            approval_metrics,
            report,
        })
    }
}

fn labels(records: &[LoanRecord]) -> (Vec<f32>, Vec<f32>) {
    records
        .iter()
        .map(|r| (r.risk_score, if r.loan_approved { 1.0 } else { 0.0 }))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoostingSettings;
    use crate::testing::{synthetic_loans, write_csv};

    fn quick_config() -> LoanboostConfig {
        LoanboostConfig {
            boosting: BoostingSettings {
                n_trees: 20,
                ..BoostingSettings::default()
            },
            ..LoanboostConfig::default()
        }
    }

    #[test]
    fn runs_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loans.csv");
        let file = std::fs::File::create(&path).unwrap();
        write_csv(file, &synthetic_loans(300, 31)).unwrap();

        let config = LoanboostConfig {
            data_path: path,
            ..quick_config()
        };
        let outcome = Pipeline::run(&config).unwrap();
        assert_eq!(outcome.n_test, 90);
        assert_eq!(outcome.n_train, 210);
        assert_eq!(outcome.risk_metrics.len(), 4);
        assert_eq!(outcome.approval_metrics.len(), 8);

        let report = outcome.report.unwrap();
        assert_eq!(report.n_samples, 90);
        let approval = &report.approval;
        let cm = approval.confusion;
        let positives = (cm.tp + cm.fn_) as f64;
        let majority = positives.max(cm.total() as f64 - positives) / cm.total() as f64;
        assert!(
            approval.accuracy > majority,
            "accuracy {} vs majority rate {majority}",
            approval.accuracy
        );
        assert!(approval.recall > 0.0);
        assert!(approval.auc.unwrap() > 0.75, "auc {:?}", approval.auc);
    }

    #[test]
    fn models_carry_feature_names() {
        let config = quick_config();
        let outcome = Pipeline::run_on_records(&config, synthetic_loans(200, 32)).unwrap();
        let names = outcome.predictor.encoder().feature_names();
        let meta = outcome.predictor.risk_model().gbdt().meta();
        assert_eq!(meta.feature_names.as_deref(), Some(names.as_slice()));
    }

    #[test]
    fn empty_test_split_skips_report() {
        let config = LoanboostConfig {
            test_fraction: 0.0,
            ..quick_config()
        };
        let outcome = Pipeline::run_on_records(&config, synthetic_loans(100, 33)).unwrap();
        assert_eq!(outcome.n_test, 0);
        assert!(outcome.report.is_none());
        assert!(outcome.risk_metrics.is_empty());
    }

    #[test]
    fn missing_corpus_is_load_error() {
        let config = LoanboostConfig {
            data_path: "/no/such/loans.csv".into(),
            ..quick_config()
        };
        assert!(matches!(
            Pipeline::run(&config),
            Err(PipelineError::Load(LoadError::Io { .. }))
        ));
    }
}
