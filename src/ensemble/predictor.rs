//! Two-stage inference over one shared encoder.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::encoding::FeatureEncoder;
use crate::evaluation::{EvaluationError, EvaluationReport, MetricsEvaluator};
use crate::loan::LoanRecord;
use crate::utils::Parallelism;

use super::trainers::{ApprovalModel, RiskScoreModel};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnsembleError {
    #[error("{artifact} expects {found} features but the encoder produces {expected}")]
    FeatureCountMismatch {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Output of one ensemble call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsemblePrediction {
    pub risk_score: f32,
    pub approved: bool,
    /// Calibrated, in `[0, 1]`.
    pub approval_probability: f32,
    /// Raw log-odds of the approval model.
    pub approval_raw_score: f32,
}

/// Fitted encoder plus both trained models.
///
/// Shares its parts read-only, so it is `Send + Sync` and cheap to clone.
/// Per-call scratch lives in a [`PredictionSession`].
#[derive(Debug, Clone)]
pub struct EnsemblePredictor {
    encoder: Arc<FeatureEncoder>,
    risk: Arc<RiskScoreModel>,
    approval: Arc<ApprovalModel>,
}

impl EnsemblePredictor {
    /// Compose the parts, checking that both models take the encoder's width.
    pub fn new(
        encoder: Arc<FeatureEncoder>,
        risk: Arc<RiskScoreModel>,
        approval: Arc<ApprovalModel>,
    ) -> Result<Self, EnsembleError> {
        let expected = encoder.n_features();
        for (artifact, found) in [
            ("risk score model", risk.n_features()),
            ("approval model", approval.n_features()),
        ] {
            if found != expected {
                return Err(EnsembleError::FeatureCountMismatch {
                    artifact,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            encoder,
            risk,
            approval,
        })
    }

    pub fn encoder(&self) -> &Arc<FeatureEncoder> {
        &self.encoder
    }

    pub fn risk_model(&self) -> &Arc<RiskScoreModel> {
        &self.risk
    }

    pub fn approval_model(&self) -> &Arc<ApprovalModel> {
        &self.approval
    }

    /// Open a session holding the per-row scratch buffer.
    pub fn session(&self) -> PredictionSession<'_> {
        PredictionSession {
            predictor: self,
            row: vec![0.0; self.encoder.n_features()],
        }
    }

    pub fn predict(&self, record: &LoanRecord) -> EnsemblePrediction {
        self.session().predict(record)
    }

    /// Predict every record, in input order.
    pub fn predict_batch(&self, records: &[LoanRecord]) -> Vec<EnsemblePrediction> {
        self.predict_batch_with(records, Parallelism::Sequential)
    }

    /// Like [`predict_batch`](Self::predict_batch), with one session per
    /// rayon worker when `parallelism` allows.
    pub fn predict_batch_with(
        &self,
        records: &[LoanRecord],
        parallelism: Parallelism,
    ) -> Vec<EnsemblePrediction> {
        parallelism.maybe_par_map_init(
            records,
            || self.session(),
            |session, record| session.predict(record),
        )
    }

    /// Predict `records` and evaluate against their labels.
    pub fn evaluate(&self, records: &[LoanRecord]) -> Result<EvaluationReport, EvaluationError> {
        let predictions = self.predict_batch(records);
        MetricsEvaluator::evaluate_predictions(records, &predictions)
    }
}

/// Inference scratch for one thread.
pub struct PredictionSession<'a> {
    predictor: &'a EnsemblePredictor,
    row: Vec<f32>,
}

impl PredictionSession<'_> {
    pub fn predict(&mut self, record: &LoanRecord) -> EnsemblePrediction {
        let p = self.predictor;
        p.encoder.transform_into(record, &mut self.row);

        let margin = p.approval.margin(&self.row);
        EnsemblePrediction {
            risk_score: p.risk.predict_row(&self.row),
            approved: ApprovalModel::decide(margin),
            approval_probability: p.approval.probability(margin),
            approval_raw_score: margin,
        }
    }

    /// Release the scratch buffer now instead of at drop.
    pub fn finish(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::{ApprovalTrainer, RiskScoreTrainer, Trainer};
    use crate::model::GBDTConfig;
    use crate::testing::synthetic_loans;

    fn predictor(records: &[LoanRecord]) -> EnsemblePredictor {
        let encoder = FeatureEncoder::fit(records).unwrap();
        let x = encoder.transform(records);
        let risk: Vec<f32> = records.iter().map(|r| r.risk_score).collect();
        let approved: Vec<f32> = records.iter().map(|r| r.loan_approved as u8 as f32).collect();
        let config = GBDTConfig::builder().n_trees(10).build().unwrap();

        let risk = RiskScoreTrainer::new(config.clone()).train(x.view(), &risk).unwrap();
        let approval = ApprovalTrainer::new(config).train(x.view(), &approved).unwrap();
        EnsemblePredictor::new(Arc::new(encoder), Arc::new(risk), Arc::new(approval)).unwrap()
    }

    #[test]
    fn predictor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnsemblePredictor>();
    }

    #[test]
    fn batch_matches_single() {
        let records = synthetic_loans(200, 5);
        let predictor = predictor(&records);

        let single: Vec<_> = records.iter().map(|r| predictor.predict(r)).collect();
        assert_eq!(predictor.predict_batch(&records), single);
        assert_eq!(
            predictor.predict_batch_with(&records, Parallelism::Parallel),
            single
        );
        assert!(predictor.predict_batch(&[]).is_empty());
    }

    #[test]
    fn prediction_fields_are_consistent() {
        let records = synthetic_loans(200, 6);
        let predictor = predictor(&records);
        let mut session = predictor.session();
        for record in &records[..20] {
            let p = session.predict(record);
            assert_eq!(p.approved, p.approval_raw_score > 0.0);
            assert!((0.0..=1.0).contains(&p.approval_probability));
            assert!(p.risk_score.is_finite());
        }
        session.finish();
    }

    #[test]
    fn mismatched_models_are_rejected() {
        let records = synthetic_loans(120, 8);
        let full = predictor(&records);

        // Encoder fit on a subset with fewer categories is narrower.
        let narrow = FeatureEncoder::fit(&records[..1]).unwrap();
        assert!(narrow.n_features() < full.encoder().n_features());

        let err = EnsemblePredictor::new(
            Arc::new(narrow.clone()),
            full.risk_model().clone(),
            full.approval_model().clone(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EnsembleError::FeatureCountMismatch {
                artifact: "risk score model",
                expected: narrow.n_features(),
                found: full.encoder().n_features(),
            }
        );
    }

    #[test]
    fn evaluate_reports_on_labels() {
        let records = synthetic_loans(200, 9);
        let report = predictor(&records).evaluate(&records).unwrap();
        assert_eq!(report.n_samples, 200);
        assert_eq!(report.approval.confusion.total(), 200);
    }
}
