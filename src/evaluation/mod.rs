//! Quality metrics for the two-stage ensemble.
//!
//! [`MetricsEvaluator`] works on order-aligned actual/predicted sequences:
//!
//! - [`MetricsEvaluator::regression`]: risk score error and tolerance bands
//! - [`MetricsEvaluator::classification`]: confusion matrix and derived rates
//! - [`MetricsEvaluator::business`]: group averages and confidence counts
//!
//! [`MetricsEvaluator::evaluate_predictions`] runs all three over ensemble
//! predictions and returns an [`EvaluationReport`].

mod business;
mod classification;
mod regression;
mod report;

pub use business::{BusinessReport, GroupAverages, HIGH_RISK_THRESHOLD};
pub use classification::{ClassificationReport, ConfusionMatrix};
pub use regression::{BandCount, RegressionReport};
pub use report::EvaluationReport;

use thiserror::Error;

use crate::ensemble::EnsemblePrediction;
use crate::loan::LoanRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("length mismatch: {actual} actual values vs {predicted} predictions")]
    LengthMismatch { actual: usize, predicted: usize },

    #[error("cannot evaluate an empty sequence")]
    Empty,
}

/// Check that two aligned sequences are non-empty and of equal length.
pub(crate) fn check_aligned(actual: usize, predicted: usize) -> Result<(), EvaluationError> {
    if actual != predicted {
        return Err(EvaluationError::LengthMismatch { actual, predicted });
    }
    if actual == 0 {
        return Err(EvaluationError::Empty);
    }
    Ok(())
}

/// Stateless evaluator; every method is a pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEvaluator;

impl MetricsEvaluator {
    /// Regression metrics of predicted against actual risk scores.
    pub fn regression(
        actual: &[f32],
        predicted: &[f32],
    ) -> Result<RegressionReport, EvaluationError> {
        RegressionReport::compute(actual, predicted)
    }

    /// Classification metrics of predicted against actual decisions.
    ///
    /// AUC is reported when `probabilities` is given.
    pub fn classification(
        actual: &[bool],
        predicted: &[bool],
        probabilities: Option<&[f32]>,
    ) -> Result<ClassificationReport, EvaluationError> {
        ClassificationReport::compute(actual, predicted, probabilities)
    }

    /// Business metrics of ensemble predictions against labeled records.
    pub fn business(
        records: &[LoanRecord],
        predictions: &[EnsemblePrediction],
    ) -> Result<BusinessReport, EvaluationError> {
        BusinessReport::compute(records, predictions)
    }

    /// Full report of ensemble predictions against labeled records.
    pub fn evaluate_predictions(
        records: &[LoanRecord],
        predictions: &[EnsemblePrediction],
    ) -> Result<EvaluationReport, EvaluationError> {
        check_aligned(records.len(), predictions.len())?;

        let actual_risk: Vec<f32> = records.iter().map(|r| r.risk_score).collect();
        let predicted_risk: Vec<f32> = predictions.iter().map(|p| p.risk_score).collect();
        let actual_approved: Vec<bool> = records.iter().map(|r| r.loan_approved).collect();
        let predicted_approved: Vec<bool> = predictions.iter().map(|p| p.approved).collect();
        let probabilities: Vec<f32> = predictions
            .iter()
            .map(|p| p.approval_probability)
            .collect();

        let report = EvaluationReport {
            n_samples: records.len(),
            risk_score: Self::regression(&actual_risk, &predicted_risk)?,
            approval: Self::classification(
                &actual_approved,
                &predicted_approved,
                Some(&probabilities),
            )?,
            business: Self::business(records, predictions)?,
        };
        log::info!(
            "evaluated {} records: risk rmse {:.4}, approval accuracy {:.4}",
            report.n_samples,
            report.risk_score.rmse,
            report.approval.accuracy
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(risk_score: f32, approved: bool, probability: f32) -> EnsemblePrediction {
        EnsemblePrediction {
            risk_score,
            approved,
            approval_probability: probability,
            approval_raw_score: if approved { 1.0 } else { -1.0 },
        }
    }

    #[test]
    fn alignment_errors() {
        assert_eq!(
            MetricsEvaluator::regression(&[1.0], &[1.0, 2.0]),
            Err(EvaluationError::LengthMismatch {
                actual: 1,
                predicted: 2
            })
        );
        assert_eq!(
            MetricsEvaluator::classification(&[], &[], None),
            Err(EvaluationError::Empty)
        );
        assert!(matches!(
            MetricsEvaluator::evaluate_predictions(&[LoanRecord::sample()], &[]),
            Err(EvaluationError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn full_report_combines_layers() {
        let records = vec![
            LoanRecord {
                risk_score: 40.0,
                loan_approved: true,
                ..LoanRecord::sample()
            },
            LoanRecord {
                risk_score: 60.0,
                loan_approved: false,
                ..LoanRecord::sample()
            },
        ];
        let predictions = vec![prediction(42.0, true, 0.9), prediction(58.0, false, 0.2)];

        let report = MetricsEvaluator::evaluate_predictions(&records, &predictions).unwrap();
        assert_eq!(report.n_samples, 2);
        assert_eq!(report.approval.accuracy, 1.0);
        assert_eq!(report.approval.auc, Some(1.0));
        assert_eq!(report.risk_score.mae, 2.0);
        assert_eq!(report.business.high_risk_actual, 1);
        assert_eq!(report.business.high_risk_predicted, 1);
        assert_eq!(report.business.high_confidence_approvals, 1);
    }

    #[test]
    fn perfect_decisions_on_mixed_labels() {
        let records = crate::testing::synthetic_loans(300, 41);
        let actual: Vec<bool> = records.iter().map(|r| r.loan_approved).collect();
        let positives = actual.iter().filter(|&&a| a).count();
        assert!(positives > 0 && positives < actual.len());

        let scores: Vec<f32> = actual.iter().map(|&a| if a { 0.9 } else { 0.1 }).collect();
        let report = MetricsEvaluator::classification(&actual, &actual, Some(&scores)).unwrap();
        assert_eq!(report.confusion.tp, positives);
        assert_eq!(report.confusion.tn, actual.len() - positives);
        assert_eq!(report.confusion.fp + report.confusion.fn_, 0);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
        assert_eq!(report.auc, Some(1.0));

        // Rejecting everyone scores the majority rate but finds no approvals.
        let reject = vec![false; actual.len()];
        let report = MetricsEvaluator::classification(&actual, &reject, None).unwrap();
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.confusion.tn, actual.len() - positives);
        assert!(report.accuracy < 0.75, "accuracy {}", report.accuracy);
    }
}
