//! Business-facing summaries of ensemble predictions.

use serde::Serialize;

use crate::ensemble::EnsemblePrediction;
use crate::loan::LoanRecord;

use super::{check_aligned, EvaluationError};

/// Risk score at or above which an applicant counts as high risk.
pub const HIGH_RISK_THRESHOLD: f32 = 55.0;
const HIGH_CONFIDENCE: f32 = 0.8;
const LOW_CONFIDENCE: f32 = 0.6;

/// Mean actual and predicted risk over one group of records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupAverages {
    pub count: usize,
    pub actual_risk: f64,
    pub predicted_risk: f64,
}

impl GroupAverages {
    fn of<'a>(pairs: impl Iterator<Item = (&'a LoanRecord, &'a EnsemblePrediction)>) -> Option<Self> {
        let (mut count, mut actual, mut predicted) = (0usize, 0.0f64, 0.0f64);
        for (record, prediction) in pairs {
            count += 1;
            actual += record.risk_score as f64;
            predicted += prediction.risk_score as f64;
        }
        (count > 0).then(|| Self {
            count,
            actual_risk: actual / count as f64,
            predicted_risk: predicted / count as f64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessReport {
    /// Records the model approved; `None` when there are none.
    pub approved: Option<GroupAverages>,
    /// Records the model rejected; `None` when there are none.
    pub rejected: Option<GroupAverages>,
    pub high_risk_actual: usize,
    pub high_risk_predicted: usize,
    /// Approvals with probability at least 0.8.
    pub high_confidence_approvals: usize,
    /// Approvals with probability below 0.6.
    pub low_confidence_approvals: usize,
}

impl BusinessReport {
    pub(crate) fn compute(
        records: &[LoanRecord],
        predictions: &[EnsemblePrediction],
    ) -> Result<Self, EvaluationError> {
        check_aligned(records.len(), predictions.len())?;
        let pairs = || records.iter().zip(predictions);

        Ok(Self {
            approved: GroupAverages::of(pairs().filter(|(_, p)| p.approved)),
            rejected: GroupAverages::of(pairs().filter(|(_, p)| !p.approved)),
            high_risk_actual: records
                .iter()
                .filter(|r| r.risk_score >= HIGH_RISK_THRESHOLD)
                .count(),
            high_risk_predicted: predictions
                .iter()
                .filter(|p| p.risk_score >= HIGH_RISK_THRESHOLD)
                .count(),
            high_confidence_approvals: predictions
                .iter()
                .filter(|p| p.approved && p.approval_probability >= HIGH_CONFIDENCE)
                .count(),
            low_confidence_approvals: predictions
                .iter()
                .filter(|p| p.approved && p.approval_probability < LOW_CONFIDENCE)
                .count(),
        })
    }
}
