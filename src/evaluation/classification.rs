//! Approval classification metrics.

use serde::Serialize;

use crate::training::roc_auc;

use super::{check_aligned, EvaluationError};

/// Counts of (actual, predicted) outcome pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn from_pairs(actual: &[bool], predicted: &[bool]) -> Self {
        let mut cm = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (true, true) => cm.tp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    /// Precision of the rejected class.
    pub fn negative_precision(&self) -> f64 {
        ratio(self.tn, self.tn + self.fn_)
    }
}

/// `num / den`, or 0 when the numerator is 0.
fn ratio(num: usize, den: usize) -> f64 {
    if num == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub specificity: f64,
    pub negative_precision: f64,
    pub negative_recall: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auc: Option<f64>,
}

impl ClassificationReport {
    pub(crate) fn compute(
        actual: &[bool],
        predicted: &[bool],
        probabilities: Option<&[f32]>,
    ) -> Result<Self, EvaluationError> {
        check_aligned(actual.len(), predicted.len())?;
        if let Some(probs) = probabilities {
            check_aligned(actual.len(), probs.len())?;
        }

        let cm = ConfusionMatrix::from_pairs(actual, predicted);
        Ok(Self {
            confusion: cm,
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1: cm.f1(),
            specificity: cm.specificity(),
            negative_precision: cm.negative_precision(),
            negative_recall: cm.specificity(),
            auc: probabilities.map(|probs| roc_auc(probs, actual)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_classifier() {
        let labels = [true, false, true, false];
        let report = ClassificationReport::compute(&labels, &labels, None).unwrap();
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
        assert_eq!(report.specificity, 1.0);
        assert_eq!(report.auc, None);
    }

    #[test]
    fn confusion_counts_cover_every_row() {
        let actual = [true, true, false, false, true];
        let predicted = [true, false, true, false, true];
        let cm = ConfusionMatrix::from_pairs(&actual, &predicted);
        assert_eq!(cm, ConfusionMatrix { tp: 2, tn: 1, fp: 1, fn_: 1 });
        assert_eq!(cm.total(), actual.len());

        assert_abs_diff_eq!(cm.accuracy(), 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(cm.precision(), 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cm.recall(), 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cm.f1(), 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cm.specificity(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(cm.negative_precision(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn zero_true_positives_give_zero_rates() {
        let cm = ConfusionMatrix::from_pairs(&[false, true], &[true, false]);
        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.f1(), 0.0);
        assert_eq!(cm.specificity(), 0.0);
    }

    #[test]
    fn auc_uses_probabilities() {
        let actual = [false, false, true, true];
        let predicted = [false, false, true, true];
        let probs = [0.1, 0.4, 0.35, 0.8];
        let report = ClassificationReport::compute(&actual, &predicted, Some(&probs)).unwrap();
        assert_abs_diff_eq!(report.auc.unwrap(), 0.75, epsilon = 1e-12);

        assert!(matches!(
            ClassificationReport::compute(&actual, &predicted, Some(&probs[..3])),
            Err(EvaluationError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn serializes_fn_field() {
        let json = serde_json::to_string(&ConfusionMatrix { tp: 1, tn: 2, fp: 3, fn_: 4 }).unwrap();
        assert_eq!(json, r#"{"tp":1,"tn":2,"fp":3,"fn":4}"#);
    }
}
