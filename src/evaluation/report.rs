//! The combined evaluation report.

use std::fmt;

use serde::Serialize;

use super::business::{BusinessReport, GroupAverages};
use super::classification::ClassificationReport;
use super::regression::RegressionReport;

/// Regression, classification and business metrics over one test set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub n_samples: usize,
    pub risk_score: RegressionReport,
    pub approval: ClassificationReport,
    pub business: BusinessReport,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evaluation over {} records", self.n_samples)?;
        writeln!(f)?;
        write!(f, "{}", self.risk_score)?;
        writeln!(f)?;
        write!(f, "{}", self.approval)?;
        writeln!(f)?;
        write!(f, "{}", self.business)
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk score (regression)")?;
        writeln!(f, "  MAE:            {:.4}", self.mae)?;
        writeln!(f, "  MSE:            {:.4}", self.mse)?;
        writeln!(f, "  RMSE:           {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:           {:.2}%", self.mape)?;
        writeln!(f, "  R²:             {:.4}", self.r_squared)?;
        for band in [&self.within_5, &self.within_10] {
            writeln!(
                f,
                "  Within ±{}:      {} ({:.1}%)",
                band.tolerance,
                band.count,
                band.fraction * 100.0
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cm = &self.confusion;
        writeln!(f, "Loan approval (classification)")?;
        writeln!(
            f,
            "  Confusion:      TP {}  TN {}  FP {}  FN {}",
            cm.tp, cm.tn, cm.fp, cm.fn_
        )?;
        writeln!(f, "  Accuracy:       {:.4}", self.accuracy)?;
        writeln!(f, "  Precision:      {:.4}", self.precision)?;
        writeln!(f, "  Recall:         {:.4}", self.recall)?;
        writeln!(f, "  F1:             {:.4}", self.f1)?;
        writeln!(f, "  Specificity:    {:.4}", self.specificity)?;
        writeln!(f, "  Neg. precision: {:.4}", self.negative_precision)?;
        writeln!(f, "  Neg. recall:    {:.4}", self.negative_recall)?;
        if let Some(auc) = self.auc {
            writeln!(f, "  AUC:            {auc:.4}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BusinessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group(f: &mut fmt::Formatter<'_>, label: &str, g: &Option<GroupAverages>) -> fmt::Result {
            match g {
                Some(g) => writeln!(
                    f,
                    "  {label} ({}): actual risk {:.2}, predicted risk {:.2}",
                    g.count, g.actual_risk, g.predicted_risk
                ),
                None => writeln!(f, "  {label}: none"),
            }
        }

        writeln!(f, "Business metrics")?;
        group(f, "Approved", &self.approved)?;
        group(f, "Rejected", &self.rejected)?;
        writeln!(
            f,
            "  High risk:      {} actual, {} predicted",
            self.high_risk_actual, self.high_risk_predicted
        )?;
        writeln!(
            f,
            "  Approvals:      {} high confidence, {} low confidence",
            self.high_confidence_approvals, self.low_confidence_approvals
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::evaluation::MetricsEvaluator;

    #[test]
    fn text_and_json_sections() {
        let risk = MetricsEvaluator::regression(&[10.0, 20.0], &[11.0, 19.0]).unwrap();
        let approval =
            MetricsEvaluator::classification(&[true, false], &[true, true], None).unwrap();

        let text = risk.to_string();
        assert!(text.starts_with("Risk score (regression)"));
        assert!(text.contains("MAE:            1.0000"));

        let text = approval.to_string();
        assert!(text.contains("TP 1  TN 0  FP 1  FN 0"));
        assert!(!text.contains("AUC"));

        let json = serde_json::to_value(&approval).unwrap();
        assert_eq!(json["confusion"]["fp"], 1);
        assert!(json.get("auc").is_none());
    }
}
