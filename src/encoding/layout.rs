//! Slot layout of the encoded feature vector and the fitted statistics
//! behind it.


use crate::loan::LoanRecord;
use crate::utils::mean_std;

pub type NumericGetter = fn(&LoanRecord) -> f32;
pub type CategoryGetter = fn(&LoanRecord) -> &str;

/// Standardized numeric fields, in fit order.
pub const SCALED_FIELDS: [(&str, NumericGetter); 5] = [
    ("age", |r| r.age),
    ("annual_income", |r| r.annual_income),
    ("credit_score", |r| r.credit_score),
    ("loan_amount", |r| r.loan_amount),
    ("monthly_income", |r| r.monthly_income),
];

/// One-hot encoded fields, in fit order.
pub const CATEGORICAL_FIELDS: [(&str, CategoryGetter); 5] = [
    ("employment_status", |r| r.employment_status.as_str()),
    ("education_level", |r| r.education_level.as_str()),
    ("marital_status", |r| r.marital_status.as_str()),
    ("home_ownership_status", |r| r.home_ownership_status.as_str()),
    ("loan_purpose", |r| r.loan_purpose.as_str()),
];

/// One block of the encoded row.
#[derive(Clone, Copy)]
pub enum Slot {
    /// Standardized field; index into [`SCALED_FIELDS`].
    Scaled(usize),
    /// Numeric field copied unchanged.
    Raw(&'static str, NumericGetter),
    /// Indicator block; index into [`CATEGORICAL_FIELDS`].
    OneHot(usize),
}

/// Encoded row layout, left to right.
pub const LAYOUT: [Slot; 33] = [
    Slot::Scaled(0),
    Slot::Scaled(1),
    Slot::Scaled(2),
    Slot::OneHot(0),
    Slot::OneHot(1),
    Slot::Raw("experience", |r| r.experience),
    Slot::Scaled(3),
    Slot::Raw("loan_duration", |r| r.loan_duration),
    Slot::OneHot(2),
    Slot::Raw("number_of_dependents", |r| r.number_of_dependents),
    Slot::OneHot(3),
    Slot::Raw("monthly_debt_payments", |r| r.monthly_debt_payments),
    Slot::Raw("credit_card_utilization_rate", |r| r.credit_card_utilization_rate),
    Slot::Raw("number_of_open_credit_lines", |r| r.number_of_open_credit_lines),
    Slot::Raw("number_of_credit_inquiries", |r| r.number_of_credit_inquiries),
    Slot::Raw("debt_to_income_ratio", |r| r.debt_to_income_ratio),
    Slot::Raw("bankruptcy_history", |r| r.bankruptcy_history),
    Slot::OneHot(4),
    Slot::Raw("previous_loan_defaults", |r| r.previous_loan_defaults),
    Slot::Raw("payment_history", |r| r.payment_history),
    Slot::Raw("length_of_credit_history", |r| r.length_of_credit_history),
    Slot::Raw("savings_account_balance", |r| r.savings_account_balance),
    Slot::Raw("checking_account_balance", |r| r.checking_account_balance),
    Slot::Raw("total_assets", |r| r.total_assets),
    Slot::Raw("total_liabilities", |r| r.total_liabilities),
    Slot::Scaled(4),
    Slot::Raw("utility_bills_payment_history", |r| r.utility_bills_payment_history),
    Slot::Raw("job_tenure", |r| r.job_tenure),
    Slot::Raw("net_worth", |r| r.net_worth),
    Slot::Raw("base_interest_rate", |r| r.base_interest_rate),
    Slot::Raw("interest_rate", |r| r.interest_rate),
    Slot::Raw("monthly_loan_payment", |r| r.monthly_loan_payment),
    Slot::Raw("total_debt_to_income_ratio", |r| r.total_debt_to_income_ratio),
];

/// Number of numeric (non-indicator) slots.
pub const N_NUMERIC_SLOTS: usize = 28;

// =============================================================================
// Scaler
// =============================================================================

/// Mean/variance normalization with fit-time statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    pub mean: f64,
    /// Population standard deviation, or 1 when the fit data was constant.
    pub scale: f64,
}

impl Scaler {
    /// Returns the scaler and whether the field had zero variance.
    pub fn fit(values: impl IntoIterator<Item = f32>) -> (Self, bool) {
        let (mean, std) = mean_std(values.into_iter().map(f64::from));
        let degenerate = !(std > 0.0 && std.is_finite());
        let scale = if degenerate { 1.0 } else { std };
        (Self { mean, scale }, degenerate)
    }

    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        ((value as f64 - self.mean) / self.scale) as f32
    }
}

// =============================================================================
// Vocabulary
// =============================================================================

/// Sorted, de-duplicated category values seen at fit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    values: Vec<String>,
}

impl Vocabulary {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut values: Vec<String> = values.into_iter().map(str::to_string).collect();
        values.sort_unstable();
        values.dedup();
        Self { values }
    }

    /// Indicator width.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Slot of `value` within the block, `None` if unseen.
    #[inline]
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values
            .binary_search_by(|probe| probe.as_str().cmp(value))
            .ok()
    }

    /// Wrap persisted values as-is; ordering is checked by the encoder.
    pub(crate) fn from_values(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn is_sorted_unique(&self) -> bool {
        self.values.windows(2).all(|w| w[0] < w[1])
    }
}
