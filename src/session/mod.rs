//! The current-sample state of an interactive session.
//!
//! [`SampleSession`] owns one [`LoanRecord`] that changes only through
//! [`SampleSession::update`] and [`SampleSession::record_prediction`]. Each
//! change is published on the session's [`EventBus`].

mod bus;

pub use bus::{EventBus, SubscriptionId};

use std::fmt::Write as _;

use serde::Deserialize;

use crate::ensemble::EnsemblePrediction;
use crate::loan::{LoanRecord, NOT_PREDICTED};

/// Change notifications published by a [`SampleSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SampleUpdated(LoanRecord),
    PredictionRecorded(EnsemblePrediction),
}

macro_rules! loan_patch {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Partial update of the applicant fields; `None` leaves a field as is.
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct LoanPatch {
            $(pub $field: Option<$ty>,)*
        }

        impl LoanPatch {
            fn apply_to(self, record: &mut LoanRecord) {
                $(if let Some(value) = self.$field {
                    record.$field = value;
                })*
            }
        }
    };
}

loan_patch! {
    application_date: String,
    age: f32,
    annual_income: f32,
    credit_score: f32,
    employment_status: String,
    education_level: String,
    experience: f32,
    loan_amount: f32,
    loan_duration: f32,
    marital_status: String,
    number_of_dependents: f32,
    home_ownership_status: String,
    monthly_debt_payments: f32,
    credit_card_utilization_rate: f32,
    number_of_open_credit_lines: f32,
    number_of_credit_inquiries: f32,
    debt_to_income_ratio: f32,
    bankruptcy_history: f32,
    loan_purpose: String,
    previous_loan_defaults: f32,
    payment_history: f32,
    length_of_credit_history: f32,
    savings_account_balance: f32,
    checking_account_balance: f32,
    total_assets: f32,
    total_liabilities: f32,
    monthly_income: f32,
    utility_bills_payment_history: f32,
    job_tenure: f32,
    net_worth: f32,
    base_interest_rate: f32,
    interest_rate: f32,
    monthly_loan_payment: f32,
    total_debt_to_income_ratio: f32,
}

/// One applicant under edit, plus whether it has been scored since the
/// last change.
#[derive(Debug, Default)]
pub struct SampleSession {
    record: LoanRecord,
    predicted: bool,
    events: EventBus<SessionEvent>,
}

impl SampleSession {
    /// Start from `record`; it counts as unscored.
    pub fn new(record: LoanRecord) -> Self {
        Self {
            record,
            predicted: false,
            events: EventBus::new(),
        }
    }

    pub fn record(&self) -> &LoanRecord {
        &self.record
    }

    pub fn is_predicted(&self) -> bool {
        self.predicted
    }

    pub fn events(&mut self) -> &mut EventBus<SessionEvent> {
        &mut self.events
    }

    /// Apply `patch`. Any edit invalidates the previous prediction.
    pub fn update(&mut self, patch: LoanPatch) {
        patch.apply_to(&mut self.record);
        self.record.risk_score = NOT_PREDICTED;
        self.predicted = false;
        log::debug!("sample updated");
        self.events
            .publish(&SessionEvent::SampleUpdated(self.record.clone()));
    }

    /// Store a prediction's risk score and decision on the sample.
    pub fn record_prediction(&mut self, prediction: &EnsemblePrediction) {
        self.record.risk_score = prediction.risk_score;
        self.record.loan_approved = prediction.approved;
        self.predicted = true;
        self.events
            .publish(&SessionEvent::PredictionRecorded(*prediction));
    }

    /// Labeled multi-line summary of the sample.
    pub fn describe(&self) -> String {
        const UNSET: &str = "(Not Initialized)";
        let r = &self.record;
        let mut out = String::from("Current Loan Sample:\n\n");
        let mut line = |label: &str, value: &dyn std::fmt::Display| {
            let _ = writeln!(out, "{label}: {value}");
        };

        line("Application Date", &r.application_date);
        line("Age", &r.age);
        line("Annual Income", &r.annual_income);
        line("Credit Score", &r.credit_score);
        line("Employment Status", &r.employment_status);
        line("Education Level", &r.education_level);
        line("Experience", &r.experience);
        line("Loan Amount", &r.loan_amount);
        line("Loan Duration", &r.loan_duration);
        line("Marital Status", &r.marital_status);
        line("Number of Dependents", &r.number_of_dependents);
        line("Home Ownership Status", &r.home_ownership_status);
        line("Monthly Debt Payments", &r.monthly_debt_payments);
        line("Credit Card Utilization Rate", &r.credit_card_utilization_rate);
        line("Number of Open Credit Lines", &r.number_of_open_credit_lines);
        line("Number of Credit Inquiries", &r.number_of_credit_inquiries);
        line("Debt to Income Ratio", &r.debt_to_income_ratio);
        line("Bankruptcy History", &r.bankruptcy_history);
        line("Loan Purpose", &r.loan_purpose);
        line("Previous Loan Defaults", &r.previous_loan_defaults);
        line("Payment History", &r.payment_history);
        line("Length of Credit History", &r.length_of_credit_history);
        line("Savings Account Balance", &r.savings_account_balance);
        line("Checking Account Balance", &r.checking_account_balance);
        line("Total Assets", &r.total_assets);
        line("Total Liabilities", &r.total_liabilities);
        line("Monthly Income", &r.monthly_income);
        line("Utility Bills Payment History", &r.utility_bills_payment_history);
        line("Job Tenure", &r.job_tenure);
        line("Net Worth", &r.net_worth);
        line("Base Interest Rate", &r.base_interest_rate);
        line("Interest Rate", &r.interest_rate);
        line("Monthly Loan Payment", &r.monthly_loan_payment);
        line("Total Debt to Income Ratio", &r.total_debt_to_income_ratio);
        if self.predicted {
            line("Risk Score", &r.risk_score);
            line("Loan Approved", &r.loan_approved);
        } else {
            line("Risk Score", &UNSET);
            line("Loan Approved", &UNSET);
        }
        out
    }
}
