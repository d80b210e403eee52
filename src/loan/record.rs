//! One loan application.

use serde::{Deserialize, Serialize};

/// Risk score of a record that has not been scored yet.
pub const NOT_PREDICTED: f32 = -1.0;

/// Corpus header, in column order.
pub const CSV_COLUMNS: [&str; 36] = [
    "applicationDate",
    "age",
    "annualIncome",
    "creditScore",
    "employmentStatus",
    "educationLevel",
    "experience",
    "loanAmount",
    "loanDuration",
    "maritalStatus",
    "numberOfDependents",
    "homeOwnershipStatus",
    "monthlyDebtPayments",
    "creditCardUtilizationRate",
    "numberOfOpenCreditLines",
    "numberOfCreditInquiries",
    "debtToIncomeRatio",
    "bankruptcyHistory",
    "loanPurpose",
    "previousLoanDefaults",
    "paymentHistory",
    "lengthOfCreditHistory",
    "savingsAccountBalance",
    "checkingAccountBalance",
    "totalAssets",
    "totalLiabilities",
    "monthlyIncome",
    "utilityBillsPaymentHistory",
    "jobTenure",
    "netWorth",
    "baseInterestRate",
    "interestRate",
    "monthlyLoanPayment",
    "totalDebtToIncomeRatio",
    "loanApproved",
    "riskScore",
];

/// A loan application with its two labels.
///
/// Field order follows [`CSV_COLUMNS`]. `risk_score` is [`NOT_PREDICTED`]
/// until a label or prediction is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub application_date: String,
    pub age: f32,
    pub annual_income: f32,
    pub credit_score: f32,
    pub employment_status: String,
    pub education_level: String,
    pub experience: f32,
    pub loan_amount: f32,
    pub loan_duration: f32,
    pub marital_status: String,
    pub number_of_dependents: f32,
    pub home_ownership_status: String,
    pub monthly_debt_payments: f32,
    pub credit_card_utilization_rate: f32,
    pub number_of_open_credit_lines: f32,
    pub number_of_credit_inquiries: f32,
    pub debt_to_income_ratio: f32,
    pub bankruptcy_history: f32,
    pub loan_purpose: String,
    pub previous_loan_defaults: f32,
    pub payment_history: f32,
    pub length_of_credit_history: f32,
    pub savings_account_balance: f32,
    pub checking_account_balance: f32,
    pub total_assets: f32,
    pub total_liabilities: f32,
    pub monthly_income: f32,
    pub utility_bills_payment_history: f32,
    pub job_tenure: f32,
    pub net_worth: f32,
    pub base_interest_rate: f32,
    pub interest_rate: f32,
    pub monthly_loan_payment: f32,
    pub total_debt_to_income_ratio: f32,
    pub loan_approved: bool,
    pub risk_score: f32,
}

impl Default for LoanRecord {
    fn default() -> Self {
        Self {
            application_date: String::new(),
            age: 0.0,
            annual_income: 0.0,
            credit_score: 0.0,
            employment_status: String::new(),
            education_level: String::new(),
            experience: 0.0,
            loan_amount: 0.0,
            loan_duration: 0.0,
            marital_status: String::new(),
            number_of_dependents: 0.0,
            home_ownership_status: String::new(),
            monthly_debt_payments: 0.0,
            credit_card_utilization_rate: 0.0,
            number_of_open_credit_lines: 0.0,
            number_of_credit_inquiries: 0.0,
            debt_to_income_ratio: 0.0,
            bankruptcy_history: 0.0,
            loan_purpose: String::new(),
            previous_loan_defaults: 0.0,
            payment_history: 0.0,
            length_of_credit_history: 0.0,
            savings_account_balance: 0.0,
            checking_account_balance: 0.0,
            total_assets: 0.0,
            total_liabilities: 0.0,
            monthly_income: 0.0,
            utility_bills_payment_history: 0.0,
            job_tenure: 0.0,
            net_worth: 0.0,
            base_interest_rate: 0.0,
            interest_rate: 0.0,
            monthly_loan_payment: 0.0,
            total_debt_to_income_ratio: 0.0,
            loan_approved: false,
            risk_score: NOT_PREDICTED,
        }
    }
}

impl LoanRecord {
    /// The demo applicant used by the interactive layer and `predict` without input.
    pub fn sample() -> Self {
        Self {
            application_date: "2019-10-11".into(),
            age: 37.0,
            annual_income: 29503.0,
            credit_score: 576.0,
            employment_status: "Employed".into(),
            education_level: "High School".into(),
            experience: 14.0,
            loan_amount: 18886.0,
            loan_duration: 60.0,
            marital_status: "Married".into(),
            number_of_dependents: 4.0,
            home_ownership_status: "Mortgage".into(),
            monthly_debt_payments: 527.0,
            credit_card_utilization_rate: 8.533_59,
            number_of_open_credit_lines: 4.0,
            number_of_credit_inquiries: 1.0,
            debt_to_income_ratio: 2.515_716,
            bankruptcy_history: 0.0,
            loan_purpose: "Debt Consolidation".into(),
            previous_loan_defaults: 0.0,
            payment_history: 27.0,
            length_of_credit_history: 27.0,
            savings_account_balance: 16163.0,
            checking_account_balance: 1695.0,
            total_assets: 291_811.0,
            total_liabilities: 9046.0,
            monthly_income: 24.585_833,
            utility_bills_payment_history: 8.251_824,
            job_tenure: 5.0,
            net_worth: 282_765.0,
            base_interest_rate: 23.5886,
            interest_rate: 23.602_541,
            monthly_loan_payment: 5.389_636,
            total_debt_to_income_ratio: 433.568_2,
            loan_approved: false,
            risk_score: NOT_PREDICTED,
        }
    }

    /// Whether `risk_score` holds a label or prediction.
    #[inline]
    pub fn has_risk_score(&self) -> bool {
        self.risk_score != NOT_PREDICTED
    }

    /// Cells in [`CSV_COLUMNS`] order.
    pub fn to_csv_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(CSV_COLUMNS.len());
        row.push(self.application_date.clone());
        for v in [self.age, self.annual_income, self.credit_score] {
            row.push(v.to_string());
        }
        row.push(self.employment_status.clone());
        row.push(self.education_level.clone());
        for v in [self.experience, self.loan_amount, self.loan_duration] {
            row.push(v.to_string());
        }
        row.push(self.marital_status.clone());
        row.push(self.number_of_dependents.to_string());
        row.push(self.home_ownership_status.clone());
        for v in [
            self.monthly_debt_payments,
            self.credit_card_utilization_rate,
            self.number_of_open_credit_lines,
            self.number_of_credit_inquiries,
            self.debt_to_income_ratio,
            self.bankruptcy_history,
        ] {
            row.push(v.to_string());
        }
        row.push(self.loan_purpose.clone());
        for v in [
            self.previous_loan_defaults,
            self.payment_history,
            self.length_of_credit_history,
            self.savings_account_balance,
            self.checking_account_balance,
            self.total_assets,
            self.total_liabilities,
            self.monthly_income,
            self.utility_bills_payment_history,
            self.job_tenure,
            self.net_worth,
            self.base_interest_rate,
            self.interest_rate,
            self.monthly_loan_payment,
            self.total_debt_to_income_ratio,
        ] {
            row.push(v.to_string());
        }
        row.push(self.loan_approved.to_string());
        row.push(self.risk_score.to_string());
        row
    }
}
