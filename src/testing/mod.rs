//! Test and benchmark helpers.
//!
//! [`synthetic_loans`] draws a reproducible corpus in which the risk score
//! and the approval label depend on a handful of fields, so both models
//! have signal to learn.

use std::io::Write;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::loan::{LoanRecord, CSV_COLUMNS};

pub const EMPLOYMENT_STATUSES: [&str; 3] = ["Employed", "Self-Employed", "Unemployed"];
pub const EDUCATION_LEVELS: [&str; 5] = ["Associate", "Bachelor", "Doctorate", "High School", "Master"];
pub const MARITAL_STATUSES: [&str; 4] = ["Divorced", "Married", "Single", "Widowed"];
pub const HOME_OWNERSHIP_STATUSES: [&str; 4] = ["Mortgage", "Other", "Own", "Rent"];
pub const LOAN_PURPOSES: [&str; 5] = ["Auto", "Debt Consolidation", "Education", "Home", "Other"];

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

/// Generate `n` labeled loan records from `seed`.
pub fn synthetic_loans(n: usize, seed: u64) -> Vec<LoanRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|i| synthetic_loan(&mut rng, i)).collect()
}

fn synthetic_loan(rng: &mut StdRng, i: usize) -> LoanRecord {
    let age = rng.gen_range(18..80) as f32;
    let experience = (age - 18.0 - rng.gen_range(0.0..4.0f32)).max(0.0).round();
    let annual_income = rng.gen_range(15_000.0..250_000.0f32).round();
    let monthly_income = (annual_income / 12.0).round();
    let credit_score = rng.gen_range(340.0..850.0f32).round();
    let loan_amount = rng.gen_range(1_000.0..150_000.0f32).round();
    let loan_duration = [12.0, 24.0, 36.0, 48.0, 60.0, 72.0, 96.0, 120.0]
        .choose(rng)
        .copied()
        .unwrap_or(36.0);
    let monthly_debt_payments = rng.gen_range(50.0..2_500.0f32).round();
    let debt_to_income_ratio = rng.gen_range(0.0..0.9f32);
    let credit_card_utilization_rate = rng.gen_range(0.0..1.0f32);
    let bankruptcy_history = if rng.gen_bool(0.05) { 1.0 } else { 0.0 };
    let previous_loan_defaults = if rng.gen_bool(0.1) { 1.0 } else { 0.0 };
    let payment_history = rng.gen_range(10..40) as f32;
    let base_interest_rate = rng.gen_range(0.1..0.3f32);
    let interest_rate = base_interest_rate + rng.gen_range(0.0..0.05f32);
    let monthly_loan_payment = loan_amount * (1.0 + interest_rate) / loan_duration;
    let total_debt_to_income_ratio = (monthly_debt_payments + monthly_loan_payment) / monthly_income;
    let total_assets = rng.gen_range(0.0..500_000.0f32).round();
    let total_liabilities = rng.gen_range(0.0..300_000.0f32).round();

    let employment_status = pick(rng, &EMPLOYMENT_STATUSES);
    let unemployed = if employment_status == "Unemployed" { 1.0 } else { 0.0 };

    let risk_score = (57.0 - (credit_score - 340.0) / 510.0 * 45.0
        + debt_to_income_ratio * 20.0
        + total_debt_to_income_ratio.min(2.0) * 8.0
        + previous_loan_defaults * 6.0
        + bankruptcy_history * 8.0
        + unemployed * 5.0
        + rng.gen_range(-3.0..3.0f32))
    .clamp(0.0, 100.0);
    let loan_approved = risk_score + rng.gen_range(-4.0..4.0f32) < 50.0;

    LoanRecord {
        application_date: format!("2018-{:02}-{:02}", 1 + i % 12, 1 + i % 28),
        age,
        annual_income,
        credit_score,
        employment_status: employment_status.to_string(),
        education_level: pick(rng, &EDUCATION_LEVELS).to_string(),
        experience,
        loan_amount,
        loan_duration,
        marital_status: pick(rng, &MARITAL_STATUSES).to_string(),
        number_of_dependents: rng.gen_range(0..5) as f32,
        home_ownership_status: pick(rng, &HOME_OWNERSHIP_STATUSES).to_string(),
        monthly_debt_payments,
        credit_card_utilization_rate,
        number_of_open_credit_lines: rng.gen_range(0..10) as f32,
        number_of_credit_inquiries: rng.gen_range(0..6) as f32,
        debt_to_income_ratio,
        bankruptcy_history,
        loan_purpose: pick(rng, &LOAN_PURPOSES).to_string(),
        previous_loan_defaults,
        payment_history,
        length_of_credit_history: rng.gen_range(1..30) as f32,
        savings_account_balance: rng.gen_range(0.0..50_000.0f32).round(),
        checking_account_balance: rng.gen_range(0.0..20_000.0f32).round(),
        total_assets,
        total_liabilities,
        monthly_income,
        utility_bills_payment_history: rng.gen_range(0.5..1.0f32),
        job_tenure: rng.gen_range(0..20) as f32,
        net_worth: total_assets - total_liabilities,
        base_interest_rate,
        interest_rate,
        monthly_loan_payment,
        total_debt_to_income_ratio,
        loan_approved,
        risk_score,
    }
}

/// Write records as a corpus CSV with the canonical header.
pub fn write_csv<W: Write>(writer: W, records: &[LoanRecord]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_COLUMNS)?;
    for record in records {
        out.write_record(record.to_csv_row())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanLoader;

    #[test]
    fn generator_is_seeded() {
        assert_eq!(synthetic_loans(20, 7), synthetic_loans(20, 7));
        assert_ne!(synthetic_loans(20, 7), synthetic_loans(20, 8));
    }

    #[test]
    fn classes_are_roughly_balanced() {
        for seed in [1, 5, 9, 12, 31] {
            let records = synthetic_loans(400, seed);
            let approved = records.iter().filter(|r| r.loan_approved).count();
            assert!(
                (120..=280).contains(&approved),
                "seed {seed}: approved = {approved}"
            );
            assert!(records.iter().all(|r| (0.0..=100.0).contains(&r.risk_score)));
        }
    }

    #[test]
    fn csv_reloads() {
        let records = synthetic_loans(10, 3);
        let mut buf = Vec::new();
        write_csv(&mut buf, &records).unwrap();
        let loaded = LoanLoader::default().load_reader(buf.as_slice()).unwrap();
        assert_eq!(loaded.len(), records.len());
        assert_eq!(loaded[4].employment_status, records[4].employment_status);
        assert_eq!(loaded[4].loan_approved, records[4].loan_approved);
    }
}
