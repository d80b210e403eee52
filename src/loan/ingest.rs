//! CSV ingest of loan applications.
//!
//! Columns are bound by position (see [`CSV_COLUMNS`]), cells are trimmed,
//! and the header row is required but its names are not checked. Numeric
//! cells never fail: blank or unparsable cells read as 0.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::{LoanRecord, CSV_COLUMNS};

/// Errors raised while reading a corpus.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("line {row}: missing column `{column}`")]
    MissingColumn { row: usize, column: &'static str },

    #[error("line {row}: `{value}` is not a boolean")]
    InvalidBool { row: usize, value: String },
}

/// How numeric cells are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericParsing {
    /// Plain decimal parse.
    #[default]
    Standard,
    /// Strip every '.', then divide by 1e9 above 1e9 or by 1e3 above 1e6.
    ///
    /// Matches corpora exported with '.' as a thousands separator.
    LegacyRescale,
}

impl NumericParsing {
    /// Parse one trimmed cell. Blank or unparsable cells read as 0.
    pub fn parse(self, cell: &str) -> f32 {
        if cell.is_empty() {
            return 0.0;
        }
        let value = match self {
            Self::Standard => cell.parse::<f32>().ok(),
            Self::LegacyRescale => cell.replace('.', "").parse::<f32>().ok().map(|v| {
                if v > 1e9 {
                    v / 1e9
                } else if v > 1e6 {
                    v / 1e3
                } else {
                    v
                }
            }),
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Reads loan corpora from CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanLoader {
    pub parsing: NumericParsing,
}

impl LoanLoader {
    pub fn new(parsing: NumericParsing) -> Self {
        Self { parsing }
    }

    /// Load every record of the file at `path`.
    pub fn load_path(&self, path: &Path) -> Result<Vec<LoanRecord>, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = self.load_reader(file)?;
        log::info!("loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Load every record from a CSV stream with a header row.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<LoanRecord>, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // 1-based file line, header included.
            let row = idx + 2;
            records.push(self.parse_record(&result?, row)?);
        }
        Ok(records)
    }

    fn parse_record(&self, cells: &StringRecord, row: usize) -> Result<LoanRecord, LoadError> {
        let cell = |col: usize| {
            cells.get(col).ok_or(LoadError::MissingColumn {
                row,
                column: CSV_COLUMNS[col],
            })
        };
        let num = |col: usize| cell(col).map(|s| self.parsing.parse(s));
        let text = |col: usize| cell(col).map(str::to_string);

        Ok(LoanRecord {
            application_date: text(0)?,
            age: num(1)?,
            annual_income: num(2)?,
            credit_score: num(3)?,
            employment_status: text(4)?,
            education_level: text(5)?,
            experience: num(6)?,
            loan_amount: num(7)?,
            loan_duration: num(8)?,
            marital_status: text(9)?,
            number_of_dependents: num(10)?,
            home_ownership_status: text(11)?,
            monthly_debt_payments: num(12)?,
            credit_card_utilization_rate: num(13)?,
            number_of_open_credit_lines: num(14)?,
            number_of_credit_inquiries: num(15)?,
            debt_to_income_ratio: num(16)?,
            bankruptcy_history: num(17)?,
            loan_purpose: text(18)?,
            previous_loan_defaults: num(19)?,
            payment_history: num(20)?,
            length_of_credit_history: num(21)?,
            savings_account_balance: num(22)?,
            checking_account_balance: num(23)?,
            total_assets: num(24)?,
            total_liabilities: num(25)?,
            monthly_income: num(26)?,
            utility_bills_payment_history: num(27)?,
            job_tenure: num(28)?,
            net_worth: num(29)?,
            base_interest_rate: num(30)?,
            interest_rate: num(31)?,
            monthly_loan_payment: num(32)?,
            total_debt_to_income_ratio: num(33)?,
            loan_approved: parse_bool(cell(34)?, row)?,
            risk_score: num(35)?,
        })
    }
}

fn parse_bool(cell: &str, row: usize) -> Result<bool, LoadError> {
    match cell.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(LoadError::InvalidBool {
            row,
            value: cell.to_string(),
        }),
    }
}
