//! Discovery of the categorical values present in a corpus.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use super::ingest::LoanLoader;
use super::record::LoanRecord;

/// Distinct non-blank values of each categorical field, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryOptions {
    pub employment_statuses: Vec<String>,
    pub education_levels: Vec<String>,
    pub marital_statuses: Vec<String>,
    pub home_ownership_statuses: Vec<String>,
    pub loan_purposes: Vec<String>,
}

impl CategoryOptions {
    pub fn from_records(records: &[LoanRecord]) -> Self {
        let distinct = |field: fn(&LoanRecord) -> &str| -> Vec<String> {
            records
                .iter()
                .map(field)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        Self {
            employment_statuses: distinct(|r| r.employment_status.as_str()),
            education_levels: distinct(|r| r.education_level.as_str()),
            marital_statuses: distinct(|r| r.marital_status.as_str()),
            home_ownership_statuses: distinct(|r| r.home_ownership_status.as_str()),
            loan_purposes: distinct(|r| r.loan_purpose.as_str()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.employment_statuses.is_empty()
            && self.education_levels.is_empty()
            && self.marital_statuses.is_empty()
            && self.home_ownership_statuses.is_empty()
            && self.loan_purposes.is_empty()
    }
}

/// Reads a corpus and reports its categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryService {
    loader: LoanLoader,
}

impl CategoryService {
    pub fn new(loader: LoanLoader) -> Self {
        Self { loader }
    }

    /// Categories of the corpus at `path`.
    ///
    /// Load failures are logged and yield empty options.
    pub fn discover(&self, path: &Path) -> CategoryOptions {
        match self.loader.load_path(path) {
            Ok(records) => CategoryOptions::from_records(&records),
            Err(err) => {
                log::error!("category discovery failed for {}: {err}", path.display());
                CategoryOptions::default()
            }
        }
    }
}
