//! Loan applications: the record type, CSV ingest, train/test splitting and
//! category discovery.

mod categories;
mod ingest;
mod record;
mod split;

pub use categories::{CategoryOptions, CategoryService};
pub use ingest::{LoadError, LoanLoader, NumericParsing};
pub use record::{LoanRecord, CSV_COLUMNS, NOT_PREDICTED};
pub use split::{train_test_split, SplitError};
