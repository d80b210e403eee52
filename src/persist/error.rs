//! Persistence errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::repr::gbdt::ForestValidationError;

/// Errors raised while saving or loading artifacts.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("invalid model: {0}")]
    Validation(String),

    #[error(transparent)]
    Forest(#[from] ForestValidationError),
}

impl PersistError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
