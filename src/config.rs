//! Application configuration, read from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! data_path = "loans.csv"
//! test_fraction = 0.3
//! seed = 42
//! numeric_parsing = "standard"   # or "legacy_rescale"
//! artifact_dir = "models"
//!
//! [boosting]
//! n_trees = 100
//! learning_rate = 0.1
//! num_leaves = 31
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loan::NumericParsing;
use crate::model::GBDTConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("test_fraction must be in [0, 1), got {0}")]
    InvalidTestFraction(f64),

    #[error(transparent)]
    Boosting(#[from] crate::model::ConfigError),
}

/// Hyperparameters shared by both ensemble members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoostingSettings {
    pub n_trees: u32,
    pub learning_rate: f32,
    pub num_leaves: u32,
    pub min_samples_leaf: u32,
    pub feature_fraction: f32,
    pub bagging_fraction: f32,
    pub early_stopping_rounds: u32,
    pub max_bins: usize,
    /// 0 = rayon default, 1 = sequential.
    pub n_threads: usize,
}

impl Default for BoostingSettings {
    fn default() -> Self {
        let defaults = GBDTConfig::default();
        Self {
            n_trees: defaults.n_trees,
            learning_rate: defaults.learning_rate,
            num_leaves: defaults.num_leaves,
            min_samples_leaf: defaults.min_samples_leaf,
            feature_fraction: defaults.feature_fraction,
            bagging_fraction: defaults.bagging_fraction,
            early_stopping_rounds: defaults.early_stopping_rounds,
            max_bins: defaults.max_bins,
            n_threads: defaults.n_threads,
        }
    }
}

impl BoostingSettings {
    /// Validated model configuration with `seed`.
    pub fn to_gbdt_config(&self, seed: u64) -> Result<GBDTConfig, crate::model::ConfigError> {
        GBDTConfig::builder()
            .n_trees(self.n_trees)
            .learning_rate(self.learning_rate)
            .num_leaves(self.num_leaves)
            .min_samples_leaf(self.min_samples_leaf)
            .feature_fraction(self.feature_fraction)
            .bagging_fraction(self.bagging_fraction)
            .early_stopping_rounds(self.early_stopping_rounds)
            .max_bins(self.max_bins)
            .n_threads(self.n_threads)
            .seed(seed)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoanboostConfig {
    pub data_path: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
    pub numeric_parsing: NumericParsing,
    pub artifact_dir: PathBuf,
    pub boosting: BoostingSettings,
}

impl Default for LoanboostConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("loans.csv"),
            test_fraction: 0.3,
            seed: 42,
            numeric_parsing: NumericParsing::Standard,
            artifact_dir: PathBuf::from("models"),
            boosting: BoostingSettings::default(),
        }
    }
}

impl LoanboostConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(ConfigError::InvalidTestFraction(self.test_fraction));
        }
        self.gbdt_config()?;
        Ok(())
    }

    /// Model configuration for both trainers.
    pub fn gbdt_config(&self) -> Result<GBDTConfig, crate::model::ConfigError> {
        self.boosting.to_gbdt_config(self.seed)
    }
}
