//! High-level GBDT configuration with builder pattern.
//!
//! [`GBDTConfig`] gathers every hyperparameter of one boosted model and uses
//! the `bon` crate for builder generation, with validation at `build()`.
//!
//! # Example
//!
//! ```
//! use loanboost::model::GBDTConfig;
//! use loanboost::training::{Metric, Objective};
//!
//! // All defaults
//! let config = GBDTConfig::builder().build().unwrap();
//! assert_eq!(config.num_leaves, 31);
//!
//! // Approval classifier
//! let config = GBDTConfig::builder()
//!     .objective(Objective::logistic())
//!     .metric(Metric::logloss())
//!     .n_trees(200)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.n_trees, 200);
//! ```

use bon::Builder;
use thiserror::Error;

use crate::training::gbdt::GainParams;
use crate::training::{GBDTParams, Metric, Objective, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("learning_rate must be positive, got {0}")]
    InvalidLearningRate(f32),

    #[error("n_trees must be at least 1")]
    InvalidNTrees,

    #[error("num_leaves must be at least 2, got {0}")]
    InvalidNumLeaves(u32),

    #[error("max_bins must be in [2, 256], got {0}")]
    InvalidMaxBins(usize),

    #[error("{field} must be in (0, 1], got {value}")]
    InvalidSamplingRatio { field: &'static str, value: f32 },

    #[error("{field} must be non-negative, got {value}")]
    InvalidRegularization { field: &'static str, value: f32 },
}

// =============================================================================
// GBDTConfig
// =============================================================================

/// Hyperparameters for one gradient boosted tree model.
///
/// Defaults match the loan scoring models: 100 rounds at learning rate 0.1,
/// leaf-wise trees with 31 leaves and at least 20 rows per leaf, 0.8 feature
/// and bagging fractions, patience 10 and seed 42.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct GBDTConfig {
    // === Objective & Metric ===
    /// Loss function for training. Default: squared loss.
    #[builder(default)]
    pub objective: Objective,

    /// Metric monitored during training. `None` disables evaluation and
    /// early stopping.
    pub metric: Option<Metric>,

    // === Boosting ===
    /// Number of boosting rounds. Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Shrinkage applied to every leaf. Default: 0.1.
    #[builder(default = 0.1)]
    pub learning_rate: f32,

    // === Tree structure ===
    /// Leaf budget per tree (leaf-wise growth). Default: 31.
    #[builder(default = 31)]
    pub num_leaves: u32,

    /// Optional depth cap.
    pub max_depth: Option<u32>,

    /// Minimum rows in each child. Default: 20.
    #[builder(default = 20)]
    pub min_samples_leaf: u32,

    // === Regularization ===
    /// L2 penalty on leaf weights. Default: 0.
    #[builder(default = 0.0)]
    pub reg_lambda: f32,

    /// Minimum hessian sum in each child. Default: 1e-3.
    #[builder(default = 1e-3)]
    pub min_child_weight: f32,

    /// Minimum gain required to split. Default: 0.
    #[builder(default = 0.0)]
    pub min_gain: f32,

    // === Sampling ===
    /// Fraction of features offered to each tree. Default: 0.8.
    #[builder(default = 0.8)]
    pub feature_fraction: f32,

    /// Fraction of rows used to grow each tree. Default: 0.8.
    #[builder(default = 0.8)]
    pub bagging_fraction: f32,

    // === Early stopping ===
    /// Non-improving rounds tolerated before stopping; 0 disables. Default: 10.
    #[builder(default = 10)]
    pub early_stopping_rounds: u32,

    // === Resources ===
    /// Histogram bins per feature. Default: 255.
    #[builder(default = 255)]
    pub max_bins: usize,

    /// Thread count: 0 = rayon default, 1 = sequential.
    #[builder(default = 0)]
    pub n_threads: usize,

    // === Reproducibility ===
    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    // === Logging ===
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: g_b_d_t_config_builder::IsComplete> GBDTConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is out of range.
    pub fn build(self) -> Result<GBDTConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GBDTConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.num_leaves < 2 {
            return Err(ConfigError::InvalidNumLeaves(self.num_leaves));
        }
        if !(2..=256).contains(&self.max_bins) {
            return Err(ConfigError::InvalidMaxBins(self.max_bins));
        }

        for (field, value) in [
            ("feature_fraction", self.feature_fraction),
            ("bagging_fraction", self.bagging_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidSamplingRatio { field, value });
            }
        }

        for (field, value) in [
            ("reg_lambda", self.reg_lambda),
            ("min_child_weight", self.min_child_weight),
            ("min_gain", self.min_gain),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidRegularization { field, value });
            }
        }

        Ok(())
    }

    /// Lower the config into trainer parameters.
    pub fn to_params(&self) -> GBDTParams {
        GBDTParams {
            n_trees: self.n_trees,
            learning_rate: self.learning_rate,
            max_leaves: self.num_leaves,
            max_depth: self.max_depth,
            gain: GainParams {
                reg_lambda: self.reg_lambda,
                min_gain: self.min_gain,
                min_child_weight: self.min_child_weight,
                min_samples_leaf: self.min_samples_leaf,
            },
            feature_fraction: self.feature_fraction,
            bagging_fraction: self.bagging_fraction,
            max_bins: self.max_bins,
            n_threads: self.n_threads,
            early_stopping_rounds: self.early_stopping_rounds,
            early_stopping_eval_set: 0,
            verbosity: self.verbosity,
            seed: self.seed,
        }
    }
}

impl Default for GBDTConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GBDTConfig::builder().build().unwrap();
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.num_leaves, 31);
        assert_eq!(config.min_samples_leaf, 20);
        assert_eq!(config.early_stopping_rounds, 10);
        assert_eq!(config.seed, 42);
        assert!((config.learning_rate - 0.1).abs() < 1e-6);
        assert!((config.feature_fraction - 0.8).abs() < 1e-6);
        assert!((config.bagging_fraction - 0.8).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_impl_matches_builder() {
        let a = GBDTConfig::default();
        let b = GBDTConfig::builder().build().unwrap();
        assert_eq!(a.to_params().n_trees, b.to_params().n_trees);
        assert_eq!(a.to_params().gain, b.to_params().gain);
    }

    #[test]
    fn invalid_learning_rate() {
        let result = GBDTConfig::builder().learning_rate(0.0).build();
        assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));

        let result = GBDTConfig::builder().learning_rate(f32::NAN).build();
        assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));
    }

    #[test]
    fn invalid_n_trees_zero() {
        let result = GBDTConfig::builder().n_trees(0).build();
        assert_eq!(result.unwrap_err(), ConfigError::InvalidNTrees);
    }

    #[test]
    fn invalid_num_leaves() {
        let result = GBDTConfig::builder().num_leaves(1).build();
        assert_eq!(result.unwrap_err(), ConfigError::InvalidNumLeaves(1));
    }

    #[test]
    fn invalid_sampling_ratios() {
        let result = GBDTConfig::builder().feature_fraction(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSamplingRatio { field: "feature_fraction", .. })
        ));

        let result = GBDTConfig::builder().bagging_fraction(1.5).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSamplingRatio { field: "bagging_fraction", .. })
        ));

        assert!(GBDTConfig::builder().bagging_fraction(1.0).build().is_ok());
    }

    #[test]
    fn invalid_regularization() {
        let result = GBDTConfig::builder().reg_lambda(-1.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegularization { field: "reg_lambda", .. })
        ));
    }

    #[test]
    fn invalid_max_bins() {
        assert!(GBDTConfig::builder().max_bins(1).build().is_err());
        assert!(GBDTConfig::builder().max_bins(257).build().is_err());
        assert!(GBDTConfig::builder().max_bins(256).build().is_ok());
    }

    #[test]
    fn to_params_carries_every_field() {
        let config = GBDTConfig::builder()
            .objective(Objective::logistic())
            .n_trees(7)
            .num_leaves(8)
            .min_samples_leaf(3)
            .seed(9)
            .n_threads(1)
            .build()
            .unwrap();
        let params = config.to_params();
        assert_eq!(params.n_trees, 7);
        assert_eq!(params.max_leaves, 8);
        assert_eq!(params.gain.min_samples_leaf, 3);
        assert_eq!(params.seed, 9);
        assert_eq!(params.n_threads, 1);
    }
}
