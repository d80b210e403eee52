//! High-level model wrappers.
//!
//! - [`GBDTModel`]: Tree ensemble with its training configuration
//! - [`PlattCalibrator`]: Sigmoid calibration of classifier margins
//! - [`ModelMeta`]: Shared metadata
//!
//! # Example
//!
//! ```ignore
//! use loanboost::model::{GBDTConfig, GBDTModel};
//! use loanboost::training::{Metric, Objective};
//!
//! let config = GBDTConfig::builder()
//!     .objective(Objective::logistic())
//!     .metric(Metric::logloss())
//!     .n_trees(50)
//!     .build()?;
//! let model = GBDTModel::train(features.view(), &labels, &[], config)?;
//! let margin = model.predict_raw_row(&row);
//! ```

mod calibration;
pub mod gbdt;
mod meta;

pub use calibration::PlattCalibrator;
pub use gbdt::{ConfigError, GBDTConfig, GBDTModel};
pub use meta::{ModelMeta, PredictionKind, TaskKind};
