//! GBDT model and configuration.
//!
//! [`GBDTConfig`] is the validated, builder-constructed hyperparameter set;
//! [`GBDTModel`] pairs a trained forest with its metadata and config.

mod config;
mod model;

pub use config::{ConfigError, GBDTConfig};
pub use model::GBDTModel;
