//! Training infrastructure for gradient boosting.
//!
//! ## Shared Infrastructure
//!
//! - [`Gradients`]: Interleaved gradient storage
//! - [`ObjectiveFn`], [`Objective`]: Gradient computation
//! - [`MetricFn`], [`Metric`], [`EvalSet`]: Evaluation during training
//! - [`EarlyStopping`]: Stops when the monitored metric plateaus
//! - [`TrainingLogger`], [`Verbosity`]: Progress logging
//!
//! ## Objectives
//!
//! - [`SquaredLoss`]: Squared error for regression (L2)
//! - [`LogisticLoss`]: Binary cross-entropy
//!
//! ## Metrics
//!
//! - [`Rmse`], [`Mae`], [`Mse`], [`RSquared`]: Regression metrics
//! - [`LogLoss`], [`Auc`], [`Accuracy`]: Binary classification metrics

mod callback;
mod eval;
pub mod gbdt;
mod gradients;
mod logger;
mod metrics;
mod objectives;
pub mod sampling;

pub use callback::{EarlyStopAction, EarlyStopping};
pub use eval::{EvalSet, Evaluator, MetricValue};
pub use gradients::{Gradients, GradsTuple};
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{Accuracy, Auc, LogLoss, Mae, Metric, MetricFn, Mse, RSquared, Rmse};
pub use objectives::{LogisticLoss, Objective, ObjectiveFn, SquaredLoss};

pub(crate) use metrics::{r_squared_from_sums, roc_auc};

pub use gbdt::{GBDTParams, GBDTTrainer, GainParams, TrainError};
pub use sampling::{ColSampler, RowSampler};
