//! loanboost: two-stage loan scoring on a native gradient boosting engine.
//!
//! A fitted [`FeatureEncoder`] turns loan applications into fixed-width rows.
//! Two gradient boosted tree models share those rows: a regressor of the
//! continuous risk score and a Platt-calibrated classifier of the approval
//! decision. [`EnsemblePredictor`] composes the three parts for inference,
//! and [`MetricsEvaluator`] reports on their quality.
//!
//! # Key Types
//!
//! - [`LoanRecord`] / [`LoanLoader`] - Applications and CSV ingest
//! - [`FeatureEncoder`] - Fit-once feature construction
//! - [`RiskScoreTrainer`] / [`ApprovalTrainer`] - The two ensemble members
//! - [`EnsemblePredictor`] - Single and batch inference
//! - [`MetricsEvaluator`] / [`EvaluationReport`] - Quality metrics
//! - [`RiskScoreNormalizer`] - Bounded display score and risk band
//! - [`ArtifactStore`] - JSON artifacts on disk
//!
//! # Training
//!
//! [`Pipeline::run`] loads the corpus named by a [`LoanboostConfig`], splits
//! it, trains both models and evaluates them on the held-out split.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod config;
pub mod data;
pub mod encoding;
pub mod ensemble;
pub mod evaluation;
pub mod loan;
pub mod model;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod repr;
pub mod session;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Records and ingest
pub use loan::{
    CategoryOptions, CategoryService, LoanLoader, LoanRecord, NumericParsing, train_test_split,
};

// Encoding and the ensemble
pub use encoding::FeatureEncoder;
pub use ensemble::{
    ApprovalModel, ApprovalTrainer, ArtifactStore, EnsemblePrediction, EnsemblePredictor,
    PredictionSession, RiskScoreModel, RiskScoreTrainer, Trainer,
};

// Evaluation and display
pub use evaluation::{EvaluationReport, MetricsEvaluator};
pub use normalize::{RiskAssessment, RiskCategory, RiskScoreNormalizer};

// Configuration and orchestration
pub use config::{ConfigError, LoanboostConfig};
pub use model::{GBDTConfig, GBDTModel};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use session::{LoanPatch, SampleSession};

// Shared utilities
pub use utils::{Parallelism, run_with_threads};
