//! The two-stage loan scoring ensemble.
//!
//! [`RiskScoreTrainer`] and [`ApprovalTrainer`] train the two members behind
//! the [`Trainer`] contract. [`EnsemblePredictor`] composes their models with
//! the fitted [`FeatureEncoder`](crate::encoding::FeatureEncoder), and
//! [`ArtifactStore`] saves and loads the three parts.

mod artifacts;
mod predictor;
mod trainers;

pub use artifacts::{
    ArtifactError, ArtifactStore, APPROVAL_MODEL_FILE, ENCODER_FILE, RISK_SCORE_MODEL_FILE,
};
pub use predictor::{EnsembleError, EnsemblePrediction, EnsemblePredictor, PredictionSession};
pub use trainers::{
    ApprovalModel, ApprovalTrainer, RiskScoreModel, RiskScoreTrainer, Trainer,
};
