//! On-disk artifacts of a trained ensemble.
//!
//! Three JSON files in one directory, each loadable on its own:
//! `risk_score_model.json`, `loan_approval_model.json` and
//! `feature_transformer.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::encoding::FeatureEncoder;
use crate::model::{GBDTModel, PlattCalibrator, TaskKind};
use crate::persist::{
    read_json, write_json, CalibrationSchema, EncoderSchema, GBDTModelSchema, PersistError,
};

use super::predictor::{EnsembleError, EnsemblePredictor};
use super::trainers::{ApprovalModel, RiskScoreModel};

pub const RISK_SCORE_MODEL_FILE: &str = "risk_score_model.json";
pub const APPROVAL_MODEL_FILE: &str = "loan_approval_model.json";
pub const ENCODER_FILE: &str = "feature_transformer.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Ensemble(#[from] EnsembleError),
}

/// A directory holding the three ensemble artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn ensure_dir(&self) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::io(&self.dir, source))
    }

    // =========================================================================
    // Save
    // =========================================================================

    pub fn save_encoder(&self, encoder: &FeatureEncoder) -> Result<PathBuf, PersistError> {
        self.ensure_dir()?;
        let path = self.path_of(ENCODER_FILE);
        write_json(&path, &EncoderSchema::from(encoder))?;
        Ok(path)
    }

    pub fn save_risk_model(&self, model: &RiskScoreModel) -> Result<PathBuf, PersistError> {
        self.ensure_dir()?;
        let path = self.path_of(RISK_SCORE_MODEL_FILE);
        write_json(&path, &GBDTModelSchema::from(model.gbdt()))?;
        Ok(path)
    }

    pub fn save_approval_model(&self, model: &ApprovalModel) -> Result<PathBuf, PersistError> {
        self.ensure_dir()?;
        let path = self.path_of(APPROVAL_MODEL_FILE);
        let mut schema = GBDTModelSchema::from(model.gbdt());
        schema.calibration = Some(CalibrationSchema::from(model.calibrator()));
        write_json(&path, &schema)?;
        Ok(path)
    }

    /// Save all three artifacts.
    pub fn save_all(
        &self,
        encoder: &FeatureEncoder,
        risk: &RiskScoreModel,
        approval: &ApprovalModel,
    ) -> Result<(), PersistError> {
        self.save_encoder(encoder)?;
        self.save_risk_model(risk)?;
        self.save_approval_model(approval)?;
        log::info!("saved ensemble artifacts to {}", self.dir.display());
        Ok(())
    }

    // =========================================================================
    // Load
    // =========================================================================

    pub fn load_encoder(&self) -> Result<FeatureEncoder, PersistError> {
        let schema: EncoderSchema = read_json(&self.path_of(ENCODER_FILE))?;
        FeatureEncoder::try_from(schema)
    }

    pub fn load_risk_model(&self) -> Result<RiskScoreModel, PersistError> {
        let schema: GBDTModelSchema = read_json(&self.path_of(RISK_SCORE_MODEL_FILE))?;
        let model = GBDTModel::try_from(schema)?;
        expect_task(&model, TaskKind::Regression, RISK_SCORE_MODEL_FILE)?;
        Ok(RiskScoreModel::new(model))
    }

    pub fn load_approval_model(&self) -> Result<ApprovalModel, PersistError> {
        let mut schema: GBDTModelSchema = read_json(&self.path_of(APPROVAL_MODEL_FILE))?;
        let calibration = schema.calibration.take().ok_or_else(|| {
            PersistError::Validation(format!("{APPROVAL_MODEL_FILE} has no calibration"))
        })?;
        let calibrator = PlattCalibrator::try_from(calibration)?;
        let model = GBDTModel::try_from(schema)?;
        expect_task(&model, TaskKind::BinaryClassification, APPROVAL_MODEL_FILE)?;
        Ok(ApprovalModel::new(model, calibrator))
    }

    /// Load all three artifacts and compose them.
    pub fn load_predictor(&self) -> Result<EnsemblePredictor, ArtifactError> {
        let encoder = self.load_encoder()?;
        let risk = self.load_risk_model()?;
        let approval = self.load_approval_model()?;
        log::info!("loaded ensemble artifacts from {}", self.dir.display());
        Ok(EnsemblePredictor::new(
            Arc::new(encoder),
            Arc::new(risk),
            Arc::new(approval),
        )?)
    }
}

fn expect_task(model: &GBDTModel, task: TaskKind, file: &str) -> Result<(), PersistError> {
    if model.meta().task != task {
        return Err(PersistError::Validation(format!(
            "{file}: expected a {task:?} model, found {:?}",
            model.meta().task
        )));
    }
    Ok(())
}
