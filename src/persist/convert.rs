//! Conversions between runtime types and schema types.
//!
//! Lossless directions are `From`; directions that can fail on untrusted
//! input are `TryFrom` with [`PersistError`].

use crate::encoding::{FeatureEncoder, Scaler, Vocabulary};
use crate::model::{GBDTConfig, GBDTModel, ModelMeta, PlattCalibrator, TaskKind};
use crate::repr::gbdt::{Forest, Tree};
use crate::training::{Accuracy, Metric, Objective, Verbosity};

use super::error::PersistError;
use super::schema::{
    CalibrationSchema, EncoderSchema, ForestSchema, GBDTConfigSchema, GBDTModelSchema,
    MetricSchema, ModelMetaSchema, ObjectiveSchema, ScalerSchema, TaskKindSchema, TreeSchema,
    FORMAT_VERSION,
};

// =============================================================================
// Objective / Metric
// =============================================================================

impl From<&Objective> for ObjectiveSchema {
    fn from(objective: &Objective) -> Self {
        match objective {
            Objective::SquaredLoss(_) => Self::SquaredLoss,
            Objective::LogisticLoss(_) => Self::LogisticLoss,
        }
    }
}

impl From<ObjectiveSchema> for Objective {
    fn from(schema: ObjectiveSchema) -> Self {
        match schema {
            ObjectiveSchema::SquaredLoss => Self::squared(),
            ObjectiveSchema::LogisticLoss => Self::logistic(),
        }
    }
}

impl From<&Metric> for MetricSchema {
    fn from(metric: &Metric) -> Self {
        match metric {
            Metric::None => Self::None,
            Metric::Rmse(_) => Self::Rmse,
            Metric::Mae(_) => Self::Mae,
            Metric::Mse(_) => Self::Mse,
            Metric::RSquared(_) => Self::RSquared,
            Metric::LogLoss(_) => Self::LogLoss,
            Metric::Accuracy(inner) => Self::Accuracy {
                threshold: inner.threshold as f64,
            },
            Metric::Auc(_) => Self::Auc,
        }
    }
}

impl From<MetricSchema> for Metric {
    fn from(schema: MetricSchema) -> Self {
        match schema {
            MetricSchema::None => Self::none(),
            MetricSchema::Rmse => Self::rmse(),
            MetricSchema::Mae => Self::mae(),
            MetricSchema::Mse => Self::mse(),
            MetricSchema::RSquared => Self::r_squared(),
            MetricSchema::LogLoss => Self::logloss(),
            MetricSchema::Accuracy { threshold } => {
                Self::Accuracy(Accuracy::with_threshold(threshold as f32))
            }
            MetricSchema::Auc => Self::auc(),
        }
    }
}

// =============================================================================
// Meta
// =============================================================================

impl From<TaskKind> for TaskKindSchema {
    fn from(task: TaskKind) -> Self {
        match task {
            TaskKind::Regression => Self::Regression,
            TaskKind::BinaryClassification => Self::BinaryClassification,
        }
    }
}

impl From<TaskKindSchema> for TaskKind {
    fn from(task: TaskKindSchema) -> Self {
        match task {
            TaskKindSchema::Regression => Self::Regression,
            TaskKindSchema::BinaryClassification => Self::BinaryClassification,
        }
    }
}

impl From<&ModelMeta> for ModelMetaSchema {
    fn from(meta: &ModelMeta) -> Self {
        Self {
            task: meta.task.into(),
            num_features: meta.n_features,
            feature_names: meta.feature_names.clone(),
            best_iteration: meta.best_iteration,
        }
    }
}

impl From<ModelMetaSchema> for ModelMeta {
    fn from(schema: ModelMetaSchema) -> Self {
        Self {
            n_features: schema.num_features,
            task: schema.task.into(),
            feature_names: schema.feature_names,
            best_iteration: schema.best_iteration,
        }
    }
}

// =============================================================================
// Tree / Forest
// =============================================================================

fn widen(values: &[f32]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

fn narrow(values: Vec<f64>) -> Vec<f32> {
    values.into_iter().map(|v| v as f32).collect()
}

impl From<&Tree> for TreeSchema {
    fn from(tree: &Tree) -> Self {
        Self {
            num_nodes: tree.n_nodes() as u32,
            split_indices: tree.split_indices().to_vec(),
            thresholds: widen(tree.split_thresholds()),
            children_left: tree.left_children().to_vec(),
            children_right: tree.right_children().to_vec(),
            default_left: tree.default_lefts().to_vec(),
            leaf_values: widen(tree.leaf_values()),
            gains: Some(widen(tree.gains())),
            covers: Some(widen(tree.covers())),
        }
    }
}

impl TryFrom<TreeSchema> for Tree {
    type Error = PersistError;

    fn try_from(schema: TreeSchema) -> Result<Self, Self::Error> {
        let n_nodes = schema.num_nodes as usize;
        let lengths = [
            ("split_indices", schema.split_indices.len()),
            ("thresholds", schema.thresholds.len()),
            ("children_left", schema.children_left.len()),
            ("children_right", schema.children_right.len()),
            ("default_left", schema.default_left.len()),
            ("leaf_values", schema.leaf_values.len()),
        ];
        if let Some((field, len)) = lengths.iter().find(|(_, len)| *len != n_nodes) {
            return Err(PersistError::Validation(format!(
                "tree field `{field}` has {len} entries, expected {n_nodes}"
            )));
        }

        let is_leaf = schema.children_left.iter().map(|&left| left == 0).collect();
        let gains = schema.gains.map(narrow).unwrap_or_else(|| vec![0.0; n_nodes]);
        let covers = schema.covers.map(narrow).unwrap_or_else(|| vec![0.0; n_nodes]);

        Ok(Tree::from_parts(
            schema.split_indices,
            narrow(schema.thresholds),
            schema.children_left,
            schema.children_right,
            schema.default_left,
            is_leaf,
            narrow(schema.leaf_values),
            gains,
            covers,
        ))
    }
}

impl From<&Forest> for ForestSchema {
    fn from(forest: &Forest) -> Self {
        Self {
            trees: forest.trees().map(TreeSchema::from).collect(),
            base_score: forest.base_score() as f64,
        }
    }
}

impl TryFrom<ForestSchema> for Forest {
    type Error = PersistError;

    fn try_from(schema: ForestSchema) -> Result<Self, Self::Error> {
        let mut forest = Forest::new(schema.base_score as f32);
        for tree in schema.trees {
            forest.push_tree(Tree::try_from(tree)?);
        }
        Ok(forest)
    }
}

// =============================================================================
// Config / Calibration
// =============================================================================

impl From<&GBDTConfig> for GBDTConfigSchema {
    fn from(config: &GBDTConfig) -> Self {
        Self {
            objective: ObjectiveSchema::from(&config.objective),
            metric: config.metric.as_ref().map(MetricSchema::from),
            n_trees: config.n_trees,
            learning_rate: config.learning_rate as f64,
            num_leaves: config.num_leaves,
            max_depth: config.max_depth,
            min_samples_leaf: config.min_samples_leaf,
            reg_lambda: config.reg_lambda as f64,
            min_child_weight: config.min_child_weight as f64,
            min_gain: config.min_gain as f64,
            feature_fraction: config.feature_fraction as f64,
            bagging_fraction: config.bagging_fraction as f64,
            early_stopping_rounds: config.early_stopping_rounds,
            max_bins: config.max_bins,
            seed: config.seed,
        }
    }
}

impl TryFrom<GBDTConfigSchema> for GBDTConfig {
    type Error = PersistError;

    fn try_from(schema: GBDTConfigSchema) -> Result<Self, Self::Error> {
        let config = GBDTConfig {
            objective: schema.objective.into(),
            metric: schema.metric.map(Metric::from),
            n_trees: schema.n_trees,
            learning_rate: schema.learning_rate as f32,
            num_leaves: schema.num_leaves,
            max_depth: schema.max_depth,
            min_samples_leaf: schema.min_samples_leaf,
            reg_lambda: schema.reg_lambda as f32,
            min_child_weight: schema.min_child_weight as f32,
            min_gain: schema.min_gain as f32,
            feature_fraction: schema.feature_fraction as f32,
            bagging_fraction: schema.bagging_fraction as f32,
            early_stopping_rounds: schema.early_stopping_rounds,
            max_bins: schema.max_bins,
            n_threads: 0,
            seed: schema.seed,
            verbosity: Verbosity::Silent,
        };
        config
            .validate()
            .map_err(|e| PersistError::Validation(e.to_string()))?;
        Ok(config)
    }
}

impl From<&PlattCalibrator> for CalibrationSchema {
    fn from(cal: &PlattCalibrator) -> Self {
        Self { a: cal.a, b: cal.b }
    }
}

impl TryFrom<CalibrationSchema> for PlattCalibrator {
    type Error = PersistError;

    fn try_from(schema: CalibrationSchema) -> Result<Self, Self::Error> {
        if !(schema.a.is_finite() && schema.b.is_finite()) {
            return Err(PersistError::Validation(
                "calibration parameters must be finite".into(),
            ));
        }
        Ok(Self {
            a: schema.a,
            b: schema.b,
        })
    }
}

// =============================================================================
// GBDTModel
// =============================================================================

impl From<&GBDTModel> for GBDTModelSchema {
    fn from(model: &GBDTModel) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            model_type: Self::MODEL_TYPE.to_string(),
            meta: ModelMetaSchema::from(model.meta()),
            forest: ForestSchema::from(model.forest()),
            config: GBDTConfigSchema::from(model.config()),
            calibration: None,
        }
    }
}

impl TryFrom<GBDTModelSchema> for GBDTModel {
    type Error = PersistError;

    /// Version and type are checked first; the forest is validated against
    /// the declared input width.
    fn try_from(schema: GBDTModelSchema) -> Result<Self, Self::Error> {
        check_header(
            schema.format_version,
            &schema.model_type,
            GBDTModelSchema::MODEL_TYPE,
        )?;

        let meta = ModelMeta::from(schema.meta);
        let forest = Forest::try_from(schema.forest)?;
        forest.validate(meta.n_features)?;
        let config = GBDTConfig::try_from(schema.config)?;

        Ok(GBDTModel::from_parts(forest, meta, config))
    }
}

// =============================================================================
// FeatureEncoder
// =============================================================================

impl From<&FeatureEncoder> for EncoderSchema {
    fn from(encoder: &FeatureEncoder) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            model_type: Self::MODEL_TYPE.to_string(),
            scalers: encoder
                .scalers()
                .iter()
                .map(|s| ScalerSchema {
                    mean: s.mean,
                    scale: s.scale,
                })
                .collect(),
            vocabularies: encoder
                .vocabularies()
                .iter()
                .map(|v| v.values().to_vec())
                .collect(),
        }
    }
}

impl TryFrom<EncoderSchema> for FeatureEncoder {
    type Error = PersistError;

    fn try_from(schema: EncoderSchema) -> Result<Self, Self::Error> {
        check_header(
            schema.format_version,
            &schema.model_type,
            EncoderSchema::MODEL_TYPE,
        )?;

        let scalers = schema
            .scalers
            .into_iter()
            .map(|s| Scaler {
                mean: s.mean,
                scale: s.scale,
            })
            .collect();
        let vocabularies = schema
            .vocabularies
            .into_iter()
            .map(Vocabulary::from_values)
            .collect();
        let encoder = FeatureEncoder::from_parts(scalers, vocabularies);
        encoder
            .validate()
            .map_err(|e| PersistError::Validation(e.to_string()))?;
        Ok(encoder)
    }
}

fn check_header(version: u32, model_type: &str, expected: &str) -> Result<(), PersistError> {
    if version != FORMAT_VERSION {
        return Err(PersistError::Version {
            found: version,
            expected: FORMAT_VERSION,
        });
    }
    if model_type != expected {
        return Err(PersistError::Validation(format!(
            "expected model type `{expected}`, found `{model_type}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::ForestValidationError;
    use crate::repr::gbdt::tree::stump;

    fn model() -> GBDTModel {
        let mut forest = Forest::new(0.25);
        forest.push_tree(stump(1, 0.5, -1.0, 2.0));
        forest.push_tree(Tree::leaf(0.5));
        let meta = ModelMeta {
            n_features: 2,
            task: TaskKind::Regression,
            feature_names: Some(vec!["a".into(), "b".into()]),
            best_iteration: Some(2),
        };
        GBDTModel::from_parts(forest, meta, GBDTConfig::default())
    }

    #[test]
    fn model_survives_json() {
        let original = model();
        let json = serde_json::to_string(&GBDTModelSchema::from(&original)).unwrap();
        let schema: GBDTModelSchema = serde_json::from_str(&json).unwrap();
        let restored = GBDTModel::try_from(schema).unwrap();

        assert_eq!(restored.forest(), original.forest());
        assert_eq!(restored.meta(), original.meta());
        for row in [[0.0f32, 0.0], [0.0, 1.0], [f32::NAN, f32::NAN]] {
            assert_eq!(restored.predict_raw_row(&row), original.predict_raw_row(&row));
        }
    }

    #[test]
    fn rejects_other_versions() {
        let mut schema = GBDTModelSchema::from(&model());
        schema.format_version = FORMAT_VERSION + 1;
        let err = GBDTModel::try_from(schema).unwrap_err();
        assert!(matches!(err, PersistError::Version { found, .. } if found == FORMAT_VERSION + 1));
    }

    #[test]
    fn rejects_forest_wider_than_meta() {
        let mut schema = GBDTModelSchema::from(&model());
        schema.meta.num_features = 1;
        let err = GBDTModel::try_from(schema).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Forest(ForestValidationError::InvalidTree { tree_idx: 0, .. })
        ));
    }

    #[test]
    fn rejects_ragged_trees() {
        let mut schema = GBDTModelSchema::from(&model());
        schema.forest.trees[0].leaf_values.pop();
        assert!(matches!(
            GBDTModel::try_from(schema),
            Err(PersistError::Validation(_))
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut schema = GBDTModelSchema::from(&model());
        schema.config.learning_rate = 0.0;
        assert!(matches!(
            GBDTModel::try_from(schema),
            Err(PersistError::Validation(_))
        ));
    }

    #[test]
    fn metric_and_objective_mapping() {
        for metric in [Metric::rmse(), Metric::auc(), Metric::accuracy(), Metric::none()] {
            assert_eq!(Metric::from(MetricSchema::from(&metric)), metric);
        }
        let obj = Objective::logistic();
        assert_eq!(Objective::from(ObjectiveSchema::from(&obj)), obj);
    }

    fn encoder() -> FeatureEncoder {
        use crate::loan::LoanRecord;
        let records = vec![
            LoanRecord {
                age: 30.0,
                employment_status: "Employed".into(),
                ..LoanRecord::sample()
            },
            LoanRecord {
                age: 50.0,
                employment_status: "Unemployed".into(),
                ..LoanRecord::sample()
            },
        ];
        FeatureEncoder::fit(&records).unwrap()
    }

    #[test]
    fn encoder_document_is_versioned() {
        let original = encoder();
        let json = serde_json::to_value(EncoderSchema::from(&original)).unwrap();
        assert_eq!(json["format_version"], FORMAT_VERSION);
        assert_eq!(json["model_type"], EncoderSchema::MODEL_TYPE);

        let schema: EncoderSchema = serde_json::from_value(json).unwrap();
        let restored = FeatureEncoder::try_from(schema).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn encoder_rejects_other_versions_and_types() {
        let mut schema = EncoderSchema::from(&encoder());
        schema.format_version = FORMAT_VERSION + 1;
        assert!(matches!(
            FeatureEncoder::try_from(schema),
            Err(PersistError::Version { .. })
        ));

        let mut schema = EncoderSchema::from(&encoder());
        schema.model_type = GBDTModelSchema::MODEL_TYPE.to_string();
        assert!(matches!(
            FeatureEncoder::try_from(schema),
            Err(PersistError::Validation(_))
        ));
    }

    #[test]
    fn encoder_rejects_unsorted_vocabulary() {
        let mut schema = EncoderSchema::from(&encoder());
        schema.vocabularies[0] = vec!["Unemployed".into(), "Employed".into()];
        assert!(matches!(
            FeatureEncoder::try_from(schema),
            Err(PersistError::Validation(_))
        ));
    }
}
