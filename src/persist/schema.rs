//! Schema types for model serialization.
//!
//! These types provide a stable serialization format independent of runtime
//! types, so the runtime representation can change without breaking saved
//! artifacts. Every document carries [`FORMAT_VERSION`].

use serde::{Deserialize, Serialize};

/// Version written into every model document.
pub const FORMAT_VERSION: u32 = 1;

/// Task type for model output interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKindSchema {
    Regression,
    BinaryClassification,
}

/// Model metadata schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    pub task: TaskKindSchema,
    pub num_features: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_iteration: Option<usize>,
}

/// Tree schema (SoA layout).
///
/// A node is a leaf when its left child is 0 (the root is never a child).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSchema {
    pub num_nodes: u32,
    pub split_indices: Vec<u32>,
    pub thresholds: Vec<f64>,
    pub children_left: Vec<u32>,
    pub children_right: Vec<u32>,
    pub default_left: Vec<bool>,
    pub leaf_values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gains: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covers: Option<Vec<f64>>,
}

/// Forest schema (trees in boosting order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSchema {
    pub trees: Vec<TreeSchema>,
    pub base_score: f64,
}

/// Objective schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveSchema {
    SquaredLoss,
    LogisticLoss,
}

/// Metric schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricSchema {
    None,
    Rmse,
    Mae,
    Mse,
    RSquared,
    LogLoss,
    Accuracy { threshold: f64 },
    Auc,
}

/// Training configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GBDTConfigSchema {
    pub objective: ObjectiveSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricSchema>,
    pub n_trees: u32,
    pub learning_rate: f64,
    pub num_leaves: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    pub min_samples_leaf: u32,
    pub reg_lambda: f64,
    pub min_child_weight: f64,
    pub min_gain: f64,
    pub feature_fraction: f64,
    pub bagging_fraction: f64,
    pub early_stopping_rounds: u32,
    pub max_bins: usize,
    pub seed: u64,
}

/// Platt calibration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSchema {
    pub a: f64,
    pub b: f64,
}

/// Full GBDT model document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GBDTModelSchema {
    pub format_version: u32,
    pub model_type: String,
    pub meta: ModelMetaSchema,
    pub forest: ForestSchema,
    pub config: GBDTConfigSchema,
    /// Present for calibrated classifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationSchema>,
}

impl GBDTModelSchema {
    /// Model type string.
    pub const MODEL_TYPE: &'static str = "gbdt";
}

// =============================================================================
// Feature encoder
// =============================================================================

/// Normalization statistics of one scaled field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerSchema {
    pub mean: f64,
    pub scale: f64,
}

/// Fitted feature encoder document.
///
/// Scalers and vocabularies are stored in the encoder's fixed field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSchema {
    pub format_version: u32,
    pub model_type: String,
    pub scalers: Vec<ScalerSchema>,
    pub vocabularies: Vec<Vec<String>>,
}

impl EncoderSchema {
    /// Model type string.
    pub const MODEL_TYPE: &'static str = "feature_encoder";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_kind_serde() {
        let task = TaskKindSchema::BinaryClassification;
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#""binary_classification""#);

        let parsed: TaskKindSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn objective_and_metric_are_tagged() {
        let json = serde_json::to_string(&ObjectiveSchema::LogisticLoss).unwrap();
        assert_eq!(json, r#"{"type":"logistic_loss"}"#);

        let json = serde_json::to_string(&MetricSchema::Accuracy { threshold: 0.5 }).unwrap();
        assert!(json.contains(r#""type":"accuracy""#));
        assert!(json.contains(r#""threshold":0.5"#));
    }

    #[test]
    fn meta_optional_fields_skipped() {
        let meta = ModelMetaSchema {
            task: TaskKindSchema::Regression,
            num_features: 10,
            feature_names: None,
            best_iteration: None,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("feature_names"));
        assert!(!json.contains("best_iteration"));

        let parsed: ModelMetaSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn tree_stats_skipped_when_absent() {
        let tree = TreeSchema {
            num_nodes: 1,
            split_indices: vec![0],
            thresholds: vec![0.0],
            children_left: vec![0],
            children_right: vec![0],
            default_left: vec![true],
            leaf_values: vec![1.0],
            gains: None,
            covers: None,
        };
        let json = serde_json::to_string(&tree).unwrap();
        assert!(!json.contains("gains"));
        assert!(!json.contains("covers"));
    }
}
