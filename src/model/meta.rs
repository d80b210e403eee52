//! Model metadata shared by training, inference and persistence.

/// High-level task implied by a model's objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskKind {
    #[default]
    Regression,
    BinaryClassification,
}

/// Semantic space of a prediction value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKind {
    /// Raw additive forest output (log-odds for classification).
    Margin,
    /// Regression value.
    Value,
    /// Probability in `[0, 1]`.
    Probability,
}

/// Model metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMeta {
    /// Number of input features the model expects.
    pub n_features: usize,
    /// Task kind.
    pub task: TaskKind,
    /// Optional feature names, one per input slot.
    pub feature_names: Option<Vec<String>>,
    /// Number of boosting rounds kept after early stopping.
    pub best_iteration: Option<usize>,
}
