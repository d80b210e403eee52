//! Gradient Boosted Decision Tree (GBDT) training module.
//!
//! - [`grower`] - Leaf-wise tree growing orchestration
//! - [`histograms`] - Per-node gradient histograms
//! - [`partition`] - Row index partitioning for tree nodes
//! - [`split`] - Gain computation and split finding
//! - [`trainer`] - GBDT training loop

pub mod grower;
pub mod histograms;
pub mod partition;
pub mod split;
pub mod trainer;

pub use grower::{GrowerParams, TreeGrower};
pub use histograms::{FeatureHistogram, HistogramBin, HistogramPool, NodeHistogram};
pub use partition::{LeafId, RowPartitioner};
pub use split::{GainParams, GreedySplitter, SplitInfo};
pub use trainer::{GBDTParams, GBDTTrainer, TrainError};
