//! Gradient boosted decision tree representation.

mod forest;
pub(crate) mod tree;

pub use forest::{Forest, ForestValidationError};
pub use tree::{MutableTree, Tree, TreeValidationError};

/// Node index local to one tree (0 = root).
pub type NodeId = u32;
