//! Canonical tree representation (SoA) and its builder.
//!
//! This module provides:
//! - [`Tree`]: Immutable SoA tree storage for efficient traversal
//! - [`MutableTree`]: Builder used by the grower while a tree is being trained
//! - [`TreeValidationError`]: Structural validation errors
//!
//! Split semantics: a row goes to the left child when its feature value is
//! `<= threshold`. NaN follows the node's default direction.

use crate::data::BinnedDataset;

use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    #[error("tree has no nodes")]
    EmptyTree,
    /// Node arrays have different lengths.
    #[error("node array `{field}` has length {len}, expected {n_nodes}")]
    LengthMismatch {
        field: &'static str,
        len: usize,
        n_nodes: usize,
    },
    /// A child pointer references an out-of-bounds node.
    #[error("node {node} has {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node was reached by more than one path, or a cycle exists.
    #[error("node {node} is reachable more than once")]
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
    /// A split references a feature index at or beyond the model's input width.
    #[error("node {node} splits on feature {feature}, model has {n_features} features")]
    FeatureOutOfRange {
        node: NodeId,
        feature: u32,
        n_features: usize,
    },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage.
///
/// Child indices are local to this tree (0 = root).
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    /// Gain at each split node (0 for leaves).
    gains: Box<[f32]>,
    /// Hessian sum at each node.
    covers: Box<[f32]>,
}

impl Tree {
    /// Create a tree from parallel node arrays.
    ///
    /// Used by the persistence layer; call [`validate`](Self::validate) on
    /// untrusted input.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
        gains: Vec<f32>,
        covers: Vec<f32>,
    ) -> Self {
        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            gains: gains.into_boxed_slice(),
            covers: covers.into_boxed_slice(),
        }
    }

    /// Single-leaf tree.
    pub fn leaf(value: f32) -> Self {
        Self::from_parts(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![true],
            vec![true],
            vec![value],
            vec![0.0],
            vec![0.0],
        )
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    pub fn split_indices(&self) -> &[u32] {
        &self.split_indices
    }

    pub fn split_thresholds(&self) -> &[f32] {
        &self.split_thresholds
    }

    pub fn left_children(&self) -> &[u32] {
        &self.left_children
    }

    pub fn right_children(&self) -> &[u32] {
        &self.right_children
    }

    pub fn default_lefts(&self) -> &[bool] {
        &self.default_left
    }

    pub fn leaf_flags(&self) -> &[bool] {
        &self.is_leaf
    }

    pub fn leaf_values(&self) -> &[f32] {
        &self.leaf_values
    }

    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    pub fn covers(&self) -> &[f32] {
        &self.covers
    }

    /// Traverse from the root to the leaf reached by `features`.
    #[inline]
    pub fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let fvalue = features[self.split_index(node) as usize];
            let go_left = if fvalue.is_nan() {
                self.default_left(node)
            } else {
                fvalue <= self.split_threshold(node)
            };
            node = if go_left {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Leaf value for one feature row.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.leaf_value(self.traverse_to_leaf(features))
    }

    /// Traverse using a binned training row.
    ///
    /// Bin `b` goes left iff its upper bound is `<= threshold`, which matches
    /// value traversal because bin bounds are strictly increasing.
    #[inline]
    pub fn traverse_binned(&self, dataset: &BinnedDataset, row: usize) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let feature = self.split_index(node) as usize;
            let column = dataset.feature(feature);
            let bound = column.mapper().bin_to_threshold(column.bins()[row] as u32);
            node = if bound <= self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Add this tree's output to `predictions` for every row of `dataset`.
    pub fn predict_binned_into(&self, dataset: &BinnedDataset, predictions: &mut [f32]) {
        debug_assert_eq!(predictions.len(), dataset.n_rows());
        for (row, pred) in predictions.iter_mut().enumerate() {
            *pred += self.leaf_value(self.traverse_binned(dataset, row));
        }
    }

    /// Validate structural invariants: every node reachable exactly once and
    /// every split feature below `n_features`.
    pub fn validate(&self, n_features: usize) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        let lengths = [
            ("split_indices", self.split_indices.len()),
            ("split_thresholds", self.split_thresholds.len()),
            ("left_children", self.left_children.len()),
            ("right_children", self.right_children.len()),
            ("default_left", self.default_left.len()),
            ("leaf_values", self.leaf_values.len()),
            ("gains", self.gains.len()),
            ("covers", self.covers.len()),
        ];
        for (field, len) in lengths {
            if len != n_nodes {
                return Err(TreeValidationError::LengthMismatch { field, len, n_nodes });
            }
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            if visited[node as usize] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[node as usize] = true;
            if self.is_leaf(node) {
                continue;
            }
            let feature = self.split_index(node);
            if feature as usize >= n_features {
                return Err(TreeValidationError::FeatureOutOfRange {
                    node,
                    feature,
                    n_features,
                });
            }
            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|&seen| !seen) {
            Some(node) => Err(TreeValidationError::UnreachableNode { node: node as NodeId }),
            None => Ok(()),
        }
    }
}

// ============================================================================
// MutableTree
// ============================================================================

/// Tree under construction.
///
/// Nodes are appended as splits are applied; [`freeze`](Self::freeze) turns the
/// builder into an immutable [`Tree`].
#[derive(Debug, Clone, Default)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
    gains: Vec<f32>,
    covers: Vec<f32>,
}

impl MutableTree {
    pub fn with_capacity(max_nodes: usize) -> Self {
        Self {
            split_indices: Vec::with_capacity(max_nodes),
            split_thresholds: Vec::with_capacity(max_nodes),
            left_children: Vec::with_capacity(max_nodes),
            right_children: Vec::with_capacity(max_nodes),
            default_left: Vec::with_capacity(max_nodes),
            is_leaf: Vec::with_capacity(max_nodes),
            leaf_values: Vec::with_capacity(max_nodes),
            gains: Vec::with_capacity(max_nodes),
            covers: Vec::with_capacity(max_nodes),
        }
    }

    /// Clear and allocate the root. Returns its id (always 0).
    pub fn init_root(&mut self) -> NodeId {
        self.split_indices.clear();
        self.split_thresholds.clear();
        self.left_children.clear();
        self.right_children.clear();
        self.default_left.clear();
        self.is_leaf.clear();
        self.leaf_values.clear();
        self.gains.clear();
        self.covers.clear();
        self.push_node()
    }

    fn push_node(&mut self) -> NodeId {
        let id = self.is_leaf.len() as NodeId;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(true);
        // Pending nodes are leaves until split.
        self.is_leaf.push(true);
        self.leaf_values.push(0.0);
        self.gains.push(0.0);
        self.covers.push(0.0);
        id
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Turn `node` into a numeric split and allocate its two children.
    pub fn apply_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
        gain: f32,
        cover: f32,
    ) -> (NodeId, NodeId) {
        let left = self.push_node();
        let right = self.push_node();
        let idx = node as usize;
        self.split_indices[idx] = feature;
        self.split_thresholds[idx] = threshold;
        self.left_children[idx] = left;
        self.right_children[idx] = right;
        self.default_left[idx] = default_left;
        self.is_leaf[idx] = false;
        self.gains[idx] = gain;
        self.covers[idx] = cover;
        (left, right)
    }

    /// Finalize `node` as a leaf.
    pub fn make_leaf(&mut self, node: NodeId, value: f32, cover: f32) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_values[idx] = value;
        self.covers[idx] = cover;
    }

    /// Scale every leaf value by the learning rate.
    pub fn apply_learning_rate(&mut self, learning_rate: f32) {
        for (value, &leaf) in self.leaf_values.iter_mut().zip(self.is_leaf.iter()) {
            if leaf {
                *value *= learning_rate;
            }
        }
    }

    pub fn freeze(self) -> Tree {
        Tree::from_parts(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
            self.gains,
            self.covers,
        )
    }
}

#[cfg(test)]
pub(crate) fn stump(feature: u32, threshold: f32, left: f32, right: f32) -> Tree {
    let mut builder = MutableTree::with_capacity(3);
    let root = builder.init_root();
    let (l, r) = builder.apply_numeric_split(root, feature, threshold, true, 1.0, 2.0);
    builder.make_leaf(l, left, 1.0);
    builder.make_leaf(r, right, 1.0);
    builder.freeze()
}
