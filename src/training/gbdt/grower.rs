//! Tree grower for gradient boosting.
//!
//! Grows one tree leaf-wise: at each step the pending leaf with the largest
//! split gain is expanded, until `max_leaves` is reached or no pending leaf
//! has an admissible split. Split finding works on histograms; only the
//! smaller child of each split is built from rows, the larger one is derived
//! from the parent with the subtraction trick.

use crate::data::BinnedDataset;
use crate::repr::gbdt::{MutableTree, NodeId, Tree};
use crate::training::{Gradients, GradsTuple};
use crate::utils::Parallelism;

use super::histograms::{HistogramPool, NodeHistogram};
use super::partition::{LeafId, RowPartitioner};
use super::split::{GainParams, GreedySplitter, SplitInfo};

/// Parameters for tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    pub gain: GainParams,
    pub learning_rate: f32,
    /// Maximum number of leaves per tree.
    pub max_leaves: u32,
    /// Optional depth cap on top of the leaf budget.
    pub max_depth: Option<u32>,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            gain: GainParams::default(),
            learning_rate: 0.1,
            max_leaves: 31,
            max_depth: None,
        }
    }
}

/// A leaf waiting to be split or finalized.
#[derive(Clone, Debug)]
struct NodeCandidate {
    leaf: LeafId,
    node: NodeId,
    depth: u32,
    split: SplitInfo,
    grad_sum: f64,
    hess_sum: f64,
    count: u32,
}

pub struct TreeGrower {
    params: GrowerParams,
    splitter: GreedySplitter,
    parallelism: Parallelism,
    histogram_pool: HistogramPool,
    partitioner: RowPartitioner,
    tree_builder: MutableTree,
    /// Learning-rate scaled value per training leaf of the last tree.
    last_leaf_values: Vec<f32>,
    /// Gradients gathered in partition order for histogram building.
    ordered: Vec<GradsTuple>,
}

impl TreeGrower {
    pub fn new(n_samples: usize, params: GrowerParams, parallelism: Parallelism) -> Self {
        let max_leaves = params.max_leaves.max(1) as usize;
        let max_nodes = 2 * max_leaves - 1;
        Self {
            splitter: GreedySplitter::new(params.gain.clone()),
            params,
            parallelism,
            histogram_pool: HistogramPool::new(max_leaves),
            partitioner: RowPartitioner::new(n_samples, max_leaves),
            tree_builder: MutableTree::with_capacity(max_nodes),
            last_leaf_values: vec![f32::NAN; max_leaves],
            ordered: Vec::with_capacity(n_samples),
        }
    }

    /// Grow a tree on `sampled_rows` (all rows when `None`) using only
    /// `features` as split candidates.
    pub fn grow(
        &mut self,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        sampled_rows: Option<&[u32]>,
        features: &[u32],
    ) -> Tree {
        let n_samples = dataset.n_rows();
        debug_assert_eq!(gradients.n_samples(), n_samples);

        self.partitioner.reset(n_samples, sampled_rows);
        self.histogram_pool.clear();
        self.last_leaf_values.fill(f32::NAN);
        let root = self.tree_builder.init_root();

        let (grad_sum, hess_sum) = gradients.sum(sampled_rows);
        let count = self.partitioner.leaf_count(0);
        let histogram = self.build_histogram(0, dataset, gradients, features);
        self.histogram_pool.insert(0, histogram);
        let split = self.find_split(0, dataset, grad_sum, hess_sum, count);

        let mut pending = vec![NodeCandidate {
            leaf: 0,
            node: root,
            depth: 0,
            split,
            grad_sum,
            hess_sum,
            count,
        }];
        let mut n_leaves = 1u32;

        while n_leaves < self.params.max_leaves {
            let Some(idx) = self.pick_next(&pending) else {
                break;
            };
            let candidate = pending.swap_remove(idx);
            let (left, right) = self.expand(candidate, dataset, gradients, features);
            pending.push(left);
            pending.push(right);
            n_leaves += 1;
        }

        for candidate in pending {
            self.finalize_leaf(&candidate);
        }

        self.tree_builder.apply_learning_rate(self.params.learning_rate);
        std::mem::take(&mut self.tree_builder).freeze()
    }

    /// Add the last grown tree to `predictions` using the final partition.
    ///
    /// Only valid when the tree was grown on all rows.
    pub fn update_predictions_from_last_tree(&self, predictions: &mut [f32]) {
        for leaf in 0..self.partitioner.n_leaves() {
            let value = self.last_leaf_values[leaf];
            if value.is_nan() {
                continue;
            }
            for &row in self.partitioner.leaf_indices(leaf as LeafId) {
                predictions[row as usize] += value;
            }
        }
    }

    /// Index of the pending candidate with the largest gain.
    ///
    /// Ties go to the smaller tree node id.
    fn pick_next(&self, pending: &[NodeCandidate]) -> Option<usize> {
        pending
            .iter()
            .enumerate()
            .filter(|(_, c)| self.can_expand(c))
            .max_by(|(_, a), (_, b)| {
                a.split
                    .gain
                    .total_cmp(&b.split.gain)
                    .then_with(|| b.node.cmp(&a.node))
            })
            .map(|(idx, _)| idx)
    }

    fn can_expand(&self, candidate: &NodeCandidate) -> bool {
        candidate.split.is_valid()
            && self
                .params
                .max_depth
                .is_none_or(|max_depth| candidate.depth < max_depth)
    }

    fn expand(
        &mut self,
        candidate: NodeCandidate,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        features: &[u32],
    ) -> (NodeCandidate, NodeCandidate) {
        let split = &candidate.split;
        let (left_node, right_node) = self.tree_builder.apply_numeric_split(
            candidate.node,
            split.feature,
            split.threshold,
            split.default_left,
            split.gain,
            candidate.hess_sum as f32,
        );

        let left_leaf = candidate.leaf;
        let (right_leaf, left_count, right_count) = self.partitioner.split(
            candidate.leaf,
            split.feature as usize,
            split.bin,
            dataset,
        );

        // The parent histogram lives in the left leaf's slot.
        let parent = self.histogram_pool.take(left_leaf);
        let (small_leaf, large_leaf) = if left_count <= right_count {
            (left_leaf, right_leaf)
        } else {
            (right_leaf, left_leaf)
        };
        let small = self.build_histogram(small_leaf, dataset, gradients, features);
        let large = match parent {
            Some(parent) => parent.subtract(&small),
            None => self.build_histogram(large_leaf, dataset, gradients, features),
        };
        self.histogram_pool.insert(small_leaf, small);
        self.histogram_pool.insert(large_leaf, large);

        let (left_grad, left_hess) = (split.left_grad, split.left_hess);
        let (right_grad, right_hess) = (
            candidate.grad_sum - left_grad,
            candidate.hess_sum - left_hess,
        );
        let depth = candidate.depth + 1;

        let left_split = self.find_split(left_leaf, dataset, left_grad, left_hess, left_count);
        let right_split = self.find_split(right_leaf, dataset, right_grad, right_hess, right_count);

        (
            NodeCandidate {
                leaf: left_leaf,
                node: left_node,
                depth,
                split: left_split,
                grad_sum: left_grad,
                hess_sum: left_hess,
                count: left_count,
            },
            NodeCandidate {
                leaf: right_leaf,
                node: right_node,
                depth,
                split: right_split,
                grad_sum: right_grad,
                hess_sum: right_hess,
                count: right_count,
            },
        )
    }

    fn finalize_leaf(&mut self, candidate: &NodeCandidate) {
        let weight = self
            .splitter
            .compute_leaf_weight(candidate.grad_sum, candidate.hess_sum);
        self.tree_builder
            .make_leaf(candidate.node, weight, candidate.hess_sum as f32);
        self.last_leaf_values[candidate.leaf as usize] = weight * self.params.learning_rate;
        self.histogram_pool.release(candidate.leaf);
    }

    fn build_histogram(
        &mut self,
        leaf: LeafId,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        features: &[u32],
    ) -> NodeHistogram {
        let rows = self.partitioner.leaf_indices(leaf);
        let pairs = gradients.pairs();
        self.ordered.clear();
        self.ordered.extend(rows.iter().map(|&row| pairs[row as usize]));
        NodeHistogram::build(dataset, features, rows, &self.ordered, self.parallelism)
    }

    fn find_split(
        &self,
        leaf: LeafId,
        dataset: &BinnedDataset,
        grad_sum: f64,
        hess_sum: f64,
        count: u32,
    ) -> SplitInfo {
        match self.histogram_pool.get(leaf) {
            Some(histogram) => self.splitter.find_split(
                histogram,
                dataset,
                grad_sum,
                hess_sum,
                count,
                self.parallelism,
            ),
            None => SplitInfo::none(),
        }
    }
}
