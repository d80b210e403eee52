//! Row partitioning for tree training.
//!
//! Manages row indices per leaf in a single contiguous buffer. Each leaf owns
//! a range of that buffer; splitting a leaf partitions its range in place so
//! the left rows stay in the original leaf and the right rows move to a newly
//! allocated one.
//!
//! ```text
//! Initial (all rows in leaf 0):
//!   indices: [0, 1, 2, 3, 4, 5, 6, 7]
//!   leaf_begin: [0], leaf_count: [8]
//!
//! After splitting leaf 0 (rows 0,2,4,6 go left, rows 1,3,5,7 go right):
//!   indices: [0, 2, 4, 6, 1, 3, 5, 7]
//!   leaf_begin: [0, 4], leaf_count: [4, 4]
//! ```

use crate::data::BinnedDataset;

/// Leaf identifier during training (not the tree's node id).
pub type LeafId = u32;

pub struct RowPartitioner {
    indices: Vec<u32>,
    leaf_begin: Vec<u32>,
    leaf_count: Vec<u32>,
    n_leaves: usize,
}

impl RowPartitioner {
    pub fn new(n_samples: usize, max_leaves: usize) -> Self {
        Self {
            indices: (0..n_samples as u32).collect(),
            leaf_begin: vec![0; max_leaves],
            leaf_count: vec![0; max_leaves],
            n_leaves: 0,
        }
    }

    /// Reset for a new tree with all rows (or only `sampled` rows) in leaf 0.
    pub fn reset(&mut self, n_samples: usize, sampled: Option<&[u32]>) {
        self.indices.clear();
        match sampled {
            None => self.indices.extend(0..n_samples as u32),
            Some(rows) => self.indices.extend_from_slice(rows),
        }
        self.leaf_begin.fill(0);
        self.leaf_count.fill(0);
        self.leaf_count[0] = self.indices.len() as u32;
        self.n_leaves = 1;
    }

    /// Row indices of a leaf.
    #[inline]
    pub fn leaf_indices(&self, leaf: LeafId) -> &[u32] {
        let begin = self.leaf_begin[leaf as usize] as usize;
        let count = self.leaf_count[leaf as usize] as usize;
        &self.indices[begin..begin + count]
    }

    #[inline]
    pub fn leaf_count(&self, leaf: LeafId) -> u32 {
        self.leaf_count[leaf as usize]
    }

    #[inline]
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Split a leaf on `feature`: rows whose bin is `<= split_bin` stay left.
    ///
    /// Returns `(right_leaf, left_count, right_count)`.
    pub fn split(
        &mut self,
        leaf: LeafId,
        feature: usize,
        split_bin: u32,
        dataset: &BinnedDataset,
    ) -> (LeafId, u32, u32) {
        let begin = self.leaf_begin[leaf as usize] as usize;
        let count = self.leaf_count[leaf as usize] as usize;
        let end = begin + count;
        let bins = dataset.feature(feature).bins();

        let mut left_end = begin;
        for i in begin..end {
            let row = self.indices[i];
            if (bins[row as usize] as u32) <= split_bin {
                self.indices.swap(i, left_end);
                left_end += 1;
            }
        }

        let left_count = (left_end - begin) as u32;
        let right_count = (end - left_end) as u32;
        self.leaf_count[leaf as usize] = left_count;

        let right_leaf = self.n_leaves as LeafId;
        self.n_leaves += 1;
        self.leaf_begin[right_leaf as usize] = left_end as u32;
        self.leaf_count[right_leaf as usize] = right_count;

        (right_leaf, left_count, right_count)
    }
}
