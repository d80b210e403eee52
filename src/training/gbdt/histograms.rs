//! Gradient histograms for split finding.
//!
//! A node histogram holds, for every feature the current tree may split on,
//! the gradient sum, hessian sum and row count per bin. Histograms are built
//! from pre-gathered ("ordered") gradients so the inner loop reads gradients
//! sequentially, and sibling histograms are derived with the subtraction
//! trick (`large = parent - small`) so only the smaller child is ever built
//! from rows.

use crate::data::BinnedDataset;
use crate::training::GradsTuple;
use crate::utils::Parallelism;

use super::partition::LeafId;

/// Accumulated statistics of one bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistogramBin {
    pub grad: f64,
    pub hess: f64,
    pub count: u32,
}

/// Per-bin statistics of one feature.
#[derive(Debug, Clone)]
pub struct FeatureHistogram {
    feature: u32,
    bins: Vec<HistogramBin>,
}

impl FeatureHistogram {
    #[inline]
    pub fn feature(&self) -> u32 {
        self.feature
    }

    #[inline]
    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }
}

/// Histograms of one tree node, one entry per sampled feature in ascending
/// feature order.
#[derive(Debug, Clone)]
pub struct NodeHistogram {
    features: Vec<FeatureHistogram>,
}

impl NodeHistogram {
    /// Build from rows and their gradients, gathered in the same order.
    pub fn build(
        dataset: &BinnedDataset,
        features: &[u32],
        rows: &[u32],
        ordered: &[GradsTuple],
        parallelism: Parallelism,
    ) -> Self {
        debug_assert_eq!(rows.len(), ordered.len());
        let features = parallelism.maybe_par_map(features, |&feature| {
            let column = dataset.feature(feature as usize).bins();
            let mut bins = vec![HistogramBin::default(); dataset.n_bins(feature as usize) as usize];
            for (&row, gh) in rows.iter().zip(ordered) {
                let bin = &mut bins[column[row as usize] as usize];
                bin.grad += gh.grad as f64;
                bin.hess += gh.hess as f64;
                bin.count += 1;
            }
            FeatureHistogram { feature, bins }
        });
        Self { features }
    }

    /// Turn a parent histogram into its sibling by subtracting `child`.
    pub fn subtract(mut self, child: &NodeHistogram) -> Self {
        debug_assert_eq!(self.features.len(), child.features.len());
        for (parent, child) in self.features.iter_mut().zip(&child.features) {
            debug_assert_eq!(parent.feature, child.feature);
            for (p, c) in parent.bins.iter_mut().zip(&child.bins) {
                p.grad -= c.grad;
                p.hess -= c.hess;
                p.count -= c.count;
            }
        }
        self
    }

    #[inline]
    pub fn features(&self) -> &[FeatureHistogram] {
        &self.features
    }
}

/// Histogram storage keyed by training leaf.
#[derive(Debug, Default)]
pub struct HistogramPool {
    slots: Vec<Option<NodeHistogram>>,
}

impl HistogramPool {
    pub fn new(max_leaves: usize) -> Self {
        Self {
            slots: (0..max_leaves).map(|_| None).collect(),
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn insert(&mut self, leaf: LeafId, histogram: NodeHistogram) {
        self.slots[leaf as usize] = Some(histogram);
    }

    pub fn get(&self, leaf: LeafId) -> Option<&NodeHistogram> {
        self.slots.get(leaf as usize).and_then(Option::as_ref)
    }

    pub fn take(&mut self, leaf: LeafId) -> Option<NodeHistogram> {
        self.slots.get_mut(leaf as usize).and_then(Option::take)
    }

    pub fn release(&mut self, leaf: LeafId) {
        if let Some(slot) = self.slots.get_mut(leaf as usize) {
            *slot = None;
        }
    }
}
