//! Greedy split finding over node histograms.

use crate::data::BinnedDataset;
use crate::utils::Parallelism;

use super::super::histograms::{FeatureHistogram, NodeHistogram};
use super::gain::GainParams;

/// Best numeric split found for a node.
///
/// Rows whose bin is `<= bin` (equivalently whose value is `<= threshold`)
/// go left. Missing values share bin 0 and therefore always go left.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitInfo {
    pub feature: u32,
    pub bin: u32,
    pub threshold: f32,
    pub gain: f32,
    pub default_left: bool,
    pub left_grad: f64,
    pub left_hess: f64,
    pub left_count: u32,
}

impl SplitInfo {
    /// Placeholder for "no admissible split".
    pub fn none() -> Self {
        Self {
            feature: 0,
            bin: 0,
            threshold: 0.0,
            gain: f32::NEG_INFINITY,
            default_left: true,
            left_grad: 0.0,
            left_hess: 0.0,
            left_count: 0,
        }
    }

    /// Whether this split improves the loss.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.gain.is_finite() && self.gain > 0.0
    }
}

/// Exhaustive scan of every bin boundary of every sampled feature.
#[derive(Clone, Debug)]
pub struct GreedySplitter {
    gain: GainParams,
}

impl GreedySplitter {
    pub fn new(gain: GainParams) -> Self {
        Self { gain }
    }

    pub fn gain_params(&self) -> &GainParams {
        &self.gain
    }

    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        self.gain.compute_leaf_weight(grad_sum, hess_sum)
    }

    /// Best split of a node over all features in its histogram.
    ///
    /// Features are evaluated independently (in parallel when allowed) and
    /// reduced in feature order, so ties go to the lower feature index and
    /// the result is identical in both modes.
    pub fn find_split(
        &self,
        histogram: &NodeHistogram,
        dataset: &BinnedDataset,
        grad_sum: f64,
        hess_sum: f64,
        count: u32,
        parallelism: Parallelism,
    ) -> SplitInfo {
        if count < self.gain.min_samples_leaf.saturating_mul(2).max(2) {
            return SplitInfo::none();
        }

        let per_feature = parallelism.maybe_par_map(histogram.features(), |fh| {
            self.find_feature_split(fh, dataset, grad_sum, hess_sum, count)
        });

        per_feature
            .into_iter()
            .fold(SplitInfo::none(), |best, candidate| {
                if candidate.gain > best.gain { candidate } else { best }
            })
    }

    fn find_feature_split(
        &self,
        fh: &FeatureHistogram,
        dataset: &BinnedDataset,
        grad_sum: f64,
        hess_sum: f64,
        count: u32,
    ) -> SplitInfo {
        let mut best = SplitInfo::none();
        let bins = fh.bins();
        if bins.len() < 2 {
            return best;
        }
        let mapper = dataset.feature(fh.feature() as usize).mapper();

        let (mut grad_left, mut hess_left, mut count_left) = (0.0f64, 0.0f64, 0u32);
        // The last bin cannot be a split point: nothing would go right.
        for (bin, stats) in bins[..bins.len() - 1].iter().enumerate() {
            grad_left += stats.grad;
            hess_left += stats.hess;
            count_left += stats.count;

            let count_right = count - count_left;
            let grad_right = grad_sum - grad_left;
            let hess_right = hess_sum - hess_left;
            if !self
                .gain
                .is_valid_split(hess_left, hess_right, count_left, count_right)
            {
                continue;
            }

            let gain = self.gain.compute_gain(
                grad_left, hess_left, grad_right, hess_right, grad_sum, hess_sum,
            );
            if gain > best.gain {
                best = SplitInfo {
                    feature: fh.feature(),
                    bin: bin as u32,
                    threshold: mapper.bin_to_threshold(bin as u32),
                    gain,
                    default_left: true,
                    left_grad: grad_left,
                    left_hess: hess_left,
                    left_count: count_left,
                };
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::GradsTuple;
    use ndarray::array;

    fn splitter() -> GreedySplitter {
        GreedySplitter::new(GainParams {
            reg_lambda: 0.0,
            min_gain: 0.0,
            min_child_weight: 0.0,
            min_samples_leaf: 1,
        })
    }

    #[test]
    fn finds_the_separating_feature() {
        // Feature 1 separates the gradients perfectly; feature 0 is noise.
        let x = array![[0.0f32, 1.0], [1.0, 1.0], [0.0, 2.0], [1.0, 2.0]];
        let ds = BinnedDataset::from_features(x.view(), 16, Parallelism::Sequential);
        let gh: Vec<GradsTuple> = [-1.0f32, -1.0, 1.0, 1.0]
            .iter()
            .map(|&g| GradsTuple { grad: g, hess: 1.0 })
            .collect();
        let hist = NodeHistogram::build(&ds, &[0, 1], &[0, 1, 2, 3], &gh, Parallelism::Sequential);

        let split = splitter().find_split(&hist, &ds, 0.0, 4.0, 4, Parallelism::Sequential);
        assert!(split.is_valid());
        assert_eq!(split.feature, 1);
        assert_eq!(split.bin, 0);
        assert_eq!(split.threshold, 1.5);
        assert_eq!(split.left_count, 2);
        assert_eq!(split.left_grad, -2.0);
    }

    #[test]
    fn respects_min_samples_leaf() {
        let x = array![[0.0f32], [1.0], [2.0], [3.0]];
        let ds = BinnedDataset::from_features(x.view(), 16, Parallelism::Sequential);
        let gh = vec![GradsTuple { grad: 1.0, hess: 1.0 }; 4];
        let hist = NodeHistogram::build(&ds, &[0], &[0, 1, 2, 3], &gh, Parallelism::Sequential);

        let strict = GreedySplitter::new(GainParams {
            min_samples_leaf: 3,
            min_child_weight: 0.0,
            ..Default::default()
        });
        assert!(!strict
            .find_split(&hist, &ds, 4.0, 4.0, 4, Parallelism::Sequential)
            .is_valid());
    }

    #[test]
    fn constant_gradients_give_no_gain() {
        let x = array![[0.0f32], [1.0], [2.0], [3.0]];
        let ds = BinnedDataset::from_features(x.view(), 16, Parallelism::Sequential);
        let gh = vec![GradsTuple { grad: 1.0, hess: 1.0 }; 4];
        let hist = NodeHistogram::build(&ds, &[0], &[0, 1, 2, 3], &gh, Parallelism::Sequential);
        let split = splitter().find_split(&hist, &ds, 4.0, 4.0, 4, Parallelism::Sequential);
        assert!(!split.is_valid());
    }
}
