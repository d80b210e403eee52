//! Bin mapper for mapping feature values to bin indices.
//!
//! A [`BinMapper`] is learned per feature from the training column. Values map
//! to the first bin whose upper bound is `>=` the value, so a split "at bin b"
//! sends every value `<= upper_bound(b)` to the left child. Trees store that
//! upper bound as their split threshold, which keeps training-time partitioning
//! and inference-time traversal consistent.

// ============================================================================
// BinMapper
// ============================================================================

/// Mapping from continuous values to bin indices.
#[derive(Clone, Debug, PartialEq)]
pub struct BinMapper {
    /// Upper bounds for each bin. The last bound is `f32::INFINITY`.
    bin_upper_bounds: Box<[f32]>,
    /// Min/max values seen during binning.
    min_val: f32,
    max_val: f32,
}

impl BinMapper {
    /// Learn bin boundaries for one feature column.
    ///
    /// When the column has at most `max_bins` distinct values every distinct
    /// value gets its own bin, with boundaries at midpoints. Otherwise bins are
    /// cut greedily so each holds roughly `n / max_bins` samples; a single
    /// distinct value never straddles two bins. NaN values are ignored.
    pub fn from_values(values: impl IntoIterator<Item = f32>, max_bins: usize) -> Self {
        debug_assert!(max_bins >= 2);

        let mut sorted: Vec<f32> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Self::trivial();
        }
        sorted.sort_by(f32::total_cmp);

        // Distinct values with their counts
        let mut distinct: Vec<(f32, usize)> = Vec::new();
        for v in sorted.iter().copied() {
            match distinct.last_mut() {
                Some((last, count)) if *last == v => *count += 1,
                _ => distinct.push((v, 1)),
            }
        }

        let min_val = distinct[0].0;
        let max_val = distinct[distinct.len() - 1].0;

        let mut bounds: Vec<f32> = Vec::with_capacity(distinct.len().min(max_bins));
        if distinct.len() <= max_bins {
            for pair in distinct.windows(2) {
                bounds.push(midpoint(pair[0].0, pair[1].0));
            }
        } else {
            let total = sorted.len();
            let target = (total as f64 / max_bins as f64).max(1.0);
            let mut acc = 0usize;
            for (i, &(value, count)) in distinct.iter().enumerate() {
                acc += count;
                let is_last = i + 1 == distinct.len();
                // Reserve one slot for the terminal +inf bound.
                if !is_last && acc as f64 >= target && bounds.len() + 1 < max_bins {
                    bounds.push(midpoint(value, distinct[i + 1].0));
                    acc = 0;
                }
            }
        }
        bounds.push(f32::INFINITY);

        Self {
            bin_upper_bounds: bounds.into_boxed_slice(),
            min_val,
            max_val,
        }
    }

    /// Rebuild a mapper from stored upper bounds.
    pub fn from_bounds(bin_upper_bounds: Vec<f32>, min_val: f32, max_val: f32) -> Self {
        Self {
            bin_upper_bounds: bin_upper_bounds.into_boxed_slice(),
            min_val,
            max_val,
        }
    }

    fn trivial() -> Self {
        Self {
            bin_upper_bounds: Box::new([f32::INFINITY]),
            min_val: 0.0,
            max_val: 0.0,
        }
    }

    /// Number of bins.
    #[inline]
    pub fn n_bins(&self) -> u32 {
        self.bin_upper_bounds.len() as u32
    }

    /// Check if this feature is trivial (only one bin, no splits possible).
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.n_bins() <= 1
    }

    /// Smallest value seen while binning.
    #[inline]
    pub fn min_val(&self) -> f32 {
        self.min_val
    }

    /// Largest value seen while binning.
    #[inline]
    pub fn max_val(&self) -> f32 {
        self.max_val
    }

    /// Map a value to its bin index. NaN maps to bin 0.
    #[inline]
    pub fn value_to_bin(&self, value: f32) -> u32 {
        if value.is_nan() {
            return 0;
        }
        let idx = self.bin_upper_bounds.partition_point(|&bound| bound < value);
        idx.min(self.bin_upper_bounds.len() - 1) as u32
    }

    /// Split threshold for "bins `<= bin` go left".
    #[inline]
    pub fn bin_to_threshold(&self, bin: u32) -> f32 {
        self.bin_upper_bounds[bin as usize]
    }

    /// Upper bounds of all bins.
    #[inline]
    pub fn upper_bounds(&self) -> &[f32] {
        &self.bin_upper_bounds
    }
}

#[inline]
fn midpoint(a: f32, b: f32) -> f32 {
    let mid = a + (b - a) / 2.0;
    // Guard against rounding onto the upper neighbour.
    if mid >= b { a } else { mid }
}
