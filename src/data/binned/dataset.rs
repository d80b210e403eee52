//! Quantized (binned) training matrix.

use ndarray::ArrayView2;

use super::BinMapper;
use crate::utils::Parallelism;

/// Largest supported bin count (bins are stored as `u8`).
pub const MAX_BINS_LIMIT: usize = 256;

/// One binned feature column.
#[derive(Clone, Debug)]
pub struct BinnedFeature {
    mapper: BinMapper,
    bins: Box<[u8]>,
}

impl BinnedFeature {
    /// Bin mapper learned for this column.
    #[inline]
    pub fn mapper(&self) -> &BinMapper {
        &self.mapper
    }

    /// Bin index per row.
    #[inline]
    pub fn bins(&self) -> &[u8] {
        &self.bins
    }
}

/// Feature-major binned dataset used by the tree grower.
///
/// Each column is quantized independently with its own [`BinMapper`]. Storage
/// is one contiguous `u8` slice per feature, so histogram building walks a
/// feature's bins with unit stride.
#[derive(Clone, Debug)]
pub struct BinnedDataset {
    n_rows: usize,
    features: Vec<BinnedFeature>,
}

impl BinnedDataset {
    /// Quantize a sample-major feature matrix (`[n_rows, n_features]`).
    ///
    /// `max_bins` is clamped to `2..=256`.
    pub fn from_features(
        features: ArrayView2<'_, f32>,
        max_bins: usize,
        parallelism: Parallelism,
    ) -> Self {
        let (n_rows, n_features) = features.dim();
        let max_bins = max_bins.clamp(2, MAX_BINS_LIMIT);

        let columns = parallelism.maybe_par_map(0..n_features, |f| {
            let column = features.column(f);
            let mapper = BinMapper::from_values(column.iter().copied(), max_bins);
            let bins: Box<[u8]> = column
                .iter()
                .map(|&v| mapper.value_to_bin(v) as u8)
                .collect();
            BinnedFeature { mapper, bins }
        });

        Self {
            n_rows,
            features: columns,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Number of bins for a feature.
    #[inline]
    pub fn n_bins(&self, feature: usize) -> u32 {
        self.features[feature].mapper.n_bins()
    }

    /// Binned column for a feature.
    #[inline]
    pub fn feature(&self, feature: usize) -> &BinnedFeature {
        &self.features[feature]
    }

    /// Iterate over all binned columns.
    pub fn features(&self) -> impl Iterator<Item = &BinnedFeature> {
        self.features.iter()
    }

    /// Bin of one cell.
    #[inline]
    pub fn bin(&self, row: usize, feature: usize) -> u32 {
        self.features[feature].bins[row] as u32
    }

    /// Total bins over all features (histogram width).
    pub fn total_bins(&self) -> usize {
        self.features.iter().map(|f| f.mapper.n_bins() as usize).sum()
    }
}
