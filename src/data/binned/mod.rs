//! Histogram binning of feature columns.

mod bin_mapper;
mod dataset;

pub use bin_mapper::BinMapper;
pub use dataset::{BinnedDataset, BinnedFeature, MAX_BINS_LIMIT};
