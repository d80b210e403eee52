//! Data handling for training.
//!
//! Training consumes a sample-major `f32` matrix (`[n_rows, n_features]`,
//! as produced by the feature encoder) which is quantized once into a
//! [`BinnedDataset`].

pub mod binned;

pub use binned::{BinMapper, BinnedDataset};
