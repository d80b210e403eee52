//! Canonical model representations shared by training, inference and persistence.

pub mod gbdt;
