//! Split gain computation and split finding.

mod find;
mod gain;

pub use find::{GreedySplitter, SplitInfo};
pub use gain::GainParams;
