//! Feature encoding of loan records.
//!
//! [`FeatureEncoder::fit`] learns one-hot vocabularies for the five
//! categorical fields and mean/standard-deviation statistics for five
//! numeric fields, then maps any record to a fixed-width `f32` row. The slot
//! order is fixed by [`layout`].

mod encoder;
pub mod layout;

pub use encoder::{EncoderError, FeatureEncoder};
pub use layout::{Scaler, Vocabulary};
