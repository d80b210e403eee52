//! The fitted feature encoder.

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

use crate::loan::LoanRecord;

use super::layout::{
    Scaler, Slot, Vocabulary, CATEGORICAL_FIELDS, LAYOUT, N_NUMERIC_SLOTS, SCALED_FIELDS,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncoderError {
    #[error("cannot fit an encoder on zero records")]
    EmptyFitSet,

    #[error("corrupt encoder state: {0}")]
    Corrupt(String),
}

/// Maps loan records to fixed-width `f32` rows.
///
/// Fitting is a constructor: the vocabularies and statistics never change
/// afterwards, and every transform reuses them. A category value unseen at
/// fit time encodes as an all-zero indicator block.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    scalers: Vec<Scaler>,
    vocabularies: Vec<Vocabulary>,
}

impl FeatureEncoder {
    /// Learn vocabularies and normalization statistics from `records`.
    pub fn fit(records: &[LoanRecord]) -> Result<Self, EncoderError> {
        if records.is_empty() {
            return Err(EncoderError::EmptyFitSet);
        }

        let scalers = SCALED_FIELDS
            .iter()
            .map(|&(name, get)| {
                let (scaler, degenerate) = Scaler::fit(records.iter().map(get));
                if degenerate {
                    log::warn!("`{name}` has zero variance in the fit set, scale set to 1");
                }
                scaler
            })
            .collect();

        let vocabularies = CATEGORICAL_FIELDS
            .iter()
            .map(|&(_, get)| Vocabulary::fit(records.iter().map(get)))
            .collect();

        let encoder = Self {
            scalers,
            vocabularies,
        };
        log::debug!(
            "fitted encoder on {} records: {} features",
            records.len(),
            encoder.n_features()
        );
        Ok(encoder)
    }

    /// Width of every encoded row.
    pub fn n_features(&self) -> usize {
        N_NUMERIC_SLOTS + self.vocabularies.iter().map(Vocabulary::len).sum::<usize>()
    }

    /// One name per slot, e.g. `age_norm` or `employment_status=Employed`.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features());
        for slot in LAYOUT {
            match slot {
                Slot::Scaled(i) => names.push(format!("{}_norm", SCALED_FIELDS[i].0)),
                Slot::Raw(name, _) => names.push(name.to_string()),
                Slot::OneHot(i) => {
                    let field = CATEGORICAL_FIELDS[i].0;
                    names.extend(
                        self.vocabularies[i]
                            .values()
                            .iter()
                            .map(|value| format!("{field}={value}")),
                    );
                }
            }
        }
        names
    }

    /// Rebuild from persisted state. Call [`validate`](Self::validate) before use.
    pub(crate) fn from_parts(scalers: Vec<Scaler>, vocabularies: Vec<Vocabulary>) -> Self {
        Self {
            scalers,
            vocabularies,
        }
    }

    pub(crate) fn scalers(&self) -> &[Scaler] {
        &self.scalers
    }

    pub(crate) fn vocabularies(&self) -> &[Vocabulary] {
        &self.vocabularies
    }

    pub fn vocabulary(&self, field: usize) -> &Vocabulary {
        &self.vocabularies[field]
    }

    pub fn scaler(&self, field: usize) -> &Scaler {
        &self.scalers[field]
    }

    /// Encode `record` into `out`, which must be `n_features()` long.
    pub fn transform_into(&self, record: &LoanRecord, out: &mut [f32]) {
        assert_eq!(
            out.len(),
            self.n_features(),
            "output row has the wrong width"
        );

        let mut pos = 0;
        for slot in LAYOUT {
            match slot {
                Slot::Scaled(i) => {
                    out[pos] = self.scalers[i].apply((SCALED_FIELDS[i].1)(record));
                    pos += 1;
                }
                Slot::Raw(_, get) => {
                    out[pos] = get(record);
                    pos += 1;
                }
                Slot::OneHot(i) => {
                    let vocab = &self.vocabularies[i];
                    let block = &mut out[pos..pos + vocab.len()];
                    block.fill(0.0);
                    if let Some(hit) = vocab.index_of((CATEGORICAL_FIELDS[i].1)(record)) {
                        block[hit] = 1.0;
                    }
                    pos += vocab.len();
                }
            }
        }
        debug_assert_eq!(pos, out.len());
    }

    /// Encode one record into a fresh row.
    pub fn transform_one(&self, record: &LoanRecord) -> Vec<f32> {
        let mut row = vec![0.0; self.n_features()];
        self.transform_into(record, &mut row);
        row
    }

    /// Encode records into a `[n_records, n_features]` matrix.
    pub fn transform(&self, records: &[LoanRecord]) -> Array2<f32> {
        let mut out = Array2::zeros((records.len(), self.n_features()));
        for (mut row, record) in out.rows_mut().into_iter().zip(records) {
            match row.as_slice_mut() {
                Some(slots) => self.transform_into(record, slots),
                None => row.assign(&ArrayView1::from(&self.transform_one(record))),
            }
        }
        out
    }

    /// Check a deserialized encoder for internal consistency.
    pub fn validate(&self) -> Result<(), EncoderError> {
        if self.scalers.len() != SCALED_FIELDS.len() {
            return Err(EncoderError::Corrupt(format!(
                "expected {} scalers, found {}",
                SCALED_FIELDS.len(),
                self.scalers.len()
            )));
        }
        if self.vocabularies.len() != CATEGORICAL_FIELDS.len() {
            return Err(EncoderError::Corrupt(format!(
                "expected {} vocabularies, found {}",
                CATEGORICAL_FIELDS.len(),
                self.vocabularies.len()
            )));
        }
        for (scaler, (name, _)) in self.scalers.iter().zip(SCALED_FIELDS) {
            if !(scaler.mean.is_finite() && scaler.scale.is_finite() && scaler.scale > 0.0) {
                return Err(EncoderError::Corrupt(format!("invalid statistics for `{name}`")));
            }
        }
        for (vocab, (name, _)) in self.vocabularies.iter().zip(CATEGORICAL_FIELDS) {
            if !vocab.is_sorted_unique() {
                return Err(EncoderError::Corrupt(format!(
                    "vocabulary of `{name}` is not sorted and unique"
                )));
            }
        }
        Ok(())
    }
}
