//! JSON persistence of trained models.
//!
//! Runtime types are never serialized directly. They are converted into
//! schema types ([`GBDTModelSchema`], [`EncoderSchema`] and friends) which
//! carry a `format_version` checked on load. Forests and encoder state are
//! validated structurally after conversion back.
//!
//! # Example
//!
//! ```ignore
//! use loanboost::persist::{read_json, write_json, GBDTModelSchema};
//!
//! write_json(&path, &GBDTModelSchema::from(&model))?;
//! let schema: GBDTModelSchema = read_json(&path)?;
//! let model = GBDTModel::try_from(schema)?;
//! ```

mod convert;
mod error;
mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use error::PersistError;
pub use schema::{
    CalibrationSchema, EncoderSchema, ForestSchema, GBDTConfigSchema, GBDTModelSchema,
    MetricSchema, ModelMetaSchema, ObjectiveSchema, ScalerSchema, TaskKindSchema, TreeSchema,
    FORMAT_VERSION,
};

/// Serialize `value` as pretty JSON to `path`, creating or truncating it.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|source| PersistError::io(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer
        .flush()
        .map_err(|source| PersistError::io(path, source))?;
    Ok(())
}

/// Deserialize a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let file = File::open(path).map_err(|source| PersistError::io(path, source))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
