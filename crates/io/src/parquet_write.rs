//! Low-level Parquet column building.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use ssfsim_ssf::SimulatedPath;

use crate::error::IoError;

/// Builds the Arrow schema for simulated paths.
///
/// Always includes `realisation`, `t` and `value`. When `has_errors` is
/// true, `measurement_error` is appended.
pub(crate) fn build_schema(has_errors: bool) -> Schema {
    let mut fields = vec![
        Field::new("realisation", DataType::UInt32, false),
        Field::new("t", DataType::UInt32, false),
        Field::new("value", DataType::Float64, false),
    ];
    if has_errors {
        fields.push(Field::new("measurement_error", DataType::Float64, false));
    }
    Schema::new(fields)
}

/// Converts one realisation into an Arrow [`RecordBatch`] in long format:
/// one row per period.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the schema expects measurement
/// errors and the path has none, or if the path is longer than `u32::MAX`
/// periods.
pub(crate) fn path_to_record_batch(
    realisation: u32,
    path: &SimulatedPath,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let n = path.len();
    let n32 = u32::try_from(n).map_err(|_| IoError::Validation {
        count: 1,
        details: format!("realisation {realisation}: {n} periods exceed u32 range"),
    })?;

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(vec![realisation; n])),
        Arc::new(UInt32Array::from_iter_values(0..n32)),
        Arc::new(Float64Array::from(path.data().to_vec())),
    ];

    if schema.fields().len() > 3 {
        let errors = path.measurement_errors().ok_or_else(|| IoError::Validation {
            count: 1,
            details: format!("realisation {realisation}: missing measurement errors"),
        })?;
        columns.push(Arc::new(Float64Array::from(errors.to_vec())));
    }

    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`IoError::Parquet`] if file creation, batch writing, or file
/// finalisation fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}
