//! Low-level Parquet reading and column extraction.

use std::collections::BTreeMap;
use std::path::Path;

use arrow::array::{AsArray, RecordBatch};
use arrow::datatypes::{DataType, Float64Type, UInt32Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::IoError;
use crate::stored::StoredPath;

/// Expected leading column names.
const BASE_COLUMNS: [&str; 3] = ["realisation", "t", "value"];

/// Name of the optional fourth column.
const ERROR_COLUMN: &str = "measurement_error";

/// Column types, in column order.
const COLUMN_TYPES: [DataType; 4] = [
    DataType::UInt32,
    DataType::UInt32,
    DataType::Float64,
    DataType::Float64,
];

/// Rows of one realisation: (t, value, measurement_error).
type Rows = Vec<(u32, f64, Option<f64>)>;

/// Reads all record batches from a Parquet file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Parquet`] if the file cannot be opened or read.
pub(crate) fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Validates the schema of a record batch and returns whether the
/// measurement-error column is present.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the column count, names or types do
/// not match.
pub(crate) fn validate_schema(batch: &RecordBatch) -> Result<bool, IoError> {
    let num_cols = batch.num_columns();
    let has_errors = match num_cols {
        3 => false,
        4 => true,
        _ => {
            return Err(IoError::Validation {
                count: 1,
                details: format!("expected 3 or 4 columns, got {num_cols}"),
            });
        }
    };

    let schema = batch.schema();
    let expected = BASE_COLUMNS
        .iter()
        .copied()
        .chain(has_errors.then_some(ERROR_COLUMN));
    let mut mismatches: Vec<String> = Vec::new();
    for (i, name) in expected.enumerate() {
        let field = schema.field(i);
        if field.name() != name {
            mismatches.push(format!(
                "column {i}: expected '{name}', got '{}'",
                field.name()
            ));
        }
        if field.data_type() != &COLUMN_TYPES[i] {
            mismatches.push(format!(
                "column {i}: expected type {}, got {}",
                COLUMN_TYPES[i],
                field.data_type()
            ));
        }
    }

    if !mismatches.is_empty() {
        return Err(IoError::Validation {
            count: mismatches.len(),
            details: mismatches.join("; "),
        });
    }
    Ok(has_errors)
}

/// Groups rows by realisation, orders each realisation by `t` and checks
/// that its periods run `0, 1, …` without gaps.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if a realisation has missing or
/// duplicated periods.
pub(crate) fn group_by_realisation(
    batches: &[RecordBatch],
    has_errors: bool,
) -> Result<Vec<StoredPath>, IoError> {
    let mut groups: BTreeMap<u32, Rows> = BTreeMap::new();

    for batch in batches {
        let realisation_col = batch.column(0).as_primitive::<UInt32Type>();
        let t_col = batch.column(1).as_primitive::<UInt32Type>();
        let value_col = batch.column(2).as_primitive::<Float64Type>();
        let error_col = has_errors.then(|| batch.column(3).as_primitive::<Float64Type>());

        for row in 0..batch.num_rows() {
            groups
                .entry(realisation_col.value(row))
                .or_default()
                .push((
                    t_col.value(row),
                    value_col.value(row),
                    error_col.map(|c| c.value(row)),
                ));
        }
    }

    let mut paths = Vec::with_capacity(groups.len());
    let mut gaps = Vec::new();
    for (realisation, mut rows) in groups {
        rows.sort_by_key(|r| r.0);
        if let Some(pos) = rows.iter().enumerate().position(|(i, r)| r.0 as usize != i) {
            gaps.push(format!("realisation {realisation}: period {pos} missing or repeated"));
            continue;
        }
        let values = rows.iter().map(|r| r.1).collect();
        let errors = has_errors.then(|| rows.iter().filter_map(|r| r.2).collect());
        paths.push(StoredPath::new(realisation, values, errors)?);
    }

    if !gaps.is_empty() {
        return Err(IoError::Validation {
            count: gaps.len(),
            details: gaps.join("; "),
        });
    }
    Ok(paths)
}
