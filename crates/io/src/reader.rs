//! Reading simulated paths back from Parquet.

use std::path::Path;

use crate::error::IoError;
use crate::parquet_read;
use crate::stored::StoredPath;

/// Reads simulated paths from a Parquet file written by
/// [`write_parquet`](crate::write_parquet).
///
/// Returns one [`StoredPath`] per realisation, sorted by realisation
/// index. An empty file yields an empty vector.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Parquet`] / [`IoError::Validation`] on format errors.
pub fn read_parquet(path: &Path) -> Result<Vec<StoredPath>, IoError> {
    let batches = parquet_read::read_batches(path)?;
    let Some(first) = batches.first() else {
        return Ok(Vec::new());
    };
    let has_errors = parquet_read::validate_schema(first)?;
    parquet_read::group_by_realisation(&batches, has_errors)
}
