//! Owned storage for a path read back from Parquet.

use crate::error::IoError;

/// One realisation read from a Parquet file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPath {
    realisation: u32,
    values: Vec<f64>,
    measurement_errors: Option<Vec<f64>>,
}

impl StoredPath {
    /// Creates a `StoredPath` after checking that the measurement errors,
    /// when present, have one entry per value.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] on a length mismatch.
    pub fn new(
        realisation: u32,
        values: Vec<f64>,
        measurement_errors: Option<Vec<f64>>,
    ) -> Result<Self, IoError> {
        if let Some(errors) = &measurement_errors
            && errors.len() != values.len()
        {
            return Err(IoError::Validation {
                count: 1,
                details: format!(
                    "realisation {realisation}: measurement_error length {} != value length {}",
                    errors.len(),
                    values.len()
                ),
            });
        }
        Ok(Self {
            realisation,
            values,
            measurement_errors,
        })
    }

    /// Realisation index.
    pub fn realisation(&self) -> u32 {
        self.realisation
    }

    /// Observations, ordered by period.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Measurement errors, if the file carries them.
    pub fn measurement_errors(&self) -> Option<&[f64]> {
        self.measurement_errors.as_deref()
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the path has no periods.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
