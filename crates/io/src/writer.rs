//! High-level Parquet writer configuration and orchestration.

use std::path::Path;

use parquet::file::properties::WriterProperties;
use ssfsim_ssf::SimulatedPath;
use tracing::info;

use crate::error::IoError;
use crate::parquet_write;

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
    /// Zstd compression (slower, better ratio).
    Zstd,
}

impl Compression {
    /// Converts to the corresponding `parquet::basic::Compression` variant.
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => {
                let level =
                    parquet::basic::ZstdLevel::try_new(3).map_err(|e| IoError::Parquet {
                        reason: e.to_string(),
                    })?;
                parquet::basic::Compression::ZSTD(level)
            }
        })
    }
}

impl std::str::FromStr for Compression {
    type Err = IoError;

    /// Parses `none`, `snappy` or `zstd`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Self::None),
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            other => Err(IoError::Validation {
                count: 1,
                details: format!("unknown compression '{other}'"),
            }),
        }
    }
}

/// Configuration for writing simulated paths to Parquet.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression algorithm to use.
    compression: Compression,
    /// Maximum number of rows per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    /// Sets the compression algorithm.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Sets the maximum number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Returns the compression algorithm.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the maximum number of rows per row group.
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `row_group_size` is zero.
    fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Writes simulated realisations to a Parquet file in long format.
///
/// Realisation `i` of `paths` is stored with `realisation = i`. The
/// `measurement_error` column is written when the first path carries
/// measurement errors; every path must then carry them.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid, if
/// there are more than `u32::MAX` realisations, or if the paths disagree
/// on measurement errors. Returns [`IoError::Parquet`] if schema
/// construction, batch conversion, or file I/O fails.
#[tracing::instrument(skip(paths, config), fields(n_paths = paths.len()))]
pub fn write_parquet(
    path: &Path,
    paths: &[SimulatedPath],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    let has_errors = paths
        .first()
        .is_some_and(|p| p.measurement_errors().is_some());
    let schema = parquet_write::build_schema(has_errors);

    let compression = config.compression.to_parquet()?;
    let props = WriterProperties::builder()
        .set_compression(compression)
        .set_max_row_group_size(config.row_group_size)
        .build();

    let batches: Vec<_> = paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let realisation = u32::try_from(i).map_err(|_| IoError::Validation {
                count: 1,
                details: format!("realisation index {i} exceeds u32 range"),
            })?;
            parquet_write::path_to_record_batch(realisation, p, &schema)
        })
        .collect::<Result<Vec<_>, _>>()?;

    parquet_write::write_batches(path, &batches, &schema, props)?;
    info!(path = %path.display(), "wrote simulated paths");

    Ok(())
}
