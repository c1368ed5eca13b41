//! # ssfsim-io
//!
//! Write simulated state-space paths to Parquet and read them back.
//!
//! Files use a long layout with one row per period:
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `realisation` | `u32` | index of the path |
//! | `t` | `u32` | period, from 0 |
//! | `value` | `f64` | simulated observation |
//! | `measurement_error` | `f64` | only when the model has errors |

mod error;
mod parquet_read;
mod parquet_write;
mod reader;
mod stored;
mod writer;

pub use error::IoError;
pub use reader::read_parquet;
pub use stored::StoredPath;
pub use writer::{Compression, WriterConfig, write_parquet};
