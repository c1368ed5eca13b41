use std::path::PathBuf;

use serde::Deserialize;

/// Top-level ssfsim configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsfsimConfig {
    /// RNG seed. Without one, paths come from the process-wide source.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Variance scales of the simulation engine.
    #[serde(default)]
    pub engine: EngineToml,

    /// The state-space model.
    pub model: ModelToml,

    /// Output settings.
    #[serde(default)]
    pub output: OutputToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineToml {
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_diffuse_scale")]
    pub diffuse_scale: f64,
}

impl Default for EngineToml {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            diffuse_scale: default_diffuse_scale(),
        }
    }
}

fn default_scale() -> f64 {
    ssfsim_ssf::DEFAULT_SCALE
}
fn default_diffuse_scale() -> f64 {
    ssfsim_ssf::DEFAULT_DIFFUSE_SCALE
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    /// Measurement loading `Z`; its length is the state dimension.
    pub loading: Vec<f64>,
    /// Constant measurement-error variance.
    #[serde(default)]
    pub error_variance: Option<f64>,
    /// Per-period measurement-error variances.
    #[serde(default)]
    pub error_variances: Option<Vec<f64>>,
    pub dynamics: DynamicsToml,
}

/// Dynamics variant, selected by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum DynamicsToml {
    /// Fixed, fully diffuse state.
    Constant,
    /// Random walk with a common variance.
    Scalar { variance: f64 },
    /// Random walk with one variance per component.
    Diagonal { variances: Vec<f64> },
    /// Random walk with a full covariance matrix, given row by row.
    Full { covariance: Vec<Vec<f64>> },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_n")]
    pub n: usize,
    #[serde(default = "default_n_sim")]
    pub n_sim: usize,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            path: None,
            n: default_n(),
            n_sim: default_n_sim(),
            compression: default_compression(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_n() -> usize {
    100
}
fn default_n_sim() -> usize {
    1
}
fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}
