//! Pure conversion functions: TOML config structs -> crate API types.

use anyhow::{Context, Result, bail};
use ndarray::Array2;

use ssfsim_io::{Compression, WriterConfig};
use ssfsim_ssf::{
    ConstantDynamics, DiagonalVarianceDynamics, FullCovarianceDynamics, LoadingMeasurement,
    ScalarVarianceDynamics, SimulationConfig, Ssf,
};

use crate::config::{DynamicsToml, EngineToml, ModelToml, OutputToml};

/// Builds the model described by `[model]`.
pub fn build_ssf(model: &ModelToml) -> Result<Ssf> {
    let dim = model.loading.len();
    if dim == 0 {
        bail!("model.loading must not be empty");
    }
    let measurement = build_measurement(model)?;

    let ssf = match &model.dynamics {
        DynamicsToml::Constant => Ssf::new(ConstantDynamics::new(dim), measurement),
        DynamicsToml::Scalar { variance } => Ssf::new(
            ScalarVarianceDynamics::new(dim, *variance).context("invalid scalar dynamics")?,
            measurement,
        ),
        DynamicsToml::Diagonal { variances } => Ssf::new(
            DiagonalVarianceDynamics::new(variances).context("invalid diagonal dynamics")?,
            measurement,
        ),
        DynamicsToml::Full { covariance } => Ssf::new(
            FullCovarianceDynamics::new(to_matrix(covariance)?)
                .context("invalid full-covariance dynamics")?,
            measurement,
        ),
    };
    ssf.context("invalid state-space model")
}

fn build_measurement(model: &ModelToml) -> Result<LoadingMeasurement> {
    let m = LoadingMeasurement::new(&model.loading);
    let m = match (model.error_variance, &model.error_variances) {
        (Some(_), Some(_)) => {
            bail!("model must have at most one of error_variance or error_variances, got both")
        }
        (Some(v), None) => m.with_error_variance(v)?,
        (None, Some(vs)) => m.with_error_variances(vs.clone())?,
        (None, None) => m,
    };
    Ok(m)
}

/// Converts a row-major nested list into a matrix.
fn to_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        bail!(
            "covariance row {i} has {} entries, expected {n_cols}",
            row.len()
        );
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat).context("failed to shape covariance matrix")
}

/// Builds a [`SimulationConfig`] from `[engine]`.
pub fn build_simulation_config(engine: &EngineToml) -> Result<SimulationConfig> {
    let cfg = SimulationConfig::new()
        .with_scale(engine.scale)
        .with_diffuse_scale(engine.diffuse_scale);
    cfg.validate().context("invalid [engine] settings")?;
    Ok(cfg)
}

/// Builds a [`WriterConfig`] from `[output]`.
pub fn build_writer_config(output: &OutputToml) -> Result<WriterConfig> {
    let compression: Compression = output
        .compression
        .parse()
        .context("invalid output.compression")?;
    Ok(WriterConfig::default()
        .with_compression(compression)
        .with_row_group_size(output.row_group_size))
}
