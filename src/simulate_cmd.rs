//! Simulate command: draw paths from a configured model and write Parquet.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ssfsim_io::write_parquet;
use ssfsim_ssf::{RandomGenerator, SimulatedPath, monte_carlo};

use crate::cli::SimulateArgs;
use crate::config::SsfsimConfig;
use crate::convert;

/// Loads and parses a TOML configuration file.
pub fn load_config(path: &Path) -> Result<SsfsimConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

/// Builds the random generator described by `config`.
pub fn build_generator(config: &SsfsimConfig) -> Result<RandomGenerator> {
    let ssf = convert::build_ssf(&config.model)?;
    let sim_cfg = convert::build_simulation_config(&config.engine)?;
    RandomGenerator::new(&ssf)
        .context("failed to prepare random generator")?
        .with_config(sim_cfg)
        .context("invalid [engine] settings")
}

/// Run the simulation pipeline.
pub fn run(args: SimulateArgs) -> Result<()> {
    let _cmd = info_span!("simulate").entered();
    let mut config = load_config(&args.config)?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let output = args
        .output
        .or_else(|| config.output.path.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no output path: set [output].path in config or use --output")
        })?;
    let writer_cfg = convert::build_writer_config(&config.output)?;
    let generator = build_generator(&config)?;
    let (n, n_sim) = (config.output.n, config.output.n_sim);

    info!(?generator, n, n_sim, seed = ?config.seed, "simulating");
    let paths: Vec<SimulatedPath> = match config.seed {
        Some(seed) => monte_carlo(&generator, n, n_sim, seed)
            .context("simulation failed")?
            .into_paths(),
        None => (0..n_sim)
            .map(|_| generator.simulate(n))
            .collect::<Result<Vec<_>, _>>()
            .context("simulation failed")?,
    };

    write_parquet(&output, &paths, &writer_cfg)
        .with_context(|| format!("failed to write Parquet: {}", output.display()))?;
    info!(path = %output.display(), n_paths = paths.len(), "paths written");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssfsim_io::read_parquet;

    const MODEL: &str = r#"
        [model]
        loading = [1.0, 0.5]
        error_variance = 0.2
        [model.dynamics]
        kind = "diagonal"
        variances = [1.0, 2.0]
        [output]
        n = 15
        n_sim = 4
    "#;

    fn args(dir: &Path, seed: Option<u64>) -> SimulateArgs {
        let config = dir.join("model.toml");
        std::fs::write(&config, MODEL).unwrap();
        SimulateArgs {
            config,
            output: Some(dir.join("out.parquet")),
            seed,
        }
    }

    #[test]
    fn writes_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        run(args(dir.path(), Some(1))).unwrap();

        let paths = read_parquet(&dir.path().join("out.parquet")).unwrap();
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.len() == 15));
        assert!(paths[0].measurement_errors().is_some());
    }

    #[test]
    fn seeded_runs_are_identical() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        run(args(a.path(), Some(9))).unwrap();
        run(args(b.path(), Some(9))).unwrap();
        assert_eq!(
            read_parquet(&a.path().join("out.parquet")).unwrap(),
            read_parquet(&b.path().join("out.parquet")).unwrap()
        );
    }

    #[test]
    fn missing_output_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path(), None);
        a.output = None;
        let err = run(a).unwrap_err();
        assert!(err.to_string().contains("no output path"));
    }
}
