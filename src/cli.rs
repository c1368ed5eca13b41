use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Random path simulation from linear Gaussian state-space models.
#[derive(Parser)]
#[command(
    name = "ssfsim",
    version,
    about = "Simulate observation paths from linear Gaussian state-space models"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Simulate paths and write them to Parquet.
    Simulate(SimulateArgs),
    /// Run a Monte-Carlo study and write per-period moments as JSON.
    Diagnose(DiagnoseArgs),
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "ssfsim.toml")]
    pub config: PathBuf,

    /// Override output Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Arguments for the `diagnose` subcommand.
#[derive(clap::Args)]
pub struct DiagnoseArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "ssfsim.toml")]
    pub config: PathBuf,

    /// Path for the JSON summary. Printed to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}
