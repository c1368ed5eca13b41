//! # ssfsim-ssf
//!
//! Linear Gaussian state-space models with a univariate observation, and
//! random path simulation from them.
//!
//! ## Model
//!
//! ```text
//! a[t+1] = T(t)·a[t] + S(t)·u[t],   u[t] ~ N(0, I)
//! y[t]   = Z(t)·a[t] + e[t],        e[t] ~ N(0, h(t))
//! a[0]   = a0 + B·δ + L·z,          L·Lᵀ = Pf0, δ diffuse
//! ```
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     A["impl Dynamics"] --> C["Ssf::new(dynamics, measurement)?"]
//!     B["impl Measurement"] --> C
//!     C -->|"RandomGenerator::new(&ssf)?"| D["RandomGenerator"]
//!     D --> E[".generate(n)"]
//!     D --> F["monte_carlo(&gen, n, n_sim, seed)"]
//! ```
//!
//! ## Provided Dynamics
//!
//! | Type | Transition | Noise `S` | Diffuse |
//! |------|------------|-----------|---------|
//! | [`ConstantDynamics`] | `I` | none | every component |
//! | [`ScalarVarianceDynamics`] | `I` | `√v·I` | no |
//! | [`DiagonalVarianceDynamics`] | `I` | `diag(√vᵢ)` | no |
//! | [`FullCovarianceDynamics`] | `I` | `chol(Σ)` | no |
//!
//! ## Randomness
//!
//! Generators draw from a shared [`NormalSource`]. By default that is the
//! process-wide [`SharedNormalSource::global`], seeded with
//! [`GLOBAL_SEED`]. Pass a seeded source with
//! [`RandomGenerator::with_source`] for independent, reproducible streams.

mod config;
mod constant;
mod dynamics;
mod error;
mod generator;
mod measurement;
mod model;
mod montecarlo;
mod random;
mod time_varying;

pub(crate) mod linalg;

pub use config::{DEFAULT_DIFFUSE_SCALE, DEFAULT_SCALE, SimulationConfig};
pub use constant::ConstantDynamics;
pub use dynamics::Dynamics;
pub use error::SsfError;
pub use generator::{RandomGenerator, SimulatedPath};
pub use measurement::{LoadingMeasurement, Measurement};
pub use model::Ssf;
pub use montecarlo::{MonteCarloSummary, monte_carlo};
pub use random::{GLOBAL_SEED, NormalSource, ReplayNormalSource, SharedNormalSource};
pub use time_varying::{DiagonalVarianceDynamics, FullCovarianceDynamics, ScalarVarianceDynamics};
