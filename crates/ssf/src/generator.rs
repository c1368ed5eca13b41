//! Random realisations of a state-space model.
//!
//! ```text
//! a[0] = a0 + √scale · L·z + √diffuse_scale · B·b,   L·Lᵀ = Pf0
//! y[0] = Z(0)·a[0] + e[0]
//! a[t] = T(t)·a[t-1] + √scale · S(t-1)·q[t-1]
//! y[t] = Z(t)·a[t] + e[t]
//! ```
//!
//! where `z`, `b` and `q` are standard-normal vectors. Draws are taken
//! from the source in a fixed order: measurement errors (if any), then the
//! initial state, then the diffuse part, then one shock vector per step.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array1, Array2, aview_mut1, aview1};
use tracing::{debug, trace};

use crate::config::SimulationConfig;
use crate::error::SsfError;
use crate::linalg;
use crate::model::Ssf;
use crate::random::{NormalSource, SharedNormalSource};

/// Numerical floor of the Cholesky factorisation of `Pf0`.
const PF0_EPS: f64 = 1e-8;

/// One simulated observation path.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatedPath {
    data: Vec<f64>,
    measurement_errors: Option<Vec<f64>>,
}

impl SimulatedPath {
    /// Returns the simulated observations.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the measurement errors added to each observation, if the
    /// model has any.
    pub fn measurement_errors(&self) -> Option<&[f64]> {
        self.measurement_errors.as_deref()
    }

    /// Returns the number of periods.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the path has no periods.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the path and returns the observations.
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }
}

/// Draws random observation paths from one [`Ssf`].
///
/// The setup work (Cholesky factor of `Pf0`, diffuse constraints) is done
/// once in [`RandomGenerator::new`]; every call to
/// [`RandomGenerator::generate`] then only allocates its own working
/// buffers, so one generator can serve several threads at once.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ssfsim_ssf::{
///     LoadingMeasurement, RandomGenerator, ScalarVarianceDynamics, SharedNormalSource, Ssf,
/// };
///
/// let ssf = Ssf::new(
///     ScalarVarianceDynamics::new(1, 4.0).unwrap(),
///     LoadingMeasurement::new(&[1.0]),
/// )
/// .unwrap();
/// let generator = RandomGenerator::new(&ssf)
///     .unwrap()
///     .with_source(Arc::new(SharedNormalSource::seeded(42)));
/// let y = generator.generate(12).unwrap();
/// assert_eq!(y.len(), 12);
/// ```
pub struct RandomGenerator {
    ssf: Ssf,
    config: SimulationConfig,
    /// Lower Cholesky factor of `Pf0`.
    la: Array2<f64>,
    a0: Option<Array1<f64>>,
    /// Diffuse constraints `B`, when the model is diffuse.
    b: Option<Array2<f64>>,
    source: Arc<dyn NormalSource>,
}

impl RandomGenerator {
    /// Prepares a generator for `ssf` with the default configuration and
    /// the process-wide normal source.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::NotPositiveSemiDefinite`] if `Pf0` has a pivot
    /// below `-1e-8`.
    pub fn new(ssf: &Ssf) -> Result<Self, SsfError> {
        let dynamics = ssf.dynamics();
        let dim = dynamics.state_dim();

        let mut la = Array2::zeros((dim, dim));
        if dynamics.pf0(la.view_mut()) {
            linalg::lower_cholesky(&mut la, PF0_EPS)?;
        }

        let mut a0 = Array1::zeros(dim);
        let a0 = dynamics.a0(a0.view_mut()).then_some(a0);

        let b = dynamics.is_diffuse().then(|| {
            let mut b = Array2::zeros((dim, dynamics.non_stationary_dim()));
            dynamics.diffuse_constraints(b.view_mut());
            b
        });

        debug!(
            state_dim = dim,
            innovations_dim = dynamics.innovations_dim(),
            non_stationary_dim = dynamics.non_stationary_dim(),
            has_errors = ssf.measurement().has_errors(),
            "random generator ready"
        );

        Ok(Self {
            ssf: ssf.clone(),
            config: SimulationConfig::default(),
            la,
            a0,
            b,
            source: SharedNormalSource::global(),
        })
    }

    /// Replaces the variance scales.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidConfig`] if `config` does not validate.
    pub fn with_config(mut self, config: SimulationConfig) -> Result<Self, SsfError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replaces the normal source used by [`RandomGenerator::generate`] and
    /// [`RandomGenerator::simulate`].
    pub fn with_source(mut self, source: Arc<dyn NormalSource>) -> Self {
        self.source = source;
        self
    }

    /// Returns the model.
    pub fn ssf(&self) -> &Ssf {
        &self.ssf
    }

    /// Returns the variance scales.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Draws one path of `n` observations.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidLength`] if `n == 0`.
    pub fn generate(&self, n: usize) -> Result<Vec<f64>, SsfError> {
        self.simulate(n).map(SimulatedPath::into_data)
    }

    /// Draws one path of `n` observations and keeps the measurement
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidLength`] if `n == 0`.
    pub fn simulate(&self, n: usize) -> Result<SimulatedPath, SsfError> {
        self.simulate_with(n, self.source.as_ref())
    }

    /// Draws one path of `n` observations from an explicit source.
    ///
    /// A call consumes exactly
    /// `n·[has_errors] + state_dim + non_stationary_dim·[diffuse]
    /// + Σ_{t<n-1} innovations_dim·[has_innovations(t)]` draws.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidLength`] if `n == 0`.
    pub fn simulate_with(
        &self,
        n: usize,
        source: &dyn NormalSource,
    ) -> Result<SimulatedPath, SsfError> {
        if n == 0 {
            return Err(SsfError::InvalidLength { n });
        }
        trace!(n, "simulating path");

        let dynamics = self.ssf.dynamics();
        let measurement = self.ssf.measurement();
        let std = self.config.scale().sqrt();

        // Only the variance of the first period is used for every period.
        let errors = measurement.has_errors().then(|| {
            let mut e = vec![0.0; n];
            source.fill(&mut e);
            let k = measurement.error_variance(0).sqrt() * std;
            e.iter_mut().for_each(|v| *v *= k);
            e
        });
        let error = |t: usize| errors.as_ref().map_or(0.0, |e| e[t]);

        let mut a = vec![0.0; dynamics.state_dim()];
        self.initial_state(source, &mut a);

        let mut data = Vec::with_capacity(n);
        data.push(measurement.zx(0, aview1(&a)) + error(0));

        let mut q = vec![0.0; dynamics.innovations_dim()];
        for t in 1..n {
            dynamics.tx(t, aview_mut1(&mut a));
            if dynamics.has_innovations(t - 1) {
                source.fill(&mut q);
                q.iter_mut().for_each(|v| *v *= std);
                dynamics.add_su(t - 1, aview_mut1(&mut a), aview1(&q));
            }
            data.push(measurement.zx(t, aview1(&a)) + error(t));
        }

        Ok(SimulatedPath {
            data,
            measurement_errors: errors,
        })
    }

    fn initial_state(&self, source: &dyn NormalSource, a: &mut [f64]) {
        source.fill(a);
        linalg::lower_mul_in_place(self.la.view(), aview_mut1(a));
        let std = self.config.scale().sqrt();
        a.iter_mut().for_each(|v| *v *= std);

        if let Some(a0) = &self.a0 {
            a.iter_mut().zip(a0).for_each(|(v, m)| *v += m);
        }

        if let Some(b) = &self.b {
            let mut u = vec![0.0; b.ncols()];
            source.fill(&mut u);
            let dstd = self.config.diffuse_scale().sqrt();
            u.iter_mut().for_each(|v| *v *= dstd);
            let u = aview1(&u);
            for (v, row) in a.iter_mut().zip(b.rows()) {
                *v += row.dot(&u);
            }
        }
    }
}

impl fmt::Debug for RandomGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomGenerator")
            .field("ssf", &self.ssf)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
