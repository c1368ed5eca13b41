//! Pairing of dynamics and measurement into one model.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;

use crate::dynamics::Dynamics;
use crate::error::SsfError;
use crate::linalg;
use crate::measurement::Measurement;

/// A univariate state-space model: one [`Dynamics`] and one
/// [`Measurement`] agreeing on the state dimension.
///
/// Both halves sit behind `Arc`, so cloning an `Ssf` is cheap and clones
/// can be handed to other threads. Neither half is ever mutated.
#[derive(Clone)]
pub struct Ssf {
    dynamics: Arc<dyn Dynamics>,
    measurement: Arc<dyn Measurement>,
}

impl Ssf {
    /// Pairs `dynamics` with `measurement` after checking that they form
    /// a well-defined model.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`SsfError::InvalidDynamics`] | `dynamics.is_valid()` is false |
    /// | [`SsfError::DimensionMismatch`] | the two state dimensions differ |
    /// | [`SsfError::InvalidInnovationsDim`] | the shock vector exceeds the state |
    /// | [`SsfError::InvalidNonStationaryDim`] | the diffuse subspace exceeds the state |
    /// | [`SsfError::RankDeficientConstraints`] | `B` lacks full column rank |
    ///
    /// # Example
    ///
    /// ```
    /// use ssfsim_ssf::{LoadingMeasurement, ScalarVarianceDynamics, Ssf};
    ///
    /// let ssf = Ssf::new(
    ///     ScalarVarianceDynamics::new(1, 4.0).unwrap(),
    ///     LoadingMeasurement::new(&[1.0]),
    /// )
    /// .unwrap();
    /// assert_eq!(ssf.state_dim(), 1);
    /// ```
    pub fn new<D, M>(dynamics: D, measurement: M) -> Result<Self, SsfError>
    where
        D: Dynamics + 'static,
        M: Measurement + 'static,
    {
        Self::from_shared(Arc::new(dynamics), Arc::new(measurement))
    }

    /// Same as [`Ssf::new`] for halves that are already shared.
    ///
    /// # Errors
    ///
    /// See [`Ssf::new`].
    pub fn from_shared(
        dynamics: Arc<dyn Dynamics>,
        measurement: Arc<dyn Measurement>,
    ) -> Result<Self, SsfError> {
        if !dynamics.is_valid() {
            return Err(SsfError::InvalidDynamics);
        }

        let state_dim = dynamics.state_dim();
        if measurement.state_dim() != state_dim {
            return Err(SsfError::DimensionMismatch {
                dynamics: state_dim,
                measurement: measurement.state_dim(),
            });
        }

        let innovations_dim = dynamics.innovations_dim();
        if innovations_dim > state_dim {
            return Err(SsfError::InvalidInnovationsDim {
                innovations_dim,
                state_dim,
            });
        }

        let nsdim = dynamics.non_stationary_dim();
        if nsdim > state_dim {
            return Err(SsfError::InvalidNonStationaryDim {
                non_stationary_dim: nsdim,
                state_dim,
            });
        }
        if nsdim > 0 {
            let mut b = Array2::zeros((state_dim, nsdim));
            dynamics.diffuse_constraints(b.view_mut());
            let rank = linalg::column_rank(b.view());
            if rank < nsdim {
                return Err(SsfError::RankDeficientConstraints {
                    rank,
                    expected: nsdim,
                });
            }
        }

        Ok(Self {
            dynamics,
            measurement,
        })
    }

    /// Returns the dynamics.
    pub fn dynamics(&self) -> &dyn Dynamics {
        self.dynamics.as_ref()
    }

    /// Returns the measurement.
    pub fn measurement(&self) -> &dyn Measurement {
        self.measurement.as_ref()
    }

    /// Returns the state dimension shared by both halves.
    pub fn state_dim(&self) -> usize {
        self.dynamics.state_dim()
    }
}

impl fmt::Debug for Ssf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ssf")
            .field("state_dim", &self.dynamics.state_dim())
            .field("innovations_dim", &self.dynamics.innovations_dim())
            .field("non_stationary_dim", &self.dynamics.non_stationary_dim())
            .field("has_errors", &self.measurement.has_errors())
            .finish()
    }
}
