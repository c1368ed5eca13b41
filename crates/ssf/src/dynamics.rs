//! The dynamics contract of a state-space model.
//!
//! ```text
//! a[t+1] = T(t) · a[t] + S(t) · u[t],    u[t] ~ N(0, I_r)
//! V(t)   = S(t) · S(t)ᵀ
//! a[0]   ~ N(a0, Pf0 + κ · B·Bᵀ),        κ → ∞ on the diffuse part
//! ```
//!
//! Every operation writes into caller-owned storage. Matrix and vector
//! buffers must be zero-initialised and sized for the declared dimensions;
//! a wrongly sized buffer is a programming error and panics.

use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2};

/// Transition and process-noise law of one structural model.
///
/// Implementations are immutable strategy objects: they can be shared
/// between threads and between any number of simulations.
pub trait Dynamics: Send + Sync {
    /// Dimension `n` of the state vector.
    fn state_dim(&self) -> usize;

    /// Dimension `r` of the per-step shock vector (`r <= n`).
    fn innovations_dim(&self) -> usize;

    /// Whether `T(t)` does not depend on `t`.
    fn is_time_invariant(&self) -> bool;

    /// Whether `S(t)` and `V(t)` do not depend on `t`.
    fn innovations_time_invariant(&self) -> bool {
        true
    }

    /// Self-consistency check. Callers refuse to simulate from an invalid
    /// instance.
    fn is_valid(&self) -> bool;

    // --- transition ---

    /// Fills `tr` (n×n) with `T(pos)`.
    fn t(&self, pos: usize, tr: ArrayViewMut2<'_, f64>);

    /// Overwrites `x` with `T(pos)·x`.
    fn tx(&self, pos: usize, x: ArrayViewMut1<'_, f64>);

    /// Overwrites `x` with `xᵀ·T(pos)`.
    fn xt(&self, pos: usize, x: ArrayViewMut1<'_, f64>);

    /// Overwrites `v` with `T(pos)·v·T(pos)ᵀ`.
    fn tvt(&self, pos: usize, v: ArrayViewMut2<'_, f64>);

    // --- process noise ---

    /// Whether a shock is added after step `pos`.
    fn has_innovations(&self, pos: usize) -> bool;

    /// Fills `sm` (n×r) with the loading `S(pos)`.
    fn s(&self, pos: usize, sm: ArrayViewMut2<'_, f64>);

    /// Fills `vm` (n×n) with `V(pos) = S(pos)·S(pos)ᵀ`.
    fn v(&self, pos: usize, vm: ArrayViewMut2<'_, f64>);

    /// `x += S(pos)·u`, with `u` of dimension `r`.
    fn add_su(&self, pos: usize, x: ArrayViewMut1<'_, f64>, u: ArrayView1<'_, f64>);

    /// `xs = xᵀ·S(pos)`, with `xs` of dimension `r`.
    fn xs(&self, pos: usize, x: ArrayView1<'_, f64>, xs: ArrayViewMut1<'_, f64>);

    /// `p += V(pos)`.
    fn add_v(&self, pos: usize, p: ArrayViewMut2<'_, f64>);

    // --- initialisation ---

    /// Dimension of the diffuse (non-stationary) subspace.
    fn non_stationary_dim(&self) -> usize {
        0
    }

    /// Whether the initial state has a diffuse part.
    fn is_diffuse(&self) -> bool {
        self.non_stationary_dim() > 0
    }

    /// Fills `b` (n × non_stationary_dim) with the directions of the
    /// diffuse subspace.
    fn diffuse_constraints(&self, _b: ArrayViewMut2<'_, f64>) {}

    /// Fills `p` (n×n) with the diffuse indicator covariance `Pi0 = B·Bᵀ`.
    fn pi0(&self, _p: ArrayViewMut2<'_, f64>) {}

    /// Fills `p` (n×n) with the stationary initial covariance. Returns
    /// `false` when nothing was written (the covariance is zero).
    fn pf0(&self, _p: ArrayViewMut2<'_, f64>) -> bool {
        false
    }

    /// Fills `a` with the deterministic initial mean. Returns `false` when
    /// nothing was written (the mean is zero).
    fn a0(&self, _a: ArrayViewMut1<'_, f64>) -> bool {
        false
    }
}
