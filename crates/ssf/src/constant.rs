//! Constant state with a fully diffuse initial distribution.
//!
//! ```text
//! a[t+1] = a[t]
//! a[0]   ~ N(0, κ·I),  κ → ∞
//! ```
//!
//! Used for components that never move once drawn, such as fixed
//! regression effects.

use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2};

use crate::dynamics::Dynamics;

/// Identity dynamics without process noise; every state direction is
/// diffuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstantDynamics {
    dim: usize,
}

impl ConstantDynamics {
    /// Creates constant dynamics for a state of dimension `dim`.
    ///
    /// # Example
    ///
    /// ```
    /// use ssfsim_ssf::{ConstantDynamics, Dynamics};
    ///
    /// let dynamics = ConstantDynamics::new(3);
    /// assert_eq!(dynamics.state_dim(), 3);
    /// assert_eq!(dynamics.non_stationary_dim(), 3);
    /// assert!(!dynamics.has_innovations(0));
    /// ```
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Dynamics for ConstantDynamics {
    fn state_dim(&self) -> usize {
        self.dim
    }

    fn innovations_dim(&self) -> usize {
        0
    }

    fn is_time_invariant(&self) -> bool {
        true
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn t(&self, _pos: usize, mut tr: ArrayViewMut2<'_, f64>) {
        tr.diag_mut().fill(1.0);
    }

    fn tx(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn xt(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn tvt(&self, _pos: usize, _v: ArrayViewMut2<'_, f64>) {}

    fn has_innovations(&self, _pos: usize) -> bool {
        false
    }

    fn s(&self, _pos: usize, _sm: ArrayViewMut2<'_, f64>) {}

    fn v(&self, _pos: usize, _vm: ArrayViewMut2<'_, f64>) {}

    fn add_su(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>, _u: ArrayView1<'_, f64>) {}

    fn xs(&self, _pos: usize, _x: ArrayView1<'_, f64>, _xs: ArrayViewMut1<'_, f64>) {}

    fn add_v(&self, _pos: usize, _p: ArrayViewMut2<'_, f64>) {}

    fn non_stationary_dim(&self) -> usize {
        self.dim
    }

    fn diffuse_constraints(&self, mut b: ArrayViewMut2<'_, f64>) {
        b.diag_mut().fill(1.0);
    }

    fn pi0(&self, mut p: ArrayViewMut2<'_, f64>) {
        p.diag_mut().fill(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    #[test]
    fn dimensions() {
        let d = ConstantDynamics::new(4);
        assert_eq!(d.state_dim(), 4);
        assert_eq!(d.innovations_dim(), 0);
        assert_eq!(d.non_stationary_dim(), 4);
        assert!(d.is_diffuse());
        assert!(d.is_valid());
        assert!(d.is_time_invariant());
        assert!(d.innovations_time_invariant());
    }

    #[test]
    fn zero_dimensional_is_not_diffuse() {
        let d = ConstantDynamics::new(0);
        assert!(!d.is_diffuse());
    }

    #[test]
    fn transition_is_identity() {
        let d = ConstantDynamics::new(3);
        let mut tr = Array2::zeros((3, 3));
        d.t(5, tr.view_mut());
        assert_eq!(tr, Array2::<f64>::eye(3));
    }

    #[test]
    fn tx_and_xt_leave_state_unchanged() {
        let d = ConstantDynamics::new(3);
        let mut x = array![1.0, -2.0, 3.5];
        d.tx(0, x.view_mut());
        assert_eq!(x, array![1.0, -2.0, 3.5]);
        d.xt(7, x.view_mut());
        assert_eq!(x, array![1.0, -2.0, 3.5]);
    }

    #[test]
    fn tvt_and_add_v_leave_covariance_unchanged() {
        let d = ConstantDynamics::new(2);
        let mut v = array![[2.0, 0.5], [0.5, 1.0]];
        d.tvt(0, v.view_mut());
        d.add_v(0, v.view_mut());
        assert_eq!(v, array![[2.0, 0.5], [0.5, 1.0]]);
    }

    #[test]
    fn no_innovations_anywhere() {
        let d = ConstantDynamics::new(2);
        assert!((0..100).all(|t| !d.has_innovations(t)));

        let mut x = array![1.0, 2.0];
        let u = Array1::<f64>::zeros(0);
        d.add_su(0, x.view_mut(), u.view());
        assert_eq!(x, array![1.0, 2.0]);
    }

    #[test]
    fn diffuse_initialisation() {
        let d = ConstantDynamics::new(3);
        let mut b = Array2::zeros((3, 3));
        d.diffuse_constraints(b.view_mut());
        assert_eq!(b, Array2::<f64>::eye(3));

        let mut pi0 = Array2::zeros((3, 3));
        d.pi0(pi0.view_mut());
        assert_eq!(pi0, Array2::<f64>::eye(3));

        let mut pf0 = Array2::zeros((3, 3));
        assert!(!d.pf0(pf0.view_mut()));
        assert!(pf0.iter().all(|&v| v == 0.0));

        let mut a0 = Array1::zeros(3);
        assert!(!d.a0(a0.view_mut()));
        assert!(a0.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConstantDynamics>();
    }
}
