//! Random-walk dynamics for time-varying coefficients.
//!
//! ```text
//! a[t+1] = a[t] + S · u[t],    u[t] ~ N(0, I)
//! ```
//!
//! The three types only differ in the shape of the noise covariance
//! `V = S·Sᵀ`:
//!
//! | Type | `V` | `S` |
//! |------|-----|-----|
//! | [`ScalarVarianceDynamics`] | `v·I` | `√v·I` |
//! | [`DiagonalVarianceDynamics`] | `diag(vᵢ)` | `diag(√vᵢ)` |
//! | [`FullCovarianceDynamics`] | `Σ` | lower Cholesky factor of `Σ` |
//!
//! None of them has a diffuse part; the initial state is zero.

use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1, ArrayViewMut2, Zip};

use crate::dynamics::Dynamics;
use crate::error::SsfError;
use crate::linalg;

/// Tolerance of the Cholesky factorisation of a full covariance matrix.
const CHOLESKY_EPS: f64 = 1e-9;

fn check_variance(index: usize, value: f64) -> Result<(), SsfError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SsfError::InvalidVariance { index, value });
    }
    Ok(())
}

/// Identity transition shared by the three variants.
fn identity(mut tr: ArrayViewMut2<'_, f64>) {
    tr.diag_mut().fill(1.0);
}

/// Common variance `v` for every state component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarVarianceDynamics {
    n: usize,
    var: f64,
    std: f64,
}

impl ScalarVarianceDynamics {
    /// Creates a random walk of dimension `n` whose components all have
    /// innovation variance `var`.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidVariance`] if `var` is negative or
    /// non-finite.
    ///
    /// # Example
    ///
    /// ```
    /// use ssfsim_ssf::{Dynamics, ScalarVarianceDynamics};
    ///
    /// let dynamics = ScalarVarianceDynamics::new(2, 4.0).unwrap();
    /// assert_eq!(dynamics.innovations_dim(), 2);
    /// assert_eq!(dynamics.std(), 2.0);
    /// ```
    pub fn new(n: usize, var: f64) -> Result<Self, SsfError> {
        check_variance(0, var)?;
        Ok(Self {
            n,
            var,
            std: var.sqrt(),
        })
    }

    /// Returns the common innovation variance.
    pub fn var(&self) -> f64 {
        self.var
    }

    /// Returns the common innovation standard deviation.
    pub fn std(&self) -> f64 {
        self.std
    }
}

impl Dynamics for ScalarVarianceDynamics {
    fn state_dim(&self) -> usize {
        self.n
    }

    fn innovations_dim(&self) -> usize {
        self.n
    }

    fn is_time_invariant(&self) -> bool {
        true
    }

    fn is_valid(&self) -> bool {
        self.var.is_finite() && self.var >= 0.0
    }

    fn t(&self, _pos: usize, tr: ArrayViewMut2<'_, f64>) {
        identity(tr);
    }

    fn tx(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn xt(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn tvt(&self, _pos: usize, _v: ArrayViewMut2<'_, f64>) {}

    fn has_innovations(&self, _pos: usize) -> bool {
        true
    }

    fn s(&self, _pos: usize, mut sm: ArrayViewMut2<'_, f64>) {
        sm.diag_mut().fill(self.std);
    }

    fn v(&self, _pos: usize, mut vm: ArrayViewMut2<'_, f64>) {
        vm.diag_mut().fill(self.var);
    }

    fn add_su(&self, _pos: usize, x: ArrayViewMut1<'_, f64>, u: ArrayView1<'_, f64>) {
        let std = self.std;
        Zip::from(x).and(u).for_each(|xi, &ui| *xi += ui * std);
    }

    fn xs(&self, _pos: usize, x: ArrayView1<'_, f64>, xs: ArrayViewMut1<'_, f64>) {
        let std = self.std;
        Zip::from(xs).and(x).for_each(|o, &xi| *o = xi * std);
    }

    fn add_v(&self, _pos: usize, mut p: ArrayViewMut2<'_, f64>) {
        p.diag_mut().mapv_inplace(|d| d + self.var);
    }
}

/// One innovation variance per state component.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagonalVarianceDynamics {
    var: Array1<f64>,
    std: Array1<f64>,
}

impl DiagonalVarianceDynamics {
    /// Creates a random walk whose `i`-th component has innovation
    /// variance `var[i]`. A zero entry freezes that component.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidVariance`] for the first negative or
    /// non-finite entry.
    pub fn new(var: &[f64]) -> Result<Self, SsfError> {
        for (i, &v) in var.iter().enumerate() {
            check_variance(i, v)?;
        }
        let var = Array1::from(var.to_vec());
        let std = var.mapv(f64::sqrt);
        Ok(Self { var, std })
    }

    /// Returns the per-component innovation variances.
    pub fn var(&self) -> ArrayView1<'_, f64> {
        self.var.view()
    }
}

impl Dynamics for DiagonalVarianceDynamics {
    fn state_dim(&self) -> usize {
        self.var.len()
    }

    fn innovations_dim(&self) -> usize {
        self.var.len()
    }

    fn is_time_invariant(&self) -> bool {
        true
    }

    fn is_valid(&self) -> bool {
        self.var.len() == self.std.len() && self.var.iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    fn t(&self, _pos: usize, tr: ArrayViewMut2<'_, f64>) {
        identity(tr);
    }

    fn tx(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn xt(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn tvt(&self, _pos: usize, _v: ArrayViewMut2<'_, f64>) {}

    fn has_innovations(&self, _pos: usize) -> bool {
        true
    }

    fn s(&self, _pos: usize, mut sm: ArrayViewMut2<'_, f64>) {
        sm.diag_mut().assign(&self.std);
    }

    fn v(&self, _pos: usize, mut vm: ArrayViewMut2<'_, f64>) {
        vm.diag_mut().assign(&self.var);
    }

    fn add_su(&self, _pos: usize, x: ArrayViewMut1<'_, f64>, u: ArrayView1<'_, f64>) {
        Zip::from(x)
            .and(u)
            .and(&self.std)
            .for_each(|xi, &ui, &si| *xi += ui * si);
    }

    fn xs(&self, _pos: usize, x: ArrayView1<'_, f64>, xs: ArrayViewMut1<'_, f64>) {
        Zip::from(xs)
            .and(x)
            .and(&self.std)
            .for_each(|o, &xi, &si| *o = xi * si);
    }

    fn add_v(&self, _pos: usize, mut p: ArrayViewMut2<'_, f64>) {
        let mut diag = p.diag_mut();
        diag += &self.var;
    }
}

/// Full innovation covariance `Σ`, injected through its lower Cholesky
/// factor.
#[derive(Clone, Debug, PartialEq)]
pub struct FullCovarianceDynamics {
    var: Array2<f64>,
    s: Array2<f64>,
}

impl FullCovarianceDynamics {
    /// Creates a random walk with innovation covariance `var`.
    ///
    /// The loading `S` is the lower Cholesky factor of `var`, computed
    /// once here with tolerance `1e-9`; pivots below the tolerance zero
    /// their column, so singular PSD matrices are accepted.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`SsfError::ShapeMismatch`] | `var` is not square |
    /// | [`SsfError::InvalidVariance`] | a diagonal entry is negative or any entry is non-finite |
    /// | [`SsfError::NotSymmetric`] | `var` differs from its transpose |
    /// | [`SsfError::NotPositiveSemiDefinite`] | the factorisation fails |
    pub fn new(var: Array2<f64>) -> Result<Self, SsfError> {
        Self::check_covariance(&var)?;
        let mut s = var.clone();
        linalg::lower_cholesky(&mut s, CHOLESKY_EPS)?;
        Ok(Self { var, s })
    }

    /// Creates a random walk from a covariance and a precomputed loading
    /// with `S·Sᵀ = var`. The loading is trusted, only its shape is
    /// checked.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::ShapeMismatch`] if `var` is not square or `s`
    /// does not have the same shape, and the errors of
    /// [`FullCovarianceDynamics::new`] for an invalid `var`.
    pub fn with_loading(var: Array2<f64>, s: Array2<f64>) -> Result<Self, SsfError> {
        Self::check_covariance(&var)?;
        if s.dim() != var.dim() {
            return Err(SsfError::ShapeMismatch {
                expected_rows: var.nrows(),
                expected_cols: var.ncols(),
                rows: s.nrows(),
                cols: s.ncols(),
            });
        }
        Ok(Self { var, s })
    }

    fn check_covariance(var: &Array2<f64>) -> Result<(), SsfError> {
        let (rows, cols) = var.dim();
        if rows != cols {
            return Err(SsfError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: rows,
                rows,
                cols,
            });
        }
        for i in 0..rows {
            check_variance(i, var[[i, i]])?;
        }
        if let Some(((i, j), &v)) = var.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SsfError::InvalidVariance {
                index: i * cols + j,
                value: v,
            });
        }
        let scale = var.diag().iter().fold(1.0_f64, |acc, &v| acc.max(v));
        if let Some((row, col)) = linalg::asymmetry(var.view(), CHOLESKY_EPS * scale) {
            return Err(SsfError::NotSymmetric { row, col });
        }
        Ok(())
    }

    /// Returns the innovation covariance `Σ`.
    pub fn covariance(&self) -> &Array2<f64> {
        &self.var
    }

    /// Returns the loading `S`.
    pub fn loading(&self) -> &Array2<f64> {
        &self.s
    }
}

impl Dynamics for FullCovarianceDynamics {
    fn state_dim(&self) -> usize {
        self.var.nrows()
    }

    fn innovations_dim(&self) -> usize {
        self.var.ncols()
    }

    fn is_time_invariant(&self) -> bool {
        true
    }

    fn is_valid(&self) -> bool {
        self.var.is_square() && self.s.dim() == self.var.dim()
    }

    fn t(&self, _pos: usize, tr: ArrayViewMut2<'_, f64>) {
        identity(tr);
    }

    fn tx(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn xt(&self, _pos: usize, _x: ArrayViewMut1<'_, f64>) {}

    fn tvt(&self, _pos: usize, _v: ArrayViewMut2<'_, f64>) {}

    fn has_innovations(&self, _pos: usize) -> bool {
        true
    }

    fn s(&self, _pos: usize, mut sm: ArrayViewMut2<'_, f64>) {
        sm.assign(&self.s);
    }

    fn v(&self, _pos: usize, mut vm: ArrayViewMut2<'_, f64>) {
        vm.assign(&self.var);
    }

    fn add_su(&self, _pos: usize, x: ArrayViewMut1<'_, f64>, u: ArrayView1<'_, f64>) {
        Zip::from(x)
            .and(self.s.rows())
            .for_each(|xi, row| *xi += row.dot(&u));
    }

    fn xs(&self, _pos: usize, x: ArrayView1<'_, f64>, xs: ArrayViewMut1<'_, f64>) {
        Zip::from(xs)
            .and(self.s.columns())
            .for_each(|o, col| *o = col.dot(&x));
    }

    fn add_v(&self, _pos: usize, mut p: ArrayViewMut2<'_, f64>) {
        p += &self.var;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn scalar_dimensions_and_matrices() {
        let d = ScalarVarianceDynamics::new(3, 4.0).unwrap();
        assert_eq!(d.state_dim(), 3);
        assert_eq!(d.innovations_dim(), 3);
        assert!(!d.is_diffuse());
        assert!(d.is_valid());
        assert!(d.has_innovations(0));

        let mut v = Array2::zeros((3, 3));
        d.v(0, v.view_mut());
        assert_eq!(v, Array2::<f64>::eye(3) * 4.0);

        let mut s = Array2::zeros((3, 3));
        d.s(0, s.view_mut());
        assert_eq!(s, Array2::<f64>::eye(3) * 2.0);

        let mut tr = Array2::zeros((3, 3));
        d.t(0, tr.view_mut());
        assert_eq!(tr, Array2::<f64>::eye(3));
    }

    #[test]
    fn scalar_add_su_and_xs() {
        let d = ScalarVarianceDynamics::new(2, 9.0).unwrap();
        let mut x = array![1.0, 1.0];
        d.add_su(0, x.view_mut(), array![1.0, -1.0].view());
        assert_eq!(x, array![4.0, -2.0]);

        let mut xs = Array1::zeros(2);
        d.xs(0, array![1.0, 2.0].view(), xs.view_mut());
        assert_eq!(xs, array![3.0, 6.0]);
    }

    #[test]
    fn scalar_add_v() {
        let d = ScalarVarianceDynamics::new(2, 0.5).unwrap();
        let mut p = array![[1.0, 0.3], [0.3, 2.0]];
        d.add_v(0, p.view_mut());
        assert_eq!(p, array![[1.5, 0.3], [0.3, 2.5]]);
    }

    #[test]
    fn scalar_rejects_negative_variance() {
        assert!(matches!(
            ScalarVarianceDynamics::new(2, -1.0),
            Err(SsfError::InvalidVariance { index: 0, .. })
        ));
        assert!(ScalarVarianceDynamics::new(2, f64::NAN).is_err());
    }

    #[test]
    fn diagonal_matrices() {
        let d = DiagonalVarianceDynamics::new(&[1.0, 0.0, 4.0]).unwrap();
        assert_eq!(d.state_dim(), 3);
        assert_eq!(d.innovations_dim(), 3);

        let mut v = Array2::zeros((3, 3));
        d.v(0, v.view_mut());
        assert_eq!(v.diag(), array![1.0, 0.0, 4.0]);
        assert_eq!(v[[0, 1]], 0.0);

        let mut s = Array2::zeros((3, 3));
        d.s(0, s.view_mut());
        assert_eq!(s.diag(), array![1.0, 0.0, 2.0]);
    }

    #[test]
    fn diagonal_zero_variance_component_is_frozen() {
        let d = DiagonalVarianceDynamics::new(&[1.0, 0.0, 1.0]).unwrap();
        let mut x = array![0.0, 5.0, 0.0];
        d.add_su(0, x.view_mut(), array![0.7, 123.0, -0.2].view());
        assert_abs_diff_eq!(x[0], 0.7, epsilon = 1e-15);
        assert_eq!(x[1], 5.0);
        assert_abs_diff_eq!(x[2], -0.2, epsilon = 1e-15);
    }

    #[test]
    fn diagonal_add_v_and_xs() {
        let d = DiagonalVarianceDynamics::new(&[1.0, 4.0]).unwrap();
        let mut p = Array2::<f64>::eye(2);
        d.add_v(0, p.view_mut());
        assert_eq!(p, array![[2.0, 0.0], [0.0, 5.0]]);

        let mut xs = Array1::zeros(2);
        d.xs(0, array![3.0, 3.0].view(), xs.view_mut());
        assert_eq!(xs, array![3.0, 6.0]);
    }

    #[test]
    fn diagonal_rejects_bad_entry() {
        let err = DiagonalVarianceDynamics::new(&[1.0, 2.0, -0.1]).unwrap_err();
        assert!(matches!(err, SsfError::InvalidVariance { index: 2, .. }));
    }

    #[test]
    fn full_loading_reproduces_covariance() {
        let sigma = array![[4.0, 2.0, 0.6], [2.0, 2.0, 0.5], [0.6, 0.5, 1.0]];
        let d = FullCovarianceDynamics::new(sigma.clone()).unwrap();
        let s = d.loading();
        let back = s.dot(&s.t());
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(back[[i, j]], sigma[[i, j]], epsilon = 1e-9);
            }
        }
        // Lower triangular.
        assert_eq!(s[[0, 1]], 0.0);
        assert_eq!(s[[1, 2]], 0.0);
    }

    #[test]
    fn full_add_su_matches_dense_product() {
        let sigma = array![[4.0, 2.0], [2.0, 5.0]];
        let d = FullCovarianceDynamics::new(sigma).unwrap();
        let u = array![0.5, -1.5];
        let expected = d.loading().dot(&u);

        let mut x = Array1::zeros(2);
        d.add_su(0, x.view_mut(), u.view());
        assert_abs_diff_eq!(x[0], expected[0], epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn full_xs_matches_dense_product() {
        let d = FullCovarianceDynamics::new(array![[4.0, 2.0], [2.0, 5.0]]).unwrap();
        let x = array![1.0, 2.0];
        let expected = x.dot(d.loading());
        let mut xs = Array1::zeros(2);
        d.xs(0, x.view(), xs.view_mut());
        assert_abs_diff_eq!(xs[0], expected[0], epsilon = 1e-12);
        assert_abs_diff_eq!(xs[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn full_v_and_add_v() {
        let sigma = array![[1.0, 0.2], [0.2, 0.5]];
        let d = FullCovarianceDynamics::new(sigma.clone()).unwrap();
        let mut v = Array2::zeros((2, 2));
        d.v(0, v.view_mut());
        assert_eq!(v, sigma);
        d.add_v(0, v.view_mut());
        assert_eq!(v, &sigma * 2.0);
    }

    #[test]
    fn full_accepts_singular_psd() {
        let d = FullCovarianceDynamics::new(array![[1.0, 1.0], [1.0, 1.0]]).unwrap();
        assert_eq!(d.loading()[[1, 1]], 0.0);
    }

    #[test]
    fn full_rejects_non_square() {
        let err = FullCovarianceDynamics::new(Array2::zeros((2, 3))).unwrap_err();
        assert!(matches!(err, SsfError::ShapeMismatch { rows: 2, cols: 3, .. }));
    }

    #[test]
    fn full_rejects_asymmetric() {
        let err = FullCovarianceDynamics::new(array![[1.0, 0.5], [0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, SsfError::NotSymmetric { row: 0, col: 1 }));
    }

    #[test]
    fn full_rejects_indefinite() {
        let err = FullCovarianceDynamics::new(array![[1.0, 2.0], [2.0, 1.0]]).unwrap_err();
        assert!(matches!(err, SsfError::NotPositiveSemiDefinite { .. }));
    }

    #[test]
    fn full_with_loading_checks_shape() {
        let sigma = array![[1.0, 0.0], [0.0, 1.0]];
        assert!(FullCovarianceDynamics::with_loading(sigma.clone(), Array2::eye(2)).is_ok());
        let err = FullCovarianceDynamics::with_loading(sigma, Array2::zeros((2, 1))).unwrap_err();
        assert!(matches!(err, SsfError::ShapeMismatch { .. }));
    }

    #[test]
    fn no_variant_is_diffuse() {
        let a = ScalarVarianceDynamics::new(2, 1.0).unwrap();
        let b = DiagonalVarianceDynamics::new(&[1.0, 1.0]).unwrap();
        let c = FullCovarianceDynamics::new(Array2::eye(2)).unwrap();
        let all: [&dyn Dynamics; 3] = [&a, &b, &c];
        for d in all {
            assert!(!d.is_diffuse());
            let mut pf0 = Array2::zeros((2, 2));
            assert!(!d.pf0(pf0.view_mut()));
        }
    }

    #[test]
    #[should_panic]
    fn wrongly_sized_buffer_panics() {
        let d = DiagonalVarianceDynamics::new(&[1.0, 1.0, 1.0]).unwrap();
        let mut x = Array1::zeros(2);
        d.add_su(0, x.view_mut(), array![1.0, 1.0, 1.0].view());
    }
}
