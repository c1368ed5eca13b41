//! The measurement contract of a univariate state-space model.
//!
//! ```text
//! y[t] = Z(t) · a[t] + e[t],    e[t] ~ N(0, h(t))
//! ```

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};

use crate::error::SsfError;

/// Law mapping the hidden state to one observed value per period.
pub trait Measurement: Send + Sync {
    /// Length of the loading `Z`, which must equal the state dimension of
    /// the paired dynamics.
    fn state_dim(&self) -> usize;

    /// Whether `Z(t)` and `h(t)` do not depend on `t`.
    fn is_time_invariant(&self) -> bool;

    /// Fills `z` with the loading `Z(pos)`.
    fn z(&self, pos: usize, z: ArrayViewMut1<'_, f64>);

    /// Returns `Z(pos)·x`.
    fn zx(&self, pos: usize, x: ArrayView1<'_, f64>) -> f64;

    /// Returns `Z(pos)·V·Z(pos)ᵀ`.
    fn zvz(&self, pos: usize, v: ArrayView2<'_, f64>) -> f64;

    /// `V += d·Z(pos)ᵀ·Z(pos)`.
    fn vpzdz(&self, pos: usize, v: ArrayViewMut2<'_, f64>, d: f64);

    /// `x += d·Z(pos)`.
    fn xpzd(&self, pos: usize, x: ArrayViewMut1<'_, f64>, d: f64);

    /// Variance `h(pos) >= 0` of the measurement error.
    fn error_variance(&self, pos: usize) -> f64;

    /// Whether the measurement at `pos` carries an error.
    fn has_error(&self, pos: usize) -> bool {
        self.error_variance(pos) > 0.0
    }

    /// Whether any period carries a measurement error.
    fn has_errors(&self) -> bool;
}

/// Variance of the measurement error of a [`LoadingMeasurement`].
#[derive(Clone, Debug, PartialEq)]
enum ErrorVariance {
    None,
    Constant(f64),
    /// One value per period; the last one holds past the end.
    Varying(Vec<f64>),
}

/// Fixed loading vector with an optional additive error.
///
/// # Example
///
/// ```
/// use ssfsim_ssf::{LoadingMeasurement, Measurement};
/// use ndarray::array;
///
/// let m = LoadingMeasurement::new(&[1.0, 0.0, 1.0])
///     .with_error_variance(0.25)
///     .unwrap();
/// assert_eq!(m.state_dim(), 3);
/// assert_eq!(m.zx(0, array![2.0, 9.0, 3.0].view()), 5.0);
/// assert!(m.has_errors());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LoadingMeasurement {
    z: Array1<f64>,
    error: ErrorVariance,
}

impl LoadingMeasurement {
    /// Creates an error-free measurement with loading `z`.
    pub fn new(z: &[f64]) -> Self {
        Self {
            z: Array1::from(z.to_vec()),
            error: ErrorVariance::None,
        }
    }

    /// Sets a constant measurement-error variance.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidVariance`] if `var` is negative or
    /// non-finite.
    pub fn with_error_variance(mut self, var: f64) -> Result<Self, SsfError> {
        if !var.is_finite() || var < 0.0 {
            return Err(SsfError::InvalidVariance {
                index: 0,
                value: var,
            });
        }
        self.error = if var > 0.0 {
            ErrorVariance::Constant(var)
        } else {
            ErrorVariance::None
        };
        Ok(self)
    }

    /// Sets one measurement-error variance per period. Periods past the
    /// end of `vars` reuse its last value.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidVariance`] for the first negative or
    /// non-finite entry.
    pub fn with_error_variances(mut self, vars: Vec<f64>) -> Result<Self, SsfError> {
        if let Some((index, &value)) = vars
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(SsfError::InvalidVariance { index, value });
        }
        self.error = if vars.iter().any(|&v| v > 0.0) {
            ErrorVariance::Varying(vars)
        } else {
            ErrorVariance::None
        };
        Ok(self)
    }

    /// Returns the loading vector.
    pub fn loading(&self) -> ArrayView1<'_, f64> {
        self.z.view()
    }
}

impl Measurement for LoadingMeasurement {
    fn state_dim(&self) -> usize {
        self.z.len()
    }

    fn is_time_invariant(&self) -> bool {
        !matches!(self.error, ErrorVariance::Varying(_))
    }

    fn z(&self, _pos: usize, mut z: ArrayViewMut1<'_, f64>) {
        z.assign(&self.z);
    }

    fn zx(&self, _pos: usize, x: ArrayView1<'_, f64>) -> f64 {
        self.z.dot(&x)
    }

    fn zvz(&self, _pos: usize, v: ArrayView2<'_, f64>) -> f64 {
        self.z.dot(&v.dot(&self.z))
    }

    fn vpzdz(&self, _pos: usize, mut v: ArrayViewMut2<'_, f64>, d: f64) {
        let n = self.z.len();
        for i in 0..n {
            let zi = self.z[i] * d;
            if zi == 0.0 {
                continue;
            }
            for j in 0..n {
                v[[i, j]] += zi * self.z[j];
            }
        }
    }

    fn xpzd(&self, _pos: usize, x: ArrayViewMut1<'_, f64>, d: f64) {
        Zip::from(x).and(&self.z).for_each(|xi, &zi| *xi += d * zi);
    }

    fn error_variance(&self, pos: usize) -> f64 {
        match &self.error {
            ErrorVariance::None => 0.0,
            ErrorVariance::Constant(v) => *v,
            ErrorVariance::Varying(vs) => vs.get(pos).or(vs.last()).copied().unwrap_or(0.0),
        }
    }

    fn has_errors(&self) -> bool {
        !matches!(self.error, ErrorVariance::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    #[test]
    fn loading_and_zx() {
        let m = LoadingMeasurement::new(&[1.0, 2.0]);
        assert_eq!(m.state_dim(), 2);
        assert!(m.is_time_invariant());

        let mut z = Array1::zeros(2);
        m.z(3, z.view_mut());
        assert_eq!(z, array![1.0, 2.0]);
        assert_eq!(m.zx(0, array![3.0, -1.0].view()), 1.0);
    }

    #[test]
    fn zvz_and_vpzdz_agree() {
        let m = LoadingMeasurement::new(&[1.0, 0.5, 0.0]);
        let v = array![[2.0, 0.3, 0.1], [0.3, 1.0, 0.2], [0.1, 0.2, 4.0]];
        // z V z' = 2 + 2*0.5*0.3 + 0.25*1 = 2.55
        assert_abs_diff_eq!(m.zvz(0, v.view()), 2.55, epsilon = 1e-12);

        let mut w = Array2::zeros((3, 3));
        m.vpzdz(0, w.view_mut(), 2.0);
        assert_abs_diff_eq!(w[[0, 0]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[[0, 1]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[[1, 1]], 0.5, epsilon = 1e-12);
        assert_eq!(w[[2, 2]], 0.0);
    }

    #[test]
    fn xpzd_adds_scaled_loading() {
        let m = LoadingMeasurement::new(&[1.0, -1.0]);
        let mut x = array![0.5, 0.5];
        m.xpzd(0, x.view_mut(), 2.0);
        assert_eq!(x, array![2.5, -1.5]);
    }

    #[test]
    fn no_error_by_default() {
        let m = LoadingMeasurement::new(&[1.0]);
        assert!(!m.has_errors());
        assert!(!m.has_error(0));
        assert_eq!(m.error_variance(10), 0.0);
    }

    #[test]
    fn constant_error_variance() {
        let m = LoadingMeasurement::new(&[1.0]).with_error_variance(0.5).unwrap();
        assert!(m.has_errors());
        assert!(m.has_error(7));
        assert_eq!(m.error_variance(0), 0.5);
        assert_eq!(m.error_variance(1000), 0.5);
    }

    #[test]
    fn zero_error_variance_means_no_errors() {
        let m = LoadingMeasurement::new(&[1.0]).with_error_variance(0.0).unwrap();
        assert!(!m.has_errors());
    }

    #[test]
    fn varying_error_variance_holds_last_value() {
        let m = LoadingMeasurement::new(&[1.0])
            .with_error_variances(vec![1.0, 0.0, 3.0])
            .unwrap();
        assert!(m.has_errors());
        assert!(!m.is_time_invariant());
        assert_eq!(m.error_variance(0), 1.0);
        assert!(!m.has_error(1));
        assert_eq!(m.error_variance(2), 3.0);
        assert_eq!(m.error_variance(50), 3.0);
    }

    #[test]
    fn rejects_negative_variance() {
        let err = LoadingMeasurement::new(&[1.0])
            .with_error_variance(-0.1)
            .unwrap_err();
        assert!(matches!(err, SsfError::InvalidVariance { index: 0, .. }));

        let err = LoadingMeasurement::new(&[1.0])
            .with_error_variances(vec![0.1, f64::INFINITY])
            .unwrap_err();
        assert!(matches!(err, SsfError::InvalidVariance { index: 1, .. }));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LoadingMeasurement>();
    }
}
