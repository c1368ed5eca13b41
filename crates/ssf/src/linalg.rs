//! Small dense linear algebra helpers on top of `ndarray`.
//!
//! Only what the simulation engine and the dynamics constructors need:
//! a tolerance-floored lower Cholesky factorisation for positive
//! semi-definite matrices, in-place lower-triangular products, and a few
//! structural checks.
//!
//! **Not part of the public API.**

use ndarray::{Array2, ArrayView2, ArrayViewMut1};

use crate::error::SsfError;

/// Replaces the lower triangle of `m` by its Cholesky factor `L`
/// (`L·Lᵀ = m`) and clears the strict upper triangle.
///
/// Only the lower triangle of `m` is read. A pivot in `[-eps, eps]` is
/// treated as exactly zero: the whole column of `L` is set to zero and the
/// direction contributes no variance.
///
/// # Errors
///
/// Returns [`SsfError::NotPositiveSemiDefinite`] when a pivot falls
/// below `-eps`.
pub(crate) fn lower_cholesky(m: &mut Array2<f64>, eps: f64) -> Result<(), SsfError> {
    let n = m.nrows();
    debug_assert_eq!(n, m.ncols());

    for j in 0..n {
        let mut d = m[[j, j]];
        for k in 0..j {
            d -= m[[j, k]] * m[[j, k]];
        }

        if d <= eps {
            if d < -eps {
                return Err(SsfError::NotPositiveSemiDefinite { index: j, pivot: d });
            }
            for i in j..n {
                m[[i, j]] = 0.0;
            }
            continue;
        }

        let ljj = d.sqrt();
        m[[j, j]] = ljj;
        for i in (j + 1)..n {
            let mut s = m[[i, j]];
            for k in 0..j {
                s -= m[[i, k]] * m[[j, k]];
            }
            m[[i, j]] = s / ljj;
        }
    }

    for i in 0..n {
        for j in (i + 1)..n {
            m[[i, j]] = 0.0;
        }
    }
    Ok(())
}

/// Overwrites `x` with `L·x` for a lower-triangular `L`.
///
/// Rows are processed bottom-up so that each `x[k]` with `k <= i` is still
/// the original value when row `i` is computed.
pub(crate) fn lower_mul_in_place(l: ArrayView2<'_, f64>, mut x: ArrayViewMut1<'_, f64>) {
    let n = x.len();
    for i in (0..n).rev() {
        let mut s = 0.0;
        for k in 0..=i {
            s += l[[i, k]] * x[k];
        }
        x[i] = s;
    }
}

/// Returns the first `(row, col)` pair where `m` differs from its
/// transpose by more than `tol`, or `None` if it is symmetric.
pub(crate) fn asymmetry(m: ArrayView2<'_, f64>, tol: f64) -> Option<(usize, usize)> {
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if (m[[i, j]] - m[[j, i]]).abs() > tol {
                return Some((i, j));
            }
        }
    }
    None
}

/// Numerical column rank of `b`, from the pivots of a Cholesky
/// factorisation of the Gram matrix `bᵀ·b`.
pub(crate) fn column_rank(b: ArrayView2<'_, f64>) -> usize {
    if b.ncols() == 0 {
        return 0;
    }
    let mut gram = b.t().dot(&b);
    let scale = gram.diag().iter().fold(1.0_f64, |acc, &v| acc.max(v.abs()));
    // A Gram matrix is PSD; a failure here can only come from rounding.
    if lower_cholesky(&mut gram, 1e-10 * scale).is_err() {
        return 0;
    }
    gram.diag().iter().filter(|&&v| v > 0.0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};

    fn reconstruct(l: &Array2<f64>) -> Array2<f64> {
        l.dot(&l.t())
    }

    #[test]
    fn cholesky_identity() {
        let mut m = Array2::eye(3);
        lower_cholesky(&mut m, 1e-9).unwrap();
        assert_eq!(m, Array2::<f64>::eye(3));
    }

    #[test]
    fn cholesky_spd() {
        let sigma = array![[4.0, 2.0, 0.6], [2.0, 2.0, 0.5], [0.6, 0.5, 1.0]];
        let mut l = sigma.clone();
        lower_cholesky(&mut l, 1e-9).unwrap();

        // Upper triangle cleared.
        assert_eq!(l[[0, 1]], 0.0);
        assert_eq!(l[[0, 2]], 0.0);
        assert_eq!(l[[1, 2]], 0.0);

        assert_abs_diff_eq!(l[[0, 0]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l[[1, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l[[1, 1]], 1.0, epsilon = 1e-12);

        let back = reconstruct(&l);
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(back[[i, j]], sigma[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn cholesky_singular_psd_zeroes_column() {
        // Rank-1 matrix: second pivot is exactly zero.
        let sigma = array![[1.0, 1.0], [1.0, 1.0]];
        let mut l = sigma.clone();
        lower_cholesky(&mut l, 1e-9).unwrap();
        assert_abs_diff_eq!(l[[0, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l[[1, 0]], 1.0, epsilon = 1e-12);
        assert_eq!(l[[1, 1]], 0.0);

        let back = reconstruct(&l);
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(back[[i, j]], sigma[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn cholesky_zero_matrix() {
        let mut m = Array2::zeros((3, 3));
        lower_cholesky(&mut m, 1e-8).unwrap();
        assert!(m.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn cholesky_tiny_negative_pivot_is_floored() {
        let mut m = array![[1.0, 0.0], [0.0, -1e-12]];
        lower_cholesky(&mut m, 1e-8).unwrap();
        assert_eq!(m[[1, 1]], 0.0);
    }

    #[test]
    fn cholesky_negative_pivot_fails() {
        let mut m = array![[1.0, 0.0], [0.0, -0.5]];
        let err = lower_cholesky(&mut m, 1e-8).unwrap_err();
        match err {
            SsfError::NotPositiveSemiDefinite { index, pivot } => {
                assert_eq!(index, 1);
                assert_abs_diff_eq!(pivot, -0.5, epsilon = 1e-15);
            }
            other => panic!("expected NotPositiveSemiDefinite, got {other:?}"),
        }
    }

    #[test]
    fn cholesky_indefinite_fails() {
        let mut m = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(matches!(
            lower_cholesky(&mut m, 1e-9),
            Err(SsfError::NotPositiveSemiDefinite { index: 1, .. })
        ));
    }

    #[test]
    fn lower_mul_matches_dot() {
        let l = array![[2.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.3, 0.2, 0.9]];
        let x = array![1.0, -2.0, 0.5];
        let expected = l.dot(&x);

        let mut y: Array1<f64> = x.clone();
        lower_mul_in_place(l.view(), y.view_mut());
        for i in 0..3 {
            assert_abs_diff_eq!(y[i], expected[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn asymmetry_detects_first_pair() {
        let m = array![[1.0, 0.5, 0.0], [0.5, 1.0, 0.2], [0.0, 0.3, 1.0]];
        assert_eq!(asymmetry(m.view(), 1e-12), Some((1, 2)));
        let s = array![[1.0, 0.5], [0.5, 1.0]];
        assert_eq!(asymmetry(s.view(), 1e-12), None);
    }

    #[test]
    fn column_rank_full_and_deficient() {
        let full = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        assert_eq!(column_rank(full.view()), 2);

        let deficient = array![[1.0, 2.0], [2.0, 4.0], [0.0, 0.0]];
        assert_eq!(column_rank(deficient.view()), 1);

        let empty = Array2::<f64>::zeros((3, 0));
        assert_eq!(column_rank(empty.view()), 0);
    }
}
