/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Matrix inversion
//!
//! Full-pivoting Gauss-Jordan elimination for general complex matrices, and a
//! partitioned (block Schur complement) inverse used for the giant matrix of
//! composite layers, where the leading block holds the atoms of the most
//! populated plane.

use super::errors::{MatrixError, Result};
use super::kernel::Matrix;
use crate::utils::linear_algebra::dense_product;
use ndarray::{s, Array2, ArrayView2};
use num_complex::Complex64;

/// Invert a square complex array by Gauss-Jordan elimination with full pivoting
///
/// # Arguments
///
/// * `a` - Square matrix to invert
///
/// # Returns
///
/// The inverse, or `SingularMatrix` if a pivot falls below the relative
/// threshold `n · ε · max|a_ij|`
pub fn gauss_jordan_inverse(a: ArrayView2<'_, Complex64>) -> Result<Array2<Complex64>> {
    let (n, m) = a.dim();
    if n != m {
        return Err(MatrixError::DimensionMismatch(format!(
            "cannot invert non-square {}x{} matrix",
            n, m
        )));
    }

    let mut work = a.to_owned();
    let scale = work.iter().fold(0.0_f64, |acc, x| acc.max(x.norm()));
    if scale == 0.0 {
        return Err(MatrixError::SingularMatrix("matrix is identically zero".to_string()));
    }
    let threshold = scale * f64::EPSILON * n as f64;

    let mut used = vec![false; n];
    let mut pivot_rows = vec![0usize; n];
    let mut pivot_cols = vec![0usize; n];

    for step in 0..n {
        let mut best = -1.0;
        let mut irow = 0;
        let mut icol = 0;
        for j in 0..n {
            if used[j] {
                continue;
            }
            for k in 0..n {
                if used[k] {
                    continue;
                }
                let value = work[(j, k)].norm();
                if value > best {
                    best = value;
                    irow = j;
                    icol = k;
                }
            }
        }

        used[icol] = true;
        if irow != icol {
            for l in 0..n {
                work.swap((irow, l), (icol, l));
            }
        }
        pivot_rows[step] = irow;
        pivot_cols[step] = icol;

        let pivot = work[(icol, icol)];
        if pivot.norm() <= threshold {
            return Err(MatrixError::SingularMatrix(format!(
                "pivot {:.3e} below threshold {:.3e} at elimination step {}",
                pivot.norm(),
                threshold,
                step + 1
            )));
        }

        let pivot_inv = 1.0 / pivot;
        work[(icol, icol)] = Complex64::new(1.0, 0.0);
        work.row_mut(icol).mapv_inplace(|x| x * pivot_inv);

        let pivot_row = work.row(icol).to_owned();
        for row in 0..n {
            if row == icol {
                continue;
            }
            let factor = work[(row, icol)];
            if factor.norm() == 0.0 {
                continue;
            }
            work[(row, icol)] = Complex64::new(0.0, 0.0);
            for l in 0..n {
                work[(row, l)] -= pivot_row[l] * factor;
            }
        }
    }

    for step in (0..n).rev() {
        let (r, c) = (pivot_rows[step], pivot_cols[step]);
        if r != c {
            for k in 0..n {
                work.swap((k, r), (k, c));
            }
        }
    }

    Ok(work)
}

/// Inverse of a square matrix partitioned after its first `split` rows/columns
///
/// With `M = [[A, B], [C, D]]` and `S = D − C A⁻¹ B`:
///
/// ```text
/// M⁻¹ = [[A⁻¹ + A⁻¹B S⁻¹ C A⁻¹,  −A⁻¹B S⁻¹],
///        [−S⁻¹ C A⁻¹,             S⁻¹     ]]
/// ```
///
/// `split == 0` or `split == n` falls back to the full inverse. The result
/// equals the full inverse within rounding.
pub fn partitioned_inverse(m: &Matrix, split: usize) -> Result<Matrix> {
    let n = m.rows();
    if n != m.cols() {
        return Err(MatrixError::DimensionMismatch(format!(
            "cannot invert non-square {}x{} matrix",
            n,
            m.cols()
        )));
    }
    if split > n {
        return Err(MatrixError::DimensionMismatch(format!(
            "partition boundary {} exceeds matrix order {}",
            split, n
        )));
    }
    if split == 0 || split == n || m.is_diagonal() {
        return m.inverse();
    }

    let full = m.view()?;
    let a = full.slice(s![..split, ..split]);
    let b = full.slice(s![..split, split..]);
    let c = full.slice(s![split.., ..split]);
    let d = full.slice(s![split.., split..]);

    let a_inv = gauss_jordan_inverse(a)?;
    let a_inv_b = dense_product(a_inv.view(), b);
    let c_a_inv = dense_product(c, a_inv.view());
    let schur = &d - &dense_product(c, a_inv_b.view());
    let schur_inv = gauss_jordan_inverse(schur.view())?;

    let top_right = -dense_product(a_inv_b.view(), schur_inv.view());
    let bottom_left = -dense_product(schur_inv.view(), c_a_inv.view());
    let top_left = &a_inv - &dense_product(top_right.view(), c_a_inv.view());

    let mut result = Array2::zeros((n, n));
    result.slice_mut(s![..split, ..split]).assign(&top_left);
    result.slice_mut(s![..split, split..]).assign(&top_right);
    result.slice_mut(s![split.., ..split]).assign(&bottom_left);
    result.slice_mut(s![split.., split..]).assign(&schur_inv);

    Matrix::from_array(result)
}
