/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Non-diagonal temperature-dependent t-matrix from the cumulant expansion
//!
//! Anisotropic vibrations couple different (l, m) channels. The thermally
//! averaged t-matrix is accumulated from the series
//!
//! ```text
//! T_0 = diag(-t_l / κ)
//! T_n = -κ²/n · Σ_a u_a² (M_a M_a T_{n-1} + T_{n-1} M_a M_a - 2 M_a T_{n-1} M_a)
//! ```
//!
//! where `M_a` are the matrices of the direction cosines `x/r`, `y/r`, `z/r`
//! in the spherical-harmonic basis.

use super::errors::{PhaseError, Result};
use crate::matrix::{Matrix, NumKind};
use crate::utils::constants::GEO_TOLERANCE;
use crate::utils::math::{lm_count, lm_index};
use log::{debug, trace, warn};
use ndarray::Array2;
use num_complex::Complex64;

/// Iteration limit of the series
const MAX_ITERATIONS: usize = 1000;

/// Convergence threshold per squared matrix element count
const CONVERGENCE: f64 = 1.0e-6;

/// Elements below this fraction of the largest accumulated element are
/// left out of the relative change
///
/// Skipping only exact zeros is not enough: elements that vanish by symmetry
/// pick up rounding residue of order 1e-17 in the operator products, and the
/// ratio of two such residues never settles below the convergence threshold.
const NEGLIGIBLE: f64 = 1.0e-12;

/// Direction-cosine operators for one angular momentum cutoff
#[derive(Debug, Clone)]
pub struct CouplingOperators {
    pub l_max: usize,
    pub mx: Matrix,
    pub my: Matrix,
    pub mz: Matrix,
    pub mxmx: Matrix,
    pub mymy: Matrix,
    pub mzmz: Matrix,
}

impl CouplingOperators {
    /// Build the operators for channels up to `l_max`
    pub fn new(l_max: usize) -> Result<Self> {
        let n = lm_count(l_max);
        let mut raise = Array2::<f64>::zeros((n, n));
        let mut mz = Array2::<f64>::zeros((n, n));

        for l in 0..=l_max {
            let lf = l as f64;
            for m in -(l as i32)..=(l as i32) {
                let mf = m as f64;
                let col = lm_index(l, m);
                if l < l_max {
                    let a = (((lf + 1.0).powi(2) - mf * mf) / ((2.0 * lf + 1.0) * (2.0 * lf + 3.0))).sqrt();
                    mz[(lm_index(l + 1, m), col)] = a;
                    mz[(col, lm_index(l + 1, m))] = a;
                    raise[(lm_index(l + 1, m + 1), col)] = -((lf + mf + 1.0) * (lf + mf + 2.0)
                        / ((2.0 * lf + 1.0) * (2.0 * lf + 3.0)))
                        .sqrt();
                }
                if l >= 1 && (m + 1).abs() < l as i32 {
                    raise[(lm_index(l - 1, m + 1), col)] = ((lf - mf) * (lf - mf - 1.0)
                        / ((2.0 * lf - 1.0) * (2.0 * lf + 1.0)))
                        .sqrt();
                }
            }
        }

        let lower = raise.t().to_owned();
        let mx_data = (&raise + &lower).mapv(|x| Complex64::new(0.5 * x, 0.0));
        let my_data = (&raise - &lower).mapv(|x| Complex64::new(0.0, -0.5 * x));

        let mx = Matrix::from_array(mx_data)?;
        let my = Matrix::from_array(my_data)?;
        let mz = Matrix::from_real(&mz)?;
        let mxmx = Matrix::multiply(&mx, &mx)?;
        let mymy = Matrix::multiply(&my, &my)?;
        let mzmz = Matrix::multiply(&mz, &mz)?;

        Ok(Self {
            l_max,
            mx,
            my,
            mz,
            mxmx,
            mymy,
            mzmz,
        })
    }
}

/// Operators kept between energies; rebuilt when `l_max` changes
#[derive(Debug, Clone, Default)]
pub struct CumulantCache {
    operators: Option<CouplingOperators>,
}

impl CumulantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operators for `l_max`, building them on first use
    pub fn operators(&mut self, l_max: usize) -> Result<&CouplingOperators> {
        let stale = self.operators.as_ref().map_or(true, |ops| ops.l_max != l_max);
        if stale {
            debug!("building direction-cosine operators for l_max = {}", l_max);
            self.operators = Some(CouplingOperators::new(l_max)?);
        }
        self.operators
            .as_ref()
            .ok_or_else(|| PhaseError::InvalidMatrixKind("operator cache is empty".to_string()))
    }
}

/// One thermal term `u² (M M T + T M M - 2 M T M)`
fn thermal_term(t: &Matrix, m: &Matrix, mm: &Matrix, u2: f64) -> Result<Matrix> {
    let left = Matrix::multiply(mm, t)?;
    let right = Matrix::multiply(t, mm)?;
    let sandwich = Matrix::multiply(m, &Matrix::multiply(t, m)?)?;
    Ok(left
        .add(&right)?
        .sub(&sandwich.scale(Complex64::new(2.0, 0.0)))?
        .scale(Complex64::new(u2, 0.0)))
}

/// Summed relative change of real and imaginary parts
///
/// Sums `|Δ/acc|` over the elements of `acc` whose part exceeds
/// `NEGLIGIBLE` times the largest element of `acc`.
fn relative_change(step: &Matrix, acc: &Matrix) -> (f64, f64) {
    let floor = NEGLIGIBLE * acc.max_abs();
    let mut rel_r = 0.0;
    let mut rel_i = 0.0;
    for (d, a) in step.data().iter().zip(acc.data().iter()) {
        if a.norm() <= floor {
            continue;
        }
        if a.re.abs() > floor {
            rel_r += (d.re / a.re).abs();
        }
        if a.im.abs() > floor {
            rel_i += (d.im / a.im).abs();
        }
    }
    (rel_r, rel_i)
}

/// Temperature-dependent non-diagonal t-matrix
///
/// # Arguments
///
/// * `amplitudes` - `t_l = sin δ_l e^{iδ_l}` for `l = 0..=l_max_0`
/// * `ux`, `uy`, `uz` - Root-mean-square displacements (Bohr)
/// * `energy` - Real part of the crystal energy (Hartree)
/// * `l_max` - Angular momentum cutoff of the result
/// * `cache` - Direction-cosine operators
///
/// # Returns
///
/// The `(l_max+1)² x (l_max+1)²` matrix in the same normalisation as the
/// diagonal `t_l`. Amplitudes beyond `l_max` are dropped with a warning.
pub fn cumulant_t_matrix(
    amplitudes: &[Complex64],
    ux: f64,
    uy: f64,
    uz: f64,
    energy: f64,
    l_max: usize,
    cache: &mut CumulantCache,
) -> Result<Matrix> {
    let n = lm_count(l_max);
    let kappa = (2.0 * energy).sqrt();
    let l_max_0 = amplitudes.len().saturating_sub(1);
    if l_max_0 > l_max {
        warn!(
            "phase shifts up to l = {} truncated to l_max = {}",
            l_max_0, l_max
        );
    }

    let mut t0 = Matrix::zeros(n, n, NumKind::Complex)?;
    for (l, t_l) in amplitudes.iter().enumerate().take(l_max + 1) {
        for m in -(l as i32)..=(l as i32) {
            let i = lm_index(l, m) + 1;
            t0.set(i, i, -t_l / kappa)?;
        }
    }

    let back_scale = Complex64::new(-kappa, 0.0);
    if ux < GEO_TOLERANCE && uy < GEO_TOLERANCE && uz < GEO_TOLERANCE {
        debug!("all displacements vanish; returning the static t-matrix");
        return Ok(t0.scale(back_scale));
    }

    let ops = cache.operators(l_max)?;
    let threshold = CONVERGENCE * (n * n) as f64;
    let mut t_n = t0.clone();
    let mut acc = t0;
    let mut relerr = f64::INFINITY;

    for iteration in 1..MAX_ITERATIONS {
        let pref = Complex64::new(-kappa * kappa / iteration as f64, 0.0);
        let sum = thermal_term(&t_n, &ops.mx, &ops.mxmx, ux * ux)?
            .add(&thermal_term(&t_n, &ops.my, &ops.mymy, uy * uy)?)?
            .add(&thermal_term(&t_n, &ops.mz, &ops.mzmz, uz * uz)?)?;
        t_n = sum.scale(pref);
        acc = acc.add(&t_n)?;

        let (rel_r, rel_i) = relative_change(&t_n, &acc);
        trace!(
            "cumulant iteration {}: relative change ({:.3e}, {:.3e})",
            iteration,
            rel_r,
            rel_i
        );
        if rel_r <= threshold && rel_i <= threshold {
            debug!("cumulant series converged after {} iterations", iteration);
            return Ok(acc.scale(back_scale));
        }
        relerr = rel_r.max(rel_i);
    }

    Err(PhaseError::NonConvergence {
        iterations: MAX_ITERATIONS,
        relerr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relative_change_skips_rounding_residue() {
        let c = |re: f64, im: f64| Complex64::new(re, im);
        let acc = Matrix::from_array(ndarray::arr2(&[
            [c(2.0, -1.0), c(1e-17, 0.0)],
            [c(0.0, 0.0), c(0.5, 4.0)],
        ]))
        .unwrap();
        let step = Matrix::from_array(ndarray::arr2(&[
            [c(0.02, 0.01), c(1e-17, 0.0)],
            [c(0.3, 0.3), c(-0.005, 0.0)],
        ]))
        .unwrap();
        let (rel_r, rel_i) = relative_change(&step, &acc);
        assert_relative_eq!(rel_r, 0.01 + 0.01, epsilon = 1e-12);
        assert_relative_eq!(rel_i, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_direction_cosines_square_to_one() {
        let l_max = 4;
        let ops = CouplingOperators::new(l_max).unwrap();
        let sum = ops.mxmx.add(&ops.mymy).unwrap().add(&ops.mzmz).unwrap();
        let inner = lm_count(l_max - 1);
        for i in 1..=inner {
            for j in 1..=inner {
                let expected = if i == j { 1.0 } else { 0.0 };
                let v = sum.get(i, j).unwrap();
                assert_relative_eq!(v.re, expected, epsilon = 1e-12);
                assert_relative_eq!(v.im, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_zero_displacement_returns_diagonal() {
        let t = [Complex64::new(0.3, 0.1), Complex64::new(-0.2, 0.05)];
        let mut cache = CumulantCache::new();
        let m = cumulant_t_matrix(&t, 0.0, 0.0, 0.0, 3.0, 2, &mut cache).unwrap();
        assert_eq!(m.rows(), 9);
        assert_relative_eq!(m.get(1, 1).unwrap().re, 0.3, epsilon = 1e-14);
        assert_relative_eq!(m.get(3, 3).unwrap().im, 0.05, epsilon = 1e-14);
        assert_eq!(m.get(5, 5).unwrap(), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_isotropic_vibration_keeps_m_symmetry() {
        let t = [
            Complex64::new(0.4, 0.2),
            Complex64::new(0.3, 0.1),
            Complex64::new(0.1, 0.02),
        ];
        let mut cache = CumulantCache::new();
        let u = 0.1;
        let m = cumulant_t_matrix(&t, u, u, u, 2.0, 3, &mut cache).unwrap();
        // Isotropic damping does not mix different (l, m) pairs
        let d = m.dense_array();
        for i in 0..16 {
            for j in 0..16 {
                if i != j {
                    assert!(d[(i, j)].norm() < 1e-8, "({}, {}) = {}", i, j, d[(i, j)]);
                }
            }
        }
        // and damps every l uniformly in m
        for m_val in -1..=1 {
            let v = d[(lm_index(1, m_val), lm_index(1, m_val))];
            assert_relative_eq!(v.re, d[(2, 2)].re, epsilon = 1e-10);
            assert_relative_eq!(v.im, d[(2, 2)].im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_cache_rebuilds_on_new_l_max() {
        let mut cache = CumulantCache::new();
        assert_eq!(cache.operators(2).unwrap().mx.rows(), 9);
        assert_eq!(cache.operators(3).unwrap().mx.rows(), 16);
    }
}
