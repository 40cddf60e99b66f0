/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Angular-momentum propagators between periodic planes and the
//! multiple-scattering matrix of a single Bravais plane

use super::errors::{LayerError, Result};
use crate::matrix::{Matrix, MatrixError};
use crate::utils::math::{gaunt, i_pow, lm_count, lm_index};
use log::debug;
use num_complex::Complex64;

#[derive(Debug, Clone, Copy)]
struct GauntEntry {
    row: usize,
    col: usize,
    lsum: usize,
    coeff: Complex64,
}

/// Non-zero coupling coefficients `i^{l-l'} C(L'', L', L)` up to `l_max`
///
/// The propagator between two planes is
/// `G_{LL'} = Σ_{L''} i^{l-l'} C(L'', L', L) Λ_{L''}` where `Λ` is a
/// lattice sum up to `2 l_max`.
#[derive(Debug, Clone)]
pub struct GauntTable {
    l_max: usize,
    entries: Vec<GauntEntry>,
}

impl GauntTable {
    pub fn new(l_max: usize) -> Self {
        let mut entries = Vec::new();
        for l in 0..=l_max as i32 {
            for m in -l..=l {
                for lp in 0..=l_max as i32 {
                    for mp in -lp..=lp {
                        let mpp = m - mp;
                        let phase = i_pow(l - lp);
                        let mut lpp = (l - lp).abs();
                        while lpp <= l + lp {
                            if mpp.abs() <= lpp {
                                let c = gaunt(lpp, mpp, lp, mp, l, m);
                                if c != 0.0 {
                                    entries.push(GauntEntry {
                                        row: lm_index(l as usize, m),
                                        col: lm_index(lp as usize, mp),
                                        lsum: lm_index(lpp as usize, mpp),
                                        coeff: phase * c,
                                    });
                                }
                            }
                            lpp += 2;
                        }
                    }
                }
            }
        }
        debug!("{} coupling coefficients for l_max = {}", entries.len(), l_max);
        Self { l_max, entries }
    }

    pub fn l_max(&self) -> usize {
        self.l_max
    }

    /// Highest `l` the lattice sums must reach
    pub fn lattice_sum_l_max(&self) -> usize {
        2 * self.l_max
    }

    /// Propagator matrix from a lattice sum
    pub fn propagator(&self, lattice_sum: &[Complex64]) -> Result<Matrix> {
        let needed = lm_count(self.lattice_sum_l_max());
        if lattice_sum.len() < needed {
            return Err(MatrixError::DimensionMismatch(format!(
                "lattice sum has {} entries, propagator needs {}",
                lattice_sum.len(),
                needed
            ))
            .into());
        }
        let n = lm_count(self.l_max);
        let mut data = ndarray::Array2::<Complex64>::zeros((n, n));
        for e in &self.entries {
            data[(e.row, e.col)] += e.coeff * lattice_sum[e.lsum];
        }
        Ok(Matrix::from_array(data)?)
    }
}

/// Largest diagonal modulus of the `l` block of a t-matrix
pub fn l_amplitude(t: &Matrix, l: usize) -> f64 {
    let diag = t.diagonal_values();
    (lm_index(l, -(l as i32))..=lm_index(l, l as i32))
        .filter_map(|i| diag.get(i))
        .fold(0.0, |acc, v| acc.max(v.norm()))
}

/// Restrict a t-matrix to channels `l ≤ l_max`
pub fn truncate_t_matrix(t: &Matrix, l_max: usize) -> Result<Matrix> {
    let n = lm_count(l_max);
    if t.rows() == n {
        return Ok(t.clone());
    }
    if t.rows() < n {
        return Err(MatrixError::DimensionMismatch(format!(
            "cannot truncate {}x{} t-matrix to {} channels",
            t.rows(),
            t.cols(),
            n
        ))
        .into());
    }
    if t.is_diagonal() {
        Ok(Matrix::diagonal(&t.diagonal_values()[..n])?)
    } else {
        Ok(t.extract(1, 1, n, n)?)
    }
}

/// Scattering matrix of one atom in the normalisation of the propagators,
/// `t̃ = -t / (2k)`
pub fn reduced_t_matrix(t: &Matrix, k: Complex64) -> Matrix {
    t.scale(-1.0 / (2.0 * k))
}

/// Multiple-scattering matrix of a Bravais plane, `τ̃ = (I - t̃ G)⁻¹ t̃`
///
/// # Arguments
///
/// * `t_reduced` - Reduced t-matrix of the atom, see [`reduced_t_matrix`]
/// * `in_plane` - Propagator of the plane onto itself
pub fn bravais_tau(t_reduced: &Matrix, in_plane: &Matrix) -> Result<Matrix> {
    if t_reduced.rows() != in_plane.rows() {
        return Err(LayerError::Matrix(MatrixError::DimensionMismatch(format!(
            "t-matrix of order {} against propagator of order {}",
            t_reduced.rows(),
            in_plane.rows()
        ))));
    }
    let tg = Matrix::multiply(t_reduced, in_plane)?;
    let kernel = Matrix::identity(tg.rows())?.sub(&tg)?;
    let inverse = kernel.inverse()?;
    Ok(Matrix::multiply(&inverse, t_reduced)?)
}
