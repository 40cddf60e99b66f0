/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Conversion between plane waves and spherical waves around the atoms
//!
//! A layer with atoms at `r_i` and multiple-scattering matrices `τ̃_i`
//! absorbs an incident beam `g` through
//!
//! ```text
//! R[iL, g] = Σ_L' τ̃_i[L, L'] i^{l'} Y*_{L'}(k̂_g) e^{i k_g·r_i}
//! ```
//!
//! and emits the scattered spherical waves into beam `g'` through
//!
//! ```text
//! E[g', jL] = -16π² i / (A k_z(g')) (-i)^l Y_L(k̂_g') e^{-i k_g'·r_j}
//! ```
//!
//! with `k_g = (k_x, k_y, ±k_z)` for waves travelling up (+) or down (-).

use super::errors::Result;
use crate::beams::Beam;
use crate::matrix::{Matrix, NumKind};
use crate::utils::math::{conjugate_harmonics, i_pow, lm_count, lm_index, spherical_harmonics};
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Direction of travel along z
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the vacuum
    Up,
    /// Into the crystal
    Down,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }
}

/// `exp(i k·r)` for a beam travelling in `direction`
pub fn plane_wave_phase(beam: &Beam, direction: Direction, r: [f64; 3]) -> Complex64 {
    let k_par = beam.k_parallel();
    let arg = Complex64::new(k_par[0] * r[0] + k_par[1] * r[1], 0.0)
        + direction.sign() * beam.k_z() * r[2];
    (Complex64::i() * arg).exp()
}

/// Spherical harmonics in the direction of the beam's wave vector
fn beam_harmonics(beam: &Beam, direction: Direction, l_max: usize) -> Vec<Complex64> {
    spherical_harmonics(
        l_max,
        direction.sign() * beam.cos_theta,
        beam.sin_theta(),
        beam.phi,
    )
}

/// Matrix taking incident beam amplitudes to spherical-wave amplitudes
///
/// # Arguments
///
/// * `taus` - Multiple-scattering matrices of the Bravais planes
/// * `positions` - Atom positions in layer coordinates (Bohr)
/// * `beams` - Beams of one Bloch class
/// * `l_max` - Angular momentum cutoff of `taus`
/// * `direction` - Direction of travel of the incident beams
///
/// # Returns
///
/// A `(n_atoms·(l_max+1)²) x n_beams` matrix
pub fn incidence_matrix(
    taus: &[Matrix],
    positions: &[[f64; 3]],
    beams: &[Beam],
    l_max: usize,
    direction: Direction,
) -> Result<Matrix> {
    let n = lm_count(l_max);
    let expansions: Vec<Vec<Complex64>> = beams
        .iter()
        .map(|beam| {
            let ylm = beam_harmonics(beam, direction, l_max);
            let ystar = conjugate_harmonics(&ylm, l_max);
            (0..=l_max)
                .flat_map(|l| (-(l as i32)..=(l as i32)).map(move |m| (l, m)))
                .map(|(l, m)| i_pow(l as i32) * ystar[lm_index(l, m)])
                .collect()
        })
        .collect();

    let mut result = Matrix::zeros(taus.len() * n, beams.len(), NumKind::Complex)?;
    for (atom, (tau, r)) in taus.iter().zip(positions.iter()).enumerate() {
        let waves = Array2::from_shape_fn((n, beams.len()), |(lm, g)| {
            expansions[g][lm] * plane_wave_phase(&beams[g], direction, *r)
        });
        let block = Matrix::multiply(tau, &Matrix::from_array(waves)?)?;
        result.insert(&block, atom * n + 1, 1)?;
    }
    Ok(result)
}

/// Matrix taking spherical-wave amplitudes to outgoing beam amplitudes
///
/// # Arguments
///
/// * `positions` - Atom positions in layer coordinates (Bohr)
/// * `beams` - Beams of one Bloch class
/// * `l_max` - Angular momentum cutoff
/// * `rel_area` - Layer cell area relative to the 1x1 cell
/// * `direction` - Direction of travel of the outgoing beams
///
/// # Returns
///
/// A `n_beams x (n_atoms·(l_max+1)²)` matrix
pub fn emission_matrix(
    positions: &[[f64; 3]],
    beams: &[Beam],
    l_max: usize,
    rel_area: f64,
    direction: Direction,
) -> Result<Matrix> {
    let n = lm_count(l_max);
    let mut data = Array2::<Complex64>::zeros((beams.len(), positions.len() * n));
    let pref = Complex64::new(0.0, -16.0 * PI * PI / rel_area);

    for (g, beam) in beams.iter().enumerate() {
        let ylm = beam_harmonics(beam, direction, l_max);
        let beam_pref = pref * beam.akz;
        for (atom, r) in positions.iter().enumerate() {
            let phase = plane_wave_phase(beam, direction, *r).inv();
            for l in 0..=l_max {
                let factor = beam_pref * i_pow(-(l as i32)) * phase;
                for m in -(l as i32)..=(l as i32) {
                    let lm = lm_index(l, m);
                    data[(g, atom * n + lm)] = factor * ylm[lm];
                }
            }
        }
    }
    Ok(Matrix::from_array(data)?)
}
