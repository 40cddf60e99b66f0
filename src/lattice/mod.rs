/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Lattice sums of outgoing spherical waves over a periodic plane
//!
//! For two planes of scatterers separated by `d` the sums
//!
//! ```text
//! L⁺_lm = -8πk i^{l+1} Σ_P h_l(k|d+P|) Y*_lm(d+P) e^{-ik_in·P}
//! L⁻_lm = -8πk i^{l+1} Σ_P (-1)^l h_l(k|d+P|) Y*_lm(d+P) e^{+ik_in·P}
//! ```
//!
//! run over the lattice vectors `P` inside the radius at which the damped
//! Hankel functions fall below `epsilon`. `L⁻` equals `L⁺` evaluated for
//! `-d`, so both come out of one pass over the lattice.
//!
//! The conjugated harmonics make `Σ_L'' i^{l-l'} C(L'', L', L) L⁺_L''` the
//! translation of an outgoing wave `h_l' Y_L'` around the source plane into
//! regular waves `j_l Y_L` around the field point (up to the factor `-2ik`).

pub mod errors;

pub use errors::{LatticeSumError, Result};

use crate::utils::constants::{GEO_TOLERANCE, LARGE_CUTOFF_RADIUS};
use crate::utils::math::{i_pow, lm_count, lm_index, sign_pow, spherical_hankel_h1, spherical_harmonics_of_vector};
use log::{trace, warn};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Lattice sums for `+d` and `-d`, indexed by `lm_index`
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeSums {
    pub plus: Vec<Complex64>,
    pub minus: Vec<Complex64>,
}

/// Radius of the summation disc
///
/// `epsilon < 1` is the amplitude cutoff, giving `-ln ε / Im k`; larger
/// values are taken as the radius itself.
pub fn cutoff_radius(k: Complex64, epsilon: f64) -> Result<f64> {
    if k.im <= 0.0 {
        return Err(LatticeSumError::NoDamping(k.im));
    }
    let r_max = if epsilon < 1.0 {
        -epsilon.ln() / k.im
    } else {
        epsilon
    };
    if r_max > LARGE_CUTOFF_RADIUS {
        warn!(
            "weak damping: Im k = {:.2e}, epsilon = {:.2e} gives a summation radius of {:.1} Bohr",
            k.im, epsilon, r_max
        );
    }
    Ok(r_max)
}

/// Nearest integer, as used for the bounds of the lattice loops
fn nint(x: f64) -> i64 {
    x.round() as i64
}

/// Lattice sums between two planes
///
/// # Arguments
///
/// * `k` - Complex wave number in the crystal (`Im k > 0`)
/// * `k_in` - Parallel wave vector of the Bloch wave
/// * `a1`, `a2` - Real-space basis of the plane lattice (Bohr)
/// * `d` - Vector from the origin of the source plane to the field plane (Bohr)
/// * `l_max` - Highest `l` of the sums
/// * `epsilon` - Amplitude cutoff or summation radius
///
/// # Returns
///
/// [`LatticeSums`] with `(l_max+1)²` entries each. The lattice point at
/// `d + P = 0` is excluded.
pub fn sum_between_layers(
    k: Complex64,
    k_in: [f64; 2],
    a1: [f64; 2],
    a2: [f64; 2],
    d: [f64; 3],
    l_max: usize,
    epsilon: f64,
) -> Result<LatticeSums> {
    let r_max = cutoff_radius(k, epsilon)?;
    let r_max_2 = r_max * r_max;

    let f1 = a1[0] * a1[0] + a1[1] * a1[1];
    let f2 = a2[0] * a2[0] + a2[1] * a2[1];
    let f12 = a1[0] * a2[0] + a1[1] * a2[1];
    let f1d = a1[0] * d[0] + a1[1] * d[1];
    let f2d = a2[0] * d[0] + a2[1] * d[1];
    let fd = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];

    let fa = f12 * f12 - f1 * f2;
    if fa.abs() < GEO_TOLERANCE * GEO_TOLERANCE || f2 <= 0.0 {
        return Err(LatticeSumError::InvalidBasis(format!(
            "({}, {}) and ({}, {}) are parallel",
            a1[0], a1[1], a2[0], a2[1]
        )));
    }

    // Range of n1 for which some n2 lies inside the disc; fa < 0
    let fb = f12 * f2d - f1d * f2;
    let fc = f2d * f2d - f2 * fd + f2 * r_max_2;
    let disc = fb * fb - fa * fc;
    let half_width = if disc > 0.0 { disc.sqrt() / fa } else { 0.0 };
    let center = -fb / fa;
    let n1_min = nint(center + half_width);
    let n1_max = nint(center - half_width);

    let n = lm_count(l_max);
    let mut plus = vec![Complex64::new(0.0, 0.0); n];
    let mut minus = vec![Complex64::new(0.0, 0.0); n];
    let pref: Vec<Complex64> = (0..=l_max)
        .map(|l| -8.0 * PI * k * i_pow(l as i32 + 1))
        .collect();

    let mut n_points = 0usize;
    for n1 in n1_min..=n1_max {
        let n1f = n1 as f64;
        let b = n1f * f12 + f2d;
        let c = f1 * n1f * n1f + 2.0 * f1d * n1f + fd - r_max_2;
        let disc2 = b * b - f2 * c;
        if disc2 < 0.0 {
            continue;
        }
        let root = disc2.sqrt() / f2;
        let n2_min = nint(-b / f2 - root);
        let n2_max = nint(-b / f2 + root);

        for n2 in n2_min..=n2_max {
            let n2f = n2 as f64;
            let p = [n1f * a1[0] + n2f * a2[0], n1f * a1[1] + n2f * a2[1]];
            let r = [d[0] + p[0], d[1] + p[1], d[2]];
            let r2 = r[0] * r[0] + r[1] * r[1] + r[2] * r[2];
            if r2 >= r_max_2 || r2 <= GEO_TOLERANCE {
                continue;
            }
            n_points += 1;

            let r_abs = r2.sqrt();
            let hankel = spherical_hankel_h1(l_max, k * r_abs)?;
            let ylm: Vec<Complex64> = spherical_harmonics_of_vector(l_max, r)
                .into_iter()
                .map(|y| y.conj())
                .collect();
            let phase = Complex64::from_polar(1.0, -(k_in[0] * p[0] + k_in[1] * p[1]));
            let phase_conj = phase.conj();

            for l in 0..=l_max {
                let radial = pref[l] * hankel[l];
                let radial_plus = radial * phase;
                let radial_minus = sign_pow(l as i32) * radial * phase_conj;
                for m in -(l as i32)..=(l as i32) {
                    let idx = lm_index(l, m);
                    plus[idx] += radial_plus * ylm[idx];
                    minus[idx] += radial_minus * ylm[idx];
                }
            }
        }
    }

    trace!(
        "lattice sum over {} points, d = ({:.3}, {:.3}, {:.3}), r_max = {:.2}",
        n_points,
        d[0],
        d[1],
        d[2],
        r_max
    );
    Ok(LatticeSums { plus, minus })
}

/// Lattice sum of a plane onto itself, the origin excluded
pub fn sum_same_layer(
    k: Complex64,
    k_in: [f64; 2],
    a1: [f64; 2],
    a2: [f64; 2],
    l_max: usize,
    epsilon: f64,
) -> Result<Vec<Complex64>> {
    Ok(sum_between_layers(k, k_in, a1, a2, [0.0; 3], l_max, epsilon)?.plus)
}
