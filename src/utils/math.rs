/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Special functions for the multiple-scattering engine
//!
//! Spherical Hankel functions and spherical harmonics are needed for complex
//! arguments: the electron wave number carries the imaginary optical potential,
//! and evanescent beams have complex polar angles. Angular momentum channels
//! are stored in natural order, `index = l(l+1) + m`.

#![allow(clippy::needless_range_loop)]

use super::errors::{Result, UtilsError};
use num_complex::Complex64;
use once_cell::sync::Lazy;
use std::f64::consts::PI;

/// Largest argument of the factorial table (170! is the largest finite f64 factorial)
const MAX_FACTORIAL: usize = 170;

static FACTORIALS: Lazy<Vec<f64>> = Lazy::new(|| {
    let mut table = Vec::with_capacity(MAX_FACTORIAL + 1);
    let mut value = 1.0;
    table.push(value);
    for n in 1..=MAX_FACTORIAL {
        value *= n as f64;
        table.push(value);
    }
    table
});

/// Factorial n! as a floating point number
///
/// # Panics
///
/// Never for the arguments used by the angular momentum algebra (n ≤ 170).
/// Larger arguments saturate to infinity.
pub fn factorial(n: usize) -> f64 {
    if n > MAX_FACTORIAL {
        return f64::INFINITY;
    }
    FACTORIALS[n]
}

/// Natural-order index of the (l, m) channel
#[inline]
pub fn lm_index(l: usize, m: i32) -> usize {
    ((l * (l + 1)) as i64 + m as i64) as usize
}

/// Number of (l, m) channels up to and including `l_max`
#[inline]
pub fn lm_count(l_max: usize) -> usize {
    (l_max + 1) * (l_max + 1)
}

/// Integer power of the imaginary unit
#[inline]
pub fn i_pow(n: i32) -> Complex64 {
    match n.rem_euclid(4) {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// (-1)^n as a float
#[inline]
pub fn sign_pow(n: i32) -> f64 {
    if n.rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Square root on the branch with non-negative imaginary part
///
/// Wave numbers of damped or evanescent waves must decay into the crystal,
/// so the root is taken with `Im ≥ 0`.
pub fn damped_sqrt(z: Complex64) -> Complex64 {
    let root = z.sqrt();
    if root.im < 0.0 {
        -root
    } else {
        root
    }
}

fn triangle(j1: i32, j2: i32, j3: i32) -> bool {
    j3 >= (j1 - j2).abs() && j3 <= j1 + j2
}

/// Wigner 3j symbol (j1 j2 j3; m1 m2 m3) for integer angular momenta
///
/// Evaluated with the Racah formula. Returns zero whenever a selection rule
/// is violated.
pub fn wigner_3j(j1: i32, j2: i32, j3: i32, m1: i32, m2: i32, m3: i32) -> f64 {
    if m1 + m2 + m3 != 0 || !triangle(j1, j2, j3) {
        return 0.0;
    }
    if m1.abs() > j1 || m2.abs() > j2 || m3.abs() > j3 {
        return 0.0;
    }
    if m1 == 0 && m2 == 0 && m3 == 0 && (j1 + j2 + j3) % 2 != 0 {
        return 0.0;
    }

    let f = |n: i32| factorial(n as usize);

    let delta = (f(j1 + j2 - j3) * f(j1 - j2 + j3) * f(-j1 + j2 + j3) / f(j1 + j2 + j3 + 1)).sqrt();
    let norm = (f(j1 + m1) * f(j1 - m1) * f(j2 + m2) * f(j2 - m2) * f(j3 + m3) * f(j3 - m3)).sqrt();

    let k_min = 0.max(j2 - j3 - m1).max(j1 - j3 + m2);
    let k_max = (j1 + j2 - j3).min(j1 - m1).min(j2 + m2);

    let mut sum = 0.0;
    for k in k_min..=k_max {
        let denom = f(k)
            * f(j1 + j2 - j3 - k)
            * f(j1 - m1 - k)
            * f(j2 + m2 - k)
            * f(j3 - j2 + m1 + k)
            * f(j3 - j1 - m2 + k);
        sum += sign_pow(k) / denom;
    }

    sign_pow(j1 - j2 - m3) * delta * norm * sum
}

/// Gaunt coefficient `∫ Y_{l1 m1} Y_{l2 m2} Y*_{l3 m3} dΩ`
pub fn gaunt(l1: i32, m1: i32, l2: i32, m2: i32, l3: i32, m3: i32) -> f64 {
    if m1 + m2 != m3 || (l1 + l2 + l3) % 2 != 0 || !triangle(l1, l2, l3) {
        return 0.0;
    }
    let norm = (((2 * l1 + 1) * (2 * l2 + 1) * (2 * l3 + 1)) as f64 / (4.0 * PI)).sqrt();
    sign_pow(m3) * norm * wigner_3j(l1, l2, l3, 0, 0, 0) * wigner_3j(l1, l2, l3, m1, m2, -m3)
}

/// Spherical Hankel functions of the first kind `h_l(z)` for `l = 0..=l_max`
///
/// Upward recurrence from `h_0(z) = -i e^{iz}/z`, stable for outgoing waves.
///
/// # Arguments
///
/// * `l_max` - Highest order required
/// * `z` - Complex argument, must be non-zero
///
/// # Returns
///
/// Vector of length `l_max + 1`
pub fn spherical_hankel_h1(l_max: usize, z: Complex64) -> Result<Vec<Complex64>> {
    if z.norm() < f64::MIN_POSITIVE.sqrt() {
        return Err(UtilsError::Math(format!(
            "Spherical Hankel function undefined at z = {}",
            z
        )));
    }

    let i = Complex64::i();
    let exp_iz = (i * z).exp();
    let z_inv = 1.0 / z;

    let mut h = Vec::with_capacity(l_max + 1);
    h.push(-i * exp_iz * z_inv);
    if l_max >= 1 {
        h.push(-exp_iz * z_inv * (1.0 + i * z_inv));
    }
    for l in 1..l_max {
        let next = (2 * l + 1) as f64 * z_inv * h[l] - h[l - 1];
        h.push(next);
    }
    Ok(h)
}

/// Spherical harmonics `Y_lm` for all `l ≤ l_max` in natural order
///
/// The polar angle enters through `cos θ` and `sin θ`, both of which may be
/// complex; the result is the holomorphic continuation of the Condon-Shortley
/// harmonics. `φ` is real.
pub fn spherical_harmonics(
    l_max: usize,
    cos_theta: Complex64,
    sin_theta: Complex64,
    phi: f64,
) -> Vec<Complex64> {
    let n = lm_count(l_max);
    let mut ylm = vec![Complex64::new(0.0, 0.0); n];

    // Associated Legendre functions P_l^m for m >= 0, stored by (l, m)
    let mut plm = vec![Complex64::new(0.0, 0.0); n];
    let mut pmm = Complex64::new(1.0, 0.0);
    for m in 0..=l_max {
        if m > 0 {
            pmm *= -((2 * m - 1) as f64) * sin_theta;
        }
        plm[lm_index(m, m as i32)] = pmm;
        if m < l_max {
            plm[lm_index(m + 1, m as i32)] = cos_theta * (2 * m + 1) as f64 * pmm;
        }
        for l in (m + 2)..=l_max {
            let a = cos_theta * (2 * l - 1) as f64 * plm[lm_index(l - 1, m as i32)];
            let b = (l + m - 1) as f64 * plm[lm_index(l - 2, m as i32)];
            plm[lm_index(l, m as i32)] = (a - b) / (l - m) as f64;
        }
    }

    for l in 0..=l_max {
        for m in 0..=l {
            let norm =
                ((2 * l + 1) as f64 / (4.0 * PI) * factorial(l - m) / factorial(l + m)).sqrt();
            let value = norm * plm[lm_index(l, m as i32)];
            let phase = Complex64::from_polar(1.0, m as f64 * phi);
            ylm[lm_index(l, m as i32)] = value * phase;
            if m > 0 {
                ylm[lm_index(l, -(m as i32))] = sign_pow(m as i32) * value * phase.conj();
            }
        }
    }
    ylm
}

/// Spherical harmonics in the direction of a real, non-zero vector
pub fn spherical_harmonics_of_vector(l_max: usize, r: [f64; 3]) -> Vec<Complex64> {
    let rho = r[0].hypot(r[1]);
    let norm = rho.hypot(r[2]);
    let cos_theta = Complex64::new(r[2] / norm, 0.0);
    let sin_theta = Complex64::new(rho / norm, 0.0);
    let phi = r[1].atan2(r[0]);
    spherical_harmonics(l_max, cos_theta, sin_theta, phi)
}

/// Holomorphic continuation of `Y*_lm`, namely `(-1)^m Y_{l,-m}`
///
/// For real directions this equals the complex conjugate.
pub fn conjugate_harmonics(ylm: &[Complex64], l_max: usize) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); lm_count(l_max)];
    for l in 0..=l_max {
        for m in -(l as i32)..=(l as i32) {
            out[lm_index(l, m)] = sign_pow(m) * ylm[lm_index(l, -m)];
        }
    }
    out
}

/// Modified spherical Bessel functions of the first kind `i_n(x)` for `n = 0..=n_max`
///
/// Power series, adequate for the moderate arguments produced by
/// Debye-Waller factors.
pub fn modified_spherical_bessel_i(n_max: usize, x: f64) -> Vec<f64> {
    let half_x2 = 0.5 * x * x;
    let mut leading = 1.0;
    let mut values = Vec::with_capacity(n_max + 1);
    for n in 0..=n_max {
        if n > 0 {
            leading *= x / (2 * n + 1) as f64;
        }
        let mut term = 1.0;
        let mut sum = 1.0;
        let mut k = 0usize;
        while k < 500 {
            term *= half_x2 / ((k + 1) as f64 * (2 * n + 2 * k + 3) as f64);
            sum += term;
            if term.abs() <= 1.0e-17 * sum.abs() {
                break;
            }
            k += 1;
        }
        values.push(leading * sum);
    }
    values
}
