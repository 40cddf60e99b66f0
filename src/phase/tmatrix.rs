/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Atomic t-matrices at one energy

use super::cumulant::{cumulant_t_matrix, CumulantCache};
use super::errors::Result;
use super::library::PhaseShiftLibrary;
use super::ThermalModel;
use crate::matrix::Matrix;
use crate::utils::math::{lm_count, modified_spherical_bessel_i, wigner_3j};
use log::debug;
use num_complex::Complex64;

/// Isotropic Debye-Waller correction of diagonal scattering amplitudes
///
/// # Arguments
///
/// * `amplitudes` - Static amplitudes `t_l` for `l = 0..=l_src`
/// * `mean_square` - Mean-square displacement `<Δr²>` (Bohr²)
/// * `energy` - Real part of the crystal energy (Hartree)
/// * `l_max` - Highest `l` of the result
///
/// # Returns
///
/// `t_l(T) = e^{-x} Σ_{l'} Σ_{l''} (2l'+1)(2l''+1) i_{l''}(x) (l'' l' l; 0 0 0)² t_{l'}`
/// for `l = 0..=l_max`, with `x = 2E<Δr²>/3`. Channels with `l > l_src`
/// are filled by the thermal coupling.
pub fn temperature_corrected(
    amplitudes: &[Complex64],
    mean_square: f64,
    energy: f64,
    l_max: usize,
) -> Vec<Complex64> {
    let l_src = amplitudes.len().saturating_sub(1);
    if mean_square <= 0.0 {
        let mut out = amplitudes.to_vec();
        out.resize(l_max + 1, Complex64::new(0.0, 0.0));
        out.truncate(l_max + 1);
        return out;
    }

    let x = 2.0 * energy * mean_square / 3.0;
    let bessel = modified_spherical_bessel_i(l_max + l_src, x);
    let damping = (-x).exp();

    (0..=l_max)
        .map(|l| {
            let mut sum = Complex64::new(0.0, 0.0);
            for (lp, t_lp) in amplitudes.iter().enumerate() {
                let lo = (l as i32 - lp as i32).unsigned_abs() as usize;
                for lpp in lo..=(l + lp) {
                    let w = wigner_3j(lpp as i32, lp as i32, l as i32, 0, 0, 0);
                    if w == 0.0 {
                        continue;
                    }
                    let weight = ((2 * lp + 1) * (2 * lpp + 1)) as f64 * bessel[lpp] * w * w;
                    sum += weight * t_lp;
                }
            }
            damping * sum
        })
        .collect()
}

/// Repeat `t_l` over the `2l+1` values of `m`
fn expand_over_m(t_l: &[Complex64], l_max: usize) -> Vec<Complex64> {
    let mut diag = Vec::with_capacity(lm_count(l_max));
    for l in 0..=l_max {
        let value = t_l.get(l).copied().unwrap_or_default();
        diag.extend(std::iter::repeat(value).take(2 * l + 1));
    }
    diag
}

/// t-matrices of every set in `library` at one energy
///
/// # Arguments
///
/// * `library` - Loaded phase shift sets
/// * `l_max` - Angular momentum cutoff of the result
/// * `energy` - Real part of the crystal energy (Hartree)
/// * `cache` - Direction-cosine operators for cumulant sets
///
/// # Returns
///
/// One `(l_max+1)² x (l_max+1)²` matrix per set, in library order.
/// Diagonal sets give diagonal matrices.
pub fn build_scattering_matrices(
    library: &PhaseShiftLibrary,
    l_max: usize,
    energy: f64,
    cache: &mut CumulantCache,
) -> Result<Vec<Matrix>> {
    let mut matrices = Vec::with_capacity(library.len());
    for (id, set) in library.iter() {
        let amplitudes = set.amplitudes(energy)?;
        let matrix = match set.thermal {
            ThermalModel::DebyeWaller { mean_square } => {
                let t_l = temperature_corrected(&amplitudes, mean_square, energy, l_max);
                Matrix::diagonal(&expand_over_m(&t_l, l_max))?
            }
            ThermalModel::Cumulant { ux, uy, uz } => {
                cumulant_t_matrix(&amplitudes, ux, uy, uz, energy, l_max, cache)?
            }
        };
        debug!(
            "t-matrix of set {} at {:.4} Hartree: {:?}, max |t| = {:.3e}",
            id.0,
            energy,
            set.thermal.kind(),
            matrix.max_abs()
        );
        matrices.push(matrix);
    }
    Ok(matrices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseShiftSet;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    fn amplitudes() -> Vec<Complex64> {
        [0.9, 0.6, 0.3, 0.1]
            .iter()
            .map(|&d: &f64| d.sin() * Complex64::from_polar(1.0, d))
            .collect()
    }

    #[test]
    fn test_zero_displacement_is_identity() {
        let t = amplitudes();
        let corrected = temperature_corrected(&t, 0.0, 5.0, 5);
        assert_eq!(&corrected[..4], &t[..]);
        assert_eq!(corrected[5], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_forward_sum_rule() {
        let t = amplitudes();
        let corrected = temperature_corrected(&t, 0.02, 4.0, 20);
        let weighted = |v: &[Complex64]| {
            v.iter()
                .enumerate()
                .fold(Complex64::new(0.0, 0.0), |acc, (l, x)| acc + (2 * l + 1) as f64 * x)
        };
        let before = weighted(&t);
        let after = weighted(&corrected);
        assert_relative_eq!(after.re, before.re, epsilon = 1e-8);
        assert_relative_eq!(after.im, before.im, epsilon = 1e-8);
    }

    #[test]
    fn test_vibrations_damp_low_order_waves() {
        let t = amplitudes();
        let corrected = temperature_corrected(&t, 0.05, 6.0, 8);
        assert!(corrected[0].norm() < t[0].norm());
        assert!(corrected[6].norm() > 0.0);
    }

    #[test]
    fn test_library_matrices() {
        let mut library = PhaseShiftLibrary::new();
        library.add_set(PhaseShiftSet {
            l_max: 1,
            energies: vec![1.0, 3.0],
            shifts: vec![vec![0.2, 0.1], vec![0.4, 0.3]],
            thermal: ThermalModel::DebyeWaller { mean_square: 0.0 },
            source: PathBuf::from("/a.phs"),
        });
        library.add_set(PhaseShiftSet {
            l_max: 1,
            energies: vec![1.0, 3.0],
            shifts: vec![vec![0.2, 0.1], vec![0.4, 0.3]],
            thermal: ThermalModel::Cumulant { ux: 0.0, uy: 0.0, uz: 0.0 },
            source: PathBuf::from("/a.phs"),
        });
        let mut cache = CumulantCache::new();
        let mats = build_scattering_matrices(&library, 2, 2.0, &mut cache).unwrap();
        assert_eq!(mats.len(), 2);
        assert!(mats[0].is_diagonal());
        assert_eq!(mats[0].rows(), 9);
        assert!(!mats[1].is_diagonal());
        for i in 1..=9 {
            let a = mats[0].get(i, i).unwrap();
            let b = mats[1].get(i, i).unwrap();
            assert_relative_eq!(a.re, b.re, epsilon = 1e-13);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-13);
        }
        let delta: f64 = 0.3;
        assert_relative_eq!(mats[0].get(1, 1).unwrap().re, delta.sin() * delta.cos(), epsilon = 1e-13);
    }
}
