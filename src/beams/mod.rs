/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Diffracted beams
//!
//! A beam is a reciprocal-lattice channel `g` of the surface. The generator
//! enumerates every beam that can become relevant up to a maximum energy; the
//! selection step trims that list at each energy and attaches the complex
//! wave vector inside the crystal.
//!
//! Beam lists are ordered by ascending `k_par = |g|²`, then by the first and
//! the second index. Reflection and transmission matrices use the same order.

pub mod errors;
pub mod generator;
pub mod selection;

pub use errors::{BeamError, Result};
pub use generator::generate;
pub use selection::select;

use crate::utils::math::damped_sqrt;
use num_complex::Complex64;
use std::ops::Deref;

/// Direction of the incident beam
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Incidence {
    /// Polar angle from the surface normal (radians)
    pub theta: f64,
    /// Azimuth (radians)
    pub phi: f64,
}

impl Incidence {
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Parallel wave vector of the incident electron at a vacuum energy (Hartree)
    pub fn parallel_k(&self, energy: f64) -> [f64; 2] {
        let k_par = self.theta.sin() * (2.0 * energy.max(0.0)).sqrt();
        [k_par * self.phi.cos(), k_par * self.phi.sin()]
    }
}

/// Optical potential of the crystal (Hartree)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticalPotential {
    /// Real part (inner potential, usually negative)
    pub vr: f64,
    /// Imaginary part (damping, positive)
    pub vi: f64,
}

impl OpticalPotential {
    pub fn new(vr: f64, vi: f64) -> Self {
        Self { vr, vi }
    }

    /// Complex kinetic energy inside the crystal for a vacuum energy
    pub fn crystal_energy(&self, energy: f64) -> Complex64 {
        Complex64::new(energy - self.vr, self.vi)
    }

    /// Complex wave number inside the crystal, `√(2E)` with `Im ≥ 0`
    pub fn wave_number(&self, energy: f64) -> Complex64 {
        damped_sqrt(2.0 * self.crystal_energy(energy))
    }
}

/// Squared cutoff radius of the parallel momentum
///
/// Waves with larger parallel momentum decay by more than `epsilon` over the
/// minimum interlayer distance `dmin`.
pub fn cutoff_k2(energy: f64, epsilon: f64, dmin: f64) -> Result<f64> {
    if !(epsilon > 0.0 && epsilon < 1.0) {
        return Err(BeamError::InvalidParameter(format!(
            "epsilon must lie in (0, 1), got {}",
            epsilon
        )));
    }
    if dmin <= 0.0 {
        return Err(BeamError::InvalidParameter(format!(
            "minimum interlayer distance must be positive, got {}",
            dmin
        )));
    }
    let decay = epsilon.ln() / dmin;
    Ok(decay * decay + 2.0 * energy)
}

/// One diffracted beam
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    /// Fractional indices with respect to the reciprocal 1x1 basis
    pub ind_1: f64,
    pub ind_2: f64,
    /// Beam set (superstructure coset) this beam belongs to
    pub set: usize,
    /// |g|², the ordering key
    pub k_par: f64,
    /// Real parts of (|k|, k_x, k_y, k_z)
    pub k_r: [f64; 4],
    /// Imaginary parts of (|k|, k_x, k_y, k_z)
    pub k_i: [f64; 4],
    pub phi: f64,
    pub cos_theta: Complex64,
    /// 1 / (A₁ₓ₁ · k_z)
    pub akz: Complex64,
}

impl Beam {
    /// Complex wave number |k|
    pub fn k(&self) -> Complex64 {
        Complex64::new(self.k_r[0], self.k_i[0])
    }

    /// Complex normal component k_z
    pub fn k_z(&self) -> Complex64 {
        Complex64::new(self.k_r[3], self.k_i[3])
    }

    /// Parallel wave vector (incident parallel momentum included once selected)
    pub fn k_parallel(&self) -> [f64; 2] {
        [self.k_r[1], self.k_r[2]]
    }

    /// Complex sin θ = |k_∥| / k
    pub fn sin_theta(&self) -> Complex64 {
        let k_par = self.k_r[1].hypot(self.k_r[2]);
        Complex64::new(k_par, 0.0) / self.k()
    }
}

/// Ordered list of beams
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeamList {
    beams: Vec<Beam>,
}

impl BeamList {
    pub fn new(beams: Vec<Beam>) -> Self {
        Self { beams }
    }

    pub fn into_vec(self) -> Vec<Beam> {
        self.beams
    }

    /// Position of the specular (0,0) beam
    pub fn specular_index(&self) -> Option<usize> {
        self.beams
            .iter()
            .position(|b| b.ind_1.abs() < 1.0e-6 && b.ind_2.abs() < 1.0e-6)
    }

    /// Number of distinct beam sets present
    pub fn set_count(&self) -> usize {
        self.beams.iter().map(|b| b.set + 1).max().unwrap_or(0)
    }
}

impl Deref for BeamList {
    type Target = [Beam];

    fn deref(&self) -> &[Beam] {
        &self.beams
    }
}

impl<'a> IntoIterator for &'a BeamList {
    type Item = &'a Beam;
    type IntoIter = std::slice::Iter<'a, Beam>;

    fn into_iter(self) -> Self::IntoIter {
        self.beams.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cutoff_rejects_bad_parameters() {
        assert!(cutoff_k2(3.0, 1.5, 2.0).is_err());
        assert!(cutoff_k2(3.0, 0.01, 0.0).is_err());
        let k2 = cutoff_k2(3.0, 0.01, 2.0).unwrap();
        let decay = 0.01f64.ln() / 2.0;
        assert_relative_eq!(k2, decay * decay + 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wave_number_is_damped() {
        let v = OpticalPotential::new(-0.4, 0.15);
        let k = v.wave_number(2.0);
        assert!(k.im > 0.0);
        assert_relative_eq!((k * k).re, 2.0 * 2.4, epsilon = 1e-12);
    }

    #[test]
    fn test_incident_parallel_momentum() {
        let inc = Incidence::new(std::f64::consts::FRAC_PI_6, 0.0);
        let k = inc.parallel_k(2.0);
        assert_relative_eq!(k[0], 0.5 * 2.0, epsilon = 1e-12);
        assert_relative_eq!(k[1], 0.0, epsilon = 1e-12);
    }
}
