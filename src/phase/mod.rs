/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Atomic phase shifts and single-atom scattering matrices
//!
//! Phase shifts are tabulated on an energy grid per atom type. At each energy
//! they are interpolated and turned into t-matrices, either diagonal with an
//! isotropic Debye-Waller correction or non-diagonal through the cumulant
//! expansion for anisotropic vibrations.

pub mod cumulant;
pub mod errors;
pub mod library;
pub mod parser;
pub mod tmatrix;

pub use cumulant::{cumulant_t_matrix, CouplingOperators, CumulantCache};
pub use errors::{PhaseError, Result};
pub use library::{resolve_phase_path, PhaseShiftLibrary, PHASE_ENV_VAR};
pub use parser::{parse_phase_shifts, PhaseShiftTable};
pub use tmatrix::{build_scattering_matrices, temperature_corrected};

use crate::utils::constants::GEO_TOLERANCE;
use log::warn;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Handle of a loaded phase-shift set inside a [`PhaseShiftLibrary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseShiftId(pub usize);

/// Requested form of the single-atom scattering matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatteringKind {
    /// Diagonal in (l, m)
    Diagonal,
    /// Non-diagonal, from the cumulant expansion
    Cumulant,
}

/// Vibrational displacement of an atom type (Bohr)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Displacement {
    /// Mean-square displacement `<Δr²>`
    Isotropic { mean_square: f64 },
    /// Root-mean-square displacements along x, y and z
    Anisotropic { ux: f64, uy: f64, uz: f64 },
}

/// Thermal treatment selected once when a set is loaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermalModel {
    /// Diagonal t-matrix with an isotropic Debye-Waller correction
    DebyeWaller { mean_square: f64 },
    /// Non-diagonal t-matrix from the cumulant expansion
    Cumulant { ux: f64, uy: f64, uz: f64 },
}

impl ThermalModel {
    /// Combine a matrix kind with a displacement descriptor
    pub fn from_parts(kind: ScatteringKind, displacement: Displacement) -> Result<Self> {
        match (kind, displacement) {
            (ScatteringKind::Diagonal, Displacement::Isotropic { mean_square }) => {
                Ok(ThermalModel::DebyeWaller { mean_square })
            }
            (ScatteringKind::Cumulant, Displacement::Anisotropic { ux, uy, uz }) => {
                Ok(ThermalModel::Cumulant { ux, uy, uz })
            }
            (kind, displacement) => Err(PhaseError::InvalidMatrixKind(format!(
                "{:?} scattering cannot use {:?} displacement",
                kind, displacement
            ))),
        }
    }

    pub fn kind(&self) -> ScatteringKind {
        match self {
            ThermalModel::DebyeWaller { .. } => ScatteringKind::Diagonal,
            ThermalModel::Cumulant { .. } => ScatteringKind::Cumulant,
        }
    }

    /// Same model with displacements equal within the geometric tolerance
    pub fn matches(&self, other: &ThermalModel) -> bool {
        match (self, other) {
            (
                ThermalModel::DebyeWaller { mean_square: a },
                ThermalModel::DebyeWaller { mean_square: b },
            ) => (a - b).abs() < GEO_TOLERANCE,
            (
                ThermalModel::Cumulant { ux, uy, uz },
                ThermalModel::Cumulant {
                    ux: vx,
                    uy: vy,
                    uz: vz,
                },
            ) => {
                (ux - vx).abs() < GEO_TOLERANCE
                    && (uy - vy).abs() < GEO_TOLERANCE
                    && (uz - vz).abs() < GEO_TOLERANCE
            }
            _ => false,
        }
    }
}

/// Phase shifts of one atom type on an energy grid
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseShiftSet {
    pub l_max: usize,
    /// Ascending energies (Hartree)
    pub energies: Vec<f64>,
    /// `shifts[i][l]` is δ_l at `energies[i]`
    pub shifts: Vec<Vec<f64>>,
    pub thermal: ThermalModel,
    /// File the set was read from
    pub source: PathBuf,
}

impl PhaseShiftSet {
    /// Lowest and highest tabulated energy
    pub fn energy_range(&self) -> (f64, f64) {
        (self.energies[0], self.energies[self.energies.len() - 1])
    }

    /// Phase shifts δ_l at `energy`, linearly interpolated on the grid
    ///
    /// Above the grid the last interval is extrapolated with a warning;
    /// below the grid the call fails.
    pub fn interpolate(&self, energy: f64) -> Result<Vec<f64>> {
        let (e_min, e_max) = self.energy_range();
        if energy < e_min {
            return Err(PhaseError::EnergyBelowRange {
                energy,
                minimum: e_min,
            });
        }
        let n = self.energies.len();
        if n == 1 {
            return Ok(self.shifts[0].clone());
        }

        let upper = if energy > e_max {
            warn!(
                "energy {:.4} Hartree above the phase shift grid of {} (max {:.4}); extrapolating",
                energy,
                self.source.display(),
                e_max
            );
            n - 1
        } else {
            self.energies
                .iter()
                .position(|&e| e >= energy)
                .unwrap_or(n - 1)
                .max(1)
        };
        let lower = upper - 1;
        let e_lo = self.energies[lower];
        let e_hi = self.energies[upper];
        let slope = (e_hi - energy) / (e_hi - e_lo);

        Ok((0..=self.l_max)
            .map(|l| {
                let d_hi = self.shifts[upper][l];
                let d_lo = self.shifts[lower][l];
                d_hi - (d_hi - d_lo) * slope
            })
            .collect())
    }

    /// Scattering amplitudes `t_l = sin δ_l · e^{iδ_l}` at `energy`
    pub fn amplitudes(&self, energy: f64) -> Result<Vec<Complex64>> {
        Ok(self
            .interpolate(energy)?
            .into_iter()
            .map(|delta| delta.sin() * Complex64::from_polar(1.0, delta))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn set() -> PhaseShiftSet {
        PhaseShiftSet {
            l_max: 1,
            energies: vec![1.0, 2.0, 4.0],
            shifts: vec![vec![0.1, 0.2], vec![0.3, 0.0], vec![0.7, -0.4]],
            thermal: ThermalModel::DebyeWaller { mean_square: 0.0 },
            source: PathBuf::from("test.phs"),
        }
    }

    #[test]
    fn test_interpolation_hits_grid_points() {
        let s = set();
        for (e, expected) in s.energies.iter().zip(s.shifts.iter()) {
            let d = s.interpolate(*e).unwrap();
            assert_relative_eq!(d[0], expected[0], epsilon = 1e-14);
            assert_relative_eq!(d[1], expected[1], epsilon = 1e-14);
        }
        let mid = s.interpolate(3.0).unwrap();
        assert_relative_eq!(mid[0], 0.5, epsilon = 1e-14);
        assert_relative_eq!(mid[1], -0.2, epsilon = 1e-14);
    }

    #[test]
    fn test_extrapolation_and_lower_bound() {
        let s = set();
        let above = s.interpolate(6.0).unwrap();
        assert_relative_eq!(above[0], 1.1, epsilon = 1e-12);
        assert!(matches!(
            s.interpolate(0.5),
            Err(PhaseError::EnergyBelowRange { .. })
        ));
    }

    #[test]
    fn test_amplitude_form() {
        let s = set();
        let t = s.amplitudes(2.0).unwrap();
        assert_relative_eq!(t[0].re, 0.3f64.sin() * 0.3f64.cos(), epsilon = 1e-14);
        assert_relative_eq!(t[0].im, 0.3f64.sin().powi(2), epsilon = 1e-14);
        assert_eq!(t[1], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_thermal_model_dispatch() {
        assert!(ThermalModel::from_parts(
            ScatteringKind::Diagonal,
            Displacement::Anisotropic { ux: 0.1, uy: 0.1, uz: 0.1 }
        )
        .is_err());
        let model = ThermalModel::from_parts(
            ScatteringKind::Cumulant,
            Displacement::Anisotropic { ux: 0.1, uy: 0.1, uz: 0.2 },
        )
        .unwrap();
        assert_eq!(model.kind(), ScatteringKind::Cumulant);
        assert!(model.matches(&ThermalModel::Cumulant { ux: 0.1, uy: 0.10001, uz: 0.2 }));
        assert!(!model.matches(&ThermalModel::DebyeWaller { mean_square: 0.1 }));
    }
}
