/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Numerical settings of a LEED calculation
//!
//! Values are given in the units of the run description (eV, degrees) and
//! converted to Hartree and radians on request.

use super::errors::{InputError, Result};
use crate::beams::{Incidence, OpticalPotential};
use crate::utils::conversions::ev_to_hartree;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Upper bound of the angular momentum
    pub l_max: usize,
    /// Amplitude cutoff for beams, lattice sums and the effective `l_max`
    pub epsilon: f64,
    /// Real part of the optical potential (eV)
    pub vr: f64,
    /// Imaginary part of the optical potential (eV)
    pub vi: f64,
    /// Polar angle of incidence (degrees)
    pub theta: f64,
    /// Azimuth of incidence (degrees)
    pub phi: f64,
    /// Directory searched for `<tag>.phs` files before `CLEED_PHASE`
    pub phase_dir: Option<PathBuf>,
    /// Largest change of the bulk reflection accepted as converged
    pub bulk_tolerance: f64,
    /// Upper limit of bulk doubling steps
    pub max_doublings: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            l_max: 8,
            epsilon: 1.0e-4,
            vr: -10.0,
            vi: 4.0,
            theta: 0.0,
            phi: 0.0,
            phase_dir: None,
            bulk_tolerance: 1.0e-6,
            max_doublings: 30,
        }
    }
}

impl EngineConfig {
    /// Check the ranges the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.vi <= 0.0 {
            return Err(InputError::InvalidFormat(format!(
                "imaginary optical potential must be positive, got {} eV",
                self.vi
            )));
        }
        if self.epsilon <= 0.0 {
            return Err(InputError::InvalidFormat(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(0.0..90.0).contains(&self.theta) {
            return Err(InputError::InvalidFormat(format!(
                "polar angle must lie in [0, 90) degrees, got {}",
                self.theta
            )));
        }
        if self.max_doublings == 0 || self.bulk_tolerance <= 0.0 {
            return Err(InputError::InvalidFormat(
                "bulk doubling needs at least one step and a positive tolerance".to_string(),
            ));
        }
        Ok(())
    }

    /// Optical potential in Hartree
    pub fn optical_potential(&self) -> OpticalPotential {
        OpticalPotential::new(ev_to_hartree(self.vr), ev_to_hartree(self.vi))
    }

    /// Incidence direction in radians
    pub fn incidence(&self) -> Incidence {
        Incidence::new(self.theta.to_radians(), self.phi.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"l_max": 6, "theta": 10.0}"#).unwrap();
        assert_eq!(config.l_max, 6);
        assert_relative_eq!(config.epsilon, 1.0e-4);
        assert_eq!(config.max_doublings, 30);
        assert!(config.phase_dir.is_none());
        assert_relative_eq!(config.incidence().theta, 10.0f64.to_radians());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{"lmax": 6}"#).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(EngineConfig::default().validate().is_ok());
        let config = EngineConfig {
            vi: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
        let config = EngineConfig {
            theta: 95.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_potential_in_hartree() {
        let pot = EngineConfig::default().optical_potential();
        assert!(pot.vr < 0.0);
        assert_relative_eq!(pot.vi, 4.0 / 27.2114, epsilon = 1e-12);
    }
}
