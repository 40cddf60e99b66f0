/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Unit conversion utilities

use super::constants;

/// Convert from Angstroms to Bohr radii
pub fn angstrom_to_bohr(angstrom: f64) -> f64 {
    angstrom / constants::BOHR_RADIUS
}

/// Convert from Bohr radii to Angstroms
pub fn bohr_to_angstrom(bohr: f64) -> f64 {
    bohr * constants::BOHR_RADIUS
}

/// Convert energy from eV to Hartree
pub fn ev_to_hartree(ev: f64) -> f64 {
    ev * constants::EV_TO_HARTREE
}

/// Convert energy from Hartree to eV
pub fn hartree_to_ev(hartree: f64) -> f64 {
    hartree * constants::HARTREE_TO_EV
}

/// Convert a 3-vector from Angstroms to Bohr radii
pub fn vector_to_bohr(v: [f64; 3]) -> [f64; 3] {
    [
        angstrom_to_bohr(v[0]),
        angstrom_to_bohr(v[1]),
        angstrom_to_bohr(v[2]),
    ]
}

/// Convert a mean-square displacement from Å² to Bohr²
pub fn square_angstrom_to_bohr(value: f64) -> f64 {
    value / (constants::BOHR_RADIUS * constants::BOHR_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_conversions() {
        let angstrom = 1.0;
        let bohr = angstrom_to_bohr(angstrom);
        assert_relative_eq!(bohr_to_angstrom(bohr), angstrom, epsilon = 1e-10);

        let ev = 10.0;
        let hartree = ev_to_hartree(ev);
        assert_relative_eq!(hartree_to_ev(hartree), ev, epsilon = 1e-10);
    }

    #[test]
    fn test_square_displacement_scaling() {
        let b = angstrom_to_bohr(0.1);
        assert_relative_eq!(square_angstrom_to_bohr(0.01), b * b, epsilon = 1e-12);
        let v = vector_to_bohr([1.0, 0.0, -2.0]);
        assert_relative_eq!(v[2], -2.0 / constants::BOHR_RADIUS, epsilon = 1e-12);
    }
}
