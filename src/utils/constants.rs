/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Physical constants and numerical tolerances used by the LEED engine

/// Bohr radius in Angstroms
pub const BOHR_RADIUS: f64 = 0.529177;

/// Hartree energy in eV
pub const HARTREE: f64 = 27.2114;

/// Conversion from eV to Hartree
pub const EV_TO_HARTREE: f64 = 1.0 / HARTREE;

/// Conversion from Hartree to eV
pub const HARTREE_TO_EV: f64 = HARTREE;

/// Conversion from Rydberg to Hartree
pub const RYDBERG_TO_HARTREE: f64 = 0.5;

/// Geometric tolerance in Bohr (positions, displacements, interlayer vectors)
pub const GEO_TOLERANCE: f64 = 1.0e-4;

/// Tolerance used when comparing parallel momenta and beam indices
pub const K_TOLERANCE: f64 = 1.0e-4;

/// Lattice-sum cutoff radii above this value (Bohr) are reported as poorly convergent
pub const LARGE_CUTOFF_RADIUS: f64 = 1000.0;
