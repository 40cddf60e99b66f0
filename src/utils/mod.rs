/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Utility functions for the LEED engine
//!
//! Constants, unit conversions, special functions of complex argument and the
//! bridge between ndarray storage and faer dense kernels.

pub mod constants;
pub mod conversions;
pub mod errors;
pub mod linear_algebra;
pub mod math;

pub use conversions::{
    angstrom_to_bohr, bohr_to_angstrom, ev_to_hartree, hartree_to_ev, square_angstrom_to_bohr,
    vector_to_bohr,
};
pub use errors::{Result, UtilsError};
