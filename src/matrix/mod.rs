/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Complex matrix kernel
//!
//! The universal container for t-matrices, lattice sums, giant matrices and
//! reflection/transmission matrices, with the dense operations the scattering
//! engine needs: products, full-pivoting inversion, partitioned inversion,
//! transposition and block insertion.

pub mod errors;
pub mod inversion;
pub mod kernel;

pub use errors::{MatrixError, Result};
pub use inversion::{gauss_jordan_inverse, partitioned_inverse};
pub use kernel::{Matrix, NumKind, ShapeClass};
