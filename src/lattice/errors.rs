/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for lattice sums

use crate::utils::errors::UtilsError;
use thiserror::Error;

/// Errors raised while summing over a two-dimensional lattice
#[derive(Error, Debug)]
pub enum LatticeSumError {
    #[error("Lattice sum does not converge without damping: Im k = {0:.3e}")]
    NoDamping(f64),

    #[error("Invalid lattice basis: {0}")]
    InvalidBasis(String),

    #[error("Special function error: {0}")]
    Math(#[from] UtilsError),
}

/// Result type for lattice sums
pub type Result<T> = std::result::Result<T, LatticeSumError>;
