/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for layer stacking

use crate::matrix::MatrixError;
use thiserror::Error;

/// Errors raised while stacking layers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DoublingError {
    #[error("Layers must be separated along +z, got a separation of {0} Bohr")]
    NonPositiveSeparation(f64),

    #[error("Bulk reflection not converged after {doublings} doublings (last change {change:.3e})")]
    NonConvergence { doublings: usize, change: f64 },

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// Result type for stacking operations
pub type Result<T> = std::result::Result<T, DoublingError>;
