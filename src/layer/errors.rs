/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for layer scattering matrices

use crate::lattice::LatticeSumError;
use crate::matrix::MatrixError;
use thiserror::Error;

/// Errors raised while building the matrices of a layer
#[derive(Error, Debug)]
pub enum LayerError {
    #[error("Invalid scattering matrix for atom {atom} of layer {layer}: {reason}")]
    InvalidInputMatrix {
        layer: usize,
        atom: usize,
        reason: String,
    },

    #[error("Layer {0} contains no atoms")]
    EmptyLayer(usize),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    #[error("Lattice sum error: {0}")]
    LatticeSum(#[from] LatticeSumError),
}

/// Result type for layer operations
pub type Result<T> = std::result::Result<T, LayerError>;
