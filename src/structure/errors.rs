/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for the surface structure model

use thiserror::Error;

/// Errors raised while building lattices, layers and crystals
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructureError {
    #[error("Degenerate lattice: {0}")]
    DegenerateLattice(String),

    #[error("Singular superstructure matrix: {0}")]
    SingularSuperstructure(String),

    #[error("Layer {0} contains no atoms")]
    EmptyLayer(usize),

    #[error("Invalid crystal: {0}")]
    InvalidCrystal(String),
}

/// Result type for structure operations
pub type Result<T> = std::result::Result<T, StructureError>;
