/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error type of the energy-point driver

use crate::beams::BeamError;
use crate::doubling::DoublingError;
use crate::input::InputError;
use crate::lattice::LatticeSumError;
use crate::layer::LayerError;
use crate::matrix::MatrixError;
use crate::phase::PhaseError;
use crate::structure::StructureError;
use thiserror::Error;

/// Errors raised while evaluating an energy point
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Beam(#[from] BeamError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    LatticeSum(#[from] LatticeSumError),

    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error(transparent)]
    Doubling(#[from] DoublingError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("No specular beam among the {0} selected beams")]
    MissingSpecularBeam(usize),
}

/// Result type for the energy-point driver
pub type Result<T> = std::result::Result<T, EngineError>;
