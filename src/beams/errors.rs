/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for beam generation and selection

use thiserror::Error;

/// Errors raised by the beam set generator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeamError {
    #[error("Could not allocate a beam list of {0} entries")]
    AllocationError(usize),

    #[error("Invalid beam parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for beam operations
pub type Result<T> = std::result::Result<T, BeamError>;
