/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for run descriptions

use crate::phase::PhaseError;
use crate::structure::StructureError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a run description
#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    #[error("Invalid structure: {0}")]
    Structure(#[from] StructureError),

    #[error("Phase shift error: {0}")]
    Phase(#[from] PhaseError),
}

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;
