/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for phase shifts and atomic t-matrices

use crate::matrix::MatrixError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading phase shifts or building t-matrices
#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("Phase shift file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed header in {} line {line}: expected '<energies> <lmax> [unit]', found '{content}'", path.display())]
    MalformedHeader {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Malformed data in {} line {line}: {message}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unexpected end of file {}: expected {expected}, found {found}", path.display())]
    UnexpectedEndOfFile {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Environment variable {0} is not set; cannot resolve phase shift tag '{1}'")]
    EnvironmentVariable(String, String),

    #[error("Energy {energy:.6} Hartree lies below the phase shift grid starting at {minimum:.6} Hartree")]
    EnergyBelowRange { energy: f64, minimum: f64 },

    #[error("Invalid scattering matrix kind: {0}")]
    InvalidMatrixKind(String),

    #[error("Cumulant expansion did not converge after {iterations} iterations (relative change {relerr:.3e})")]
    NonConvergence { iterations: usize, relerr: f64 },

    #[error("Unknown phase shift set {0}")]
    UnknownPhaseShift(usize),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// Result type for phase shift operations
pub type Result<T> = std::result::Result<T, PhaseError>;
