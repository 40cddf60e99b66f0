/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Error types for the matrix kernel

use thiserror::Error;

/// Errors raised by matrix operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Invalid matrix shape: {0}")]
    InvalidShape(String),

    #[error("Index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Result type for matrix operations
pub type Result<T> = std::result::Result<T, MatrixError>;
