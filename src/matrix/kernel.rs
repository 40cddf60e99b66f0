/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Dense real/complex matrix type
//!
//! Every t-matrix, lattice-sum block, giant matrix and reflection/transmission
//! matrix in the engine is a [`Matrix`]. Element accessors follow the 1-based
//! `(row, col)` convention of the scattering formulae; bulk numeric work goes
//! through the 0-based ndarray view.

use super::errors::{MatrixError, Result};
use super::inversion::gauss_jordan_inverse;
use crate::utils::linear_algebra::dense_product;
use ndarray::{s, Array2, ArrayView2};
use num_complex::Complex64;

/// Numeric kind of the stored elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    /// Imaginary parts are identically zero
    Real,
    Complex,
}

/// Shape class of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    /// General rectangular
    Normal,
    Square,
    /// 1x1
    Scalar,
    /// Square with only the diagonal stored
    Diagonal,
}

/// Dense matrix with a numeric kind and a shape class
///
/// Diagonal matrices keep their diagonal as an `n x 1` column.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    kind: NumKind,
    shape: ShapeClass,
    data: Array2<Complex64>,
}

fn classify(rows: usize, cols: usize) -> ShapeClass {
    if rows == 1 && cols == 1 {
        ShapeClass::Scalar
    } else if rows == cols {
        ShapeClass::Square
    } else {
        ShapeClass::Normal
    }
}

fn check_positive(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(MatrixError::InvalidShape(format!(
            "rows and columns must be positive, got {}x{}",
            rows, cols
        )));
    }
    Ok(())
}

fn combine_kind(a: NumKind, b: NumKind) -> NumKind {
    if a == NumKind::Real && b == NumKind::Real {
        NumKind::Real
    } else {
        NumKind::Complex
    }
}

impl Matrix {
    /// Allocate a zero-filled matrix
    pub fn zeros(rows: usize, cols: usize, kind: NumKind) -> Result<Self> {
        check_positive(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            kind,
            shape: classify(rows, cols),
            data: Array2::zeros((rows, cols)),
        })
    }

    /// Zero-filled matrix, reusing `existing` when its shape and kind already match
    ///
    /// A diagonal buffer is never reused for a full matrix.
    pub fn reuse_or_zeros(
        existing: Option<Matrix>,
        rows: usize,
        cols: usize,
        kind: NumKind,
    ) -> Result<Self> {
        match existing {
            Some(mut m)
                if m.rows == rows
                    && m.cols == cols
                    && m.kind == kind
                    && m.shape != ShapeClass::Diagonal =>
            {
                m.data.fill(Complex64::new(0.0, 0.0));
                Ok(m)
            }
            _ => Self::zeros(rows, cols, kind),
        }
    }

    /// Wrap a complex array
    pub fn from_array(data: Array2<Complex64>) -> Result<Self> {
        let (rows, cols) = data.dim();
        check_positive(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            kind: NumKind::Complex,
            shape: classify(rows, cols),
            data,
        })
    }

    /// Wrap a real array
    pub fn from_real(data: &Array2<f64>) -> Result<Self> {
        let (rows, cols) = data.dim();
        check_positive(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            kind: NumKind::Real,
            shape: classify(rows, cols),
            data: data.mapv(|x| Complex64::new(x, 0.0)),
        })
    }

    /// Diagonal matrix from its diagonal elements
    pub fn diagonal(values: &[Complex64]) -> Result<Self> {
        let n = values.len();
        check_positive(n, n)?;
        let data = Array2::from_shape_fn((n, 1), |(i, _)| values[i]);
        Ok(Self {
            rows: n,
            cols: n,
            kind: NumKind::Complex,
            shape: ShapeClass::Diagonal,
            data,
        })
    }

    /// Identity matrix, stored as a real diagonal
    pub fn identity(n: usize) -> Result<Self> {
        check_positive(n, n)?;
        Ok(Self {
            rows: n,
            cols: n,
            kind: NumKind::Real,
            shape: ShapeClass::Diagonal,
            data: Array2::from_elem((n, 1), Complex64::new(1.0, 0.0)),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn kind(&self) -> NumKind {
        self.kind
    }

    pub fn shape(&self) -> ShapeClass {
        self.shape
    }

    pub fn is_diagonal(&self) -> bool {
        self.shape == ShapeClass::Diagonal
    }

    /// Raw storage (an `n x 1` column for diagonal matrices)
    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Full array view of a non-diagonal matrix
    pub fn view(&self) -> Result<ArrayView2<'_, Complex64>> {
        if self.is_diagonal() {
            return Err(MatrixError::InvalidShape(
                "diagonal matrix has no dense view; use to_dense".to_string(),
            ));
        }
        Ok(self.data.view())
    }

    /// Consume the matrix and return the dense array
    pub fn into_array(self) -> Array2<Complex64> {
        if self.is_diagonal() {
            self.dense_array()
        } else {
            self.data
        }
    }

    /// Dense copy of the elements
    pub fn dense_array(&self) -> Array2<Complex64> {
        if self.is_diagonal() {
            let mut dense = Array2::zeros((self.rows, self.cols));
            for i in 0..self.rows {
                dense[(i, i)] = self.data[(i, 0)];
            }
            dense
        } else {
            self.data.clone()
        }
    }

    /// Dense (square) version of a diagonal matrix; other matrices are cloned
    pub fn to_dense(&self) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            kind: self.kind,
            shape: classify(self.rows, self.cols),
            data: self.dense_array(),
        }
    }

    /// Diagonal elements
    pub fn diagonal_values(&self) -> Vec<Complex64> {
        let n = self.rows.min(self.cols);
        if self.is_diagonal() {
            self.data.column(0).to_vec()
        } else {
            (0..n).map(|i| self.data[(i, i)]).collect()
        }
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Element at 1-based position `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Result<Complex64> {
        self.check_index(row, col)?;
        if self.is_diagonal() {
            if row == col {
                Ok(self.data[(row - 1, 0)])
            } else {
                Ok(Complex64::new(0.0, 0.0))
            }
        } else {
            Ok(self.data[(row - 1, col - 1)])
        }
    }

    /// Set the element at 1-based position `(row, col)`
    ///
    /// A non-zero imaginary part promotes a real matrix to complex.
    pub fn set(&mut self, row: usize, col: usize, value: Complex64) -> Result<()> {
        self.check_index(row, col)?;
        if value.im != 0.0 {
            self.kind = NumKind::Complex;
        }
        if self.is_diagonal() {
            if row == col {
                self.data[(row - 1, 0)] = value;
                return Ok(());
            }
            if value.norm() != 0.0 {
                return Err(MatrixError::InvalidShape(format!(
                    "cannot set off-diagonal element ({}, {}) of a diagonal matrix",
                    row, col
                )));
            }
            return Ok(());
        }
        self.data[(row - 1, col - 1)] = value;
        Ok(())
    }

    /// Overwrite this matrix with a copy of `src`, reshaping as needed
    pub fn copy_from(&mut self, src: &Matrix) {
        if self.data.dim() == src.data.dim() {
            self.data.assign(&src.data);
        } else {
            self.data = src.data.clone();
        }
        self.rows = src.rows;
        self.cols = src.cols;
        self.kind = src.kind;
        self.shape = src.shape;
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix {
        if self.is_diagonal() {
            return self.clone();
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            kind: self.kind,
            shape: classify(self.cols, self.rows),
            data: self.data.t().to_owned(),
        }
    }

    /// Matrix product `a · b`
    pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        if a.cols != b.rows {
            return Err(MatrixError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                a.rows, a.cols, b.rows, b.cols
            )));
        }
        let kind = combine_kind(a.kind, b.kind);

        match (a.is_diagonal(), b.is_diagonal()) {
            (true, true) => {
                let values: Vec<Complex64> = a
                    .data
                    .column(0)
                    .iter()
                    .zip(b.data.column(0).iter())
                    .map(|(x, y)| x * y)
                    .collect();
                let mut m = Matrix::diagonal(&values)?;
                m.kind = kind;
                Ok(m)
            }
            (true, false) => {
                let mut m = b.clone();
                m.scale_rows(&a.diagonal_values())?;
                m.kind = kind;
                Ok(m)
            }
            (false, true) => {
                let mut m = a.clone();
                m.scale_cols(&b.diagonal_values())?;
                m.kind = kind;
                Ok(m)
            }
            (false, false) => {
                let data = dense_product(a.data.view(), b.data.view());
                Ok(Matrix {
                    rows: a.rows,
                    cols: b.cols,
                    kind,
                    shape: classify(a.rows, b.cols),
                    data,
                })
            }
        }
    }

    /// Matrix product written into an existing buffer
    pub fn multiply_into(dst: &mut Matrix, a: &Matrix, b: &Matrix) -> Result<()> {
        let product = Matrix::multiply(a, b)?;
        dst.copy_from(&product);
        Ok(())
    }

    /// Inverse by Gauss-Jordan elimination with full pivoting
    pub fn inverse(&self) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(MatrixError::DimensionMismatch(format!(
                "cannot invert non-square {}x{} matrix",
                self.rows, self.cols
            )));
        }
        if self.is_diagonal() {
            let mut values = Vec::with_capacity(self.rows);
            for (i, v) in self.data.column(0).iter().enumerate() {
                if v.norm() == 0.0 {
                    return Err(MatrixError::SingularMatrix(format!(
                        "zero diagonal element at position {}",
                        i + 1
                    )));
                }
                values.push(1.0 / v);
            }
            let mut m = Matrix::diagonal(&values)?;
            m.kind = self.kind;
            return Ok(m);
        }
        let data = gauss_jordan_inverse(self.data.view())?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            kind: self.kind,
            shape: self.shape,
            data,
        })
    }

    /// Replace the matrix by its inverse
    pub fn invert_in_place(&mut self) -> Result<()> {
        let inverse = self.inverse()?;
        *self = inverse;
        Ok(())
    }

    /// Insert `sub` so that its element (1, 1) lands at 1-based `(row_offset, col_offset)`
    pub fn insert(&mut self, sub: &Matrix, row_offset: usize, col_offset: usize) -> Result<()> {
        if self.is_diagonal() {
            return Err(MatrixError::InvalidShape(
                "cannot insert a block into a diagonal matrix".to_string(),
            ));
        }
        if row_offset == 0
            || col_offset == 0
            || row_offset - 1 + sub.rows > self.rows
            || col_offset - 1 + sub.cols > self.cols
        {
            return Err(MatrixError::DimensionMismatch(format!(
                "{}x{} block at ({}, {}) does not fit into {}x{} matrix",
                sub.rows, sub.cols, row_offset, col_offset, self.rows, self.cols
            )));
        }
        let r0 = row_offset - 1;
        let c0 = col_offset - 1;
        self.data
            .slice_mut(s![r0..r0 + sub.rows, c0..c0 + sub.cols])
            .assign(&sub.dense_array());
        self.kind = combine_kind(self.kind, sub.kind);
        Ok(())
    }

    /// Copy out the block whose element (1, 1) sits at 1-based `(row_offset, col_offset)`
    pub fn extract(
        &self,
        row_offset: usize,
        col_offset: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Matrix> {
        check_positive(rows, cols)?;
        if row_offset == 0
            || col_offset == 0
            || row_offset - 1 + rows > self.rows
            || col_offset - 1 + cols > self.cols
        {
            return Err(MatrixError::DimensionMismatch(format!(
                "{}x{} block at ({}, {}) lies outside {}x{} matrix",
                rows, cols, row_offset, col_offset, self.rows, self.cols
            )));
        }
        let dense = self.dense_array();
        let r0 = row_offset - 1;
        let c0 = col_offset - 1;
        Ok(Matrix {
            rows,
            cols,
            kind: self.kind,
            shape: classify(rows, cols),
            data: dense.slice(s![r0..r0 + rows, c0..c0 + cols]).to_owned(),
        })
    }

    /// Product with a complex scalar
    pub fn scale(&self, factor: Complex64) -> Matrix {
        let mut m = self.clone();
        m.data.mapv_inplace(|x| x * factor);
        if factor.im != 0.0 {
            m.kind = NumKind::Complex;
        }
        m
    }

    fn elementwise(&self, other: &Matrix, sign: f64) -> Result<Matrix> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(MatrixError::DimensionMismatch(format!(
                "cannot add {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let kind = combine_kind(self.kind, other.kind);
        if self.is_diagonal() && other.is_diagonal() {
            let data = &self.data + &(&other.data * sign);
            return Ok(Matrix {
                rows: self.rows,
                cols: self.cols,
                kind,
                shape: ShapeClass::Diagonal,
                data,
            });
        }
        let data = self.dense_array() + other.dense_array() * sign;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            kind,
            shape: classify(self.rows, self.cols),
            data,
        })
    }

    /// Element-wise sum
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.elementwise(other, 1.0)
    }

    /// Element-wise difference
    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.elementwise(other, -1.0)
    }

    /// Add `values[i]` to the i-th diagonal element
    pub fn add_to_diagonal(&mut self, values: &[Complex64]) -> Result<()> {
        let n = self.rows.min(self.cols);
        if values.len() != n {
            return Err(MatrixError::DimensionMismatch(format!(
                "{} diagonal values for {}x{} matrix",
                values.len(),
                self.rows,
                self.cols
            )));
        }
        for (i, v) in values.iter().enumerate() {
            if self.is_diagonal() {
                self.data[(i, 0)] += v;
            } else {
                self.data[(i, i)] += v;
            }
        }
        if values.iter().any(|v| v.im != 0.0) {
            self.kind = NumKind::Complex;
        }
        Ok(())
    }

    /// Multiply the i-th row by `factors[i]` (left product with a diagonal matrix)
    pub fn scale_rows(&mut self, factors: &[Complex64]) -> Result<()> {
        if factors.len() != self.rows {
            return Err(MatrixError::DimensionMismatch(format!(
                "{} row factors for {} rows",
                factors.len(),
                self.rows
            )));
        }
        for (mut row, f) in self.data.rows_mut().into_iter().zip(factors.iter()) {
            row.mapv_inplace(|x| x * f);
        }
        if factors.iter().any(|v| v.im != 0.0) {
            self.kind = NumKind::Complex;
        }
        Ok(())
    }

    /// Multiply the j-th column by `factors[j]` (right product with a diagonal matrix)
    pub fn scale_cols(&mut self, factors: &[Complex64]) -> Result<()> {
        if factors.len() != self.cols {
            return Err(MatrixError::DimensionMismatch(format!(
                "{} column factors for {} columns",
                factors.len(),
                self.cols
            )));
        }
        if self.is_diagonal() {
            return self.scale_rows(factors);
        }
        for (mut col, f) in self.data.columns_mut().into_iter().zip(factors.iter()) {
            col.mapv_inplace(|x| x * f);
        }
        if factors.iter().any(|v| v.im != 0.0) {
            self.kind = NumKind::Complex;
        }
        Ok(())
    }

    /// Largest element modulus
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, x| acc.max(x.norm()))
    }
}
