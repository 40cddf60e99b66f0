/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Linear algebra utilities using the Faer library
//!
//! Matrices are stored as ndarray arrays throughout the crate; dense products
//! above a small size are handed to faer.

use faer::Mat;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

/// Below this many multiply-adds the ndarray product is used directly
const FAER_PRODUCT_THRESHOLD: usize = 4096;

/// Convert from an ndarray view to faer::Mat<Complex64>
pub fn ndarray_to_faer(array: ArrayView2<'_, Complex64>) -> Mat<Complex64> {
    let (rows, cols) = array.dim();
    Mat::from_fn(rows, cols, |i, j| array[(i, j)])
}

/// Convert from faer::Mat<Complex64> to ndarray::Array2<Complex64>
pub fn faer_to_ndarray(matrix: &Mat<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| matrix[(i, j)])
}

/// Dense complex matrix product `a · b`
///
/// The caller guarantees `a.ncols() == b.nrows()`.
pub fn dense_product(a: ArrayView2<'_, Complex64>, b: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    let work = a.nrows() * a.ncols() * b.ncols();
    if work < FAER_PRODUCT_THRESHOLD {
        return a.dot(&b);
    }
    let a_faer = ndarray_to_faer(a);
    let b_faer = ndarray_to_faer(b);
    let product = &a_faer * &b_faer;
    faer_to_ndarray(&product)
}
