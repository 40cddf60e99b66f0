/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

use approx::assert_relative_eq;
use leed_rs::matrix::{partitioned_inverse, Matrix, MatrixError, NumKind};
use num_complex::Complex64;
use rstest::rstest;

/// Well-conditioned complex test matrix
fn test_matrix(n: usize) -> Matrix {
    let mut m = Matrix::zeros(n, n, NumKind::Complex).unwrap();
    for i in 1..=n {
        for j in 1..=n {
            let x = ((i * 5 + j * 3) % 7) as f64 / 7.0;
            let diag = if i == j { 10.0 } else { 0.0 };
            m.set(i, j, Complex64::new(diag + x, 0.3 * x - 0.1)).unwrap();
        }
    }
    m
}

fn assert_identity(m: &Matrix) {
    for i in 1..=m.rows() {
        for j in 1..=m.cols() {
            let expected = if i == j { 1.0 } else { 0.0 };
            let v = m.get(i, j).unwrap();
            assert_relative_eq!(v.re, expected, epsilon = 1e-10);
            assert_relative_eq!(v.im, 0.0, epsilon = 1e-10);
        }
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(4)]
#[case(7)]
#[case(9)]
fn test_partitioned_inverse_matches_full(#[case] split: usize) {
    let m = test_matrix(9);
    let full = m.inverse().unwrap();
    let parted = partitioned_inverse(&m, split).unwrap();
    assert!(full.sub(&parted).unwrap().max_abs() < 1e-10);
    assert_identity(&Matrix::multiply(&m, &parted).unwrap());
}

#[test]
fn test_partition_beyond_order_rejected() {
    let m = test_matrix(3);
    assert!(matches!(
        partitioned_inverse(&m, 4),
        Err(MatrixError::DimensionMismatch(_))
    ));
}

#[test]
fn test_singular_matrix_reported() {
    let mut m = Matrix::zeros(3, 3, NumKind::Complex).unwrap();
    m.set(1, 1, Complex64::new(1.0, 0.0)).unwrap();
    assert!(matches!(m.inverse(), Err(MatrixError::SingularMatrix(_))));
}

#[test]
fn test_block_insert_and_extract() {
    let mut big = Matrix::zeros(6, 6, NumKind::Complex).unwrap();
    let block = test_matrix(3);
    big.insert(&block, 4, 2).unwrap();
    let back = big.extract(4, 2, 3, 3).unwrap();
    assert!(back.sub(&block).unwrap().max_abs() < 1e-15);
    assert_eq!(big.get(1, 1).unwrap(), Complex64::new(0.0, 0.0));
}

#[test]
fn test_diagonal_product_stays_diagonal() {
    let a = Matrix::diagonal(&[Complex64::new(2.0, 0.0), Complex64::new(0.0, 1.0)]).unwrap();
    let b = Matrix::diagonal(&[Complex64::new(0.5, 0.0), Complex64::new(0.0, -1.0)]).unwrap();
    let p = Matrix::multiply(&a, &b).unwrap();
    assert!(p.is_diagonal());
    assert_identity(&p);
}

#[test]
fn test_in_place_operations_reuse_buffers() {
    let m = test_matrix(5);
    let mut inv = m.clone();
    inv.invert_in_place().unwrap();

    let mut product = Matrix::reuse_or_zeros(None, 5, 5, NumKind::Complex).unwrap();
    Matrix::multiply_into(&mut product, &m, &inv).unwrap();
    assert_identity(&product);

    let mut reused = Matrix::reuse_or_zeros(Some(product), 5, 5, NumKind::Complex).unwrap();
    assert_eq!(reused.max_abs(), 0.0);
    Matrix::multiply_into(&mut reused, &inv, &m).unwrap();
    assert_identity(&reused);
    assert_eq!(reused.clone().into_array().dim(), (5, 5));
}
