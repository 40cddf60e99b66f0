/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Stacking two layers
//!
//! Layer `a` lies below layer `b`; `v` points from the top reference of `a`
//! to the bottom reference of `b`. Between the layers the beams pick up the
//! diagonal propagators
//!
//! ```text
//! P⁺ = exp(i( k_x v_x + k_y v_y + k_z v_z))   (upwards, a to b)
//! P⁻ = exp(i(-k_x v_x - k_y v_y + k_z v_z))   (downwards, b to a)
//! ```

use super::errors::{DoublingError, Result};
use crate::beams::Beam;
use crate::layer::LayerMatrices;
use crate::matrix::Matrix;
use num_complex::Complex64;

/// Diagonal propagators `(P⁺, P⁻)` over the vector `v`
pub fn interlayer_propagators(beams: &[Beam], v: [f64; 3]) -> (Vec<Complex64>, Vec<Complex64>) {
    let i = Complex64::i();
    beams
        .iter()
        .map(|b| {
            let k_par = b.k_parallel();
            let lateral = k_par[0] * v[0] + k_par[1] * v[1];
            let normal = b.k_z() * v[2];
            ((i * (lateral + normal)).exp(), (i * (normal - lateral)).exp())
        })
        .unzip()
}

fn check_separation(v: [f64; 3]) -> Result<()> {
    if v[2] <= 0.0 {
        return Err(DoublingError::NonPositiveSeparation(v[2]));
    }
    Ok(())
}

/// `I - m`
fn one_minus(m: &Matrix) -> Result<Matrix> {
    Ok(Matrix::identity(m.rows())?.sub(m)?)
}

/// Round trip `P⁺ R P⁻` of a wave reflected upwards by the lower layer
fn up_bounce(rpm_a: &Matrix, p_plus: &[Complex64], p_minus: &[Complex64]) -> Result<Matrix> {
    let mut m = rpm_a.clone();
    m.scale_cols(p_minus)?;
    m.scale_rows(p_plus)?;
    Ok(m)
}

/// Reflection matrix from above of `a` covered by `b`
///
/// # Arguments
///
/// * `rpm_a` - Reflection matrix of the lower stack
/// * `b` - Matrices of the upper layer
/// * `beams` - Selected beams
/// * `v` - Vector from the top of `a` to the bottom of `b` (Bohr), `v_z > 0`
///
/// # Returns
///
/// `Rpm_b + Tpp_b P⁺ Rpm_a P⁻ (I - Rmp_b P⁺ Rpm_a P⁻)⁻¹ Tmm_b`
pub fn combine(rpm_a: &Matrix, b: &LayerMatrices, beams: &[Beam], v: [f64; 3]) -> Result<Matrix> {
    check_separation(v)?;
    let (p_plus, p_minus) = interlayer_propagators(beams, v);

    let bounce = up_bounce(rpm_a, &p_plus, &p_minus)?;
    let x_inv = one_minus(&Matrix::multiply(&b.rmp, &bounce)?)?.inverse()?;

    let product = Matrix::multiply(
        &Matrix::multiply(&Matrix::multiply(&b.tpp, &bounce)?, &x_inv)?,
        &b.tmm,
    )?;
    Ok(b.rpm.add(&product)?)
}

/// All four matrices of `a` covered by `b`
///
/// The result is referenced to the bottom of `a` and the top of `b`. Its
/// `rpm` equals [`combine`] applied to `a.rpm`.
pub fn double_layer(
    a: &LayerMatrices,
    b: &LayerMatrices,
    beams: &[Beam],
    v: [f64; 3],
) -> Result<LayerMatrices> {
    check_separation(v)?;
    let (p_plus, p_minus) = interlayer_propagators(beams, v);

    // Waves entering from above bounce as P⁺ Rpm_a P⁻, from below as P⁻ Rmp_b P⁺
    let bounce_up = up_bounce(&a.rpm, &p_plus, &p_minus)?;
    let mut bounce_down = b.rmp.clone();
    bounce_down.scale_cols(&p_plus)?;
    bounce_down.scale_rows(&p_minus)?;

    let x_inv = one_minus(&Matrix::multiply(&b.rmp, &bounce_up)?)?.inverse()?;
    let y_inv = one_minus(&Matrix::multiply(&a.rpm, &bounce_down)?)?.inverse()?;

    let rpm = b.rpm.add(&Matrix::multiply(
        &Matrix::multiply(&Matrix::multiply(&b.tpp, &bounce_up)?, &x_inv)?,
        &b.tmm,
    )?)?;

    let mut tmm_a = a.tmm.clone();
    tmm_a.scale_cols(&p_minus)?;
    let tmm = Matrix::multiply(&Matrix::multiply(&tmm_a, &x_inv)?, &b.tmm)?;

    let mut tpp_b = b.tpp.clone();
    tpp_b.scale_cols(&p_plus)?;
    let tpp = Matrix::multiply(&Matrix::multiply(&tpp_b, &y_inv)?, &a.tpp)?;

    let rmp = a.rmp.add(&Matrix::multiply(
        &Matrix::multiply(&Matrix::multiply(&a.tmm, &bounce_down)?, &y_inv)?,
        &a.tpp,
    )?)?;

    Ok(LayerMatrices { tpp, tmm, rpm, rmp })
}
