/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Semi-infinite bulk and the full crystal stack

use super::combine::{combine, double_layer};
use super::errors::{DoublingError, Result};
use crate::beams::Beam;
use crate::layer::LayerMatrices;
use crate::matrix::{Matrix, MatrixError};
use crate::structure::{separation, Crystal};
use log::{debug, info};

/// Reflection matrix of a semi-infinite repetition of `unit`
///
/// The stack is doubled until the reflection matrix stops changing. Every
/// doubled stack is separated from its copy by the same `gap`, since the
/// reference points sit at the outer atoms of each stack.
///
/// # Arguments
///
/// * `unit` - Matrices of one bulk unit
/// * `beams` - Selected beams
/// * `gap` - Vector from the top of one unit to the bottom of the next (Bohr)
/// * `max_doublings` - Upper limit of doubling steps
/// * `tolerance` - Largest element change accepted as converged
pub fn bulk_reflection(
    unit: &LayerMatrices,
    beams: &[Beam],
    gap: [f64; 3],
    max_doublings: usize,
    tolerance: f64,
) -> Result<Matrix> {
    let mut stack = unit.clone();
    let mut change = f64::INFINITY;
    for step in 1..=max_doublings {
        let doubled = double_layer(&stack, &stack, beams, gap)?;
        change = doubled.rpm.sub(&stack.rpm)?.max_abs();
        debug!("doubling {}: max |dR| = {:.3e}", step, change);
        stack = doubled;
        if change < tolerance {
            return Ok(stack.rpm);
        }
    }
    Err(DoublingError::NonConvergence {
        doublings: max_doublings,
        change,
    })
}

/// Reflection matrix of the whole crystal, referenced to the top of the
/// outermost layer
///
/// # Arguments
///
/// * `crystal` - Layer geometry
/// * `layers` - Matrices of every layer of `crystal`, in the same order
/// * `beams` - Selected beams
/// * `max_doublings`, `tolerance` - Convergence control of the bulk
pub fn crystal_reflection(
    crystal: &Crystal,
    layers: &[LayerMatrices],
    beams: &[Beam],
    max_doublings: usize,
    tolerance: f64,
) -> Result<Matrix> {
    if layers.len() != crystal.layers.len() {
        return Err(MatrixError::DimensionMismatch(format!(
            "{} layer matrices for {} layers",
            layers.len(),
            crystal.layers.len()
        ))
        .into());
    }

    let bulk = crystal.bulk_layers();
    let mut unit = layers[0].clone();
    for (pair, matrices) in bulk.windows(2).zip(&layers[1..bulk.len()]) {
        let v = separation(pair[0].top_reference(), pair[1].bottom_reference());
        unit = double_layer(&unit, matrices, beams, v)?;
    }

    let mut rpm = bulk_reflection(&unit, beams, crystal.bulk_gap(), max_doublings, tolerance)?;

    let mut top = bulk[bulk.len() - 1].top_reference();
    for (layer, matrices) in crystal.overlayers().iter().zip(&layers[bulk.len()..]) {
        let v = separation(top, layer.bottom_reference());
        rpm = combine(&rpm, matrices, beams, v)?;
        top = layer.top_reference();
    }
    info!(
        "stacked {} bulk and {} overlayers, max |R| = {:.4}",
        bulk.len(),
        crystal.overlayers().len(),
        rpm.max_abs()
    );
    Ok(rpm)
}
