/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Reflection and transmission matrices of a composite layer
//!
//! The atoms of a layer are split into Bravais planes, one per atom, whose
//! multiple scattering is solved in angular-momentum space. The coupling
//! between planes is solved exactly by inverting the giant matrix
//!
//! ```text
//! M = I - [τ̃_j G(r_j - r_i)]_{ji}
//! ```
//!
//! and the result is converted to beam space on both sides.

use super::errors::{LayerError, Result};
use super::plane_wave::{emission_matrix, incidence_matrix, Direction};
use super::propagator::{
    bravais_tau, l_amplitude, reduced_t_matrix, truncate_t_matrix, GauntTable,
};
use crate::beams::{Beam, BeamList};
use crate::lattice::{sum_between_layers, sum_same_layer};
use crate::matrix::{partitioned_inverse, Matrix, NumKind};
use crate::structure::{Atom, Layer};
use crate::utils::constants::GEO_TOLERANCE;
use crate::utils::math::lm_count;
use log::{debug, trace};
use num_complex::Complex64;
use rayon::prelude::*;
use std::collections::HashMap;

/// Beam-space matrices of a layer
///
/// `+` waves travel towards the vacuum, `-` waves into the crystal. The
/// first sign is the exit direction, the second the incidence direction;
/// `rpm` is the reflection seen from above.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMatrices {
    pub tpp: Matrix,
    pub tmm: Matrix,
    pub rpm: Matrix,
    pub rmp: Matrix,
}

/// Angular-momentum cutoff and lattice-sum accuracy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeSettings {
    /// Upper bound of the angular momentum
    pub l_max: usize,
    /// Amplitude cutoff for lattice sums and for the effective `l_max`
    pub epsilon: f64,
}

/// Coupling tables kept between layers and energies, keyed by `l_max`
#[derive(Debug, Default)]
pub struct GauntCache {
    tables: HashMap<usize, GauntTable>,
}

impl GauntCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&mut self, l_max: usize) -> &GauntTable {
        self.tables
            .entry(l_max)
            .or_insert_with(|| GauntTable::new(l_max))
    }
}

/// Move the atoms of the most populated z-plane to the front
///
/// # Returns
///
/// The reordered atoms and the size of the leading plane. Planes are grouped
/// within `GEO_TOLERANCE`; on a tie the first plane met wins. The relative
/// order of atoms is kept on both sides of the split.
pub fn order_atoms(atoms: &[Atom]) -> (Vec<Atom>, usize) {
    let mut planes: Vec<(f64, usize)> = Vec::new();
    for atom in atoms {
        let z = atom.position[2];
        match planes.iter_mut().find(|(z0, _)| (z - *z0).abs() < GEO_TOLERANCE) {
            Some(plane) => plane.1 += 1,
            None => planes.push((z, 1)),
        }
    }
    let Some(&(z_front, count)) = planes
        .iter()
        .fold(None, |best: Option<&(f64, usize)>, plane| match best {
            Some(b) if b.1 >= plane.1 => Some(b),
            _ => Some(plane),
        })
    else {
        return (Vec::new(), 0);
    };

    let (mut front, back): (Vec<Atom>, Vec<Atom>) = atoms
        .iter()
        .cloned()
        .partition(|a| (a.position[2] - z_front).abs() < GEO_TOLERANCE);
    front.extend(back);
    (front, count)
}

/// Smallest `l` above which every t-matrix stays below `epsilon`, at least 1
pub fn effective_l_max(t_matrices: &[&Matrix], l_max: usize, epsilon: f64) -> usize {
    let l_eff = (1..=l_max)
        .rev()
        .find(|&l| t_matrices.iter().any(|t| l_amplitude(t, l) >= epsilon))
        .unwrap_or(1);
    l_eff.max(1).min(l_max)
}

/// Check that every atom has a square t-matrix of the expected order
fn validate_t_matrices(layer: &Layer, t_matrices: &[Matrix], l_max: usize) -> Result<()> {
    let n = lm_count(l_max);
    for (i, atom) in layer.atoms.iter().enumerate() {
        let id = atom.phase_shift.0;
        let t = t_matrices
            .get(id)
            .ok_or_else(|| LayerError::InvalidInputMatrix {
                layer: layer.index,
                atom: i,
                reason: format!("no t-matrix for phase shift set {}", id),
            })?;
        if t.rows() != n || t.cols() != n {
            return Err(LayerError::InvalidInputMatrix {
                layer: layer.index,
                atom: i,
                reason: format!(
                    "expected {}x{} for l_max = {}, got {}x{}",
                    n,
                    n,
                    l_max,
                    t.rows(),
                    t.cols()
                ),
            });
        }
    }
    Ok(())
}

/// Beams coupled by the layer periodicity
///
/// A 1x1 layer only couples beams of the same set; a superstructure layer
/// couples all of them.
fn bloch_classes(layer: &Layer, beams: &BeamList) -> Vec<Vec<usize>> {
    let n_sets = beams.set_count();
    if (layer.rel_area - 1.0).abs() < GEO_TOLERANCE && n_sets > 1 {
        (0..n_sets)
            .map(|set| {
                beams
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.set == set)
                    .map(|(i, _)| i)
                    .collect::<Vec<_>>()
            })
            .filter(|class| !class.is_empty())
            .collect()
    } else {
        vec![(0..beams.len()).collect()]
    }
}

/// Distinct vectors `r_j - r_i` for `i < j` and the index of each pair
fn pair_vectors(positions: &[[f64; 3]]) -> (Vec<[f64; 3]>, HashMap<(usize, usize), usize>) {
    let mut vectors: Vec<[f64; 3]> = Vec::new();
    let mut index = HashMap::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let d = [
                positions[j][0] - positions[i][0],
                positions[j][1] - positions[i][1],
                positions[j][2] - positions[i][2],
            ];
            let found = vectors.iter().position(|v| {
                (0..3).all(|c| (v[c] - d[c]).abs() < GEO_TOLERANCE)
            });
            let slot = match found {
                Some(slot) => slot,
                None => {
                    vectors.push(d);
                    vectors.len() - 1
                }
            };
            index.insert((i, j), slot);
        }
    }
    (vectors, index)
}

struct ClassMatrices {
    tpp: Matrix,
    tmm: Matrix,
    rpm: Matrix,
    rmp: Matrix,
}

/// Solve one Bloch class in the combined angular-momentum space
#[allow(clippy::too_many_arguments)]
fn solve_class(
    layer: &Layer,
    atoms: &[Atom],
    split: usize,
    beams: &[Beam],
    reduced: &HashMap<usize, Matrix>,
    k: Complex64,
    epsilon: f64,
    table: &GauntTable,
) -> Result<ClassMatrices> {
    let l_eff = table.l_max();
    let n = lm_count(l_eff);
    let k_in = beams[0].k_parallel();

    let in_plane = table.propagator(&sum_same_layer(
        k,
        k_in,
        layer.a1,
        layer.a2,
        table.lattice_sum_l_max(),
        epsilon,
    )?)?;

    let mut tau_by_set: HashMap<usize, Matrix> = HashMap::new();
    for (&id, t) in reduced {
        tau_by_set.insert(id, bravais_tau(t, &in_plane)?);
    }
    let taus: Vec<Matrix> = atoms
        .iter()
        .map(|a| tau_by_set[&a.phase_shift.0].clone())
        .collect();
    let positions: Vec<[f64; 3]> = atoms.iter().map(|a| a.position).collect();

    let n_atoms = atoms.len();
    let mut giant = Matrix::zeros(n_atoms * n, n_atoms * n, NumKind::Complex)?;
    giant.add_to_diagonal(&vec![Complex64::new(1.0, 0.0); n_atoms * n])?;

    if n_atoms > 1 {
        let (vectors, pair_index) = pair_vectors(&positions);
        let propagators: Vec<(Matrix, Matrix)> = vectors
            .par_iter()
            .map(|d| -> Result<(Matrix, Matrix)> {
                let sums = sum_between_layers(
                    k,
                    k_in,
                    layer.a1,
                    layer.a2,
                    *d,
                    table.lattice_sum_l_max(),
                    epsilon,
                )?;
                Ok((table.propagator(&sums.plus)?, table.propagator(&sums.minus)?))
            })
            .collect::<Result<Vec<_>>>()?;
        trace!(
            "layer {}: {} distinct pair vectors for {} atom pairs",
            layer.index,
            vectors.len(),
            pair_index.len()
        );

        let minus_one = Complex64::new(-1.0, 0.0);
        for ((i, j), slot) in &pair_index {
            let (g_plus, g_minus) = &propagators[*slot];
            let ji = Matrix::multiply(&taus[*j], g_plus)?.scale(minus_one);
            let ij = Matrix::multiply(&taus[*i], g_minus)?.scale(minus_one);
            giant.insert(&ji, j * n + 1, i * n + 1)?;
            giant.insert(&ij, i * n + 1, j * n + 1)?;
        }
    }

    let inverse = partitioned_inverse(&giant, split * n)?;

    let r_up = incidence_matrix(&taus, &positions, beams, l_eff, Direction::Up)?;
    let r_down = incidence_matrix(&taus, &positions, beams, l_eff, Direction::Down)?;
    let e_up = emission_matrix(&positions, beams, l_eff, layer.rel_area, Direction::Up)?;
    let e_down = emission_matrix(&positions, beams, l_eff, layer.rel_area, Direction::Down)?;

    let scattered_up = Matrix::multiply(&inverse, &r_up)?;
    let scattered_down = Matrix::multiply(&inverse, &r_down)?;

    Ok(ClassMatrices {
        tpp: Matrix::multiply(&e_up, &scattered_up)?,
        rmp: Matrix::multiply(&e_down, &scattered_up)?,
        tmm: Matrix::multiply(&e_down, &scattered_down)?,
        rpm: Matrix::multiply(&e_up, &scattered_down)?,
    })
}

/// Copy a class block into the full beam-space matrix
fn scatter_block(full: &mut Matrix, block: &Matrix, class: &[usize]) -> Result<()> {
    for (a, &ga) in class.iter().enumerate() {
        for (b, &gb) in class.iter().enumerate() {
            full.set(ga + 1, gb + 1, block.get(a + 1, b + 1)?)?;
        }
    }
    Ok(())
}

/// Reflection and transmission matrices of one layer
///
/// # Arguments
///
/// * `layer` - Layer with at least one atom
/// * `beams` - Selected beams at this energy
/// * `t_matrices` - Atomic t-matrices indexed by phase shift id, each
///   `(l_max+1)²` square
/// * `k` - Complex wave number in the crystal
/// * `settings` - Angular momentum cutoff and lattice-sum accuracy
/// * `cache` - Coupling tables
///
/// # Returns
///
/// [`LayerMatrices`] referenced to the bottom (`z_min`) and top (`z_max`)
/// points of the layer, including the unscattered wave in `tpp` and `tmm`.
pub fn assemble_composite(
    layer: &Layer,
    beams: &BeamList,
    t_matrices: &[Matrix],
    k: Complex64,
    settings: &CompositeSettings,
    cache: &mut GauntCache,
) -> Result<LayerMatrices> {
    if layer.atoms.is_empty() {
        return Err(LayerError::EmptyLayer(layer.index));
    }
    validate_t_matrices(layer, t_matrices, settings.l_max)?;

    let mut used: Vec<usize> = layer.atoms.iter().map(|a| a.phase_shift.0).collect();
    used.sort_unstable();
    used.dedup();
    let used_t: Vec<&Matrix> = used.iter().map(|&id| &t_matrices[id]).collect();
    let l_eff = effective_l_max(&used_t, settings.l_max, settings.epsilon);

    let mut reduced = HashMap::new();
    for &id in &used {
        let t = truncate_t_matrix(&t_matrices[id], l_eff)?;
        reduced.insert(id, reduced_t_matrix(&t, k));
    }

    let (atoms, split) = order_atoms(&layer.atoms);
    let classes = bloch_classes(layer, beams);
    debug!(
        "layer {}: {} atoms ({} in the leading plane), l_eff = {}, {} Bloch classes",
        layer.index,
        atoms.len(),
        split,
        l_eff,
        classes.len()
    );

    let table = cache.table(l_eff);
    let nb = beams.len();
    let mut tpp = Matrix::zeros(nb, nb, NumKind::Complex)?;
    let mut tmm = Matrix::zeros(nb, nb, NumKind::Complex)?;
    let mut rpm = Matrix::zeros(nb, nb, NumKind::Complex)?;
    let mut rmp = Matrix::zeros(nb, nb, NumKind::Complex)?;

    for class in &classes {
        let class_beams: Vec<Beam> = class.iter().map(|&g| beams[g].clone()).collect();
        let solved = solve_class(
            layer,
            &atoms,
            split,
            &class_beams,
            &reduced,
            k,
            settings.epsilon,
            table,
        )?;
        scatter_block(&mut tpp, &solved.tpp, class)?;
        scatter_block(&mut tmm, &solved.tmm, class)?;
        scatter_block(&mut rpm, &solved.rpm, class)?;
        scatter_block(&mut rmp, &solved.rmp, class)?;
    }

    // Reference the waves to the bottom and top of the layer
    let (z_min, z_max) = layer.z_range();
    let i = Complex64::i();
    let to_top: Vec<Complex64> = beams.iter().map(|b| (i * b.k_z() * z_max).exp()).collect();
    let from_bottom: Vec<Complex64> =
        beams.iter().map(|b| (-i * b.k_z() * z_min).exp()).collect();

    tpp.scale_rows(&to_top)?;
    tpp.scale_cols(&from_bottom)?;
    rpm.scale_rows(&to_top)?;
    rpm.scale_cols(&to_top)?;
    rmp.scale_rows(&from_bottom)?;
    rmp.scale_cols(&from_bottom)?;
    tmm.scale_rows(&from_bottom)?;
    tmm.scale_cols(&to_top)?;

    let unscattered: Vec<Complex64> = beams
        .iter()
        .map(|b| (i * b.k_z() * (z_max - z_min)).exp())
        .collect();
    tpp.add_to_diagonal(&unscattered)?;
    tmm.add_to_diagonal(&unscattered)?;

    Ok(LayerMatrices { tpp, tmm, rpm, rmp })
}
