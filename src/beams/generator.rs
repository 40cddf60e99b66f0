/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Generation of the full beam list up to a maximum energy

use super::errors::{BeamError, Result};
use super::{cutoff_k2, Beam, BeamList, Incidence};
use crate::structure::SurfaceLattice;
use crate::utils::constants::K_TOLERANCE;
use log::{debug, warn};
use num_complex::Complex64;
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Resolution used to compare fractional beam indices
const INDEX_RESOLUTION: f64 = 1.0e6;

/// Enumerate the beam sets of the superstructure
///
/// Each beam set is a coset of the 1x1 reciprocal lattice inside the
/// superstructure reciprocal lattice, represented by its offset in the unit
/// diamond `[0, 1) x [0, 1)` of the 1x1 reciprocal basis. Set 0 is always the
/// integer-order set.
///
/// Every combination `n1 g1 + n2 g2` of the superstructure reciprocal basis is
/// reduced modulo the 1x1 reciprocal lattice. Since `det(M)` times the
/// reciprocal superstructure matrix is integral, `0 ≤ n1, n2 < det(M)` reaches
/// every coset whatever the shape of `M`. A count that differs from the area
/// ratio is reported but not fatal.
pub fn beam_sets(lattice: &SurfaceLattice) -> Vec<[f64; 2]> {
    let expected = lattice.rel_area.round() as usize;
    let n_scan = expected.max(1) as i64;
    let m = lattice.recip_superstructure;

    let mut sets = vec![[0.0, 0.0]];
    for n1 in 0..n_scan {
        for n2 in 0..n_scan {
            let kx = reduce_unit(n1 as f64 * m[0][0] + n2 as f64 * m[1][0]);
            let ky = reduce_unit(n1 as f64 * m[0][1] + n2 as f64 * m[1][1]);
            let duplicate = sets
                .iter()
                .any(|s| (s[0] - kx).abs() < K_TOLERANCE && (s[1] - ky).abs() < K_TOLERANCE);
            if !duplicate {
                sets.push([kx, ky]);
            }
        }
    }

    if sets.len() != expected {
        warn!(
            "found {} beam sets, expected {} from the superstructure area",
            sets.len(),
            expected
        );
    }
    sets
}

/// Fractional part in `[0, 1)`, with values within tolerance of 1 folded to 0
fn reduce_unit(value: f64) -> f64 {
    let reduced = value.rem_euclid(1.0);
    if reduced < K_TOLERANCE || reduced > 1.0 - K_TOLERANCE {
        0.0
    } else {
        reduced
    }
}

fn index_key(value: f64) -> i64 {
    (value * INDEX_RESOLUTION).round() as i64
}

/// Sort beams by `k_par` in tolerance bands, then by `ind_1`, then by `ind_2`
pub fn sort_beams(beams: &mut [Beam]) {
    beams.sort_by(|a, b| a.k_par.total_cmp(&b.k_par));

    let mut start = 0;
    while start < beams.len() {
        let band_floor = beams[start].k_par;
        let mut end = start + 1;
        while end < beams.len() && beams[end].k_par - band_floor < K_TOLERANCE {
            end += 1;
        }
        beams[start..end].sort_by(|a, b| {
            match index_key(a.ind_1).cmp(&index_key(b.ind_1)) {
                Ordering::Equal => index_key(a.ind_2).cmp(&index_key(b.ind_2)),
                other => other,
            }
        });
        start = end;
    }
}

/// Generate every beam relevant up to `energy_max`
///
/// # Arguments
///
/// * `energy_max` - Highest vacuum energy of the run (Hartree)
/// * `lattice` - Surface lattice with superstructure
/// * `incidence` - Incident beam direction
/// * `vr` - Real part of the optical potential (Hartree)
/// * `epsilon` - Smallest amplitude still regarded as significant
/// * `dmin` - Minimum interlayer distance (Bohr)
///
/// # Returns
///
/// The beams with `|g| ≤ k_cut + |k_in|`, where `k_cut` is the cutoff wave
/// number at `energy_max` and `k_in` the incident parallel momentum there,
/// sorted canonically. This disc contains every `g` with
/// `|g + k_in| ≤ k_cut`, and also the beams `select` keeps at lower
/// energies, where the incident direction is the same but `k_in` is shorter.
pub fn generate(
    energy_max: f64,
    lattice: &SurfaceLattice,
    incidence: &Incidence,
    vr: f64,
    epsilon: f64,
    dmin: f64,
) -> Result<BeamList> {
    let energy = energy_max - vr;
    if energy <= 0.0 {
        return Err(BeamError::InvalidParameter(format!(
            "crystal energy {} Hartree is not positive",
            energy
        )));
    }

    let k_in = incidence.parallel_k(energy_max);
    let k_in_abs = k_in[0].hypot(k_in[1]);
    // Radius of the selection disc plus the largest incident shift
    let k_max = cutoff_k2(energy, epsilon, dmin)?.sqrt() + k_in_abs;
    let k_max_2 = k_max * k_max;

    let capacity = 2 + (lattice.rel_area * lattice.area * k_max_2 / (PI * PI)) as usize;
    let mut beams: Vec<Beam> = Vec::new();
    beams
        .try_reserve(capacity)
        .map_err(|_| BeamError::AllocationError(capacity))?;

    let len_1 = lattice.b1[0].hypot(lattice.b1[1]);
    let len_2 = lattice.b2[0].hypot(lattice.b2[1]);
    let cos_gamma = (lattice.b1[0] * lattice.b2[0] + lattice.b1[1] * lattice.b2[1]) / (len_1 * len_2);
    let sin_gamma = (1.0 - cos_gamma * cos_gamma).sqrt();

    let n2_max = 2 + (k_max / (len_2 * sin_gamma)) as i64;
    let n1_max = 2 + (k_max / (len_1 * sin_gamma) + n2_max as f64 * len_2 * cos_gamma.abs() / len_1) as i64;

    let sets = beam_sets(lattice);
    for (set, offset) in sets.iter().enumerate() {
        for n1 in -n1_max..=n1_max {
            for n2 in -n2_max..=n2_max {
                let ind_1 = n1 as f64 + offset[0];
                let ind_2 = n2 as f64 + offset[1];
                let g = lattice.reciprocal_vector(ind_1, ind_2);
                let k_par = g[0] * g[0] + g[1] * g[1];
                if k_par > k_max_2 {
                    continue;
                }
                beams.push(Beam {
                    ind_1,
                    ind_2,
                    set,
                    k_par,
                    k_r: [0.0, g[0], g[1], 0.0],
                    k_i: [0.0; 4],
                    phi: 0.0,
                    cos_theta: Complex64::new(1.0, 0.0),
                    akz: Complex64::new(1.0 / lattice.area, 0.0),
                });
            }
        }
    }

    sort_beams(&mut beams);
    debug!(
        "generated {} beams in {} sets up to {:.4} Hartree (k_max = {:.4})",
        beams.len(),
        sets.len(),
        energy_max,
        k_max
    );
    Ok(BeamList::new(beams))
}
