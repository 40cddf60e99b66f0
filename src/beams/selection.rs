/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Per-energy selection of the active beams

use super::errors::{BeamError, Result};
use super::{cutoff_k2, Beam, BeamList, Incidence, OpticalPotential};
use crate::utils::math::damped_sqrt;
use log::debug;
use num_complex::Complex64;

/// Select the beams active at one energy and attach their wave vectors
///
/// # Arguments
///
/// * `full` - Beam list from [`generate`](super::generate)
/// * `energy` - Vacuum energy (Hartree)
/// * `potential` - Optical potential
/// * `incidence` - Incident beam direction
/// * `epsilon` - Smallest amplitude still regarded as significant
/// * `dmin` - Minimum interlayer distance (Bohr)
/// * `area` - Area of the 1x1 unit cell (Bohr²)
///
/// # Returns
///
/// The surviving beams in their original order. Evanescent beams are kept;
/// their `k_z` is dominated by its imaginary part.
pub fn select(
    full: &BeamList,
    energy: f64,
    potential: &OpticalPotential,
    incidence: &Incidence,
    epsilon: f64,
    dmin: f64,
    area: f64,
) -> Result<BeamList> {
    let e_crystal = potential.crystal_energy(energy);
    let k_max_2 = cutoff_k2(e_crystal.re, epsilon, dmin)?;
    let k_in = incidence.parallel_k(energy);
    let k = damped_sqrt(2.0 * e_crystal);

    let mut selected = Vec::new();
    for beam in full.iter() {
        let kx = beam.k_r[1] + k_in[0];
        let ky = beam.k_r[2] + k_in[1];
        let k_par_2 = kx * kx + ky * ky;
        if k_par_2 > k_max_2 {
            continue;
        }

        let k_z = damped_sqrt(2.0 * e_crystal - k_par_2);
        selected.push(Beam {
            k_r: [k.re, kx, ky, k_z.re],
            k_i: [k.im, 0.0, 0.0, k_z.im],
            phi: ky.atan2(kx),
            cos_theta: k_z / k,
            akz: Complex64::new(1.0, 0.0) / (area * k_z),
            ..beam.clone()
        });
    }

    if selected.is_empty() {
        return Err(BeamError::InvalidParameter(format!(
            "no beam inside the cutoff at {:.4} Hartree",
            energy
        )));
    }
    debug!(
        "selected {} of {} beams at {:.4} Hartree",
        selected.len(),
        full.len(),
        energy
    );
    Ok(BeamList::new(selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beams::generate;
    use crate::structure::SurfaceLattice;
    use approx::assert_relative_eq;

    fn setup() -> (SurfaceLattice, BeamList) {
        let lattice = SurfaceLattice::primitive([4.5, 0.0], [0.0, 4.5]).unwrap();
        let full = generate(4.0, &lattice, &Incidence::new(0.2, 0.3), -0.4, 1e-3, 2.5).unwrap();
        (lattice, full)
    }

    #[test]
    fn test_selection_is_order_preserving_subset() {
        let (lattice, full) = setup();
        let potential = OpticalPotential::new(-0.4, 0.15);
        let active = select(&full, 2.0, &potential, &Incidence::new(0.2, 0.3), 1e-3, 2.5, lattice.area).unwrap();
        assert!(active.len() <= full.len());
        let mut cursor = 0;
        for beam in active.iter() {
            let pos = full[cursor..]
                .iter()
                .position(|b| b.ind_1 == beam.ind_1 && b.ind_2 == beam.ind_2)
                .expect("selected beam must come from the full list");
            cursor += pos + 1;
        }
    }

    #[test]
    fn test_wave_vector_quantities() {
        let (lattice, full) = setup();
        let potential = OpticalPotential::new(-0.4, 0.15);
        let active = select(&full, 2.0, &potential, &Incidence::new(0.2, 0.3), 1e-3, 2.5, lattice.area).unwrap();
        let e = potential.crystal_energy(2.0);
        for beam in active.iter() {
            let k_z = beam.k_z();
            assert!(k_z.im >= 0.0);
            let k_par_2 = beam.k_r[1].powi(2) + beam.k_r[2].powi(2);
            let lhs = k_z * k_z + k_par_2;
            assert_relative_eq!(lhs.re, 2.0 * e.re, epsilon = 1e-10);
            assert_relative_eq!(lhs.im, 2.0 * e.im, epsilon = 1e-10);
            let akz = beam.akz * lattice.area * k_z;
            assert_relative_eq!(akz.re, 1.0, epsilon = 1e-12);
        }
        // Specular beam carries the incident parallel momentum
        let spec = &active[active.specular_index().unwrap()];
        let k_in = Incidence::new(0.2, 0.3).parallel_k(2.0);
        assert_relative_eq!(spec.k_r[1], k_in[0], epsilon = 1e-12);
        assert_relative_eq!(spec.phi, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_evanescent_beams_have_imaginary_kz() {
        let (lattice, full) = setup();
        let potential = OpticalPotential::new(-0.4, 0.05);
        let active = select(&full, 0.5, &potential, &Incidence::default(), 1e-3, 2.5, lattice.area).unwrap();
        let evanescent = active
            .iter()
            .filter(|b| b.k_r[1].powi(2) + b.k_r[2].powi(2) > b.k().re.powi(2));
        for beam in evanescent {
            assert!(beam.k_z().im > beam.k_z().re);
        }
    }
}
