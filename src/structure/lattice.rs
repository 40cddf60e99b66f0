/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Two-dimensional surface lattice with an optional superstructure

use super::errors::{Result, StructureError};
use std::f64::consts::PI;

/// Smallest accepted cell area (Bohr²) and superstructure determinant
const DEGENERACY_TOLERANCE: f64 = 1.0e-8;

/// The 1x1 surface lattice, its reciprocal lattice and the superstructure
///
/// The superstructure matrix `M` expresses the superstructure basis in terms
/// of the 1x1 basis: `b1 = M11 a1 + M12 a2`, `b2 = M21 a1 + M22 a2`. The
/// reciprocal superstructure basis is `(M⁻¹)ᵀ` applied to the reciprocal 1x1
/// basis.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceLattice {
    /// Real-space 1x1 basis vectors (Bohr)
    pub a1: [f64; 2],
    pub a2: [f64; 2],
    /// Reciprocal 1x1 basis vectors (1/Bohr, `a_i · b_j = 2π δ_ij`)
    pub b1: [f64; 2],
    pub b2: [f64; 2],
    /// Area of the 1x1 unit cell (Bohr²)
    pub area: f64,
    pub superstructure: [[f64; 2]; 2],
    pub recip_superstructure: [[f64; 2]; 2],
    /// Superstructure cell area relative to the 1x1 cell
    pub rel_area: f64,
}

impl SurfaceLattice {
    /// Build a lattice from the 1x1 basis and the superstructure matrix
    ///
    /// # Arguments
    ///
    /// * `a1`, `a2` - Real-space 1x1 basis vectors in Bohr
    /// * `superstructure` - Superstructure matrix (identity for a 1x1 surface)
    pub fn new(a1: [f64; 2], a2: [f64; 2], superstructure: [[f64; 2]; 2]) -> Result<Self> {
        let det = a1[0] * a2[1] - a1[1] * a2[0];
        if det.abs() < DEGENERACY_TOLERANCE {
            return Err(StructureError::DegenerateLattice(format!(
                "basis vectors ({}, {}) and ({}, {}) span no area",
                a1[0], a1[1], a2[0], a2[1]
            )));
        }

        let b1 = [2.0 * PI * a2[1] / det, -2.0 * PI * a2[0] / det];
        let b2 = [-2.0 * PI * a1[1] / det, 2.0 * PI * a1[0] / det];

        let m = superstructure;
        let m_det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
        if m_det.abs() < DEGENERACY_TOLERANCE {
            return Err(StructureError::SingularSuperstructure(format!(
                "determinant {} of {:?}",
                m_det, m
            )));
        }
        let recip_superstructure = [
            [m[1][1] / m_det, -m[1][0] / m_det],
            [-m[0][1] / m_det, m[0][0] / m_det],
        ];

        Ok(Self {
            a1,
            a2,
            b1,
            b2,
            area: det.abs(),
            superstructure,
            recip_superstructure,
            rel_area: m_det.abs(),
        })
    }

    /// 1x1 lattice without superstructure
    pub fn primitive(a1: [f64; 2], a2: [f64; 2]) -> Result<Self> {
        Self::new(a1, a2, [[1.0, 0.0], [0.0, 1.0]])
    }

    /// Real-space superstructure basis vectors
    pub fn superstructure_basis(&self) -> ([f64; 2], [f64; 2]) {
        let m = self.superstructure;
        let combine = |c1: f64, c2: f64| {
            [
                c1 * self.a1[0] + c2 * self.a2[0],
                c1 * self.a1[1] + c2 * self.a2[1],
            ]
        };
        (combine(m[0][0], m[0][1]), combine(m[1][0], m[1][1]))
    }

    /// Parallel wave vector of the beam with fractional indices `(ind_1, ind_2)`
    pub fn reciprocal_vector(&self, ind_1: f64, ind_2: f64) -> [f64; 2] {
        [
            ind_1 * self.b1[0] + ind_2 * self.b2[0],
            ind_1 * self.b1[1] + ind_2 * self.b2[1],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reciprocal_basis_orthogonality() {
        let lattice = SurfaceLattice::primitive([4.8, 0.0], [2.4, 4.157]).unwrap();
        let dot = |a: [f64; 2], b: [f64; 2]| a[0] * b[0] + a[1] * b[1];
        assert_relative_eq!(dot(lattice.a1, lattice.b1), 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(dot(lattice.a2, lattice.b2), 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(dot(lattice.a1, lattice.b2), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dot(lattice.a2, lattice.b1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(lattice.rel_area, 1.0);
    }

    #[test]
    fn test_superstructure_transforms() {
        let lattice =
            SurfaceLattice::new([5.0, 0.0], [0.0, 5.0], [[2.0, 0.0], [0.0, 1.0]]).unwrap();
        assert_relative_eq!(lattice.rel_area, 2.0);
        assert_relative_eq!(lattice.recip_superstructure[0][0], 0.5);
        assert_relative_eq!(lattice.recip_superstructure[1][1], 1.0);
        let (s1, s2) = lattice.superstructure_basis();
        assert_eq!(s1, [10.0, 0.0]);
        assert_eq!(s2, [0.0, 5.0]);
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        assert!(matches!(
            SurfaceLattice::primitive([1.0, 0.0], [2.0, 0.0]),
            Err(StructureError::DegenerateLattice(_))
        ));
        assert!(matches!(
            SurfaceLattice::new([1.0, 0.0], [0.0, 1.0], [[1.0, 2.0], [2.0, 4.0]]),
            Err(StructureError::SingularSuperstructure(_))
        ));
    }
}
