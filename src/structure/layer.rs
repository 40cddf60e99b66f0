/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Atoms, layers and the layered crystal
//!
//! The z axis points from the bulk towards the vacuum. Layers are stored from
//! the deepest to the outermost; the bulk layers come first and form the bulk
//! unit that repeats by `bulk_repeat`.

use super::errors::{Result, StructureError};
use super::lattice::SurfaceLattice;
use crate::phase::PhaseShiftId;
use serde::{Deserialize, Serialize};

/// An atom of a layer
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Phase-shift set describing the scatterer
    pub phase_shift: PhaseShiftId,
    /// Position in layer coordinates (Bohr)
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(phase_shift: PhaseShiftId, position: [f64; 3]) -> Self {
        Self {
            phase_shift,
            position,
        }
    }
}

/// Role of a layer in the crystal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    /// Part of the periodically repeated bulk unit (1x1 periodicity)
    Bulk,
    /// Stacked once on top of the bulk (superstructure periodicity)
    Overlayer,
}

/// A set of atoms sharing one two-dimensional lattice
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub index: usize,
    pub role: LayerRole,
    /// Position of the layer coordinate origin in crystal coordinates (Bohr)
    pub origin: [f64; 3],
    /// Real-space basis of the layer periodicity (Bohr)
    pub a1: [f64; 2],
    pub a2: [f64; 2],
    /// Layer cell area relative to the 1x1 cell
    pub rel_area: f64,
    pub atoms: Vec<Atom>,
}

impl Layer {
    /// Create a layer with the periodicity its role implies on `lattice`
    pub fn new(
        index: usize,
        role: LayerRole,
        origin: [f64; 3],
        lattice: &SurfaceLattice,
        atoms: Vec<Atom>,
    ) -> Result<Self> {
        if atoms.is_empty() {
            return Err(StructureError::EmptyLayer(index));
        }
        let (a1, a2, rel_area) = match role {
            LayerRole::Bulk => (lattice.a1, lattice.a2, 1.0),
            LayerRole::Overlayer => {
                let (b1, b2) = lattice.superstructure_basis();
                (b1, b2, lattice.rel_area)
            }
        };
        Ok(Self {
            index,
            role,
            origin,
            a1,
            a2,
            rel_area,
            atoms,
        })
    }

    /// Lowest and highest atomic z coordinate in layer coordinates
    pub fn z_range(&self) -> (f64, f64) {
        self.atoms.iter().fold((f64::MAX, f64::MIN), |(lo, hi), atom| {
            (lo.min(atom.position[2]), hi.max(atom.position[2]))
        })
    }

    /// Point to which incidence from below and exit downwards are referenced
    pub fn bottom_reference(&self) -> [f64; 3] {
        let (z_min, _) = self.z_range();
        [self.origin[0], self.origin[1], self.origin[2] + z_min]
    }

    /// Point to which incidence from above and exit upwards are referenced
    pub fn top_reference(&self) -> [f64; 3] {
        let (_, z_max) = self.z_range();
        [self.origin[0], self.origin[1], self.origin[2] + z_max]
    }
}

/// Vector from point `a` to point `b`
pub fn separation(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [b[0] - a[0], b[1] - a[1], b[2] - a[2]]
}

/// Layered crystal: semi-infinite bulk plus overlayers
#[derive(Debug, Clone, PartialEq)]
pub struct Crystal {
    pub lattice: SurfaceLattice,
    /// Layers from the deepest to the outermost
    pub layers: Vec<Layer>,
    /// Translation between equivalent points of consecutive bulk units (Bohr)
    pub bulk_repeat: [f64; 3],
    /// Minimum interlayer spacing used for the beam cutoff (Bohr)
    pub dmin: f64,
}

impl Crystal {
    /// Assemble and validate a crystal
    pub fn new(
        lattice: SurfaceLattice,
        layers: Vec<Layer>,
        bulk_repeat: [f64; 3],
        dmin: f64,
    ) -> Result<Self> {
        let n_bulk = layers
            .iter()
            .take_while(|layer| layer.role == LayerRole::Bulk)
            .count();
        if n_bulk == 0 {
            return Err(StructureError::InvalidCrystal(
                "the deepest layer must belong to the bulk".to_string(),
            ));
        }
        if layers[n_bulk..].iter().any(|l| l.role == LayerRole::Bulk) {
            return Err(StructureError::InvalidCrystal(
                "bulk layers must precede all overlayers".to_string(),
            ));
        }
        if bulk_repeat[2] <= 0.0 {
            return Err(StructureError::InvalidCrystal(format!(
                "bulk repeat vector must point towards the surface, got z = {}",
                bulk_repeat[2]
            )));
        }
        if dmin <= 0.0 {
            return Err(StructureError::InvalidCrystal(format!(
                "minimum interlayer spacing must be positive, got {}",
                dmin
            )));
        }
        Ok(Self {
            lattice,
            layers,
            bulk_repeat,
            dmin,
        })
    }

    pub fn bulk_layers(&self) -> &[Layer] {
        let n_bulk = self
            .layers
            .iter()
            .take_while(|layer| layer.role == LayerRole::Bulk)
            .count();
        &self.layers[..n_bulk]
    }

    pub fn overlayers(&self) -> &[Layer] {
        let n_bulk = self.bulk_layers().len();
        &self.layers[n_bulk..]
    }

    /// Vector from the top of one bulk unit to the bottom of the next
    pub fn bulk_gap(&self) -> [f64; 3] {
        let bulk = self.bulk_layers();
        let bottom = bulk[0].bottom_reference();
        let top = bulk[bulk.len() - 1].top_reference();
        let thickness = separation(bottom, top);
        [
            self.bulk_repeat[0] - thickness[0],
            self.bulk_repeat[1] - thickness[1],
            self.bulk_repeat[2] - thickness[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lattice() -> SurfaceLattice {
        SurfaceLattice::new([5.0, 0.0], [0.0, 5.0], [[2.0, 0.0], [0.0, 2.0]]).unwrap()
    }

    fn atom(z: f64) -> Atom {
        Atom::new(PhaseShiftId(0), [0.0, 0.0, z])
    }

    #[test]
    fn test_layer_periodicity_follows_role() {
        let lat = lattice();
        let bulk = Layer::new(0, LayerRole::Bulk, [0.0; 3], &lat, vec![atom(0.0)]).unwrap();
        assert_eq!(bulk.a1, [5.0, 0.0]);
        assert_relative_eq!(bulk.rel_area, 1.0);
        let over = Layer::new(1, LayerRole::Overlayer, [0.0; 3], &lat, vec![atom(0.0)]).unwrap();
        assert_eq!(over.a1, [10.0, 0.0]);
        assert_relative_eq!(over.rel_area, 4.0);
    }

    #[test]
    fn test_empty_layer_rejected() {
        assert_eq!(
            Layer::new(3, LayerRole::Bulk, [0.0; 3], &lattice(), vec![]),
            Err(StructureError::EmptyLayer(3))
        );
    }

    #[test]
    fn test_reference_points_and_gap() {
        let lat = lattice();
        let bulk = Layer::new(
            0,
            LayerRole::Bulk,
            [0.0, 0.0, 1.0],
            &lat,
            vec![atom(-0.5), atom(0.5)],
        )
        .unwrap();
        assert_eq!(bulk.bottom_reference(), [0.0, 0.0, 0.5]);
        assert_eq!(bulk.top_reference(), [0.0, 0.0, 1.5]);
        let crystal = Crystal::new(lat, vec![bulk], [1.0, 0.0, 3.0], 1.0).unwrap();
        assert_eq!(crystal.bulk_gap(), [1.0, 0.0, 2.0]);
        assert!(crystal.overlayers().is_empty());
    }

    #[test]
    fn test_crystal_requires_bulk_first() {
        let lat = lattice();
        let over = Layer::new(0, LayerRole::Overlayer, [0.0; 3], &lat, vec![atom(0.0)]).unwrap();
        let bulk = Layer::new(1, LayerRole::Bulk, [0.0; 3], &lat, vec![atom(0.0)]).unwrap();
        assert!(Crystal::new(lat.clone(), vec![over.clone(), bulk.clone()], [0.0, 0.0, 2.0], 1.0).is_err());
        assert!(Crystal::new(lat.clone(), vec![bulk.clone(), over, bulk], [0.0, 0.0, 2.0], 1.0).is_err());
    }
}
