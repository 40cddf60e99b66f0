/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Surface structure model: lattice, atoms, layers and the layered crystal

pub mod errors;
pub mod lattice;
pub mod layer;

pub use errors::{Result, StructureError};
pub use lattice::SurfaceLattice;
pub use layer::{separation, Atom, Crystal, Layer, LayerRole};
