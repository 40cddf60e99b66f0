/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Scattering matrices of single layers
//!
//! This module turns atomic t-matrices into the beam-space reflection and
//! transmission matrices of one layer:
//!
//! - [`propagator`] builds angular-momentum propagators from lattice sums and
//!   solves the multiple scattering inside one Bravais plane
//! - [`plane_wave`] converts between beams and spherical waves
//! - [`composite`] couples the planes of a layer through the giant matrix

pub mod composite;
pub mod errors;
pub mod plane_wave;
pub mod propagator;

pub use composite::{assemble_composite, CompositeSettings, GauntCache, LayerMatrices};
pub use errors::{LayerError, Result};
pub use plane_wave::Direction;
pub use propagator::GauntTable;
