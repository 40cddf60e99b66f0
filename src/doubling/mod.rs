/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Layer doubling
//!
//! Combines the beam-space matrices of single layers into those of a stack,
//! repeats the bulk unit until its reflection converges and adds the
//! overlayers on top.

pub mod combine;
pub mod errors;
pub mod stack;

pub use combine::{combine, double_layer, interlayer_propagators};
pub use errors::{DoublingError, Result};
pub use stack::{bulk_reflection, crystal_reflection};
