//! Particles and the two placement algorithms: electron shell positions and
//! nucleon packing.

pub mod electron;
pub mod nucleus;
pub mod particle;
