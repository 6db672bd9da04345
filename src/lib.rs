//! Bookkeeping and layout for a 2-D atom built from protons, neutrons and
//! electrons.
//!
//! [`ParticleAtom`] tracks its members through reactive collections, keeps
//! counts, charge, mass number and nucleus radius derived from them, and
//! assigns every member a destination: electrons go to one of ten shell
//! positions, nucleons are packed into a stable cluster. Drawing and animating
//! particles towards their destinations is up to the host.

pub mod atom;
pub mod constants;
pub mod error;
pub mod physics;
pub mod reactive;

pub use atom::{AtomConfig, AtomCounts, ElectronPlacement, ParticleAtom, ParticleCollection};
pub use error::{AtomError, AtomResult};
pub use physics::particle::{Particle, ParticleKind, ParticleRef};
