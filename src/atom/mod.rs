//! The particle atom: collections of member particles, derived counts and the
//! orchestration of electron and nucleon placement.

pub mod collection;
pub mod config;
pub mod model;

pub use collection::ParticleCollection;
pub use config::{AtomConfig, ElectronPlacement};
pub use model::{AtomCounts, ParticleAtom, ShellPosition};
