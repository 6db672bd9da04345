use crate::constants::{
    DEFAULT_INNER_SHELL_RADIUS, DEFAULT_NUCLEON_RADIUS, DEFAULT_OUTER_SHELL_RADIUS,
};
use crate::error::{AtomError, AtomResult};
use crate::physics::nucleus::MAX_NUCLEON_RADIUS;
pub use crate::physics::electron::ElectronPlacement;
use serde::{Deserialize, Serialize};

/// Construction-time geometry of a [`ParticleAtom`](crate::atom::ParticleAtom).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtomConfig {
    pub nucleon_radius: f64,
    pub inner_shell_radius: f64,
    pub outer_shell_radius: f64,
    pub electron_placement: ElectronPlacement,
}

impl Default for AtomConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_NUCLEON_RADIUS,
            DEFAULT_INNER_SHELL_RADIUS,
            DEFAULT_OUTER_SHELL_RADIUS,
        )
    }
}

impl AtomConfig {
    pub const fn new(nucleon_radius: f64, inner_shell_radius: f64, outer_shell_radius: f64) -> Self {
        Self {
            nucleon_radius,
            inner_shell_radius,
            outer_shell_radius,
            electron_placement: ElectronPlacement::Proximal,
        }
    }

    pub const fn with_placement(mut self, electron_placement: ElectronPlacement) -> Self {
        self.electron_placement = electron_placement;
        self
    }

    pub fn validate(&self) -> AtomResult<()> {
        for (name, value) in [
            ("nucleon_radius", self.nucleon_radius),
            ("inner_shell_radius", self.inner_shell_radius),
            ("outer_shell_radius", self.outer_shell_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AtomError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.nucleon_radius >= MAX_NUCLEON_RADIUS {
            return Err(AtomError::InvalidConfig(format!(
                "nucleon_radius must be below {MAX_NUCLEON_RADIUS}, got {}",
                self.nucleon_radius
            )));
        }
        // Inner positions must be nearer the center for inner-first filling.
        if self.inner_shell_radius >= self.outer_shell_radius {
            return Err(AtomError::InvalidConfig(format!(
                "inner shell radius {} must be smaller than outer shell radius {}",
                self.inner_shell_radius, self.outer_shell_radius
            )));
        }
        Ok(())
    }
}
