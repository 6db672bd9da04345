use crate::error::AtomError;
use crate::reactive::Property;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PARTICLE_ID: AtomicU64 = AtomicU64::new(1);

/// Shared handle to a particle. The atom keeps handles, never copies, so the
/// renderer, the animator and the atom all observe the same particle.
pub type ParticleRef = Rc<Particle>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Proton,
    Neutron,
    Electron,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [Self::Proton, Self::Neutron, Self::Electron];

    pub fn is_nucleon(self) -> bool {
        matches!(self, Self::Proton | Self::Neutron)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proton => "proton",
            Self::Neutron => "neutron",
            Self::Electron => "electron",
        }
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ParticleKind {
    type Err = AtomError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| AtomError::UnknownParticleKind(tag.to_owned()))
    }
}

/// A proton, neutron or electron owned by the host application.
///
/// Only the atom writes `destination`; only the host's animation loop moves
/// `position` towards it; only input handling toggles `user_controlled`.
pub struct Particle {
    id: u64,
    kind: ParticleKind,
    pub position: Property<DVec2>,
    pub destination: Property<DVec2>,
    pub user_controlled: Property<bool>,
    /// Draw order for overlapping nucleons; 0 is the back-most layer.
    pub z_layer: Property<u32>,
}

impl Particle {
    pub fn new(kind: ParticleKind, position: DVec2) -> ParticleRef {
        Rc::new(Self {
            id: NEXT_PARTICLE_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            position: Property::new(position),
            destination: Property::new(position),
            user_controlled: Property::new(false),
            z_layer: Property::new(0),
        })
    }

    pub fn proton() -> ParticleRef {
        Self::new(ParticleKind::Proton, DVec2::ZERO)
    }

    pub fn neutron() -> ParticleRef {
        Self::new(ParticleKind::Neutron, DVec2::ZERO)
    }

    pub fn electron() -> ParticleRef {
        Self::new(ParticleKind::Electron, DVec2::ZERO)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn position(&self) -> DVec2 {
        self.position.get()
    }

    pub fn set_position(&self, position: DVec2) {
        self.position.set(position);
    }

    pub fn destination(&self) -> DVec2 {
        self.destination.get()
    }

    pub fn set_destination(&self, destination: DVec2) {
        self.destination.set(destination);
    }

    pub fn set_position_and_destination(&self, position: DVec2) {
        self.destination.set(position);
        self.position.set(position);
    }

    pub fn is_at_destination(&self) -> bool {
        self.position.get() == self.destination.get()
    }

    pub fn is_user_controlled(&self) -> bool {
        self.user_controlled.get()
    }

    pub fn set_user_controlled(&self, controlled: bool) {
        self.user_controlled.set(controlled);
    }

    pub fn z_layer(&self) -> u32 {
        self.z_layer.get()
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("position", &self.position.get())
            .field("destination", &self.destination.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_round_trip_through_strings() {
        for kind in ParticleKind::ALL {
            assert_eq!(kind.to_string().parse::<ParticleKind>(), Ok(kind));
        }
        assert_eq!(
            "quark".parse::<ParticleKind>(),
            Err(AtomError::UnknownParticleKind("quark".to_owned()))
        );
    }

    #[test]
    fn new_particle_rests_at_its_position() {
        let particle = Particle::new(ParticleKind::Neutron, DVec2::new(4.0, -2.0));
        assert!(particle.is_at_destination());
        assert!(!particle.is_user_controlled());
        particle.set_destination(DVec2::ZERO);
        assert!(!particle.is_at_destination());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Particle::proton().id(), Particle::proton().id());
    }
}
