use crate::constants::{INNER_SHELL_CAPACITY, OUTER_SHELL_CAPACITY};
use crate::error::{AtomError, AtomResult};
use crate::physics::particle::ParticleRef;
use glam::DVec2;
use rand::RngCore;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;
use std::rc::Rc;

const TIE_TOLERANCE: f64 = 1e-9;

/// How an added electron picks among the open shell positions of one shell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectronPlacement {
    /// Closest open position to where the electron currently is.
    #[default]
    Proximal,
    /// Any open position, chosen by the injected random source.
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Inner,
    Outer,
}

/// One candidate electron position, relative to the atom center.
#[derive(Clone, Debug)]
pub struct ShellSlot {
    shell: Shell,
    radius: f64,
    offset: DVec2,
    occupant: Option<ParticleRef>,
}

impl ShellSlot {
    fn new(shell: Shell, radius: f64, angle: f64) -> Self {
        Self {
            shell,
            radius,
            offset: DVec2::new(angle.cos(), angle.sin()) * radius,
            occupant: None,
        }
    }

    pub fn shell(&self) -> Shell {
        self.shell
    }

    /// Exact distance from the atom center.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    pub fn occupant(&self) -> Option<&ParticleRef> {
        self.occupant.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.occupant.is_none()
    }

    fn holds(&self, electron: &ParticleRef) -> bool {
        self.occupant
            .as_ref()
            .is_some_and(|occupant| Rc::ptr_eq(occupant, electron))
    }
}

/// An outer electron promoted into a vacated inner position.
#[derive(Clone, Debug)]
pub struct Backfill {
    pub electron: ParticleRef,
    pub from: usize,
    pub to: usize,
    /// Offset of the inner position the electron now occupies.
    pub offset: DVec2,
}

/// Fixed table of two inner and eight outer electron positions.
#[derive(Clone, Debug)]
pub struct ElectronShells {
    slots: Vec<ShellSlot>,
}

impl ElectronShells {
    pub const SLOT_COUNT: usize = INNER_SHELL_CAPACITY + OUTER_SHELL_CAPACITY;

    pub fn new(inner_radius: f64, outer_radius: f64) -> Self {
        let mut slots = Vec::with_capacity(Self::SLOT_COUNT);
        // Inner pair sits on the horizontal axis, the outer ring every 45 degrees.
        slots.push(ShellSlot::new(Shell::Inner, inner_radius, 0.0));
        slots.push(ShellSlot::new(
            Shell::Inner,
            inner_radius,
            std::f64::consts::PI,
        ));
        for step in 0..OUTER_SHELL_CAPACITY {
            slots.push(ShellSlot::new(
                Shell::Outer,
                outer_radius,
                step as f64 * FRAC_PI_4,
            ));
        }
        Self { slots }
    }

    pub fn slots(&self) -> &[ShellSlot] {
        &self.slots
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_open()).count()
    }

    pub fn has_open_slot(&self) -> bool {
        self.slots.iter().any(ShellSlot::is_open)
    }

    pub fn slot_of(&self, electron: &ParticleRef) -> Option<usize> {
        self.slots.iter().position(|slot| slot.holds(electron))
    }

    /// Assigns `electron` to an open position and returns its slot index.
    ///
    /// `relative_position` is the electron's current position relative to the
    /// atom center. Inner positions always win over outer ones; within a shell
    /// the placement mode decides.
    pub fn place(
        &mut self,
        electron: &ParticleRef,
        relative_position: DVec2,
        placement: ElectronPlacement,
        rng: &mut dyn RngCore,
    ) -> AtomResult<usize> {
        let mut open: Vec<usize> = (0..self.slots.len())
            .filter(|&index| self.slots[index].is_open())
            .collect();

        match placement {
            ElectronPlacement::Proximal => open.sort_by(|&a, &b| {
                let da = self.slots[a].offset.distance(relative_position);
                let db = self.slots[b].offset.distance(relative_position);
                da.total_cmp(&db)
            }),
            ElectronPlacement::Random => open.shuffle(rng),
        }
        // Stable, so the first ordering survives within a shell.
        open.sort_by(|&a, &b| self.slots[a].radius.total_cmp(&self.slots[b].radius));

        let index = *open.first().ok_or(AtomError::NoOpenShellPosition)?;
        self.slots[index].occupant = Some(Rc::clone(electron));
        Ok(index)
    }

    /// Clears the position held by `electron`.
    ///
    /// Vacating an inner position pulls in the occupied outer electron nearest
    /// to it; equidistant candidates resolve to the lowest slot index.
    pub fn vacate(&mut self, electron: &ParticleRef) -> Option<Backfill> {
        let to = self.slot_of(electron)?;
        self.slots[to].occupant = None;
        if self.slots[to].shell != Shell::Inner {
            return None;
        }

        let target = self.slots[to].offset;
        let mut nearest: Option<(usize, f64)> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.shell != Shell::Outer || slot.is_open() {
                continue;
            }
            let distance = slot.offset.distance(target);
            // Trig round-off must not break exact ties.
            if nearest.is_none_or(|(_, best)| distance < best - TIE_TOLERANCE) {
                nearest = Some((index, distance));
            }
        }
        let (from, _) = nearest?;

        let moved = self.slots[from].occupant.take()?;
        self.slots[to].occupant = Some(Rc::clone(&moved));
        Some(Backfill {
            electron: moved,
            from,
            to,
            offset: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::particle::Particle;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn shells() -> ElectronShells {
        ElectronShells::new(85.0, 130.0)
    }

    fn place(shells: &mut ElectronShells, electron: &ParticleRef, at: DVec2) -> AtomResult<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        shells.place(electron, at, ElectronPlacement::Proximal, &mut rng)
    }

    #[test]
    fn table_has_two_inner_and_eight_outer_positions() {
        let shells = shells();
        let inner = shells
            .slots()
            .iter()
            .filter(|slot| slot.shell() == Shell::Inner)
            .count();
        assert_eq!(inner, 2);
        assert_eq!(shells.slots().len(), ElectronShells::SLOT_COUNT);
        for slot in shells.slots() {
            assert!((slot.offset().length() - slot.radius()).abs() < 1e-9);
        }
    }

    #[test]
    fn proximal_placement_prefers_inner_shell() {
        let mut shells = shells();
        let electron = Particle::electron();
        // Right next to an outer position, but inner positions are open.
        let index = place(&mut shells, &electron, DVec2::new(-1.0, 131.0)).unwrap();
        assert_eq!(shells.slots()[index].shell(), Shell::Inner);
    }

    #[test]
    fn proximal_placement_picks_closest_within_shell() {
        let mut shells = shells();
        let left = Particle::electron();
        let index = place(&mut shells, &left, DVec2::new(-200.0, 0.0)).unwrap();
        assert_eq!(index, 1);

        place(&mut shells, &Particle::electron(), DVec2::ZERO).unwrap();
        let top = Particle::electron();
        let index = place(&mut shells, &top, DVec2::new(0.0, 500.0)).unwrap();
        assert!((shells.slots()[index].offset() - DVec2::new(0.0, 130.0)).length() < 1e-9);
    }

    #[test]
    fn random_placement_still_fills_inner_first() {
        let mut shells = shells();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for expected in [Shell::Inner, Shell::Inner, Shell::Outer] {
            let index = shells
                .place(&Particle::electron(), DVec2::ZERO, ElectronPlacement::Random, &mut rng)
                .unwrap();
            assert_eq!(shells.slots()[index].shell(), expected);
        }
    }

    #[test]
    fn eleventh_electron_has_nowhere_to_go() {
        let mut shells = shells();
        for _ in 0..ElectronShells::SLOT_COUNT {
            place(&mut shells, &Particle::electron(), DVec2::ZERO).unwrap();
        }
        assert!(!shells.has_open_slot());
        assert_eq!(
            place(&mut shells, &Particle::electron(), DVec2::ZERO),
            Err(AtomError::NoOpenShellPosition)
        );
    }

    #[test]
    fn vacating_inner_slot_pulls_nearest_outer_electron() {
        let mut shells = shells();
        let inner_right = Particle::electron();
        place(&mut shells, &inner_right, DVec2::new(100.0, 0.0)).unwrap();
        place(&mut shells, &Particle::electron(), DVec2::new(-100.0, 0.0)).unwrap();
        let far = Particle::electron();
        place(&mut shells, &far, DVec2::new(-130.0, 0.0)).unwrap();
        let near = Particle::electron();
        place(&mut shells, &near, DVec2::new(130.0, 10.0)).unwrap();

        let backfill = shells.vacate(&inner_right).expect("outer electron moves in");
        assert!(Rc::ptr_eq(&backfill.electron, &near));
        assert_eq!(backfill.to, 0);
        assert_eq!(shells.slot_of(&near), Some(0));
        assert_eq!(shells.occupied_count(), 3);
        assert!(shells.slots()[backfill.from].is_open());
    }

    #[test]
    fn backfill_tie_resolves_to_lowest_slot_index() {
        let mut shells = shells();
        let inner = Particle::electron();
        place(&mut shells, &inner, DVec2::new(100.0, 0.0)).unwrap();
        place(&mut shells, &Particle::electron(), DVec2::new(-100.0, 0.0)).unwrap();
        // 45 and 315 degree positions are equidistant from the right inner slot.
        let upper = Particle::electron();
        let lower = Particle::electron();
        place(&mut shells, &lower, DVec2::new(92.0, -92.0)).unwrap();
        place(&mut shells, &upper, DVec2::new(92.0, 92.0)).unwrap();

        let backfill = shells.vacate(&inner).unwrap();
        assert!(Rc::ptr_eq(&backfill.electron, &upper));
    }

    #[test]
    fn vacating_outer_slot_does_not_backfill() {
        let mut shells = shells();
        for _ in 0..2 {
            place(&mut shells, &Particle::electron(), DVec2::ZERO).unwrap();
        }
        let outer = Particle::electron();
        place(&mut shells, &outer, DVec2::ZERO).unwrap();
        assert!(shells.vacate(&outer).is_none());
        assert_eq!(shells.occupied_count(), 2);
        assert!(shells.vacate(&outer).is_none());
    }
}
