use crate::atom::collection::ParticleCollection;
use crate::atom::config::AtomConfig;
use crate::error::{AtomError, AtomResult};
use crate::physics::electron::{ElectronShells, Shell};
use crate::physics::nucleus::{self, NucleonConfigurator};
use crate::physics::particle::{ParticleKind, ParticleRef};
use crate::reactive::{DerivedProperty, ListenerId, Property, Source};
use glam::DVec2;
use log::{debug, error, warn};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

const DEFAULT_SEED: u64 = 42;

/// Derived values of an atom at one point in time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtomCounts {
    pub protons: usize,
    pub neutrons: usize,
    pub electrons: usize,
    pub charge: i64,
    pub mass_number: usize,
    pub particle_count: usize,
    pub nucleus_radius: f64,
}

/// One entry of the electron shell table, in world coordinates.
#[derive(Clone, Debug)]
pub struct ShellPosition {
    pub shell: Shell,
    pub position: DVec2,
    pub occupant: Option<ParticleRef>,
}

struct AtomCore {
    config: AtomConfig,
    configurator: NucleonConfigurator,
    position: Property<DVec2>,
    nucleus_offset: Property<DVec2>,
    protons: ParticleCollection,
    neutrons: ParticleCollection,
    electrons: ParticleCollection,
    shells: RefCell<ElectronShells>,
    rng: RefCell<Box<dyn RngCore>>,
    proton_count: DerivedProperty<usize>,
    neutron_count: DerivedProperty<usize>,
    electron_count: DerivedProperty<usize>,
    charge: DerivedProperty<i64>,
    mass_number: DerivedProperty<usize>,
    particle_count: DerivedProperty<usize>,
    nucleus_radius: DerivedProperty<f64>,
    watchers: RefCell<HashMap<u64, ListenerId>>,
}

/// An atom assembled from externally owned protons, neutrons and electrons.
///
/// The atom decides where every member should go (`destination`) and keeps its
/// counts, charge, mass number and nucleus radius current; moving particles
/// towards their destinations is left to the host.
pub struct ParticleAtom {
    core: Rc<AtomCore>,
}

impl ParticleAtom {
    pub fn new(config: AtomConfig) -> AtomResult<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }

    /// Like [`new`](Self::new), drawing random electron placements from `rng`.
    pub fn with_rng(config: AtomConfig, rng: impl RngCore + 'static) -> AtomResult<Self> {
        config.validate()?;
        let core = Rc::new_cyclic(|weak| AtomCore::new(config, Box::new(rng), weak));
        debug!("created particle atom with {config:?}");
        Ok(Self { core })
    }

    pub fn config(&self) -> &AtomConfig {
        &self.core.config
    }

    pub fn position(&self) -> DVec2 {
        self.core.position.get()
    }

    /// Moves the atom; every member is translated along with it.
    pub fn set_position(&self, position: DVec2) {
        self.core.position.set(position);
    }

    pub fn position_property(&self) -> &Property<DVec2> {
        &self.core.position
    }

    pub fn nucleus_offset(&self) -> DVec2 {
        self.core.nucleus_offset.get()
    }

    /// Shifts the nucleus relative to the atom center; only nucleons move.
    pub fn set_nucleus_offset(&self, offset: DVec2) {
        self.core.nucleus_offset.set(offset);
    }

    pub fn nucleus_offset_property(&self) -> &Property<DVec2> {
        &self.core.nucleus_offset
    }

    pub fn protons(&self) -> &ParticleCollection {
        &self.core.protons
    }

    pub fn neutrons(&self) -> &ParticleCollection {
        &self.core.neutrons
    }

    pub fn electrons(&self) -> &ParticleCollection {
        &self.core.electrons
    }

    pub fn proton_count(&self) -> usize {
        self.core.proton_count.get()
    }

    pub fn neutron_count(&self) -> usize {
        self.core.neutron_count.get()
    }

    pub fn electron_count(&self) -> usize {
        self.core.electron_count.get()
    }

    pub fn charge(&self) -> i64 {
        self.core.charge.get()
    }

    pub fn mass_number(&self) -> usize {
        self.core.mass_number.get()
    }

    /// Same as [`mass_number`](Self::mass_number).
    pub fn weight(&self) -> usize {
        self.mass_number()
    }

    pub fn particle_count(&self) -> usize {
        self.core.particle_count.get()
    }

    pub fn nucleus_radius(&self) -> f64 {
        self.core.nucleus_radius.get()
    }

    pub fn proton_count_property(&self) -> &DerivedProperty<usize> {
        &self.core.proton_count
    }

    pub fn neutron_count_property(&self) -> &DerivedProperty<usize> {
        &self.core.neutron_count
    }

    pub fn electron_count_property(&self) -> &DerivedProperty<usize> {
        &self.core.electron_count
    }

    pub fn charge_property(&self) -> &DerivedProperty<i64> {
        &self.core.charge
    }

    pub fn mass_number_property(&self) -> &DerivedProperty<usize> {
        &self.core.mass_number
    }

    pub fn particle_count_property(&self) -> &DerivedProperty<usize> {
        &self.core.particle_count
    }

    pub fn nucleus_radius_property(&self) -> &DerivedProperty<f64> {
        &self.core.nucleus_radius
    }

    pub fn snapshot(&self) -> AtomCounts {
        AtomCounts {
            protons: self.proton_count(),
            neutrons: self.neutron_count(),
            electrons: self.electron_count(),
            charge: self.charge(),
            mass_number: self.mass_number(),
            particle_count: self.particle_count(),
            nucleus_radius: self.nucleus_radius(),
        }
    }

    /// The ten electron positions in table order: two inner, then eight outer.
    pub fn electron_shell_positions(&self) -> Vec<ShellPosition> {
        let center = self.position();
        self.core
            .shells
            .borrow()
            .slots()
            .iter()
            .map(|slot| ShellPosition {
                shell: slot.shell(),
                position: center + slot.offset(),
                occupant: slot.occupant().cloned(),
            })
            .collect()
    }

    pub fn contains_particle(&self, particle: &ParticleRef) -> bool {
        self.core.collection(particle.kind()).contains(particle)
    }

    /// Adds `particle` and assigns its destination.
    ///
    /// Adding a current member again is ignored, which keeps repeated adds
    /// during state restoration harmless.
    pub fn add_particle(&self, particle: ParticleRef) -> AtomResult<()> {
        if self.contains_particle(&particle) {
            warn!("particle #{} is already in the atom, ignoring add", particle.id());
            return Ok(());
        }

        let kind = particle.kind();
        if kind == ParticleKind::Electron && !self.core.shells.borrow().has_open_slot() {
            error!(
                "cannot add electron #{}: all {} shell positions are taken",
                particle.id(),
                ElectronShells::SLOT_COUNT
            );
            return Err(AtomError::NoOpenShellPosition);
        }

        let collection = self.core.collection(kind);
        collection.add(Rc::clone(&particle));
        // Listeners run inside `add` and may take the particle straight back out.
        if collection.contains(&particle) {
            match kind {
                ParticleKind::Proton | ParticleKind::Neutron => self.core.reconfigure_nucleus(),
                ParticleKind::Electron => {
                    if let Err(e) = self.core.place_electron(&particle) {
                        collection.remove(&particle)?;
                        return Err(e);
                    }
                }
            }
        }
        if !collection.contains(&particle) {
            debug!("{kind} #{} left the atom while being added", particle.id());
            return Ok(());
        }

        self.core.watch(&particle);
        debug!("added {} #{}", particle.kind(), particle.id());
        Ok(())
    }

    /// Removes a member without repacking the nucleus; call
    /// [`reconfigure_nucleus`](Self::reconfigure_nucleus) after removing nucleons.
    /// Removing an inner-shell electron still backfills from the outer shell.
    pub fn remove_particle(&self, particle: &ParticleRef) -> AtomResult<()> {
        self.core.remove_particle(particle)
    }

    /// Removes and returns the most recently added member of `kind`.
    pub fn extract_particle(&self, kind: ParticleKind) -> Option<ParticleRef> {
        let particle = self.core.collection(kind).last()?;
        self.core.remove_particle(&particle).ok()?;
        Some(particle)
    }

    /// Removes and returns the member of `kind` whose position is nearest to
    /// `point`; ties go to the earliest added.
    pub fn extract_particle_closest_to(
        &self,
        kind: ParticleKind,
        point: DVec2,
    ) -> Option<ParticleRef> {
        let particle = self
            .core
            .collection(kind)
            .to_vec()
            .into_iter()
            .map(|particle| (particle.position().distance(point), particle))
            .reduce(|best, next| if next.0 < best.0 { next } else { best })
            .map(|(_, particle)| particle)?;
        self.core.remove_particle(&particle).ok()?;
        Some(particle)
    }

    /// Removes every member. The nucleus is not repacked since nothing is left.
    pub fn clear(&self) {
        self.core.protons.clear();
        self.core.neutrons.clear();
        self.core.electrons.clear();
        debug!("cleared particle atom");
    }

    /// Snaps every member onto its destination, bypassing animation.
    pub fn move_all_particles_to_destination(&self) {
        for particle in self.core.members() {
            particle.set_position(particle.destination());
        }
    }

    /// Reassigns every nucleon's destination and draw layer.
    pub fn reconfigure_nucleus(&self) {
        self.core.reconfigure_nucleus();
    }
}

impl fmt::Debug for ParticleAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleAtom")
            .field("position", &self.position())
            .field("counts", &self.snapshot())
            .finish()
    }
}

impl AtomCore {
    fn new(config: AtomConfig, rng: Box<dyn RngCore>, weak: &Weak<AtomCore>) -> Self {
        let configurator = NucleonConfigurator::new(config.nucleon_radius);
        let protons = ParticleCollection::new(ParticleKind::Proton);
        let neutrons = ParticleCollection::new(ParticleKind::Neutron);
        let electrons = ParticleCollection::new(ParticleKind::Electron);

        let count_of = |collection: &ParticleCollection| {
            let length = collection.length().clone();
            DerivedProperty::new(&[&length as &dyn Source], {
                let length = length.clone();
                move || length.get()
            })
        };
        let proton_count = count_of(&protons);
        let neutron_count = count_of(&neutrons);
        let electron_count = count_of(&electrons);

        let charge = DerivedProperty::new(&[&proton_count as &dyn Source, &electron_count], {
            let (protons, electrons) = (proton_count.clone(), electron_count.clone());
            move || protons.get() as i64 - electrons.get() as i64
        });
        let mass_number = DerivedProperty::new(&[&proton_count as &dyn Source, &neutron_count], {
            let (protons, neutrons) = (proton_count.clone(), neutron_count.clone());
            move || protons.get() + neutrons.get()
        });
        let particle_count = DerivedProperty::new(
            &[&proton_count as &dyn Source, &neutron_count, &electron_count],
            {
                let (protons, neutrons, electrons) = (
                    proton_count.clone(),
                    neutron_count.clone(),
                    electron_count.clone(),
                );
                move || protons.get() + neutrons.get() + electrons.get()
            },
        );
        let nucleus_radius = DerivedProperty::new(&[&mass_number as &dyn Source], {
            let mass_number = mass_number.clone();
            move || configurator.radius(mass_number.get())
        });

        let position = Property::new(DVec2::ZERO);
        {
            let weak = weak.clone();
            position.subscribe(move |new, old| {
                if let Some(core) = weak.upgrade() {
                    translate(core.members(), *new - *old);
                }
            });
        }
        let nucleus_offset = Property::new(DVec2::ZERO);
        {
            let weak = weak.clone();
            nucleus_offset.subscribe(move |new, old| {
                if let Some(core) = weak.upgrade() {
                    translate(core.nucleons(), *new - *old);
                }
            });
        }

        for collection in [&protons, &neutrons, &electrons] {
            let weak = weak.clone();
            collection.on_item_removed().subscribe(move |particle| {
                if let Some(core) = weak.upgrade() {
                    core.released(particle);
                }
            });
        }

        Self {
            config,
            configurator,
            position,
            nucleus_offset,
            shells: RefCell::new(ElectronShells::new(
                config.inner_shell_radius,
                config.outer_shell_radius,
            )),
            rng: RefCell::new(rng),
            protons,
            neutrons,
            electrons,
            proton_count,
            neutron_count,
            electron_count,
            charge,
            mass_number,
            particle_count,
            nucleus_radius,
            watchers: RefCell::new(HashMap::new()),
        }
    }

    fn collection(&self, kind: ParticleKind) -> &ParticleCollection {
        match kind {
            ParticleKind::Proton => &self.protons,
            ParticleKind::Neutron => &self.neutrons,
            ParticleKind::Electron => &self.electrons,
        }
    }

    fn nucleons(&self) -> Vec<ParticleRef> {
        let mut nucleons = self.protons.to_vec();
        nucleons.extend(self.neutrons.to_vec());
        nucleons
    }

    fn members(&self) -> Vec<ParticleRef> {
        let mut members = self.nucleons();
        members.extend(self.electrons.to_vec());
        members
    }

    fn nucleus_center(&self) -> DVec2 {
        self.position.get() + self.nucleus_offset.get()
    }

    fn reconfigure_nucleus(&self) {
        let nucleons = nucleus::interleave(&self.protons.to_vec(), &self.neutrons.to_vec());
        let layout = self
            .configurator
            .layout(nucleons.len(), self.nucleus_center());
        for (nucleon, placement) in nucleons.iter().zip(&layout.placements) {
            nucleon.set_destination(placement.destination);
            nucleon.z_layer.set(placement.layer);
        }
        debug!(
            "reconfigured nucleus of {} nucleons, radius {:.3}",
            nucleons.len(),
            layout.radius
        );
    }

    fn place_electron(&self, electron: &ParticleRef) -> AtomResult<()> {
        let center = self.position.get();
        let index = {
            let mut rng = self.rng.borrow_mut();
            self.shells.borrow_mut().place(
                electron,
                electron.position() - center,
                self.config.electron_placement,
                &mut **rng,
            )?
        };
        let offset = self.shells.borrow().slots()[index].offset();
        electron.set_destination(center + offset);
        Ok(())
    }

    fn remove_particle(&self, particle: &ParticleRef) -> AtomResult<()> {
        let collection = self.collection(particle.kind());
        if !collection.contains(particle) {
            return Err(AtomError::NotAMember { id: particle.id() });
        }
        collection.remove(particle)?;
        debug!("removed {} #{}", particle.kind(), particle.id());
        Ok(())
    }

    /// Common exit path for every way a particle can leave the atom.
    fn released(&self, particle: &ParticleRef) {
        let watcher = self.watchers.borrow_mut().remove(&particle.id());
        if let Some(id) = watcher {
            particle.user_controlled.unsubscribe(id);
        }
        particle.z_layer.set(0);

        if particle.kind() == ParticleKind::Electron {
            let backfill = self.shells.borrow_mut().vacate(particle);
            if let Some(backfill) = backfill {
                debug!(
                    "electron #{} moves from shell position {} to {}",
                    backfill.electron.id(),
                    backfill.from,
                    backfill.to
                );
                backfill
                    .electron
                    .set_destination(self.position.get() + backfill.offset);
            }
        }
    }

    /// Evicts `particle` as soon as the user picks it up.
    fn watch(self: &Rc<Self>, particle: &ParticleRef) {
        let core = Rc::downgrade(self);
        let watched = Rc::downgrade(particle);
        let id = particle.user_controlled.subscribe(move |controlled, _| {
            if !*controlled {
                return;
            }
            let (Some(core), Some(particle)) = (core.upgrade(), watched.upgrade()) else {
                return;
            };
            if core.remove_particle(&particle).is_ok() {
                debug!("{} #{} picked up by the user", particle.kind(), particle.id());
                if particle.kind().is_nucleon() {
                    core.reconfigure_nucleus();
                }
            }
        });
        self.watchers.borrow_mut().insert(particle.id(), id);
    }
}

impl Drop for AtomCore {
    fn drop(&mut self) {
        for particle in self.members() {
            if let Some(id) = self.watchers.get_mut().remove(&particle.id()) {
                particle.user_controlled.unsubscribe(id);
            }
        }
    }
}

/// Shifts resting particles outright; moving ones only get a new destination.
fn translate(particles: Vec<ParticleRef>, delta: DVec2) {
    if delta == DVec2::ZERO {
        return;
    }
    for particle in particles {
        if particle.is_at_destination() {
            particle.set_position_and_destination(particle.position() + delta);
        } else {
            particle.set_destination(particle.destination() + delta);
        }
    }
}
