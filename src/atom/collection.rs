use crate::error::{AtomError, AtomResult};
use crate::physics::particle::{ParticleKind, ParticleRef};
use crate::reactive::{Emitter, Property};
use std::cell::RefCell;
use std::rc::Rc;

/// Insertion-ordered set of particle handles of one kind.
///
/// Mutations first update the contents, then emit the item event, then
/// update `length`; all of it happens before the call returns.
pub struct ParticleCollection {
    kind: ParticleKind,
    particles: RefCell<Vec<ParticleRef>>,
    length: Property<usize>,
    item_added: Emitter<ParticleRef>,
    item_removed: Emitter<ParticleRef>,
}

impl ParticleCollection {
    pub fn new(kind: ParticleKind) -> Self {
        Self {
            kind,
            particles: RefCell::new(Vec::new()),
            length: Property::new(0),
            item_added: Emitter::new(),
            item_removed: Emitter::new(),
        }
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    /// Appends `particle`; returns `false` without notifying when it is
    /// already present.
    pub fn add(&self, particle: ParticleRef) -> bool {
        debug_assert_eq!(particle.kind(), self.kind, "particle kind mismatch");
        if self.contains(&particle) {
            return false;
        }
        self.particles.borrow_mut().push(Rc::clone(&particle));
        self.item_added.emit(&particle);
        self.length.set(self.len());
        true
    }

    pub fn remove(&self, particle: &ParticleRef) -> AtomResult<()> {
        match self.take(particle) {
            Some(_) => Ok(()),
            None => Err(AtomError::NotAMember { id: particle.id() }),
        }
    }

    /// Removes every member, newest first. Listeners may mutate the
    /// collection while this runs.
    pub fn clear(&self) {
        for particle in self.to_vec().iter().rev() {
            // None when a listener already removed it.
            self.take(particle);
        }
    }

    /// Removes `particle` if present and notifies; `None` when absent.
    fn take(&self, particle: &ParticleRef) -> Option<ParticleRef> {
        let removed = {
            let mut particles = self.particles.borrow_mut();
            let index = particles
                .iter()
                .position(|member| Rc::ptr_eq(member, particle))?;
            particles.remove(index)
        };
        self.item_removed.emit(&removed);
        self.length.set(self.len());
        Some(removed)
    }

    pub fn contains(&self, particle: &ParticleRef) -> bool {
        self.index_of(particle).is_some()
    }

    pub fn index_of(&self, particle: &ParticleRef) -> Option<usize> {
        self.particles
            .borrow()
            .iter()
            .position(|member| Rc::ptr_eq(member, particle))
    }

    pub fn get(&self, index: usize) -> Option<ParticleRef> {
        self.particles.borrow().get(index).cloned()
    }

    pub fn last(&self) -> Option<ParticleRef> {
        self.particles.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.particles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.borrow().is_empty()
    }

    /// Snapshot of the members; safe to iterate while mutating the collection.
    pub fn to_vec(&self) -> Vec<ParticleRef> {
        self.particles.borrow().clone()
    }

    pub fn length(&self) -> &Property<usize> {
        &self.length
    }

    pub fn on_item_added(&self) -> &Emitter<ParticleRef> {
        &self.item_added
    }

    pub fn on_item_removed(&self) -> &Emitter<ParticleRef> {
        &self.item_removed
    }
}
