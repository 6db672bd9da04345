//! Dependency graph between reactive values.
//!
//! Every derived value is a node with a height one above its tallest source.
//! A change walks the reachable dependents in `(height, id)` order, so a node
//! only recomputes after all of its changed sources have settled, and siblings
//! that share a source recompute in the order they were declared.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_node_id() -> u64 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) trait Dependent {
    fn height(&self) -> usize;
    fn node_id(&self) -> u64;
    /// Recomputes the cached value and notifies its listeners.
    /// Returns the dependents to revisit, empty when the value did not change.
    fn recompute(&self) -> Vec<Rc<dyn Dependent>>;
}

/// Opaque edge handed to a [`Source`] when a derived value subscribes to it.
pub struct DependentLink(pub(crate) Weak<dyn Dependent>);

/// Anything a derived value can be computed from.
pub trait Source {
    /// Position of this value in the dependency graph; plain properties sit at 0.
    fn height(&self) -> usize;
    fn attach(&self, link: DependentLink);
}

#[derive(Default)]
pub(crate) struct Dependents(RefCell<Vec<Weak<dyn Dependent>>>);

impl Dependents {
    pub(crate) fn push(&self, link: DependentLink) {
        self.0.borrow_mut().push(link.0);
    }

    /// Live dependents; dropped nodes are pruned on the way.
    pub(crate) fn snapshot(&self) -> Vec<Rc<dyn Dependent>> {
        let mut links = self.0.borrow_mut();
        links.retain(|link| link.strong_count() > 0);
        links.iter().filter_map(Weak::upgrade).collect()
    }
}

pub(crate) fn propagate(changed: Vec<Rc<dyn Dependent>>) {
    let mut pending: BTreeMap<(usize, u64), Rc<dyn Dependent>> = BTreeMap::new();
    for node in changed {
        pending.insert((node.height(), node.node_id()), node);
    }
    while let Some((_, node)) = pending.pop_first() {
        for next in node.recompute() {
            pending
                .entry((next.height(), next.node_id()))
                .or_insert(next);
        }
    }
}
