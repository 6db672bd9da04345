use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::emitter::{ListenerId, Observers};
use super::graph::{self, Dependent, DependentLink, Dependents, Source};

type ChangeListener<T> = dyn Fn(&T, &T);

struct DerivedNode<T: 'static> {
    id: u64,
    height: usize,
    value: RefCell<T>,
    compute: Box<dyn Fn() -> T>,
    observers: Observers<ChangeListener<T>>,
    dependents: Dependents,
}

impl<T: Clone + PartialEq + 'static> Dependent for DerivedNode<T> {
    fn height(&self) -> usize {
        self.height
    }

    fn node_id(&self) -> u64 {
        self.id
    }

    fn recompute(&self) -> Vec<Rc<dyn Dependent>> {
        let value = (self.compute)();
        let old = {
            let mut slot = self.value.borrow_mut();
            if *slot == value {
                return Vec::new();
            }
            std::mem::replace(&mut *slot, value.clone())
        };
        self.observers.for_each(|listener| listener(&value, &old));
        self.dependents.snapshot()
    }
}

/// Read-only value recomputed from its sources whenever one of them changes.
///
/// `compute` must only read the declared sources; it captures its own handles
/// to them.
pub struct DerivedProperty<T: 'static>(Rc<DerivedNode<T>>);

impl<T: Clone + PartialEq + 'static> DerivedProperty<T> {
    pub fn new(sources: &[&dyn Source], compute: impl Fn() -> T + 'static) -> Self {
        let height = sources.iter().map(|source| source.height()).max().unwrap_or(0) + 1;
        let node = Rc::new(DerivedNode {
            id: graph::next_node_id(),
            height,
            value: RefCell::new(compute()),
            compute: Box::new(compute),
            observers: Observers::default(),
            dependents: Dependents::default(),
        });
        let link: Weak<dyn Dependent> = Rc::downgrade(&node) as Weak<dyn Dependent>;
        for source in sources {
            source.attach(DependentLink(link.clone()));
        }
        Self(node)
    }

    pub fn get(&self) -> T {
        self.0.value.borrow().clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&T, &T) + 'static) -> ListenerId {
        self.0.observers.link(Rc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.0.observers.unlink(id)
    }
}

impl<T: 'static> Clone for DerivedProperty<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for DerivedProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DerivedProperty")
            .field(&*self.0.value.borrow())
            .finish()
    }
}

impl<T: 'static> Source for DerivedProperty<T> {
    fn height(&self) -> usize {
        self.0.height
    }

    fn attach(&self, link: DependentLink) {
        self.0.dependents.push(link);
    }
}
