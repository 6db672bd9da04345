use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::emitter::{ListenerId, Observers};
use super::graph::{self, DependentLink, Dependents, Source};

type ChangeListener<T> = dyn Fn(&T, &T);

struct PropertyCell<T: 'static> {
    value: RefCell<T>,
    observers: Observers<ChangeListener<T>>,
    dependents: Dependents,
}

/// Mutable value with synchronous change notification.
///
/// Cloning yields another handle to the same value.
pub struct Property<T: 'static>(Rc<PropertyCell<T>>);

impl<T: Clone + PartialEq + 'static> Property<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(PropertyCell {
            value: RefCell::new(value),
            observers: Observers::default(),
            dependents: Dependents::default(),
        }))
    }

    pub fn get(&self) -> T {
        self.0.value.borrow().clone()
    }

    /// Stores `value`; when it differs from the current one, listeners receive
    /// `(new, old)` and derived values recompute before this returns.
    pub fn set(&self, value: T) {
        let old = {
            let mut slot = self.0.value.borrow_mut();
            if *slot == value {
                return;
            }
            std::mem::replace(&mut *slot, value.clone())
        };
        self.0.observers.for_each(|listener| listener(&value, &old));
        graph::propagate(self.0.dependents.snapshot());
    }

    pub fn subscribe(&self, listener: impl Fn(&T, &T) + 'static) -> ListenerId {
        self.0.observers.link(Rc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.0.observers.unlink(id)
    }

    pub fn listener_count(&self) -> usize {
        self.0.observers.len()
    }
}

impl<T: 'static> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.0.value.borrow()).finish()
    }
}

impl<T: 'static> Source for Property<T> {
    fn height(&self) -> usize {
        0
    }

    fn attach(&self, link: DependentLink) {
        self.0.dependents.push(link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_notifies_with_new_and_old() {
        let property = Property::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            property.subscribe(move |new, old| seen.borrow_mut().push((*new, *old)));
        }
        property.set(2);
        property.set(5);
        assert_eq!(*seen.borrow(), vec![(2, 1), (5, 2)]);
        assert_eq!(property.get(), 5);
    }

    #[test]
    fn setting_equal_value_is_silent() {
        let property = Property::new("same".to_owned());
        let calls = Rc::new(Cell::new(0));
        {
            let calls = calls.clone();
            property.subscribe(move |_, _| calls.set(calls.get() + 1));
        }
        property.set("same".to_owned());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn clones_share_the_value() {
        let property = Property::new(0.5_f64);
        let handle = property.clone();
        handle.set(1.5);
        assert_eq!(property.get(), 1.5);
    }

    #[test]
    fn listener_may_set_the_property_again() {
        let property = Property::new(0);
        {
            let handle = property.clone();
            property.subscribe(move |new, _| {
                if *new < 3 {
                    handle.set(new + 1);
                }
            });
        }
        property.set(1);
        assert_eq!(property.get(), 3);
    }
}
