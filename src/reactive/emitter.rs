use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by `subscribe`, used to detach the listener again.
///
/// Ids are only unique per source; handing an id to a different property is a
/// no-op at best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered listener list shared by properties and emitters.
pub(crate) struct Observers<F: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, Rc<F>)>>,
}

impl<F: ?Sized> Default for Observers<F> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<F: ?Sized> Observers<F> {
    pub(crate) fn link(&self, listener: Rc<F>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn unlink(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn is_linked(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    /// Calls every listener in registration order.
    ///
    /// Works on a snapshot: listeners linked while notifying wait for the next
    /// event, listeners unlinked while notifying are skipped.
    pub(crate) fn for_each(&self, mut call: impl FnMut(&F)) {
        let snapshot: Vec<(ListenerId, Rc<F>)> = self.entries.borrow().clone();
        for (id, listener) in snapshot {
            if self.is_linked(id) {
                call(&listener);
            }
        }
    }
}

/// Fire-and-forget notification channel carrying one argument.
pub struct Emitter<T: 'static> {
    observers: Observers<dyn Fn(&T)>,
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            observers: Observers::default(),
        }
    }
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> ListenerId {
        self.observers.link(Rc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.observers.unlink(id)
    }

    pub fn listener_count(&self) -> usize {
        self.observers.len()
    }

    pub fn emit(&self, value: &T) {
        self.observers.for_each(|listener| listener(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_in_registration_order() {
        let emitter = Emitter::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let log = log.clone();
            emitter.subscribe(move |value| log.borrow_mut().push(format!("{tag}{value}")));
        }
        emitter.emit(&7);
        assert_eq!(*log.borrow(), vec!["a7", "b7", "c7"]);
    }

    #[test]
    fn listener_added_during_emit_waits_for_next_event() {
        let emitter = Rc::new(Emitter::<u32>::new());
        let late_calls = Rc::new(Cell::new(0));
        {
            let weak = Rc::downgrade(&emitter);
            let late_calls = late_calls.clone();
            emitter.subscribe(move |_| {
                if let Some(emitter) = weak.upgrade() {
                    let late_calls = late_calls.clone();
                    emitter.subscribe(move |_| late_calls.set(late_calls.get() + 1));
                }
            });
        }
        emitter.emit(&1);
        assert_eq!(late_calls.get(), 0);
        emitter.emit(&2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn unsubscribed_listener_is_skipped() {
        let emitter = Emitter::<()>::new();
        let calls = Rc::new(Cell::new(0));
        let id = {
            let calls = calls.clone();
            emitter.subscribe(move |_| calls.set(calls.get() + 1))
        };
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&());
        assert_eq!(calls.get(), 0);
        assert_eq!(emitter.listener_count(), 0);
    }
}
