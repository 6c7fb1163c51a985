//! Listener registry with disposer handles.
//!
//! Everything here is single-threaded: callbacks run synchronously on the
//! emitting call, in subscription order.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

/// A set of callbacks for one kind of event.
pub struct Registry<E> {
    listeners: Rc<RefCell<Listeners<E>>>,
}

impl<E: 'static> Registry<E> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register `callback`. It stays registered until the returned handle's
    /// [`Subscription::unsubscribe`] is called or the registry is dropped.
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            let callback: Callback<E> = Rc::new(RefCell::new(callback));
            listeners.entries.push((id, callback));
            id
        };

        let weak: Weak<RefCell<Listeners<E>>> = Rc::downgrade(&self.listeners);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Call every listener with `event`.
    ///
    /// The listener list is snapshotted first, so a callback may subscribe or
    /// unsubscribe without invalidating this emit.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            (&mut *callback.borrow_mut())(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer for one registered callback. Dropping the handle keeps the
/// callback registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_run_in_subscription_order() {
        let registry = Registry::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&seen);
        let _first = registry.subscribe(move |n| a.borrow_mut().push(("first", *n)));
        let b = Rc::clone(&seen);
        let _second = registry.subscribe(move |n| b.borrow_mut().push(("second", *n)));

        registry.emit(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_that_callback() {
        let registry = Registry::<()>::new();
        let hits = Rc::new(RefCell::new(0));

        let h1 = Rc::clone(&hits);
        let first = registry.subscribe(move |_| *h1.borrow_mut() += 1);
        let h2 = Rc::clone(&hits);
        let _second = registry.subscribe(move |_| *h2.borrow_mut() += 10);

        first.unsubscribe();
        registry.emit(&());
        assert_eq!(*hits.borrow(), 10);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unsubscribe_after_registry_dropped_is_harmless() {
        let registry = Registry::<()>::new();
        let sub = registry.subscribe(|_| {});
        drop(registry);
        sub.unsubscribe();
    }

    #[test]
    fn dropping_handle_keeps_callback() {
        let registry = Registry::<()>::new();
        drop(registry.subscribe(|_| {}));
        assert_eq!(registry.len(), 1);
    }
}
