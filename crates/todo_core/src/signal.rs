//! Single-threaded observable values.
//!
//! # Responsibility
//! - Hold one current value and broadcast every change to subscribers.
//! - Back the presentation mode flag and the store push-streams.
//!
//! # Invariants
//! - Deliveries never interleave: a `set` issued from inside a subscriber is
//!   queued and delivered after the current delivery completes.
//! - Subscribers see values in the order they were set.
//! - `get` always returns the most recently set value.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Handle returned by [`Signal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// Observable value confined to one thread.
pub struct Signal<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
    pending: RefCell<VecDeque<T>>,
    cancelled: RefCell<Vec<SubscriptionId>>,
    delivering: Cell<bool>,
    next_id: Cell<u64>,
}

impl<T: Clone> Signal<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: RefCell::new(initial),
            subscribers: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            cancelled: RefCell::new(Vec::new()),
            delivering: Cell::new(false),
            next_id: Cell::new(0),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Runs `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replaces the value and notifies every subscriber.
    ///
    /// Subscribers are not notified with the value they were registered with;
    /// read [`Signal::get`] after subscribing to observe the current state.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value.clone();
        self.pending.borrow_mut().push_back(value);
        if self.delivering.get() {
            return;
        }

        self.delivering.set(true);
        loop {
            let Some(next) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            let mut active = std::mem::take(&mut *self.subscribers.borrow_mut());
            for (id, subscriber) in active.iter_mut() {
                if self.cancelled.borrow().contains(id) {
                    continue;
                }
                subscriber(&next);
            }

            let mut subscribers = self.subscribers.borrow_mut();
            active.append(&mut subscribers);
            let cancelled = std::mem::take(&mut *self.cancelled.borrow_mut());
            active.retain(|(id, _)| !cancelled.contains(id));
            *subscribers = active;
        }
        self.delivering.set(false);
    }

    /// Registers `subscriber` for every future change.
    pub fn subscribe(&self, subscriber: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .borrow_mut()
            .retain(|(candidate, _)| *candidate != id);
        if self.delivering.get() {
            self.cancelled.borrow_mut().push(id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<T: Clone + Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
