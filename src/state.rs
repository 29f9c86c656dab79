// SPDX-License-Identifier: MPL-2.0
//! Observable state container shared by the session and locale stores.
//!
//! A [`StateCell`] owns one value and only ever replaces it whole. Readers
//! therefore see either the previous or the next value, never a mix of the
//! two. Each committed replacement is published twice:
//!
//! - to synchronous listeners registered with [`StateCell::subscribe`],
//!   called in registration order right after the commit;
//! - to a `tokio::sync::watch` channel for async consumers
//!   ([`StateCell::watch`]).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Handle returned by [`StateCell::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct StateCell<T> {
    current: watch::Sender<T>,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Returns a snapshot of the committed value.
    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Runs `f` against the committed value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.current.borrow())
    }

    /// Replaces the value unconditionally and notifies listeners.
    pub fn replace(&self, next: T) {
        self.current.send_replace(next.clone());
        self.notify(&next);
    }

    /// Atomically decides on a replacement from the committed value.
    ///
    /// `decide` runs while the value is locked; returning `None` leaves the
    /// value untouched and notifies nobody. Returns whether a replacement
    /// was committed. `decide` must not call back into this cell.
    pub fn replace_if(&self, decide: impl FnOnce(&T) -> Option<T>) -> bool {
        let mut committed = None;
        self.current.send_if_modified(|value| match decide(value) {
            Some(next) => {
                *value = next.clone();
                committed = Some(next);
                true
            }
            None => false,
        });

        match committed {
            Some(next) => {
                self.notify(&next);
                true
            }
            None => false,
        }
    }

    /// Registers a listener called after every committed replacement.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners().push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Returns a receiver that observes every future commit.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.current.subscribe()
    }

    fn notify(&self, value: &T) {
        // Snapshot so a listener may subscribe/unsubscribe without deadlocking.
        let listeners: Vec<Listener<T>> = self
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener<T>)>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell")
            .field("current", &*self.current.borrow())
            .finish_non_exhaustive()
    }
}
