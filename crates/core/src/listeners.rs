//! Subscription fan-out
//!
//! Listeners are called synchronously on whatever call stack triggered the
//! change. Each notification iterates a snapshot taken up front and holds
//! no lock while callbacks run, so a callback may unsubscribe itself (or
//! anyone else) or subscribe new listeners.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::models::{ChatMessage, ChatRoom};

/// Receives the full room list after every change
pub type RoomsListener = dyn Fn(&[ChatRoom]) + Send + Sync;

/// Receives `(room_id, message)` for every appended message
pub type MessageListener = dyn Fn(&str, &ChatMessage) + Send + Sync;

struct Entries<L: ?Sized> {
    next_id: u64,
    listeners: BTreeMap<u64, Arc<L>>,
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<L: ?Sized + Send + Sync> Detach for Mutex<Entries<L>> {
    fn detach(&self, id: u64) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .remove(&id);
    }
}

/// A set of listeners of one kind
pub struct ListenerSet<L: ?Sized> {
    entries: Arc<Mutex<Entries<L>>>,
}

impl<L: ?Sized + Send + Sync + 'static> ListenerSet<L> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries {
                next_id: 0,
                listeners: BTreeMap::new(),
            })),
        }
    }

    /// Register a listener
    pub fn add(&self, listener: Arc<L>) -> Subscription {
        let id = {
            let mut entries = self.lock();
            let id = entries.next_id;
            entries.next_id += 1;
            entries.listeners.insert(id, listener);
            id
        };
        let entries: Weak<dyn Detach> = Arc::downgrade(&self.entries) as Weak<dyn Detach>;
        Subscription { id, entries }
    }

    /// Current listeners in registration order
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.lock().listeners.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.lock().listeners.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries<L>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L: ?Sized + Send + Sync + 'static> Default for ListenerSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerSet<RoomsListener> {
    pub fn notify(&self, rooms: &[ChatRoom]) {
        for listener in self.snapshot() {
            listener(rooms);
        }
    }
}

impl ListenerSet<MessageListener> {
    pub fn notify(&self, room_id: &str, message: &ChatMessage) {
        for listener in self.snapshot() {
            listener(room_id, message);
        }
    }
}

/// Handle returned by a subscribe call.
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Clone)]
pub struct Subscription {
    id: u64,
    entries: Weak<dyn Detach>,
}

impl Subscription {
    /// Remove the listener. Safe to call repeatedly, from inside a
    /// callback, or after the owning service is gone.
    pub fn unsubscribe(&self) {
        if let Some(entries) = self.entries.upgrade() {
            entries.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
