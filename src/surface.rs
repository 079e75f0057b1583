//! Input surfaces.
//!
//! An input surface is the document-level place where listeners are
//! registered against a set of event kinds. Monitors only see this trait, so
//! the host can deliver events from any dispatch mechanism.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::trace;

use crate::domain::EventKind;
use crate::domain::EventKinds;

/// A single input occurrence delivered to a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: EventKind,

    /// When the host dispatched the event.
    pub at: Instant,
}

impl InputEvent {
    /// Create an event stamped with the current time.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: Instant::now(),
        }
    }
}

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Trait for surfaces that accept event listeners.
pub trait InputSurface: Send + Sync {
    /// Register `sender` for every kind in `kinds`.
    fn add_listener(&self, kinds: EventKinds, sender: UnboundedSender<InputEvent>) -> ListenerId;

    /// Deregister a listener. Returns false if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

struct Listener {
    kinds: EventKinds,
    sender: UnboundedSender<InputEvent>,
}

/// In-process input surface.
///
/// The host calls [`Document::dispatch`] for each input occurrence.
#[derive(Default)]
pub struct Document {
    listeners: Mutex<HashMap<ListenerId, Listener>>,
    next_id: AtomicU64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event of `kind` to every listener registered for it.
    ///
    /// Returns the number of listeners the event reached. Listeners whose
    /// receiving end is gone are dropped.
    pub fn dispatch(&self, kind: EventKind) -> usize {
        let event = InputEvent::now(kind);
        let mut listeners = self.lock();
        let mut delivered = 0;

        listeners.retain(|id, listener| {
            if !listener.kinds.contains(kind) {
                return true;
            }
            if listener.sender.send(event).is_ok() {
                delivered += 1;
                true
            } else {
                trace!("Pruning closed listener {:?}", id);
                false
            }
        });

        trace!("Dispatched {} to {} listener(s)", kind, delivered);
        delivered
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ListenerId, Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InputSurface for Document {
    fn add_listener(&self, kinds: EventKinds, sender: UnboundedSender<InputEvent>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!("Adding listener {:?} for {}", id, kinds);
        self.lock().insert(id, Listener { kinds, sender });
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            trace!("Removed listener {:?}", id);
        }
        removed
    }
}
