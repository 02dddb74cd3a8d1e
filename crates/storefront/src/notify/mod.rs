//! Change notifications between views of the same state.
//!
//! Views never share an in-memory copy of the cart or likes. They re-read
//! the store when told something changed. Two notifier variants exist:
//!
//! - [`InProcessNotifier`] - same-process publish/subscribe
//! - [`StorageWatchNotifier`] - in-process delivery plus a watch on the
//!   storage backend, so writes from other processes sharing it are
//!   delivered too
//!
//! The store depends only on the [`ChangeNotifier`] trait.

mod in_process;
mod watch;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::storage::{StorageError, StorageKey};

pub use in_process::InProcessNotifier;
pub use watch::{StorageWatchNotifier, WatchHandle};

/// Kinds of notification a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CartChanged,
    LikesChanged,
    ToastRequested,
}

/// A notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Cart lines were written.
    CartChanged,
    /// Likes were written.
    LikesChanged,
    /// Transient user feedback, e.g. "added to cart".
    ToastRequested { message: String },
}

impl ChangeEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::CartChanged => EventKind::CartChanged,
            Self::LikesChanged => EventKind::LikesChanged,
            Self::ToastRequested { .. } => EventKind::ToastRequested,
        }
    }

    pub fn toast(message: impl Into<String>) -> Self {
        Self::ToastRequested {
            message: message.into(),
        }
    }
}

/// A subscribed callback.
pub type Handler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Publish/subscribe capability the store emits through.
pub trait ChangeNotifier: Send + Sync {
    /// Deliver `event` to every handler subscribed to its kind.
    fn emit(&self, event: ChangeEvent);

    /// Register `handler` for events of `kind`.
    fn subscribe(&self, kind: EventKind, handler: Handler) -> Subscription;

    /// Stream of every emitted event, for async consumers.
    fn events(&self) -> broadcast::Receiver<ChangeEvent>;

    /// Run `write`, this process's own write of `value` under `key`.
    ///
    /// A notifier that watches storage marks `value` as seen in the same
    /// critical section as the write, so a concurrent poll never reports it
    /// as an external change.
    ///
    /// # Errors
    ///
    /// Returns the error from `write`.
    fn record_write(
        &self,
        _key: StorageKey,
        _value: &str,
        write: &mut dyn FnMut() -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        write()
    }
}

/// Registered handlers, shared by the notifier variants.
pub(crate) struct HandlerRegistry {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, EventKind, Handler)>>,
}

impl HandlerRegistry {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            handlers: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn add(self: &Arc<Self>, kind: EventKind, handler: Handler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().push((id, kind, handler));
        Subscription {
            registry: Arc::downgrade(self),
            id,
        }
    }

    fn remove(&self, id: u64) {
        self.handlers.lock().retain(|(existing, _, _)| *existing != id);
    }

    /// Call every handler for the event's kind.
    ///
    /// Handlers run after the lock is released, so they may subscribe or
    /// unsubscribe from inside the callback.
    pub(crate) fn dispatch(&self, event: &ChangeEvent) {
        let kind = event.kind();
        let matching: Vec<Handler> = self
            .handlers
            .lock()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| Arc::clone(h))
            .collect();
        for handler in matching {
            handler(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handlers.lock().len()
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`].
///
/// Dropping it does not unsubscribe. [`Subscription::unsubscribe`] may be
/// called any number of times, including after the notifier is gone.
#[derive(Debug, Clone)]
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    registry: Weak<HandlerRegistry>,
    id: u64,
}

impl Subscription {
    /// Deregister the handler.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl core::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.lock().len())
            .finish_non_exhaustive()
    }
}
