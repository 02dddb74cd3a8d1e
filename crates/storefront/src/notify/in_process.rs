//! Same-process notifier.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::trace;

use super::{ChangeEvent, ChangeNotifier, EventKind, Handler, HandlerRegistry, Subscription};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Delivers events synchronously to registered handlers and to a broadcast
/// channel for async listeners.
#[derive(Debug)]
pub struct InProcessNotifier {
    registry: Arc<HandlerRegistry>,
    tx: broadcast::Sender<ChangeEvent>,
}

impl InProcessNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            registry: HandlerRegistry::new(),
            tx,
        }
    }
}

impl Default for InProcessNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for InProcessNotifier {
    fn emit(&self, event: ChangeEvent) {
        trace!(?event, "Emitting change event");
        self.registry.dispatch(&event);
        // No receivers is fine
        let _ = self.tx.send(event);
    }

    fn subscribe(&self, kind: EventKind, handler: Handler) -> Subscription {
        self.registry.add(kind, handler)
    }

    fn events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}
