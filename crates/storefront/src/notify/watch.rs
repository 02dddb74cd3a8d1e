//! Notifier that also observes writes made by other processes.
//!
//! Several processes (terminal sessions, a long-running `watch`) may share
//! one [`FileStorage`](crate::storage::FileStorage) directory. Each keeps
//! the raw value it last saw for the cart and likes keys; a poll that finds
//! a different value emits the matching change event locally. A process's
//! own writes update that snapshot while the poll is locked out, so it never
//! re-receives its own write.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{ChangeEvent, ChangeNotifier, EventKind, Handler, InProcessNotifier, Subscription};
use crate::storage::{Storage, StorageError, StorageKey};

/// Keys whose external changes are reported, with the event they map to.
const WATCHED: [(StorageKey, EventKind); 2] = [
    (StorageKey::Cart, EventKind::CartChanged),
    (StorageKey::Likes, EventKind::LikesChanged),
];

const fn event_for(kind: EventKind) -> Option<ChangeEvent> {
    match kind {
        EventKind::CartChanged => Some(ChangeEvent::CartChanged),
        EventKind::LikesChanged => Some(ChangeEvent::LikesChanged),
        EventKind::ToastRequested => None,
    }
}

/// In-process notifier plus a storage watch.
pub struct StorageWatchNotifier {
    local: InProcessNotifier,
    storage: Arc<dyn Storage>,
    seen: Mutex<HashMap<StorageKey, Option<String>>>,
}

impl StorageWatchNotifier {
    /// Create a notifier watching `storage`, starting from its current contents.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let seen = WATCHED
            .iter()
            .filter_map(|(key, _)| storage.get(*key).ok().map(|value| (*key, value)))
            .collect();
        Self {
            local: InProcessNotifier::new(),
            storage,
            seen: Mutex::new(seen),
        }
    }

    /// Check the watched keys once and emit an event for each that changed
    /// since this process last saw it. Returns the emitted events.
    pub fn poll(&self) -> Vec<ChangeEvent> {
        let mut changed = Vec::new();
        {
            let mut seen = self.seen.lock();
            for (key, kind) in WATCHED {
                match self.storage.get(key) {
                    Ok(current) => {
                        if seen.get(&key) != Some(&current) {
                            seen.insert(key, current);
                            changed.extend(event_for(kind));
                        }
                    }
                    Err(e) => {
                        debug!(key = %key, error = %e, "Storage unreadable during watch poll");
                    }
                }
            }
        }

        for event in &changed {
            self.local.emit(event.clone());
        }
        changed
    }

    /// Poll every `every` on the current tokio runtime until the handle is
    /// stopped or the notifier is dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_watch(self: &Arc<Self>, every: Duration) -> WatchHandle {
        let weak = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(notifier) = weak.upgrade() else {
                    debug!("Notifier dropped, stopping storage watch");
                    break;
                };
                let changed = notifier.poll();
                if !changed.is_empty() {
                    debug!(events = ?changed, "Observed external storage changes");
                }
            }
        });
        WatchHandle { task }
    }
}

impl ChangeNotifier for StorageWatchNotifier {
    fn emit(&self, event: ChangeEvent) {
        self.local.emit(event);
    }

    fn subscribe(&self, kind: EventKind, handler: Handler) -> Subscription {
        self.local.subscribe(kind, handler)
    }

    fn events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.local.events()
    }

    fn record_write(
        &self,
        key: StorageKey,
        value: &str,
        write: &mut dyn FnMut() -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        if !WATCHED.iter().any(|(watched, _)| *watched == key) {
            return write();
        }
        // Held across the write so `poll` sees either the old snapshot and
        // old value, or both updated.
        let mut seen = self.seen.lock();
        write()?;
        seen.insert(key, Some(value.to_owned()));
        Ok(())
    }
}

impl core::fmt::Debug for StorageWatchNotifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StorageWatchNotifier")
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

/// Handle to a running storage watch. Dropping it stops the watch.
#[derive(Debug)]
pub struct WatchHandle {
    task: JoinHandle<()>,
}

impl WatchHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use rooicell_core::ProductId;

    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::CommerceStore;

    fn shared() -> Arc<dyn Storage> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn test_poll_reports_external_write_once() {
        let storage = shared();
        let ours = StorageWatchNotifier::new(Arc::clone(&storage));

        storage.set(StorageKey::Cart, "[]").unwrap();
        assert_eq!(ours.poll(), vec![ChangeEvent::CartChanged]);
        assert!(ours.poll().is_empty());
    }

    #[test]
    fn test_own_write_is_not_echoed() {
        let storage = shared();
        let ours = StorageWatchNotifier::new(Arc::clone(&storage));
        let theirs = StorageWatchNotifier::new(Arc::clone(&storage));

        let value = r#"{"prod-1":true}"#;
        ours.record_write(StorageKey::Likes, value, &mut || {
            storage.set(StorageKey::Likes, value)
        })
        .unwrap();

        assert!(ours.poll().is_empty());
        assert_eq!(theirs.poll(), vec![ChangeEvent::LikesChanged]);
    }

    #[test]
    fn test_failed_own_write_keeps_snapshot() {
        let storage = shared();
        let ours = StorageWatchNotifier::new(Arc::clone(&storage));
        let err = ours
            .record_write(StorageKey::Cart, "[]", &mut || Err(StorageError::Unavailable))
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable));

        storage.set(StorageKey::Cart, "[]").unwrap();
        assert_eq!(ours.poll(), vec![ChangeEvent::CartChanged]);
    }

    #[test]
    fn test_emit_does_not_hide_external_write() {
        let storage = shared();
        let ours = StorageWatchNotifier::new(Arc::clone(&storage));
        storage.set(StorageKey::Cart, "[]").unwrap();
        ours.emit(ChangeEvent::CartChanged);
        assert_eq!(ours.poll(), vec![ChangeEvent::CartChanged]);
    }

    /// Storage that starts a watch poll on another thread after every write,
    /// before the writer gets to emit.
    struct PollAfterSet {
        inner: MemoryStorage,
        watcher: OnceLock<Arc<StorageWatchNotifier>>,
        pollers: Mutex<Vec<thread::JoinHandle<Vec<ChangeEvent>>>>,
    }

    impl Storage for PollAfterSet {
        fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)?;
            if let Some(watcher) = self.watcher.get() {
                let watcher = Arc::clone(watcher);
                self.pollers.lock().push(thread::spawn(move || watcher.poll()));
                thread::sleep(Duration::from_millis(50));
            }
            Ok(())
        }

        fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_poll_racing_own_write_emits_once() {
        let storage = Arc::new(PollAfterSet {
            inner: MemoryStorage::new(),
            watcher: OnceLock::new(),
            pollers: Mutex::new(Vec::new()),
        });
        let watcher = Arc::new(StorageWatchNotifier::new(
            Arc::clone(&storage) as Arc<dyn Storage>
        ));
        storage.watcher.set(Arc::clone(&watcher)).unwrap();

        let carts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&carts);
        let _sub = watcher.subscribe(
            EventKind::CartChanged,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let store = CommerceStore::new(
            Arc::clone(&storage) as Arc<dyn Storage>,
            Arc::clone(&watcher) as Arc<dyn ChangeNotifier>,
        );
        store.add_to_cart(&ProductId::new("prod-1"), 0).unwrap();

        let pollers: Vec<_> = storage.pollers.lock().drain(..).collect();
        assert_eq!(pollers.len(), 1);
        for poller in pollers {
            assert!(poller.join().unwrap().is_empty());
        }
        assert_eq!(carts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unwatched_keys_are_ignored() {
        let storage = shared();
        let ours = StorageWatchNotifier::new(Arc::clone(&storage));
        storage.set(StorageKey::FavoritesOnly, "true").unwrap();
        assert!(ours.poll().is_empty());
    }

    #[test]
    fn test_external_clear_is_a_change() {
        let storage = shared();
        storage.set(StorageKey::Cart, "[]").unwrap();
        let ours = StorageWatchNotifier::new(Arc::clone(&storage));
        storage.remove(StorageKey::Cart).unwrap();
        assert_eq!(ours.poll(), vec![ChangeEvent::CartChanged]);
    }

    #[tokio::test]
    async fn test_spawned_watch_delivers_to_subscribers() {
        let storage = shared();
        let ours = Arc::new(StorageWatchNotifier::new(Arc::clone(&storage)));
        let mut rx = ours.events();
        let handle = ours.spawn_watch(Duration::from_millis(10));

        storage.set(StorageKey::Likes, "{}").unwrap();
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, ChangeEvent::LikesChanged);

        handle.stop();
    }

    #[tokio::test]
    async fn test_watch_stops_when_notifier_dropped() {
        let ours = Arc::new(StorageWatchNotifier::new(shared()));
        let handle = ours.spawn_watch(Duration::from_millis(5));
        drop(ours);
        tokio::time::timeout(Duration::from_secs(2), async {
            while !handle.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }
}
