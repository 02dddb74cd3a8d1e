//! Integration tests for the ROOICELL storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rooicell-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end cart, likes and filter flows on the bundled catalog
//! - `cross_session` - Sessions sharing a data directory see each other's writes
//! - `persistence` - On-disk format, corruption and legacy data

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use rooicell_storefront::notify::{ChangeEvent, EventKind, Subscription};
use rooicell_storefront::{AppState, CommerceStore, StorefrontConfig};

/// A data directory that sessions can be opened on.
pub struct TestContext {
    dir: TempDir,
}

impl TestContext {
    /// Create a fresh, empty data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Open a session over the shared data directory.
    #[must_use]
    pub fn session(&self) -> AppState {
        AppState::new(StorefrontConfig {
            data_dir: self.dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        })
    }
}

/// Collects every event a store emits.
pub struct EventLog {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
    subscriptions: Vec<Subscription>,
}

impl EventLog {
    #[must_use]
    pub fn attach(store: &CommerceStore) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriptions = [
            EventKind::CartChanged,
            EventKind::LikesChanged,
            EventKind::ToastRequested,
        ]
        .into_iter()
        .map(|kind| {
            let log = Arc::clone(&events);
            store.subscribe(kind, move |event| log.lock().push(event.clone()))
        })
        .collect();
        Self {
            events,
            subscriptions,
        }
    }

    #[must_use]
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn detach(&self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }
}
