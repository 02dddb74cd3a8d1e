//! Session state shared across views.

use std::sync::Arc;

use rooicell_core::{Catalog, cart_total, resolve_cart};
use url::Url;

use crate::catalog::CatalogProvider;
use crate::config::StorefrontConfig;
use crate::notify::{ChangeNotifier, StorageWatchNotifier, WatchHandle};
use crate::order::{order_link, order_message};
use crate::storage::{FileStorage, Storage};
use crate::store::CommerceStore;

/// Everything a view needs for one session.
///
/// This struct is cheaply cloneable via `Arc` and is passed explicitly to
/// every view; there is no global instance.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: CommerceStore,
    catalog: CatalogProvider,
    watcher: Arc<StorageWatchNotifier>,
}

impl AppState {
    /// Create state persisting to `config.data_dir`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.data_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Create state over an explicit storage backend.
    #[must_use]
    pub fn with_storage(config: StorefrontConfig, storage: Arc<dyn Storage>) -> Self {
        let watcher = Arc::new(StorageWatchNotifier::new(Arc::clone(&storage)));
        let notifier: Arc<dyn ChangeNotifier> = Arc::clone(&watcher) as Arc<dyn ChangeNotifier>;
        let store = CommerceStore::new(storage, notifier);
        let catalog = CatalogProvider::from_url(config.catalog_url.clone(), config.catalog_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                watcher,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &CommerceStore {
        &self.inner.store
    }

    #[must_use]
    pub fn catalog_provider(&self) -> &CatalogProvider {
        &self.inner.catalog
    }

    /// The current catalog.
    pub async fn catalog(&self) -> Arc<Catalog> {
        self.inner.catalog.catalog().await
    }

    /// The storage watch behind the store's notifier.
    #[must_use]
    pub fn watcher(&self) -> &Arc<StorageWatchNotifier> {
        &self.inner.watcher
    }

    /// Start picking up writes from other processes at the configured interval.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_watch(&self) -> WatchHandle {
        self.inner.watcher.spawn_watch(self.inner.config.watch_interval)
    }

    /// WhatsApp link for the current cart, or `None` when nothing in the cart
    /// resolves against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the configured phone yields an invalid link.
    pub fn order_link(&self, catalog: &Catalog) -> Result<Option<Url>, url::ParseError> {
        let lines = self.store().read_cart();
        let resolved = resolve_cart(&lines, catalog);
        if resolved.is_empty() {
            return Ok(None);
        }
        let message = order_message(&resolved, cart_total(&resolved));
        order_link(&self.inner.config.order_phone, &message).map(Some)
    }
}

impl core::fmt::Debug for AppState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("catalog", &self.inner.catalog)
            .finish_non_exhaustive()
    }
}
