//! Local commerce state store.
//!
//! Single source of truth for cart lines, likes and the catalog filter. Every
//! value lives in the injected [`Storage`] backend; nothing is cached in
//! memory, so any number of `CommerceStore` handles (or processes) over the
//! same storage see the same state.
//!
//! # Contract
//!
//! - Reads never fail. Missing, corrupt or unreadable values read as empty.
//! - A successful mutation performs exactly one storage write, then emits
//!   one change event (and at most one toast).
//! - A mutation that changes nothing writes nothing and emits nothing.
//! - A mutation that returns `Err` left storage untouched and emitted nothing.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use rooicell_core::filter::{CatalogFilter, filter_products};
use rooicell_core::{
    Cart, CartLine, Catalog, CategoryId, Collection, LikeSet, LineKey, Product, ProductId,
};

use crate::error::{Result, StoreError};
use crate::notify::{ChangeEvent, ChangeNotifier, EventKind, InProcessNotifier, Subscription};
use crate::storage::{MemoryStorage, Storage, StorageKey};

/// Toast texts shown after cart mutations.
pub mod messages {
    pub const ADDED_TO_CART: &str = "Добавлено в корзину";
    pub const REMOVED_FROM_CART: &str = "Товар удалён из корзины";
    pub const COLLECTION_ADDED: &str = "Добавлено в корзину: подборка";
}

/// Handle to the local commerce state.
///
/// Cheap to clone; clones share the same storage and notifier.
#[derive(Clone)]
pub struct CommerceStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn ChangeNotifier>,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl CommerceStore {
    /// Create a store over `storage`, emitting through `notifier`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                storage,
                notifier,
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// A store over fresh in-memory storage with an in-process notifier.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(InProcessNotifier::new()),
        )
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.inner.storage
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn ChangeNotifier> {
        &self.inner.notifier
    }

    /// Register `handler` for events of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(kind, Arc::new(handler))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Cart lines, or the error that made them unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if storage is unavailable or the value is corrupt.
    pub fn try_read_cart(&self) -> Result<Vec<CartLine>> {
        self.load::<Cart>(StorageKey::Cart).map(Cart::into_lines)
    }

    /// Cart lines; empty when storage is missing, corrupt or unavailable.
    #[must_use]
    pub fn read_cart(&self) -> Vec<CartLine> {
        self.cart().into_lines()
    }

    /// The cart as a [`Cart`] value.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.read_or_default(StorageKey::Cart)
    }

    /// Number of distinct cart lines.
    #[must_use]
    pub fn cart_line_count(&self) -> usize {
        self.cart().line_count()
    }

    /// Sum of cart quantities, as shown on the header badge.
    #[must_use]
    pub fn cart_total_quantity(&self) -> u64 {
        self.cart().total_quantity()
    }

    /// Add one unit of a product volume to the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart could not be persisted; nothing changed.
    pub fn add_to_cart(&self, product_id: &ProductId, volume_index: usize) -> Result<bool> {
        self.add_to_cart_quantity(product_id, volume_index, 1)
    }

    /// Add `delta` units of a product volume, merging with an existing line.
    ///
    /// Returns `Ok(false)` for a zero `delta`, which is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart could not be persisted; nothing changed.
    #[instrument(skip_all, fields(product_id = %product_id, volume_index = volume_index))]
    pub fn add_to_cart_quantity(
        &self,
        product_id: &ProductId,
        volume_index: usize,
        delta: u32,
    ) -> Result<bool> {
        let key = LineKey::new(product_id.clone(), volume_index);
        let changed = self
            .update(StorageKey::Cart, |cart: &mut Cart| cart.add(key, delta).then_some(()))?
            .is_some();

        if changed {
            debug!("Added to cart");
            self.emit(ChangeEvent::CartChanged);
            self.emit(ChangeEvent::toast(messages::ADDED_TO_CART));
        }
        Ok(changed)
    }

    /// Overwrite a line's quantity. Zero or negative removes the line.
    ///
    /// Returns `Ok(false)` when no line matches.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart could not be persisted; nothing changed.
    #[instrument(skip_all, fields(product_id = %product_id, volume_index = volume_index))]
    pub fn set_cart_quantity(
        &self,
        product_id: &ProductId,
        volume_index: usize,
        quantity: i64,
    ) -> Result<bool> {
        if quantity <= 0 {
            return self.remove_from_cart(product_id, volume_index);
        }

        let key = LineKey::new(product_id.clone(), volume_index);
        let changed = self
            .update(StorageKey::Cart, |cart: &mut Cart| {
                cart.set_quantity(&key, quantity).then_some(())
            })?
            .is_some();

        if changed {
            debug!("Updated cart quantity");
            self.emit(ChangeEvent::CartChanged);
        }
        Ok(changed)
    }

    /// Delete a cart line. Returns `Ok(false)` when it was not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart could not be persisted; nothing changed.
    #[instrument(skip_all, fields(product_id = %product_id, volume_index = volume_index))]
    pub fn remove_from_cart(&self, product_id: &ProductId, volume_index: usize) -> Result<bool> {
        let key = LineKey::new(product_id.clone(), volume_index);
        let changed = self
            .update(StorageKey::Cart, |cart: &mut Cart| cart.remove(&key).then_some(()))?
            .is_some();

        if changed {
            debug!("Removed from cart");
            self.emit(ChangeEvent::CartChanged);
            self.emit(ChangeEvent::toast(messages::REMOVED_FROM_CART));
        }
        Ok(changed)
    }

    /// Persist an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart could not be persisted; nothing changed.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) -> Result<()> {
        {
            let _guard = self.inner.write_lock.lock();
            self.save(StorageKey::Cart, &Cart::default())?;
        }
        debug!("Cleared cart");
        self.emit(ChangeEvent::CartChanged);
        Ok(())
    }

    /// Merge several lines in one write with one notification.
    ///
    /// Returns how many of the items changed the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart could not be persisted; nothing changed.
    pub fn add_lines_to_cart<I>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = (LineKey, u32)>,
    {
        self.add_lines_with_toast(items, messages::ADDED_TO_CART)
    }

    /// Add one unit of every resolvable product in `collection`, at its
    /// recommended volume. References the catalog cannot resolve are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart could not be persisted; nothing changed.
    #[instrument(skip_all, fields(collection_id = %collection.id))]
    pub fn add_collection_to_cart(&self, collection: &Collection, catalog: &Catalog) -> Result<usize> {
        let resolved = catalog.resolve_collection(collection);
        let skipped = collection.product_refs.len() - resolved.len();
        if skipped > 0 {
            debug!(skipped, "Skipping unresolvable collection entries");
        }

        let items = resolved
            .into_iter()
            .map(|r| (LineKey::new(r.product.id.clone(), r.volume_index), 1));
        self.add_lines_with_toast(items, messages::COLLECTION_ADDED)
    }

    fn add_lines_with_toast<I>(&self, items: I, toast: &str) -> Result<usize>
    where
        I: IntoIterator<Item = (LineKey, u32)>,
    {
        let added = self
            .update(StorageKey::Cart, |cart: &mut Cart| {
                let added = items
                    .into_iter()
                    .filter(|(key, delta)| cart.add(key.clone(), *delta))
                    .count();
                (added > 0).then_some(added)
            })?
            .unwrap_or(0);

        if added > 0 {
            debug!(added, "Added lines to cart");
            self.emit(ChangeEvent::CartChanged);
            self.emit(ChangeEvent::toast(toast));
        }
        Ok(added)
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Liked flags, or the error that made them unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if storage is unavailable or the value is corrupt.
    pub fn try_read_likes(&self) -> Result<LikeSet> {
        self.load(StorageKey::Likes)
    }

    /// Liked flags; empty when storage is missing, corrupt or unavailable.
    #[must_use]
    pub fn read_likes(&self) -> LikeSet {
        self.read_or_default(StorageKey::Likes)
    }

    #[must_use]
    pub fn is_liked(&self, product_id: &ProductId) -> bool {
        self.read_likes().is_liked(product_id)
    }

    /// Flip a product's liked flag and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if likes could not be persisted; nothing changed.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub fn toggle_like(&self, product_id: &ProductId) -> Result<bool> {
        let liked = self
            .update(StorageKey::Likes, |likes: &mut LikeSet| {
                Some(likes.toggle(product_id))
            })?
            .unwrap_or(false);

        debug!(liked, "Toggled like");
        self.emit(ChangeEvent::LikesChanged);
        Ok(liked)
    }

    // =========================================================================
    // Filters
    // =========================================================================

    #[must_use]
    pub fn read_selected_categories(&self) -> BTreeSet<CategoryId> {
        self.read_or_default(StorageKey::SelectedCategories)
    }

    /// Replace the category filter. An empty set shows everything.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the filter could not be persisted.
    #[instrument(skip(self))]
    pub fn set_selected_categories(&self, categories: BTreeSet<CategoryId>) -> Result<()> {
        let _guard = self.inner.write_lock.lock();
        self.save(StorageKey::SelectedCategories, &categories)
    }

    /// Add or remove one category from the filter. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the filter could not be persisted.
    #[instrument(skip_all, fields(category_id = %category_id))]
    pub fn toggle_category(&self, category_id: &CategoryId) -> Result<bool> {
        let selected = self
            .update(
                StorageKey::SelectedCategories,
                |set: &mut BTreeSet<CategoryId>| {
                    if set.remove(category_id) {
                        Some(false)
                    } else {
                        set.insert(category_id.clone());
                        Some(true)
                    }
                },
            )?
            .unwrap_or(false);
        Ok(selected)
    }

    #[must_use]
    pub fn read_favorites_only(&self) -> bool {
        self.read_or_default(StorageKey::FavoritesOnly)
    }

    /// Persist the favorites-only flag and return it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the flag could not be persisted.
    #[instrument(skip(self))]
    pub fn set_favorites_only(&self, favorites_only: bool) -> Result<bool> {
        let _guard = self.inner.write_lock.lock();
        self.save(StorageKey::FavoritesOnly, &favorites_only)?;
        Ok(favorites_only)
    }

    /// The persisted category and favorites filter.
    #[must_use]
    pub fn read_filter(&self) -> CatalogFilter {
        CatalogFilter::new(self.read_selected_categories(), self.read_favorites_only())
    }

    /// Catalog products passing the persisted filter, in catalog order.
    #[must_use]
    pub fn visible_products<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        filter_products(&catalog.products, &self.read_filter(), &self.read_likes())
    }

    // =========================================================================
    // Persistence helpers
    // =========================================================================

    fn load<T: DeserializeOwned + Default>(&self, key: StorageKey) -> Result<T> {
        match self.inner.storage.get(key)? {
            None => Ok(T::default()),
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| StoreError::CorruptData { key, source })
            }
        }
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: StorageKey) -> T {
        self.load(key).unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Falling back to empty state");
            T::default()
        })
    }

    fn save<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<()> {
        let raw =
            serde_json::to_string(value).map_err(|source| StoreError::Serialization { key, source })?;
        let storage = &self.inner.storage;
        self.inner
            .notifier
            .record_write(key, &raw, &mut || storage.set(key, &raw))?;
        Ok(())
    }

    /// Read-modify-write one key under the write lock.
    ///
    /// `op` returns `None` to signal "unchanged", in which case nothing is
    /// written. A corrupt stored value is replaced; unavailable storage
    /// aborts before `op` runs.
    fn update<T, R>(&self, key: StorageKey, op: impl FnOnce(&mut T) -> Option<R>) -> Result<Option<R>>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let _guard = self.inner.write_lock.lock();
        let mut value = match self.load::<T>(key) {
            Err(e) if e.is_corrupt_data() => {
                warn!(key = %key, error = %e, "Replacing corrupt stored value");
                T::default()
            }
            other => other?,
        };

        let Some(result) = op(&mut value) else {
            return Ok(None);
        };
        self.save(key, &value)?;
        Ok(Some(result))
    }

    fn emit(&self, event: ChangeEvent) {
        self.inner.notifier.emit(event);
    }
}

impl core::fmt::Debug for CommerceStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommerceStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    /// Records every event emitted through a store.
    struct Recorder {
        events: Arc<Mutex<Vec<ChangeEvent>>>,
        _subs: Vec<Subscription>,
    }

    impl Recorder {
        fn attach(store: &CommerceStore) -> Self {
            let events = Arc::new(Mutex::new(Vec::new()));
            let subs = [
                EventKind::CartChanged,
                EventKind::LikesChanged,
                EventKind::ToastRequested,
            ]
            .into_iter()
            .map(|kind| {
                let log = Arc::clone(&events);
                store.subscribe(kind, move |e| log.lock().push(e.clone()))
            })
            .collect();
            Self {
                events,
                _subs: subs,
            }
        }

        fn count(&self, kind: EventKind) -> usize {
            self.events.lock().iter().filter(|e| e.kind() == kind).count()
        }

        fn total(&self) -> usize {
            self.events.lock().len()
        }
    }

    fn store_over(storage: &Arc<MemoryStorage>) -> CommerceStore {
        CommerceStore::new(
            Arc::clone(storage) as Arc<dyn Storage>,
            Arc::new(InProcessNotifier::new()),
        )
    }

    fn line(id: &str, volume_index: usize, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            volume_index,
            quantity,
        }
    }

    #[test]
    fn test_add_then_remove_scenario() {
        let store = CommerceStore::in_memory();
        let prod = ProductId::new("prod-1");
        assert!(store.read_cart().is_empty());

        store.add_to_cart(&prod, 0).unwrap();
        assert_eq!(store.read_cart(), vec![line("prod-1", 0, 1)]);

        store.add_to_cart(&prod, 0).unwrap();
        assert_eq!(store.read_cart(), vec![line("prod-1", 0, 2)]);

        assert!(store.remove_from_cart(&prod, 0).unwrap());
        assert!(store.read_cart().is_empty());
    }

    #[test]
    fn test_merge_invariant_over_add_sequence() {
        let store = CommerceStore::in_memory();
        let adds = [("prod-1", 0, 2), ("prod-2", 1, 1), ("prod-1", 0, 3), ("prod-1", 1, 1), ("prod-2", 1, 4)];
        for (id, volume, delta) in adds {
            store.add_to_cart_quantity(&ProductId::new(id), volume, delta).unwrap();
        }

        let cart = store.read_cart();
        let mut keys: Vec<_> = cart.iter().map(CartLine::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), cart.len());
        assert_eq!(
            cart,
            vec![line("prod-1", 0, 5), line("prod-2", 1, 5), line("prod-1", 1, 1)]
        );
        assert_eq!(store.cart_line_count(), 3);
        assert_eq!(store.cart_total_quantity(), 11);
    }

    #[test]
    fn test_add_emits_cart_changed_and_toast() {
        let store = CommerceStore::in_memory();
        let recorder = Recorder::attach(&store);
        store.add_to_cart(&ProductId::new("prod-1"), 0).unwrap();
        assert_eq!(recorder.count(EventKind::CartChanged), 1);
        assert_eq!(recorder.count(EventKind::ToastRequested), 1);
        assert_eq!(
            recorder.events.lock()[1],
            ChangeEvent::toast(messages::ADDED_TO_CART)
        );
    }

    #[test]
    fn test_zero_delta_is_silent_noop() {
        let store = CommerceStore::in_memory();
        let recorder = Recorder::attach(&store);
        assert!(!store.add_to_cart_quantity(&ProductId::new("prod-1"), 0, 0).unwrap());
        assert_eq!(recorder.total(), 0);
        assert_eq!(store.storage().get(StorageKey::Cart).unwrap(), None);
    }

    #[test]
    fn test_quantity_floor() {
        for quantity in [0, -5] {
            let store = CommerceStore::in_memory();
            let prod = ProductId::new("prod-1");
            store.add_to_cart_quantity(&prod, 0, 3).unwrap();
            assert!(store.set_cart_quantity(&prod, 0, quantity).unwrap());
            assert!(store.read_cart().is_empty());
        }
    }

    #[test]
    fn test_set_quantity_overwrites_without_toast() {
        let store = CommerceStore::in_memory();
        let prod = ProductId::new("prod-4");
        store.add_to_cart(&prod, 1).unwrap();
        let recorder = Recorder::attach(&store);

        assert!(store.set_cart_quantity(&prod, 1, 6).unwrap());
        assert_eq!(store.read_cart(), vec![line("prod-4", 1, 6)]);
        assert_eq!(recorder.count(EventKind::CartChanged), 1);
        assert_eq!(recorder.count(EventKind::ToastRequested), 0);
    }

    #[test]
    fn test_set_quantity_missing_line_is_noop() {
        let store = CommerceStore::in_memory();
        let recorder = Recorder::attach(&store);
        assert!(!store.set_cart_quantity(&ProductId::new("prod-9"), 0, 3).unwrap());
        assert!(store.read_cart().is_empty());
        assert_eq!(recorder.total(), 0);
    }

    #[test]
    fn test_remove_missing_line_is_noop() {
        let store = CommerceStore::in_memory();
        let recorder = Recorder::attach(&store);
        assert!(!store.remove_from_cart(&ProductId::new("prod-9"), 0).unwrap());
        assert_eq!(recorder.total(), 0);
    }

    #[test]
    fn test_clear_cart_persists_empty_and_notifies_once() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_over(&storage);
        store.add_to_cart(&ProductId::new("prod-1"), 0).unwrap();
        let recorder = Recorder::attach(&store);

        store.clear_cart().unwrap();
        assert_eq!(storage.get(StorageKey::Cart).unwrap().as_deref(), Some("[]"));
        assert_eq!(recorder.count(EventKind::CartChanged), 1);
        assert_eq!(recorder.count(EventKind::ToastRequested), 0);
    }

    #[test]
    fn test_corrupt_cart_reads_empty_and_is_replaced_on_write() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(StorageKey::Cart, "{not json").unwrap();
        let store = store_over(&storage);

        assert!(store.read_cart().is_empty());
        assert!(store.try_read_cart().unwrap_err().is_corrupt_data());

        store.add_to_cart(&ProductId::new("prod-2"), 1).unwrap();
        assert_eq!(store.read_cart(), vec![line("prod-2", 1, 1)]);
    }

    #[test]
    fn test_wrong_shape_reads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(StorageKey::Cart, r#"[{"productId":"prod-1","volumeIndex":0,"quantity":-2}]"#)
            .unwrap();
        storage.set(StorageKey::FavoritesOnly, "\"yes\"").unwrap();
        let store = store_over(&storage);
        assert!(store.read_cart().is_empty());
        assert!(!store.read_favorites_only());
    }

    #[test]
    fn test_stored_cart_breaking_line_invariants_is_corrupt() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                StorageKey::Cart,
                r#"[{"productId":"prod-1","volumeIndex":0,"quantity":0},
                    {"productId":"prod-1","volumeIndex":0,"quantity":2}]"#,
            )
            .unwrap();
        let store = store_over(&storage);

        assert!(store.read_cart().is_empty());
        assert!(store.try_read_cart().unwrap_err().is_corrupt_data());

        storage
            .set(
                StorageKey::Cart,
                r#"[{"productId":"prod-1","volumeIndex":0,"quantity":1},
                    {"productId":"prod-1","volumeIndex":0,"quantity":2}]"#,
            )
            .unwrap();
        assert!(store.read_cart().is_empty());

        store.add_to_cart(&ProductId::new("prod-1"), 0).unwrap();
        assert_eq!(store.read_cart(), vec![line("prod-1", 0, 1)]);
    }

    #[test]
    fn test_unavailable_storage_degrades_silently() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_over(&storage);
        store.add_to_cart(&ProductId::new("prod-1"), 0).unwrap();
        let recorder = Recorder::attach(&store);

        storage.set_available(false);
        assert!(store.read_cart().is_empty());
        assert!(!store.is_liked(&ProductId::new("prod-1")));
        assert!(store.read_selected_categories().is_empty());
        assert!(matches!(
            store.add_to_cart(&ProductId::new("prod-1"), 0),
            Err(StoreError::PersistenceUnavailable(_))
        ));
        assert!(store.toggle_like(&ProductId::new("prod-1")).is_err());
        assert!(store.clear_cart().is_err());
        assert_eq!(recorder.total(), 0);

        storage.set_available(true);
        assert_eq!(store.read_cart(), vec![line("prod-1", 0, 1)]);
        assert!(!store.is_liked(&ProductId::new("prod-1")));
    }

    #[test]
    fn test_quota_exceeded_leaves_state_unchanged() {
        let storage = Arc::new(MemoryStorage::with_quota(60));
        let store = store_over(&storage);
        store.add_to_cart(&ProductId::new("prod-1"), 0).unwrap();
        let recorder = Recorder::attach(&store);

        let err = store
            .add_to_cart(&ProductId::new("prod-with-a-long-identifier"), 1)
            .unwrap_err();
        assert!(matches!(err, StoreError::PersistenceUnavailable(_)));
        assert_eq!(store.read_cart(), vec![line("prod-1", 0, 1)]);
        assert_eq!(recorder.total(), 0);
    }

    #[test]
    fn test_toggle_like_twice_restores_state() {
        let store = CommerceStore::in_memory();
        let recorder = Recorder::attach(&store);
        let prod = ProductId::new("prod-5");

        assert!(store.toggle_like(&prod).unwrap());
        assert!(store.is_liked(&prod));
        assert!(!store.toggle_like(&prod).unwrap());
        assert!(!store.is_liked(&prod));
        assert_eq!(recorder.count(EventKind::LikesChanged), 2);
        assert_eq!(recorder.count(EventKind::ToastRequested), 0);
    }

    #[test]
    fn test_legacy_likes_array_is_read_and_rewritten_as_map() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(StorageKey::Likes, r#"["prod-1","prod-2"]"#).unwrap();
        let store = store_over(&storage);

        assert!(store.is_liked(&ProductId::new("prod-2")));
        assert!(!store.toggle_like(&ProductId::new("prod-1")).unwrap());
        assert_eq!(
            storage.get(StorageKey::Likes).unwrap().as_deref(),
            Some(r#"{"prod-1":false,"prod-2":true}"#)
        );
    }

    #[test]
    fn test_filters_persist_across_handles() {
        let storage = Arc::new(MemoryStorage::new());
        let first = store_over(&storage);
        first
            .set_selected_categories(BTreeSet::from([CategoryId::new("cat-1"), CategoryId::new("cat-3")]))
            .unwrap();
        assert!(first.set_favorites_only(true).unwrap());

        let second = store_over(&storage);
        let filter = second.read_filter();
        assert!(filter.favorites_only);
        assert_eq!(filter.categories.len(), 2);
        assert!(filter.categories.contains("cat-3"));
    }

    #[test]
    fn test_toggle_category() {
        let store = CommerceStore::in_memory();
        let cat = CategoryId::new("cat-2");
        assert!(store.toggle_category(&cat).unwrap());
        assert!(store.read_selected_categories().contains(&cat));
        assert!(!store.toggle_category(&cat).unwrap());
        assert!(store.read_selected_categories().is_empty());
    }

    fn catalog() -> Catalog {
        serde_json::from_value(serde_json::json!({
            "products": [
                {"id": "prod-1", "name": "Oil", "volumes": [{"volume": "150ml", "price": 1290}], "categoryId": "cat-1"},
                {"id": "prod-2", "name": "Foam", "volumes": [{"volume": "150ml", "price": 890}], "categoryId": "cat-1"},
                {"id": "prod-4", "name": "Toner", "volumes": [
                    {"volume": "200ml", "price": 990}, {"volume": "400ml", "price": 1690}
                ], "categoryId": "cat-3"}
            ],
            "collections": [
                {"id": "col-1", "name": "Morning", "description": "", "productIds": [
                    {"productId": "prod-1", "recommendedVolumeIndex": 0},
                    {"productId": "prod-gone", "recommendedVolumeIndex": 0},
                    {"productId": "prod-4", "recommendedVolumeIndex": 1}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_collection_bulk_add_emits_once() {
        let store = CommerceStore::in_memory();
        let catalog = catalog();
        let collection = catalog.collections[0].clone();
        let recorder = Recorder::attach(&store);

        let added = store.add_collection_to_cart(&collection, &catalog).unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.read_cart(), vec![line("prod-1", 0, 1), line("prod-4", 1, 1)]);
        assert_eq!(recorder.count(EventKind::CartChanged), 1);
        assert_eq!(recorder.count(EventKind::ToastRequested), 1);
    }

    #[test]
    fn test_collection_bulk_add_merges_existing_lines() {
        let store = CommerceStore::in_memory();
        let catalog = catalog();
        store.add_to_cart(&ProductId::new("prod-4"), 1).unwrap();
        store
            .add_collection_to_cart(&catalog.collections[0], &catalog)
            .unwrap();
        assert_eq!(store.read_cart(), vec![line("prod-4", 1, 2), line("prod-1", 0, 1)]);
    }

    #[test]
    fn test_visible_products_applies_persisted_filter() {
        let store = CommerceStore::in_memory();
        let catalog = catalog();
        store.toggle_like(&ProductId::new("prod-2")).unwrap();
        store.toggle_like(&ProductId::new("prod-4")).unwrap();
        store.toggle_category(&CategoryId::new("cat-1")).unwrap();
        store.set_favorites_only(true).unwrap();

        let visible: Vec<&str> = store
            .visible_products(&catalog)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(visible, ["prod-2"]);
    }

    #[test]
    fn test_external_clear_reads_as_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_over(&storage);
        store.add_to_cart(&ProductId::new("prod-1"), 0).unwrap();
        store.toggle_like(&ProductId::new("prod-1")).unwrap();
        for key in StorageKey::ALL {
            storage.remove(key).unwrap();
        }
        assert!(store.read_cart().is_empty());
        assert!(store.read_likes().is_empty());
        assert_eq!(store.read_filter(), CatalogFilter::default());
    }
}
