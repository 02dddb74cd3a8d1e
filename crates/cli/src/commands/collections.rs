//! Curated collections.

use rooicell_core::CollectionId;
use rooicell_storefront::AppState;

use super::CommandError;
use crate::view;

#[allow(clippy::print_stdout)]
pub async fn list(state: &AppState) {
    let catalog = state.catalog().await;
    print!("{}", view::collection_list(&catalog));
}

/// Print a collection's products at their recommended volumes.
///
/// # Errors
///
/// Returns an error if the collection is not in the catalog.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState, id: &CollectionId) -> Result<(), CommandError> {
    let catalog = state.catalog().await;
    let collection = catalog
        .collection(id)
        .ok_or_else(|| CommandError::UnknownCollection(id.clone()))?;
    print!("{}", view::collection_detail(collection, &catalog));
    Ok(())
}

/// Put every product of a collection into the cart in one step.
///
/// # Errors
///
/// Returns an error if the collection is unknown or the cart could not be saved.
pub async fn add(state: &AppState, id: &CollectionId) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = state.catalog().await;
    let collection = catalog
        .collection(id)
        .ok_or_else(|| CommandError::UnknownCollection(id.clone()))?;

    let added = state.store().add_collection_to_cart(collection, &catalog)?;
    tracing::info!(collection_id = %id, added, "Collection added to cart");
    Ok(())
}
