//! Command handlers. Each takes the session [`AppState`] explicitly.
//!
//! [`AppState`]: rooicell_storefront::AppState

pub mod cart;
pub mod catalog;
pub mod collections;
pub mod filter;
pub mod likes;
pub mod watch;

use rooicell_core::{Catalog, CollectionId, Product, ProductId};
use thiserror::Error;

/// Errors reported to the terminal user.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("Product {product} has no volume {index}")]
    UnknownVolume { product: ProductId, index: usize },

    #[error("Unknown collection: {0}")]
    UnknownCollection(CollectionId),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Look up a product, rejecting ids the catalog does not know.
pub fn find_product<'a>(catalog: &'a Catalog, id: &ProductId) -> Result<&'a Product, CommandError> {
    catalog
        .product(id)
        .ok_or_else(|| CommandError::UnknownProduct(id.clone()))
}

/// Look up a product and check `volume_index` against its volumes.
pub fn find_volume<'a>(
    catalog: &'a Catalog,
    id: &ProductId,
    volume_index: usize,
) -> Result<&'a Product, CommandError> {
    let product = find_product(catalog, id)?;
    if product.volume(volume_index).is_none() {
        return Err(CommandError::UnknownVolume {
            product: id.clone(),
            index: volume_index,
        });
    }
    Ok(product)
}
