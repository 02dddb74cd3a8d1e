//! Catalog browsing.
//!
//! ```bash
//! # Products passing the saved filter
//! rooicell catalog list
//!
//! # Every product, ignoring the filter
//! rooicell catalog list --all
//!
//! # One product card
//! rooicell catalog show prod-4
//! ```

use rooicell_core::ProductId;
use rooicell_core::filter::{CatalogFilter, filter_products};
use rooicell_storefront::AppState;

use super::find_product;
use crate::view;

/// Print products, filtered by the saved filter unless `all` is set.
#[allow(clippy::print_stdout)]
pub async fn list(state: &AppState, all: bool) {
    let catalog = state.catalog().await;
    let likes = state.store().read_likes();
    let filter = if all {
        CatalogFilter::default()
    } else {
        state.store().read_filter()
    };

    let products = filter_products(&catalog.products, &filter, &likes);
    tracing::debug!(
        shown = products.len(),
        total = catalog.products.len(),
        "Listing catalog"
    );
    if !filter.is_empty() {
        print!("{}", view::filter(&filter, &catalog));
        println!();
    }
    print!("{}", view::product_list(&products, &catalog, &likes));
}

/// Print one product card.
///
/// # Errors
///
/// Returns an error if the product is not in the catalog.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState, product_id: &ProductId) -> Result<(), super::CommandError> {
    let catalog = state.catalog().await;
    let product = find_product(&catalog, product_id)?;
    print!(
        "{}",
        view::product_detail(product, &catalog, state.store().is_liked(product_id))
    );
    Ok(())
}
