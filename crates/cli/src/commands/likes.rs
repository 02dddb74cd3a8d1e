//! Liked products.

use rooicell_core::ProductId;
use rooicell_storefront::AppState;

use super::find_product;
use crate::view;

/// Flip a product's liked flag.
///
/// # Errors
///
/// Returns an error if the product is unknown or likes could not be saved.
#[allow(clippy::print_stdout)]
pub async fn toggle(state: &AppState, product_id: &ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = state.catalog().await;
    let product = find_product(&catalog, product_id)?;
    let liked = state.store().toggle_like(product_id)?;
    println!(
        "{} {}",
        if liked { "♥" } else { "♡" },
        product.name
    );
    Ok(())
}

/// Print liked products that are still in the catalog.
#[allow(clippy::print_stdout)]
pub async fn list(state: &AppState) {
    let catalog = state.catalog().await;
    let likes = state.store().read_likes();
    let liked: Vec<_> = catalog
        .products
        .iter()
        .filter(|p| likes.is_liked(&p.id))
        .collect();
    print!("{}", view::product_list(&liked, &catalog, &likes));
}
