//! Cart commands.
//!
//! ```bash
//! rooicell cart add prod-1 --volume 0 --quantity 2
//! rooicell cart set prod-1 5 --volume 0
//! rooicell cart remove prod-1
//! rooicell cart show
//! rooicell cart order
//! ```

use rooicell_core::{ProductId, cart_total, resolve_cart};
use rooicell_storefront::AppState;

use super::find_volume;
use crate::view;

/// Print the cart with line and grand totals.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState) {
    let catalog = state.catalog().await;
    let lines = state.store().read_cart();
    let resolved = resolve_cart(&lines, &catalog);
    if resolved.len() < lines.len() {
        tracing::debug!(
            dropped = lines.len() - resolved.len(),
            "Cart lines no longer in catalog"
        );
    }
    print!("{}", view::cart(&resolved, cart_total(&resolved)));
}

/// Add `quantity` units of a product volume.
///
/// # Errors
///
/// Returns an error if the product or volume is unknown or the cart could not be saved.
pub async fn add(
    state: &AppState,
    product_id: &ProductId,
    volume_index: usize,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = state.catalog().await;
    find_volume(&catalog, product_id, volume_index)?;
    state
        .store()
        .add_to_cart_quantity(product_id, volume_index, quantity)?;
    Ok(())
}

/// Overwrite a line's quantity; zero or less removes it.
///
/// # Errors
///
/// Returns an error if the cart could not be saved.
pub fn set(
    state: &AppState,
    product_id: &ProductId,
    volume_index: usize,
    quantity: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    if !state
        .store()
        .set_cart_quantity(product_id, volume_index, quantity)?
    {
        tracing::warn!(product_id = %product_id, volume_index, "No such cart line");
    }
    Ok(())
}

/// Remove a cart line.
///
/// # Errors
///
/// Returns an error if the cart could not be saved.
pub fn remove(
    state: &AppState,
    product_id: &ProductId,
    volume_index: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if !state.store().remove_from_cart(product_id, volume_index)? {
        tracing::warn!(product_id = %product_id, volume_index, "No such cart line");
    }
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart could not be saved.
pub fn clear(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    state.store().clear_cart()?;
    tracing::info!("Cart cleared");
    Ok(())
}

/// Print the order message and its WhatsApp link.
///
/// # Errors
///
/// Returns an error if the configured phone number produces an invalid link.
#[allow(clippy::print_stdout)]
pub async fn order(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = state.catalog().await;
    let Some(link) = state.order_link(&catalog)? else {
        println!("Ваша корзина пуста");
        return Ok(());
    };

    let lines = state.store().read_cart();
    let resolved = resolve_cart(&lines, &catalog);
    println!(
        "{}",
        rooicell_storefront::order::order_message(&resolved, cart_total(&resolved))
    );
    println!();
    println!("{link}");
    Ok(())
}
