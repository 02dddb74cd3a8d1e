//! Saved catalog filter.

use std::collections::BTreeSet;

use rooicell_storefront::AppState;

use super::CommandError;
use crate::view;

#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState) {
    let catalog = state.catalog().await;
    print!("{}", view::filter(&state.store().read_filter(), &catalog));
}

/// Toggle a category by id or slug.
///
/// # Errors
///
/// Returns an error if the category is unknown or the filter could not be saved.
#[allow(clippy::print_stdout)]
pub async fn toggle_category(state: &AppState, id_or_slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = state.catalog().await;
    let category = catalog
        .categories
        .iter()
        .find(|c| c.id.as_str() == id_or_slug || c.slug == id_or_slug)
        .ok_or_else(|| CommandError::UnknownCategory(id_or_slug.to_string()))?;

    let selected = state.store().toggle_category(&category.id)?;
    println!("{} {}", if selected { "[x]" } else { "[ ]" }, category.name);
    Ok(())
}

/// Turn favorites-only on or off.
///
/// # Errors
///
/// Returns an error if the flag could not be saved.
pub fn favorites(state: &AppState, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    state.store().set_favorites_only(enabled)?;
    Ok(())
}

/// Drop every filter.
///
/// # Errors
///
/// Returns an error if the filter could not be saved.
pub fn clear(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    state.store().set_selected_categories(BTreeSet::new())?;
    state.store().set_favorites_only(false)?;
    Ok(())
}
