//! Plain-text rendering of catalog, cart and filter state.
//!
//! Everything here returns a `String`; the command handlers print it.

use std::fmt::Write as _;

use rooicell_core::display::{min_price, short_description};
use rooicell_core::filter::CatalogFilter;
use rooicell_core::{Catalog, Collection, LikeSet, Price, Product, ResolvedLine};

/// Description length on catalog rows.
pub const GRID_DESCRIPTION_CHARS: usize = 95;

const EMPTY_CART: &str = "Ваша корзина пуста";
const EMPTY_RESULTS: &str = "Ничего не найдено";

fn heart(liked: bool) -> char {
    if liked { '♥' } else { '♡' }
}

fn category_names(product: &Product, catalog: &Catalog) -> String {
    product
        .category_ids
        .iter()
        .map(|id| catalog.category(id).map_or(id.as_str(), |c| c.name.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One catalog row per product.
#[must_use]
pub fn product_list(products: &[&Product], catalog: &Catalog, likes: &LikeSet) -> String {
    if products.is_empty() {
        return format!("{EMPTY_RESULTS}\n");
    }

    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{} {:<8} {}  от {}  [{}]",
            heart(likes.is_liked(&product.id)),
            product.id,
            product.name,
            min_price(&product.volumes),
            category_names(product, catalog),
        );
        let _ = writeln!(
            out,
            "           {}",
            short_description(&product.description, GRID_DESCRIPTION_CHARS)
        );
    }
    out
}

/// Full product card.
#[must_use]
pub fn product_detail(product: &Product, catalog: &Catalog, liked: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} ({})", heart(liked), product.name, product.id);
    let _ = writeln!(out, "{}", product.description);
    let _ = writeln!(out, "Категории: {}", category_names(product, catalog));
    let _ = writeln!(out, "Объёмы:");
    for (index, volume) in product.volumes.iter().enumerate() {
        let _ = writeln!(out, "  [{index}] {} - {}", volume.label, volume.price);
    }

    let collections = catalog.collections_containing(&product.id);
    if !collections.is_empty() {
        let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(out, "В подборках: {}", names.join(", "));
    }
    out
}

/// One row per collection.
#[must_use]
pub fn collection_list(catalog: &Catalog) -> String {
    let mut out = String::new();
    for collection in &catalog.collections {
        let resolved = catalog.resolve_collection(collection);
        let _ = writeln!(
            out,
            "{:<6} {} ({} шт.)",
            collection.id,
            collection.name,
            resolved.len()
        );
    }
    out
}

/// Collection contents at the recommended volumes, with the set price.
#[must_use]
pub fn collection_detail(collection: &Collection, catalog: &Catalog) -> String {
    let resolved = catalog.resolve_collection(collection);
    let mut out = String::new();
    let _ = writeln!(out, "{}", collection.name);
    let _ = writeln!(out, "{}", collection.description);
    for entry in &resolved {
        let _ = writeln!(
            out,
            "  {} ({}) - {}",
            entry.product.name, entry.volume.label, entry.volume.price
        );
    }
    let total: Price = resolved.iter().map(|r| r.volume.price).sum();
    let _ = writeln!(out, "Стоимость подборки: {total}");
    out
}

/// Cart lines with totals.
#[must_use]
pub fn cart(lines: &[ResolvedLine<'_>], total: Price) -> String {
    if lines.is_empty() {
        return format!("{EMPTY_CART}\n");
    }

    let mut out = String::new();
    for line in lines {
        let _ = writeln!(
            out,
            "{:<8} [{}] {} ({}) x {} = {}",
            line.product.id,
            line.volume_index,
            line.product.name,
            line.volume.label,
            line.quantity,
            line.line_total()
        );
    }
    let _ = writeln!(out, "Итого: {total}");
    out
}

/// Active filter summary.
#[must_use]
pub fn filter(filter: &CatalogFilter, catalog: &Catalog) -> String {
    let categories = if filter.categories.is_empty() {
        "все".to_string()
    } else {
        filter
            .categories
            .iter()
            .map(|id| catalog.category(id).map_or(id.as_str(), |c| c.name.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let favorites = if filter.favorites_only { "да" } else { "нет" };
    format!("Категории: {categories}\nТолько избранное: {favorites}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rooicell_core::{CartLine, CategoryId, ProductId, cart_total, resolve_cart};
    use rooicell_storefront::catalog::bundled_catalog;

    use super::*;

    #[test]
    fn test_product_list_marks_likes_and_min_price() {
        let catalog = bundled_catalog().unwrap();
        let likes: LikeSet = [(ProductId::new("prod-2"), true)].into_iter().collect();
        let products: Vec<&Product> = catalog.products.iter().take(2).collect();

        let out = product_list(&products, &catalog, &likes);
        let rows: Vec<&str> = out.lines().collect();
        assert!(rows[0].starts_with("♡ prod-1"));
        assert!(rows[0].contains("от 1290 ₸"));
        assert!(rows[0].contains("[Очищение]"));
        assert!(rows[2].starts_with("♥ prod-2"));
    }

    #[test]
    fn test_product_list_empty() {
        let catalog = Catalog::default();
        assert_eq!(product_list(&[], &catalog, &LikeSet::default()), "Ничего не найдено\n");
    }

    #[test]
    fn test_product_detail_lists_volumes_and_collections() {
        let catalog = bundled_catalog().unwrap();
        let toner = catalog.product(&ProductId::new("prod-4")).unwrap();
        let out = product_detail(toner, &catalog, true);
        assert!(out.contains("[1] 400ml - 1690 ₸"));
        assert!(out.contains("Утренний уход"));
        assert!(out.contains("Интенсивное увлажнение"));
    }

    #[test]
    fn test_cart_view() {
        let catalog = bundled_catalog().unwrap();
        let lines = vec![
            CartLine {
                product_id: ProductId::new("prod-1"),
                volume_index: 0,
                quantity: 2,
            },
            CartLine {
                product_id: ProductId::new("prod-4"),
                volume_index: 1,
                quantity: 1,
            },
        ];
        let resolved = resolve_cart(&lines, &catalog);
        let out = cart(&resolved, cart_total(&resolved));
        assert!(out.contains("x 2 = 2580 ₸"));
        assert!(out.ends_with("Итого: 4270 ₸\n"));

        assert_eq!(cart(&[], Price::ZERO), "Ваша корзина пуста\n");
    }

    #[test]
    fn test_collection_detail_total() {
        let catalog = bundled_catalog().unwrap();
        let out = collection_detail(&catalog.collections[1], &catalog);
        // 2190 + 1590 + 2490
        assert!(out.ends_with("Стоимость подборки: 6270 ₸\n"));
    }

    #[test]
    fn test_filter_view() {
        let catalog = bundled_catalog().unwrap();
        let out = filter(&CatalogFilter::default(), &catalog);
        assert_eq!(out, "Категории: все\nТолько избранное: нет\n");

        let active = CatalogFilter::new([CategoryId::new("cat-3")].into(), true);
        assert_eq!(filter(&active, &catalog), "Категории: Тонеры\nТолько избранное: да\n");
    }
}
