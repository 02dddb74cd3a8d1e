//! Product list filtering.
//!
//! The catalog grid shows products that pass both the category filter and
//! the favorites filter. An empty category selection means "show all".

use std::collections::BTreeSet;

use crate::types::{CategoryId, LikeSet, Product};

/// The user's current catalog filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Inclusion set; empty means no category filter.
    pub categories: BTreeSet<CategoryId>,
    /// Only show liked products.
    pub favorites_only: bool,
}

impl CatalogFilter {
    #[must_use]
    pub const fn new(categories: BTreeSet<CategoryId>, favorites_only: bool) -> Self {
        Self {
            categories,
            favorites_only,
        }
    }

    /// Whether no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && !self.favorites_only
    }

    #[must_use]
    pub fn matches_category(&self, product: &Product) -> bool {
        self.categories.is_empty()
            || product
                .category_ids
                .iter()
                .any(|c| self.categories.contains(c))
    }

    #[must_use]
    pub fn matches_favorites(&self, product: &Product, likes: &LikeSet) -> bool {
        !self.favorites_only || likes.is_liked(&product.id)
    }

    #[must_use]
    pub fn matches(&self, product: &Product, likes: &LikeSet) -> bool {
        self.matches_category(product) && self.matches_favorites(product, likes)
    }
}

/// Products passing `filter`, in their original order.
#[must_use]
pub fn filter_products<'a>(
    products: &'a [Product],
    filter: &CatalogFilter,
    likes: &LikeSet,
) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| filter.matches(p, likes))
        .collect()
}
