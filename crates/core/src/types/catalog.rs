//! Catalog entities: products, categories and curated collections.
//!
//! These are immutable, supplied by a catalog provider and never written to
//! local storage. The JSON shape matches the bundled catalog data, including
//! the legacy field names it carries.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, CollectionId, ProductId};
use super::price::Price;

/// A purchasable size variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Human-readable size, e.g. `"150ml"` or `"50g"`.
    #[serde(rename = "volume")]
    pub label: String,
    /// Price of one unit of this volume.
    pub price: Price,
}

/// A catalog product.
///
/// Category membership is normalized into [`Product::category_ids`] when
/// deserializing, whichever of `category`, `categoryId`, `categoryIds` or
/// `categories` the source used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawProduct")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Image URL.
    pub image: String,
    /// Ordered, index-addressable volumes. Cart lines refer to these by index.
    pub volumes: Vec<Volume>,
    pub category_ids: BTreeSet<CategoryId>,
    /// Advisory default from the catalog source. Persisted likes win.
    pub is_liked: bool,
}

impl Product {
    /// Volume at `index`, if it exists.
    #[must_use]
    pub fn volume(&self, index: usize) -> Option<&Volume> {
        self.volumes.get(index)
    }

    /// Whether the product belongs to `category`.
    #[must_use]
    pub fn in_category(&self, category: &CategoryId) -> bool {
        self.category_ids.contains(category)
    }
}

/// A single category id or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryField {
    One(CategoryId),
    Many(Vec<CategoryId>),
}

impl CategoryField {
    fn into_ids(self) -> Vec<CategoryId> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

/// Wire shape of a product before category normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProduct {
    id: ProductId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    volumes: Vec<Volume>,
    #[serde(default)]
    category: Option<CategoryField>,
    #[serde(default)]
    category_id: Option<CategoryField>,
    #[serde(default)]
    category_ids: Option<CategoryField>,
    #[serde(default)]
    categories: Option<CategoryField>,
    #[serde(default)]
    is_liked: bool,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        let category_ids = [raw.category, raw.category_id, raw.category_ids, raw.categories]
            .into_iter()
            .flatten()
            .flat_map(CategoryField::into_ids)
            .collect();

        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            image: raw.image,
            volumes: raw.volumes,
            category_ids,
            is_liked: raw.is_liked,
        }
    }
}

/// A product category used by the catalog filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A product reference inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub product_id: ProductId,
    pub recommended_volume_index: usize,
}

/// A curated, named bundle of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub description: String,
    #[serde(rename = "productIds", alias = "productRefs")]
    pub product_refs: Vec<ProductRef>,
}

/// A collection entry resolved against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRef<'a> {
    pub product: &'a Product,
    pub volume_index: usize,
    pub volume: &'a Volume,
}

/// Structural problems found by [`Catalog::validate`].
///
/// None of these stop the catalog from being used: dangling references are
/// dropped at resolution time.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// A product has no volumes and cannot be added to the cart.
    #[error("product {0} has no volumes")]
    EmptyVolumes(ProductId),
    /// Two products share an id; lookups return the first.
    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),
    /// A product refers to a category the catalog does not define.
    #[error("product {product} refers to unknown category {category}")]
    UnknownCategory {
        product: ProductId,
        category: CategoryId,
    },
    /// A collection refers to a product that does not exist.
    #[error("collection {collection} refers to missing product {product}")]
    DanglingReference {
        collection: CollectionId,
        product: ProductId,
    },
    /// A collection recommends a volume the product does not have.
    #[error("collection {collection} recommends volume {index} of {product}, which does not exist")]
    InvalidVolumeIndex {
        collection: CollectionId,
        product: ProductId,
        index: usize,
    },
}

/// The full immutable catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl Catalog {
    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Look up a category by id.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Look up a collection by id.
    #[must_use]
    pub fn collection(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections.iter().find(|c| &c.id == id)
    }

    /// Collections that include `product_id`, in catalog order.
    #[must_use]
    pub fn collections_containing(&self, product_id: &ProductId) -> Vec<&Collection> {
        self.collections
            .iter()
            .filter(|c| c.product_refs.iter().any(|r| &r.product_id == product_id))
            .collect()
    }

    /// Resolve a collection's references against this catalog.
    ///
    /// References to missing products or out-of-range volumes are dropped.
    #[must_use]
    pub fn resolve_collection<'a>(&'a self, collection: &Collection) -> Vec<ResolvedRef<'a>> {
        collection
            .product_refs
            .iter()
            .filter_map(|r| {
                let product = self.product(&r.product_id)?;
                let volume = product.volume(r.recommended_volume_index)?;
                Some(ResolvedRef {
                    product,
                    volume_index: r.recommended_volume_index,
                    volume,
                })
            })
            .collect()
    }

    /// Report structural problems in the catalog data.
    #[must_use]
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for product in &self.products {
            if !seen.insert(&product.id) {
                issues.push(CatalogIssue::DuplicateProduct(product.id.clone()));
            }
            if product.volumes.is_empty() {
                issues.push(CatalogIssue::EmptyVolumes(product.id.clone()));
            }
            for category in &product.category_ids {
                if self.category(category).is_none() {
                    issues.push(CatalogIssue::UnknownCategory {
                        product: product.id.clone(),
                        category: category.clone(),
                    });
                }
            }
        }

        for collection in &self.collections {
            for r in &collection.product_refs {
                match self.product(&r.product_id) {
                    None => issues.push(CatalogIssue::DanglingReference {
                        collection: collection.id.clone(),
                        product: r.product_id.clone(),
                    }),
                    Some(product) if product.volume(r.recommended_volume_index).is_none() => {
                        issues.push(CatalogIssue::InvalidVolumeIndex {
                            collection: collection.id.clone(),
                            product: r.product_id.clone(),
                            index: r.recommended_volume_index,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        issues
    }
}
