//! Per-product "liked" flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Mapping from product id to liked state. Absent means not liked.
///
/// Stored as a JSON object. An older storefront build stored a plain array
/// of liked ids; that shape is still accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLikes")]
pub struct LikeSet(BTreeMap<ProductId, bool>);

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLikes {
    Map(BTreeMap<ProductId, bool>),
    List(Vec<ProductId>),
}

impl From<StoredLikes> for LikeSet {
    fn from(stored: StoredLikes) -> Self {
        match stored {
            StoredLikes::Map(map) => Self(map),
            StoredLikes::List(ids) => Self(ids.into_iter().map(|id| (id, true)).collect()),
        }
    }
}

impl LikeSet {
    #[must_use]
    pub fn is_liked(&self, id: &ProductId) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    /// Flip the flag for `id`, treating absence as `false`. Returns the new state.
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        let next = !self.is_liked(id);
        self.0.insert(id.clone(), next);
        next
    }

    pub fn set(&mut self, id: ProductId, liked: bool) {
        self.0.insert(id, liked);
    }

    /// Ids currently liked, in id order.
    pub fn liked_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.0.iter().filter(|(_, liked)| **liked).map(|(id, _)| id)
    }

    /// Number of liked products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.liked_ids().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(ProductId, bool)> for LikeSet {
    fn from_iter<I: IntoIterator<Item = (ProductId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
