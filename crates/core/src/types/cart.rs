//! Shopping cart lines and the pure operations over them.
//!
//! A [`Cart`] holds at most one [`CartLine`] per `(product, volume index)`
//! pair and never holds a line with a zero quantity. Every mutation here is
//! in-memory only; persistence is the state store's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Product, Volume};
use super::id::ProductId;
use super::price::Price;

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub product_id: ProductId,
    pub volume_index: usize,
}

impl LineKey {
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, volume_index: usize) -> Self {
        Self {
            product_id: product_id.into(),
            volume_index,
        }
    }
}

/// One (product, chosen volume, quantity) entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub volume_index: usize,
    pub quantity: u32,
}

impl CartLine {
    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.volume_index == key.volume_index
    }

    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            volume_index: self.volume_index,
        }
    }
}

/// Stored lines that break the cart's invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidCart {
    #[error("line {product_id}/{volume_index} has zero quantity")]
    ZeroQuantity {
        product_id: ProductId,
        volume_index: usize,
    },
    #[error("line {product_id}/{volume_index} appears more than once")]
    DuplicateLine {
        product_id: ProductId,
        volume_index: usize,
    },
}

/// Ordered cart contents.
///
/// Deserializing rejects zero quantities and repeated `(product, volume)`
/// pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = InvalidCart;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if line.quantity == 0 {
                return Err(InvalidCart::ZeroQuantity {
                    product_id: line.product_id.clone(),
                    volume_index: line.volume_index,
                });
            }
            if !seen.insert(line.key()) {
                return Err(InvalidCart::DuplicateLine {
                    product_id: line.product_id.clone(),
                    volume_index: line.volume_index,
                });
            }
        }
        Ok(Self { lines })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl Cart {

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(key))
    }

    /// Merge `delta` units into the line for `key`, appending it if absent.
    ///
    /// Returns `false` (and changes nothing) when `delta` is zero.
    pub fn add(&mut self, key: LineKey, delta: u32) -> bool {
        if delta == 0 {
            return false;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(&key)) {
            line.quantity = line.quantity.saturating_add(delta);
        } else {
            self.lines.push(CartLine {
                product_id: key.product_id,
                volume_index: key.volume_index,
                quantity: delta,
            });
        }
        true
    }

    /// Overwrite the quantity of an existing line. Non-positive removes it.
    ///
    /// Returns `false` when no line matches `key` or the quantity is unchanged.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(key);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.lines.iter_mut().find(|l| l.matches(key)) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove the line for `key`. Returns `false` when it was not present.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| !l.matches(key));
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// A cart line resolved against the current catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLine<'a> {
    pub product: &'a Product,
    pub volume_index: usize,
    pub volume: &'a Volume,
    pub quantity: u32,
}

impl ResolvedLine<'_> {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.volume.price.times(self.quantity)
    }
}

/// Resolve cart lines against the catalog, preserving cart order.
///
/// Lines whose product or volume index no longer exists are dropped.
#[must_use]
pub fn resolve_cart<'a>(lines: &[CartLine], catalog: &'a Catalog) -> Vec<ResolvedLine<'a>> {
    lines
        .iter()
        .filter_map(|line| {
            let product = catalog.product(&line.product_id)?;
            let volume = product.volume(line.volume_index)?;
            Some(ResolvedLine {
                product,
                volume_index: line.volume_index,
                volume,
                quantity: line.quantity,
            })
        })
        .collect()
}

/// Sum of `price × quantity` over resolved lines.
#[must_use]
pub fn cart_total(lines: &[ResolvedLine<'_>]) -> Price {
    lines.iter().map(ResolvedLine::line_total).sum()
}
