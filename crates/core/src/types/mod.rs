//! Core types for the ROOICELL storefront.
//!
//! This module provides type-safe wrappers for catalog and cart concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod likes;
pub mod price;

pub use cart::{Cart, CartLine, InvalidCart, LineKey, ResolvedLine, cart_total, resolve_cart};
pub use catalog::{
    Catalog, CatalogIssue, Category, Collection, Product, ProductRef, ResolvedRef, Volume,
};
pub use id::*;
pub use likes::LikeSet;
pub use price::{Price, TENGE};
