//! ROOICELL Core - Shared catalog and cart types.
//!
//! This crate provides the types and pure functions used by the state store
//! and the CLI:
//! - `storefront` - Local commerce state store, persistence and notifications
//! - `cli` - Terminal front-end for browsing the catalog and managing the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, catalog entities, cart lines and likes
//! - [`filter`] - Category / favorites filtering of the product list
//! - [`display`] - Minimum price and description truncation helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod display;
pub mod filter;
pub mod types;

pub use types::*;
