//! ROOICELL storefront library.
//!
//! Client-local commerce state for the ROOICELL catalog: the cart, liked
//! products and the catalog filter, persisted through a pluggable
//! [`storage::Storage`] backend and announced through a
//! [`notify::ChangeNotifier`]. Also provides the catalog provider and the
//! WhatsApp order hand-off.
//!
//! Pure domain types and helpers live in `rooicell-core`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod order;
pub mod state;
pub mod storage;
pub mod store;

pub use catalog::{CatalogError, CatalogProvider};
pub use config::{ConfigError, StorefrontConfig};
pub use error::StoreError;
pub use state::AppState;
pub use store::CommerceStore;
