//! Catalog provider.
//!
//! The catalog is read-only data. It comes from one of two places:
//!
//! - the bundled JSON compiled into the crate
//! - a remote JSON document, cached with `moka` for a configurable TTL
//!
//! A remote fetch never fails the caller. On error it falls back to the last
//! successfully fetched catalog, then to the bundled one.

mod error;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use parking_lot::RwLock;
use tracing::{debug, error, instrument, warn};
use url::Url;

use rooicell_core::Catalog;

pub use error::CatalogError;

/// Catalog JSON shipped with the crate.
pub const BUNDLED_CATALOG_JSON: &str = include_str!("../../data/catalog.json");

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Parse the bundled catalog.
///
/// # Errors
///
/// Returns `CatalogError::Parse` if the bundled JSON is malformed.
pub fn bundled_catalog() -> Result<Catalog, CatalogError> {
    Ok(serde_json::from_str(BUNDLED_CATALOG_JSON)?)
}

/// Source of catalog data.
///
/// Cheap to clone; clones share the cache and the last-known catalog.
#[derive(Clone)]
pub struct CatalogProvider {
    inner: Arc<CatalogProviderInner>,
}

struct CatalogProviderInner {
    bundled: Arc<Catalog>,
    remote: Option<RemoteSource>,
}

struct RemoteSource {
    client: reqwest::Client,
    url: Url,
    cache: Cache<String, Arc<Catalog>>,
    last_known: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogProvider {
    /// Serve only the bundled catalog.
    #[must_use]
    pub fn bundled() -> Self {
        Self {
            inner: Arc::new(CatalogProviderInner {
                bundled: Arc::new(load_bundled()),
                remote: None,
            }),
        }
    }

    /// Fetch from `url`, caching successful responses for `ttl`.
    #[must_use]
    pub fn remote(url: Url, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogProviderInner {
                bundled: Arc::new(load_bundled()),
                remote: Some(RemoteSource {
                    client: reqwest::Client::new(),
                    url,
                    cache,
                    last_known: RwLock::new(None),
                }),
            }),
        }
    }

    /// Remote when a URL is given, bundled otherwise.
    #[must_use]
    pub fn from_url(url: Option<Url>, ttl: Duration) -> Self {
        url.map_or_else(Self::bundled, |url| Self::remote(url, ttl))
    }

    /// The remote catalog URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.inner.remote.as_ref().map(|r| &r.url)
    }

    /// The compiled-in catalog.
    #[must_use]
    pub fn bundled_snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.bundled)
    }

    /// The current catalog. Never fails.
    pub async fn catalog(&self) -> Arc<Catalog> {
        let Some(remote) = &self.inner.remote else {
            return self.bundled_snapshot();
        };

        let key = remote.url.to_string();
        if let Some(cached) = remote.cache.get(&key).await {
            debug!("Catalog cache hit");
            return cached;
        }

        match self.fetch().await {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                remote.cache.insert(key, Arc::clone(&catalog)).await;
                *remote.last_known.write() = Some(Arc::clone(&catalog));
                catalog
            }
            Err(e) => {
                let fallback = remote.last_known.read().clone();
                warn!(
                    url = %remote.url,
                    error = %e,
                    last_known = fallback.is_some(),
                    "Catalog fetch failed, using fallback"
                );
                fallback.unwrap_or_else(|| self.bundled_snapshot())
            }
        }
    }

    /// Fetch the remote catalog once, bypassing cache and fallback.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if no URL is configured, the request fails, the
    /// server answers with a non-success status or the body is not a catalog.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let remote = self.inner.remote.as_ref().ok_or(CatalogError::NoRemote)?;

        let response = remote
            .client
            .get(remote.url.clone())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Catalog endpoint returned non-success status"
            );
            return Err(CatalogError::Status(status));
        }

        let catalog: Catalog = serde_json::from_str(&body)?;
        log_issues(&catalog);
        debug!(
            products = catalog.products.len(),
            collections = catalog.collections.len(),
            "Fetched remote catalog"
        );
        Ok(catalog)
    }
}

impl core::fmt::Debug for CatalogProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CatalogProvider")
            .field("url", &self.url().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

fn load_bundled() -> Catalog {
    match bundled_catalog() {
        Ok(catalog) => {
            log_issues(&catalog);
            catalog
        }
        Err(e) => {
            error!(error = %e, "Bundled catalog is malformed");
            Catalog::default()
        }
    }
}

fn log_issues(catalog: &Catalog) {
    for issue in catalog.validate() {
        warn!(%issue, "Catalog issue");
    }
}
