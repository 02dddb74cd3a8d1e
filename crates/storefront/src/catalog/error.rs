use thiserror::Error;

/// Errors from fetching the remote catalog.
///
/// [`CatalogProvider::catalog`](super::CatalogProvider::catalog) recovers
/// from all of these by falling back.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No remote URL is configured.
    #[error("No remote catalog configured")]
    NoRemote,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("Catalog endpoint returned {0}")]
    Status(reqwest::StatusCode),

    /// Response body is not a catalog.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
