use crate::domain::error::QiitaError;
use async_trait::async_trait;

/// Source of JSON documents for a request path.
///
/// `ApiClient` is the production implementation; the resource layer only
/// talks to this trait, so it can be swapped without touching callers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `path` (relative to the API base, or absolute) as raw JSON.
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value, QiitaError>;
}
