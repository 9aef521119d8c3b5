use crate::domain::error::QiitaError;
use crate::domain::traits::Fetcher;
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

/// Qiita API client that injects the bearer token into every request.
///
/// One call is one GET: no caching and no retries happen here. The resource
/// cache sits on top of this.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: String,
    credential: Option<String>,
}

impl ApiClient {
    pub fn new(client: Client, base: impl Into<String>, credential: Option<String>) -> Self {
        Self {
            client,
            base: base.into(),
            credential: credential.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            config.api_base.clone(),
            config.credential().map(str::to_string),
        )
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URLs pass through; anything else is appended to the API base.
    pub fn resolve_url(&self, path: &str) -> Result<Url, QiitaError> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let joined = format!(
                    "{}/{}",
                    self.base.trim_end_matches('/'),
                    path.trim_start_matches('/')
                );
                Ok(Url::parse(&joined)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, QiitaError> {
        // Checked before the first await: a missing token fails on first poll.
        let Some(token) = self.credential.as_deref() else {
            return Err(QiitaError::Config("missing credential".to_string()));
        };
        let url = self.resolve_url(path)?;

        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path, "Qiita API request failed");
            return Err(QiitaError::RemoteApi {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| QiitaError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Fetcher for ApiClient {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value, QiitaError> {
        self.fetch(path).await
    }
}
