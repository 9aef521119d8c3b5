use crate::application::query::CommittedQuery;
use crate::application::resources::Resources;
use crate::domain::error::QiitaError;
use crate::infrastructure::config::Config;
use crate::infrastructure::network::{http::create_client, ApiClient};
use crate::infrastructure::storage::cache::CacheOptions;
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: ApiClient,
    pub resources: Resources,
    pub query: CommittedQuery,
}

impl AppState {
    /// Build the client, caches and committed query. `start_url` (a shared
    /// link) takes precedence over the configured app URL.
    pub fn new(config: Config, start_url: Option<&str>) -> Result<Self, QiitaError> {
        let http_client = create_client(&config)?;
        let api = ApiClient::from_config(http_client, &config);
        let resources = Resources::new(
            Arc::new(api.clone()),
            CacheOptions::from(&config.cache),
        );
        let url = Url::parse(start_url.unwrap_or(config.app_url.as_str()))?;

        Ok(Self {
            config: Arc::new(config),
            api,
            resources,
            query: CommittedQuery::new(url),
        })
    }
}
