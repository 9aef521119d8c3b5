use crate::domain::error::QiitaError;
use crate::domain::key::{CacheKey, ResourceKey};
use crate::domain::model::{Item, Query, User};
use crate::domain::traits::Fetcher;
use crate::infrastructure::storage::cache::{CacheOptions, ResourceCache};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Qiita API endpoints
pub mod endpoints {
    pub const AUTHENTICATED_USER: &str = "/authenticated_user";
    pub const ITEMS: &str = "/items";

    pub fn user_items(user_id: &str) -> String {
        format!("/users/{}/items", user_id)
    }
}

pub fn user_key() -> ResourceKey {
    CacheKey::new(endpoints::AUTHENTICATED_USER).into()
}

/// Listing key from the committed query; an empty filter is not sent.
pub fn listing_key(query: &Query) -> ResourceKey {
    let key = CacheKey::new(endpoints::ITEMS)
        .with_param("page", query.page)
        .with_param("per_page", query.per_page);
    let filter = query.filter.trim();
    if filter.is_empty() {
        key.into()
    } else {
        key.with_param("query", filter).into()
    }
}

/// Suppressed until the owning user is known.
pub fn user_items_key(user: Option<&User>) -> ResourceKey {
    user.map(|u| CacheKey::new(endpoints::user_items(&u.id)))
        .into()
}

pub type FetchFuture<T> = BoxFuture<'static, Result<T, QiitaError>>;

/// The caches behind the three logical resources, sharing one fetcher.
#[derive(Clone)]
pub struct Resources {
    fetcher: Arc<dyn Fetcher>,
    pub users: ResourceCache<User>,
    pub items: ResourceCache<Vec<Item>>,
}

impl Resources {
    pub fn new(fetcher: Arc<dyn Fetcher>, options: CacheOptions) -> Self {
        Self {
            fetcher,
            users: ResourceCache::new(options),
            items: ResourceCache::new(options),
        }
    }

    /// A fetch closure that requests the key's path and decodes it as `T`.
    pub fn fetcher<T>(&self) -> impl FnOnce(CacheKey) -> FetchFuture<T> + Send + 'static
    where
        T: DeserializeOwned + Send + 'static,
    {
        let fetcher = Arc::clone(&self.fetcher);
        move |key: CacheKey| {
            async move {
                let body = fetcher.fetch_json(&key.to_path()).await?;
                serde_json::from_value(body).map_err(|e| QiitaError::Decode(e.to_string()))
            }
            .boxed()
        }
    }
}
