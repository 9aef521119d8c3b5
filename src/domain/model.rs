use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MIN_PER_PAGE: u32 = 1;
pub const MAX_PER_PAGE: u32 = 100;

// 认证用户 (GET /authenticated_user)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub items_count: u64,
    #[serde(default)]
    pub profile_image_url: String,
}

// 文章条目 (GET /items, GET /users/:id/items)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub likes_count: u64,
    pub created_at: String, // ISO-8601
}

/// Pagination and search filter for the item listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub page: u32,
    pub per_page: u32,
    pub filter: String,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            filter: String::new(),
        }
    }
}

impl Query {
    /// Returns a copy with every field of `patch` that is set laid over `self`.
    ///
    /// Out-of-range numbers in the patch are clamped, so the result is always
    /// a valid query.
    pub fn merge(&self, patch: &QueryPatch) -> Self {
        Self {
            page: patch
                .page
                .map_or(self.page, |p| clamp_page(i64::from(p))),
            per_page: patch
                .per_page
                .map_or(self.per_page, |p| clamp_per_page(i64::from(p))),
            filter: patch.filter.clone().unwrap_or_else(|| self.filter.clone()),
        }
    }
}

/// A partial `Query`; unset fields keep their current value on commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub filter: Option<String>,
}

impl QueryPatch {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.page.is_none() && self.per_page.is_none() && self.filter.is_none()
    }
}

impl From<&Query> for QueryPatch {
    fn from(query: &Query) -> Self {
        Self {
            page: Some(query.page),
            per_page: Some(query.per_page),
            filter: Some(query.filter.clone()),
        }
    }
}

/// Clamp a raw page number to `>= 1`.
pub fn clamp_page(raw: i64) -> u32 {
    u32::try_from(raw.max(i64::from(DEFAULT_PAGE))).unwrap_or(u32::MAX)
}

/// Clamp a raw per-page count to `[1, 100]`.
pub fn clamp_per_page(raw: i64) -> u32 {
    let clamped = raw.clamp(i64::from(MIN_PER_PAGE), i64::from(MAX_PER_PAGE));
    u32::try_from(clamped).unwrap_or(DEFAULT_PER_PAGE)
}
