//! Committed query state: the URL-persisted page, per-page and filter.
//!
//! The URL is the single source of truth. Every reader decodes it on demand,
//! and every writer goes through [`CommittedQuery::commit`] or one of the
//! navigation methods, which publish the new location to all subscribers.

use crate::domain::model::{
    clamp_page, clamp_per_page, Query, QueryPatch, DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE,
    MIN_PER_PAGE,
};
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;
use uuid::Uuid;

pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "perPage";
pub const FILTER_PARAM: &str = "query";

/// Why the location last changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Initial,
    /// A commit, tagged with the committing component when it has one.
    Commit(Option<Uuid>),
    /// Back/forward or an explicitly opened URL.
    Navigation,
}

#[derive(Debug, Clone)]
pub struct Location {
    pub url: Url,
    pub revision: u64,
    pub origin: Origin,
    history: Vec<Url>,
    cursor: usize,
}

impl Location {
    fn new(url: Url) -> Self {
        Self {
            history: vec![url.clone()],
            url,
            revision: 0,
            origin: Origin::Initial,
            cursor: 0,
        }
    }

    fn push(&mut self, url: Url, origin: Origin) {
        self.history.truncate(self.cursor + 1);
        self.history.push(url.clone());
        self.cursor = self.history.len() - 1;
        self.set(url, origin);
    }

    fn set(&mut self, url: Url, origin: Origin) {
        self.url = url;
        self.origin = origin;
        self.revision += 1;
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }
}

/// Shared handle to the committed query; clones observe the same state.
#[derive(Clone)]
pub struct CommittedQuery {
    location: Arc<watch::Sender<Location>>,
}

impl CommittedQuery {
    pub fn new(url: Url) -> Self {
        let (tx, _) = watch::channel(Location::new(url));
        Self {
            location: Arc::new(tx),
        }
    }

    pub fn read(&self) -> Query {
        decode(&self.location.borrow().url)
    }

    pub fn url(&self) -> Url {
        self.location.borrow().url.clone()
    }

    pub fn revision(&self) -> u64 {
        self.location.borrow().revision
    }

    pub fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }

    /// Merge `patch` over the current query and write it to the URL.
    pub fn commit(&self, patch: QueryPatch) -> Query {
        self.commit_with(Origin::Commit(None), &patch)
    }

    /// Like [`commit`](Self::commit), tagged with the committing component.
    pub fn commit_as(&self, author: Uuid, patch: QueryPatch) -> Query {
        self.commit_with(Origin::Commit(Some(author)), &patch)
    }

    fn commit_with(&self, origin: Origin, patch: &QueryPatch) -> Query {
        let mut committed = Query::default();
        self.location.send_modify(|location| {
            committed = decode(&location.url).merge(patch);
            let url = encode(&location.url, &committed);
            location.push(url, origin);
        });
        tracing::debug!(
            page = committed.page,
            per_page = committed.per_page,
            filter = %committed.filter,
            "query committed"
        );
        committed
    }

    /// Open `url` as a new history entry (an external navigation).
    pub fn navigate(&self, url: Url) -> Query {
        self.location
            .send_modify(|location| location.push(url, Origin::Navigation));
        self.read()
    }

    pub fn back(&self) -> bool {
        self.step(-1)
    }

    pub fn forward(&self) -> bool {
        self.step(1)
    }

    fn step(&self, delta: isize) -> bool {
        self.location.send_if_modified(|location| {
            let Some(cursor) = location.cursor.checked_add_signed(delta) else {
                return false;
            };
            let Some(url) = location.history.get(cursor).cloned() else {
                return false;
            };
            location.cursor = cursor;
            location.set(url, Origin::Navigation);
            true
        })
    }
}

/// Decode the query from `url`, applying defaults and range normalization.
pub fn decode(url: &Url) -> Query {
    let mut query = Query::default();
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            PAGE_PARAM => query.page = parse_int(&value).map_or(DEFAULT_PAGE, clamp_page),
            PER_PAGE_PARAM => {
                query.per_page = parse_int(&value).map_or(DEFAULT_PER_PAGE, clamp_per_page)
            }
            FILTER_PARAM => query.filter = value.into_owned(),
            _ => {}
        }
    }
    query
}

/// Write `query` into `base`, keeping parameters this module does not own.
/// Fields equal to their default are left out of the URL.
pub fn encode(base: &Url, query: &Query) -> Url {
    let mut url = base.clone();
    let foreign: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(name, _)| ![PAGE_PARAM, PER_PAGE_PARAM, FILTER_PARAM].contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut pairs = foreign;
    if query.page != DEFAULT_PAGE {
        pairs.push((PAGE_PARAM.to_string(), query.page.to_string()));
    }
    if query.per_page != DEFAULT_PER_PAGE {
        pairs.push((PER_PAGE_PARAM.to_string(), query.per_page.to_string()));
    }
    if !query.filter.is_empty() {
        pairs.push((FILTER_PARAM.to_string(), query.filter.clone()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url
}

/// Integer parsing for URL values. Infinite values saturate to the nearest
/// bound; anything else unparsable yields `None`.
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_nan() => None,
        Ok(f) if f >= i64::MAX as f64 => Some(i64::MAX),
        Ok(f) if f <= i64::MIN as f64 => Some(i64::MIN),
        // Fractional values truncate toward zero
        Ok(f) => Some(f.trunc() as i64),
        Err(_) => None,
    }
}
