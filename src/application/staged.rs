//! Staged (uncommitted) edits to the query.
//!
//! Edits are validated as they are made and reach the committed query only on
//! [`StagedInput::submit`] or a pagination step. When the committed query
//! changes for any other reason, pending edits are thrown away and the staged
//! fields are reloaded from it.

use crate::application::query::{CommittedQuery, Location, Origin};
use crate::domain::model::{
    clamp_page, clamp_per_page, Query, QueryPatch, DEFAULT_PAGE, DEFAULT_PER_PAGE,
};
use tokio::sync::watch;
use uuid::Uuid;

pub struct StagedInput {
    id: Uuid,
    committed: CommittedQuery,
    rx: watch::Receiver<Location>,
    page: u32,
    per_page: u32,
    filter: String,
}

impl StagedInput {
    pub fn new(committed: &CommittedQuery) -> Self {
        let rx = committed.subscribe();
        let Query {
            page,
            per_page,
            filter,
        } = committed.read();
        Self {
            id: Uuid::new_v4(),
            committed: committed.clone(),
            rx,
            page,
            per_page,
            filter,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn snapshot(&self) -> Query {
        Query {
            page: self.page,
            per_page: self.per_page,
            filter: self.filter.clone(),
        }
    }

    /// Reload from the committed query if it changed since we last looked and
    /// the change was not our own commit. Returns whether fields were replaced.
    pub fn resync(&mut self) -> bool {
        if !self.rx.has_changed().unwrap_or(false) {
            return false;
        }
        let location = self.rx.borrow_and_update().clone();
        if location.origin == Origin::Commit(Some(self.id)) {
            return false;
        }
        let query = crate::application::query::decode(&location.url);
        tracing::debug!(
            revision = location.revision,
            page = query.page,
            "staged input replaced by committed query"
        );
        self.page = query.page;
        self.per_page = query.per_page;
        self.filter = query.filter;
        true
    }

    /// Wait until the committed query changes, then resync.
    pub async fn changed(&mut self) -> bool {
        if self.rx.changed().await.is_err() {
            return std::future::pending().await;
        }
        // `changed()` marked the value seen; force the resync to look at it.
        self.rx.mark_changed();
        self.resync()
    }

    pub fn set_page(&mut self, page: i64) {
        self.resync();
        self.page = clamp_page(page);
    }

    pub fn set_per_page(&mut self, per_page: i64) {
        self.resync();
        self.per_page = clamp_per_page(per_page);
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.resync();
        self.filter = filter.into();
    }

    /// Page input box: anything unparsable becomes page 1.
    pub fn set_page_text(&mut self, text: &str) {
        self.set_page(parse_leading_int(text).unwrap_or(i64::from(DEFAULT_PAGE)));
    }

    /// Per-page input box: anything unparsable becomes the default of 20.
    pub fn set_per_page_text(&mut self, text: &str) {
        self.set_per_page(parse_leading_int(text).unwrap_or(i64::from(DEFAULT_PER_PAGE)));
    }

    /// Commit every staged field, trimming the filter.
    pub fn submit(&mut self) -> Query {
        self.resync();
        self.filter = self.filter.trim().to_string();
        self.committed.commit_as(
            self.id,
            QueryPatch::default()
                .page(self.page)
                .per_page(self.per_page)
                .filter(self.filter.clone()),
        )
    }

    pub fn can_go_previous(&self) -> bool {
        self.committed.read().page > 1
    }

    /// Move to the committed page + 1, keeping the committed size and filter.
    pub fn next_page(&mut self) -> Query {
        self.resync();
        let current = self.committed.read();
        self.step_to(current.page.saturating_add(1), current)
    }

    /// Move to the committed page - 1. Disabled (returns `None`) on page 1.
    pub fn previous_page(&mut self) -> Option<Query> {
        self.resync();
        let current = self.committed.read();
        if current.page <= 1 {
            return None;
        }
        Some(self.step_to(current.page - 1, current))
    }

    fn step_to(&mut self, page: u32, current: Query) -> Query {
        self.page = page;
        self.committed.commit_as(
            self.id,
            QueryPatch::default()
                .page(page)
                .per_page(current.per_page)
                .filter(current.filter),
        )
    }
}

/// Parse the leading integer of `text` ("12abc" → 12), the way numeric input
/// boxes read partially typed values.
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    let number = text.get(..digits_end)?;
    match number.parse::<i64>() {
        Ok(n) => Some(n),
        // All digits but out of range
        Err(_) if number.len() > 1 && number[1..].bytes().all(|b| b.is_ascii_digit()) => {
            Some(if number.starts_with('-') { i64::MIN } else { i64::MAX })
        }
        Err(_) => None,
    }
}
