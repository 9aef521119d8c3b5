use crate::application::query::CommittedQuery;
use crate::application::resources::{listing_key, user_items_key, user_key, Resources};
use crate::application::staged::StagedInput;
use crate::domain::key::ResourceKey;
use crate::domain::model::{Item, Query, User};
use crate::infrastructure::storage::cache::{ResourceState, Subscription};
use url::Url;

/// Everything the view renders for one pass.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub query: Query,
    pub staged: Query,
    pub url: Url,
    pub can_go_previous: bool,
    pub user: ResourceState<User>,
    pub listing: ResourceState<Vec<Item>>,
    pub user_items: ResourceState<Vec<Item>>,
}

impl DashboardView {
    pub fn is_loading(&self) -> bool {
        self.user.is_loading || self.listing.is_loading || self.user_items.is_loading
    }
}

/// The page: committed query, staged edits, and one subscription per
/// resource. All keys are re-derived on every [`refresh`](Self::refresh).
pub struct Dashboard {
    resources: Resources,
    committed: CommittedQuery,
    staged: StagedInput,
    user: Subscription<User>,
    listing: Subscription<Vec<Item>>,
    user_items: Subscription<Vec<Item>>,
    show_user_items: bool,
}

impl Dashboard {
    pub fn new(resources: Resources, committed: CommittedQuery) -> Self {
        let staged = StagedInput::new(&committed);
        Self {
            user: Subscription::new(&resources.users),
            listing: Subscription::new(&resources.items),
            user_items: Subscription::new(&resources.items),
            resources,
            committed,
            staged,
            show_user_items: false,
        }
    }

    pub fn with_user_items(mut self, show: bool) -> Self {
        self.show_user_items = show;
        self
    }

    pub fn committed(&self) -> &CommittedQuery {
        &self.committed
    }

    pub fn staged(&mut self) -> &mut StagedInput {
        &mut self.staged
    }

    pub fn refresh(&mut self) -> DashboardView {
        self.staged.resync();
        let query = self.committed.read();

        let user = self
            .user
            .update(user_key(), self.resources.fetcher::<User>());
        let listing = self
            .listing
            .update(listing_key(&query), self.resources.fetcher::<Vec<Item>>());

        // Dependent: no user id, no request.
        let owner_key = if self.show_user_items {
            user_items_key(user.value.as_deref())
        } else {
            ResourceKey::Suppressed
        };
        let user_items = self
            .user_items
            .update(owner_key, self.resources.fetcher::<Vec<Item>>());

        DashboardView {
            staged: self.staged.snapshot(),
            can_go_previous: query.page > 1,
            url: self.committed.url(),
            query,
            user,
            listing,
            user_items,
        }
    }

    /// Refresh until no resource is loading. Dependent keys that become known
    /// along the way are fetched before this returns.
    pub async fn settle(&mut self) -> DashboardView {
        loop {
            let view = self.refresh();
            if !view.is_loading() {
                return view;
            }
            tokio::select! {
                _ = self.user.changed() => {}
                _ = self.listing.changed() => {}
                _ = self.user_items.changed() => {}
            }
        }
    }
}
