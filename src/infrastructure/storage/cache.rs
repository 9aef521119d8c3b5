// Keyed resource cache with request deduplication and stale-response guarding
use crate::domain::error::{ErrorInfo, QiitaError};
use crate::domain::key::{CacheKey, ResourceKey};
use crate::infrastructure::config::CacheConfig;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::FutureExt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Token minted per fetch attempt; only the latest one may land.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// What a consumer sees for one key.
#[derive(Debug)]
pub struct ResourceState<T> {
    pub status: EntryStatus,
    pub value: Option<Arc<T>>,
    pub error: Option<ErrorInfo>,
    /// `Loading` with no settled result yet (or retrying after an error).
    pub is_loading: bool,
    /// A request is in flight, including silent revalidations.
    pub is_validating: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl<T> ResourceState<T> {
    pub fn idle() -> Self {
        Self {
            status: EntryStatus::Idle,
            value: None,
            error: None,
            is_loading: false,
            is_validating: false,
            last_fetched_at: None,
        }
    }
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            value: self.value.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_validating: self.is_validating,
            last_fetched_at: self.last_fetched_at,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CacheOptions {
    /// Settled entries younger than this are not revalidated.
    pub dedupe_interval: Duration,
    /// Revalidate a cached `Success` entry in the background when a consumer
    /// switches back to its key.
    pub revalidate_on_revisit: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            dedupe_interval: Duration::from_secs(2),
            revalidate_on_revisit: false,
        }
    }
}

impl From<&CacheConfig> for CacheOptions {
    fn from(config: &CacheConfig) -> Self {
        Self {
            dedupe_interval: config.dedupe_interval(),
            revalidate_on_revisit: config.revalidate_on_revisit,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Fetches started (network calls, for an HTTP-backed fetcher).
    pub requests: u64,
    pub applied: u64,
    /// Responses dropped because a newer request superseded them.
    pub discarded: u64,
}

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    applied: AtomicU64,
    discarded: AtomicU64,
}

struct CacheEntry<T> {
    status: EntryStatus,
    value: Option<Arc<T>>,
    error: Option<ErrorInfo>,
    last_fetched_at: Option<DateTime<Utc>>,
    settled_at: Option<Instant>,
    in_flight: Option<RequestId>,
    tx: watch::Sender<ResourceState<T>>,
}

impl<T> CacheEntry<T> {
    fn new() -> Self {
        let (tx, _) = watch::channel(ResourceState::idle());
        Self {
            status: EntryStatus::Idle,
            value: None,
            error: None,
            last_fetched_at: None,
            settled_at: None,
            in_flight: None,
            tx,
        }
    }

    fn snapshot(&self) -> ResourceState<T> {
        ResourceState {
            status: self.status,
            value: self.value.clone(),
            error: self.error.clone(),
            is_loading: self.status == EntryStatus::Loading,
            is_validating: self.in_flight.is_some(),
            last_fetched_at: self.last_fetched_at,
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    fn settled_within(&self, window: Duration) -> bool {
        self.settled_at.is_some_and(|at| at.elapsed() < window)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Same key as the consumer's previous call.
    Mount,
    /// The consumer switched to this key.
    Revisit,
    Revalidate,
    Force,
}

struct Inner<T> {
    entries: DashMap<CacheKey, CacheEntry<T>>,
    next_request: AtomicU64,
    options: CacheOptions,
    counters: Counters,
}

/// Shared key → value store. Cloning yields another handle to the same store.
///
/// Fetches that do not finish on their first poll are spawned on the current
/// tokio runtime. Without one, such a fetch settles as a configuration error.
pub struct ResourceCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<T: Send + Sync + 'static> ResourceCache<T> {
    pub fn new(options: CacheOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                next_request: AtomicU64::new(0),
                options,
                counters: Counters::default(),
            }),
        }
    }

    pub fn options(&self) -> CacheOptions {
        self.inner.options
    }

    /// Current state for `key`, starting a fetch only when the entry has never
    /// been loaded. In-flight requests are shared; settled entries are served
    /// from memory.
    pub fn use_resource<F, Fut>(&self, key: &ResourceKey, fetch: F) -> ResourceState<T>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T, QiitaError>> + Send + 'static,
    {
        match key.as_key() {
            Some(key) => self.activate(key, Trigger::Mount, fetch),
            None => ResourceState::idle(),
        }
    }

    /// Refresh a settled entry unless a request is already in flight or the
    /// last one settled within the dedupe interval. The current value stays
    /// visible while the refresh runs.
    pub fn revalidate<F, Fut>(&self, key: &CacheKey, fetch: F) -> ResourceState<T>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T, QiitaError>> + Send + 'static,
    {
        self.activate(key, Trigger::Revalidate, fetch)
    }

    /// Start a new request unconditionally. Any request still in flight for
    /// `key` is superseded and its response will be discarded.
    pub fn refetch<F, Fut>(&self, key: &CacheKey, fetch: F) -> ResourceState<T>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T, QiitaError>> + Send + 'static,
    {
        self.activate(key, Trigger::Force, fetch)
    }

    /// Snapshot without side effects.
    pub fn read(&self, key: &CacheKey) -> ResourceState<T> {
        self.inner
            .entries
            .get(key)
            .map_or_else(ResourceState::idle, |entry| entry.snapshot())
    }

    /// Receive every future state change of `key`.
    pub fn subscribe(&self, key: &CacheKey) -> watch::Receiver<ResourceState<T>> {
        self.inner
            .entries
            .entry(key.clone())
            .or_insert_with(CacheEntry::new)
            .tx
            .subscribe()
    }

    /// Drop entries nobody subscribes to and nothing is fetching.
    pub fn prune(&self) -> usize {
        let before = self.inner.entries.len();
        self.inner
            .entries
            .retain(|_, entry| entry.tx.receiver_count() > 0 || entry.in_flight.is_some());
        let removed = before.saturating_sub(self.inner.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "pruned unreferenced cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let counters = &self.inner.counters;
        CacheStats {
            requests: counters.requests.load(Ordering::Relaxed),
            applied: counters.applied.load(Ordering::Relaxed),
            discarded: counters.discarded.load(Ordering::Relaxed),
        }
    }

    fn activate<F, Fut>(&self, key: &CacheKey, trigger: Trigger, fetch: F) -> ResourceState<T>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T, QiitaError>> + Send + 'static,
    {
        let window = self.inner.options.dedupe_interval;
        let request = {
            let mut entry = self
                .inner
                .entries
                .entry(key.clone())
                .or_insert_with(CacheEntry::new);

            let start = match (entry.status, trigger) {
                (_, Trigger::Force) => true,
                _ if entry.in_flight.is_some() => false,
                (EntryStatus::Idle, _) => true,
                (EntryStatus::Error, Trigger::Revisit) => true,
                (EntryStatus::Success, Trigger::Revisit) => {
                    self.inner.options.revalidate_on_revisit && !entry.settled_within(window)
                }
                (EntryStatus::Success | EntryStatus::Error, Trigger::Revalidate) => {
                    !entry.settled_within(window)
                }
                _ => false,
            };
            if !start {
                return entry.snapshot();
            }

            let request = self.inner.next_request.fetch_add(1, Ordering::Relaxed) + 1;
            entry.in_flight = Some(request);
            // A successful value keeps being served while it revalidates.
            if entry.status != EntryStatus::Success {
                entry.status = EntryStatus::Loading;
            }
            entry.publish();
            request
        };

        self.dispatch(key.clone(), request, fetch);
        self.read(key)
    }

    fn dispatch<F, Fut>(&self, key: CacheKey, request: RequestId, fetch: F)
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T, QiitaError>> + Send + 'static,
    {
        self.inner.counters.requests.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%key, request, "fetch started");

        let mut pending = Box::pin(fetch(key.clone()));
        // A future that completes without suspending (e.g. a missing
        // credential) settles before the caller gets its snapshot.
        if let Some(outcome) = pending.as_mut().now_or_never() {
            self.settle(&key, request, outcome);
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(%key, request, "no tokio runtime to drive the fetch");
            let err = QiitaError::Config("fetch started outside a tokio runtime".to_string());
            self.settle(&key, request, Err(err));
            return;
        };
        let cache = self.clone();
        runtime.spawn(async move {
            let outcome = pending.await;
            cache.settle(&key, request, outcome);
        });
    }

    fn settle(&self, key: &CacheKey, request: RequestId, outcome: Result<T, QiitaError>) {
        let Some(mut entry) = self.inner.entries.get_mut(key) else {
            self.inner.counters.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        };
        // Compare-and-set under the shard lock: only the newest request lands.
        if entry.in_flight != Some(request) {
            self.inner.counters.discarded.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%key, request, current = ?entry.in_flight, "discarding superseded response");
            return;
        }

        entry.in_flight = None;
        entry.settled_at = Some(Instant::now());
        match outcome {
            Ok(value) => {
                entry.status = EntryStatus::Success;
                entry.value = Some(Arc::new(value));
                entry.error = None;
                entry.last_fetched_at = Some(Utc::now());
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "fetch failed");
                entry.status = EntryStatus::Error;
                entry.error = Some(ErrorInfo::from(&err));
            }
        }
        self.inner.counters.applied.fetch_add(1, Ordering::Relaxed);
        entry.publish();
    }
}

/// One consumer of the cache, i.e. one call site that re-derives its key.
///
/// Switching to a key that already holds a value serves that value at once;
/// switching to a failed key retries it.
pub struct Subscription<T> {
    cache: ResourceCache<T>,
    key: ResourceKey,
    rx: Option<watch::Receiver<ResourceState<T>>>,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub fn new(cache: &ResourceCache<T>) -> Self {
        Self {
            cache: cache.clone(),
            key: ResourceKey::Suppressed,
            rx: None,
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn update<F, Fut>(&mut self, key: ResourceKey, fetch: F) -> ResourceState<T>
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = Result<T, QiitaError>> + Send + 'static,
    {
        if key == self.key {
            let state = self.cache.use_resource(&key, fetch);
            return match self.rx.as_mut() {
                Some(rx) => rx.borrow_and_update().clone(),
                None => state,
            };
        }

        tracing::trace!(from = ?self.key, to = ?key, "resource key changed");
        let state = match key.as_key() {
            Some(cache_key) => {
                // Subscribe first so a response landing right after
                // activation still shows up in `changed()`.
                let mut rx = self.cache.subscribe(cache_key);
                self.cache.activate(cache_key, Trigger::Revisit, fetch);
                let state = rx.borrow_and_update().clone();
                self.rx = Some(rx);
                state
            }
            None => {
                self.rx = None;
                ResourceState::idle()
            }
        };
        self.key = key;
        state
    }

    pub fn state(&self) -> ResourceState<T> {
        self.rx
            .as_ref()
            .map_or_else(ResourceState::idle, |rx| rx.borrow().clone())
    }

    /// Wait for the next change of the current key. Never resolves while the
    /// key is suppressed.
    pub async fn changed(&mut self) -> ResourceState<T> {
        let Some(rx) = self.rx.as_mut() else {
            return std::future::pending().await;
        };
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
        rx.borrow_and_update().clone()
    }
}
