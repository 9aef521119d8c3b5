//! Shared test doubles
#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use qiita_sync::domain::error::QiitaError;
use qiita_sync::domain::key::CacheKey;
use qiita_sync::domain::traits::Fetcher;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

pub type Fetch<T> = Box<dyn FnOnce(CacheKey) -> BoxFuture<'static, Result<T, QiitaError>> + Send>;

/// A fetch whose result is delivered later through the returned sender.
pub fn gated<T: Send + 'static>(
    calls: &Arc<AtomicUsize>,
) -> (oneshot::Sender<Result<T, QiitaError>>, Fetch<T>) {
    let (tx, rx) = oneshot::channel();
    let calls = Arc::clone(calls);
    let fetch: Fetch<T> = Box::new(move |_key: CacheKey| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            rx.await
                .unwrap_or_else(|_| Err(QiitaError::Decode("sender dropped".to_string())))
        }
        .boxed()
    });
    (tx, fetch)
}

/// A fetch that completes on its first poll.
pub fn ready<T: Send + 'static>(calls: &Arc<AtomicUsize>, outcome: Result<T, QiitaError>) -> Fetch<T> {
    let calls = Arc::clone(calls);
    Box::new(move |_key: CacheKey| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { outcome }.boxed()
    })
}

pub fn server_error() -> QiitaError {
    QiitaError::RemoteApi {
        status: 500,
        status_text: "Internal Server Error".to_string(),
    }
}

/// Poll `cond` until it holds, failing the test after two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// In-memory `Fetcher` that records every requested path.
#[derive(Default)]
pub struct RecordingFetcher {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `body`. A path without `?` also answers every
    /// request for that path with any query string.
    pub fn respond(&self, path: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), body);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == path).count()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch_json(&self, path: &str) -> Result<Value, QiitaError> {
        self.calls.lock().unwrap().push(path.to_string());
        let responses = self.responses.lock().unwrap();
        let bare = path.split('?').next().unwrap_or(path);
        responses
            .get(path)
            .or_else(|| responses.get(bare))
            .cloned()
            .ok_or(QiitaError::RemoteApi {
                status: 404,
                status_text: "Not Found".to_string(),
            })
    }
}
