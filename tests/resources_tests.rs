//! Logical resources and the dashboard wiring them to the committed query

mod common;

use common::RecordingFetcher;
use qiita_sync::application::dashboard::Dashboard;
use qiita_sync::application::query::CommittedQuery;
use qiita_sync::application::resources::{listing_key, user_items_key, user_key, Resources};
use qiita_sync::domain::error::ErrorKind;
use qiita_sync::domain::key::ResourceKey;
use qiita_sync::domain::model::{Query, QueryPatch, User};
use qiita_sync::infrastructure::config::Config;
use qiita_sync::infrastructure::network::http::create_client;
use qiita_sync::infrastructure::network::ApiClient;
use qiita_sync::infrastructure::storage::cache::{CacheOptions, EntryStatus};
use serde_json::json;
use std::sync::Arc;
use url::Url;

fn committed() -> CommittedQuery {
    CommittedQuery::new(Url::parse("http://localhost:5173/").unwrap())
}

fn recording() -> Arc<RecordingFetcher> {
    let fetcher = Arc::new(RecordingFetcher::new());
    fetcher.respond(
        "/authenticated_user",
        json!({
            "id": "abc",
            "name": "Alice",
            "description": null,
            "followers_count": 10,
            "items_count": 2,
            "profile_image_url": "https://example.com/abc.png"
        }),
    );
    fetcher.respond(
        "/items",
        json!([{
            "id": "i1",
            "title": "Hello",
            "url": "https://qiita.com/abc/items/i1",
            "likes_count": 1,
            "created_at": "2024-05-01T12:00:00+09:00"
        }]),
    );
    fetcher.respond("/users/abc/items", json!([]));
    fetcher
}

fn path_of(key: ResourceKey) -> String {
    key.as_key().expect("key is suppressed").to_path()
}

#[test]
fn listing_key_follows_the_query() {
    let plain = path_of(listing_key(&Query::default()));
    assert_eq!(plain, "/items?page=1&per_page=20");

    let filtered = Query {
        page: 2,
        per_page: 50,
        filter: "  tag:test ".to_string(),
    };
    assert_eq!(
        path_of(listing_key(&filtered)),
        "/items?page=2&per_page=50&query=tag%3Atest"
    );

    let blank = Query {
        filter: "   ".to_string(),
        ..Query::default()
    };
    assert_eq!(path_of(listing_key(&blank)), plain);
}

#[test]
fn user_items_key_waits_for_the_user() {
    assert!(user_items_key(None).is_suppressed());

    let user: User = serde_json::from_value(json!({ "id": "abc" })).unwrap();
    assert_eq!(path_of(user_items_key(Some(&user))), "/users/abc/items");
    assert_eq!(path_of(user_key()), "/authenticated_user");
}

#[tokio::test]
async fn missing_token_fails_immediately_without_network() {
    let http = create_client(&Config::default()).unwrap();
    // Unroutable base: any request that slipped through would not be a
    // configuration error.
    let api = ApiClient::new(http, "http://127.0.0.1:9/api/v2", None);
    let resources = Resources::new(Arc::new(api), CacheOptions::default());

    let state = resources
        .users
        .use_resource(&user_key(), resources.fetcher::<User>());

    assert_eq!(state.status, EntryStatus::Error);
    assert!(!state.is_loading);
    assert!(state.value.is_none());
    assert_eq!(state.error.unwrap().kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn user_items_are_fetched_once_the_user_is_known() {
    let fetcher = recording();
    let resources = Resources::new(fetcher.clone(), CacheOptions::default());
    let mut dashboard = Dashboard::new(resources, committed()).with_user_items(true);

    let view = dashboard.settle().await;

    assert_eq!(view.user.value.as_ref().unwrap().id, "abc");
    assert_eq!(view.user_items.status, EntryStatus::Success);
    assert_eq!(fetcher.count("/users/abc/items"), 1);

    // Rendering again reuses every entry
    dashboard.refresh();
    assert_eq!(fetcher.count("/users/abc/items"), 1);
    assert_eq!(fetcher.count("/authenticated_user"), 1);
}

#[tokio::test]
async fn user_items_stay_suppressed_when_the_user_fails() {
    let fetcher = Arc::new(RecordingFetcher::new());
    fetcher.respond("/items", json!([]));
    let resources = Resources::new(fetcher.clone(), CacheOptions::default());
    let mut dashboard = Dashboard::new(resources, committed()).with_user_items(true);

    let view = dashboard.settle().await;

    assert_eq!(view.user.status, EntryStatus::Error);
    assert_eq!(view.user_items.status, EntryStatus::Idle);
    assert!(fetcher.calls().iter().all(|c| !c.starts_with("/users/")));
}

#[tokio::test]
async fn committing_a_query_fetches_the_new_listing_once() {
    let fetcher = recording();
    let resources = Resources::new(fetcher.clone(), CacheOptions::default());
    let query = committed();
    let mut dashboard = Dashboard::new(resources, query.clone());
    dashboard.settle().await;

    query.commit(QueryPatch::default().page(2).filter("tag:test"));
    assert_eq!(
        query.read(),
        Query {
            page: 2,
            per_page: 20,
            filter: "tag:test".to_string(),
        }
    );

    let view = dashboard.settle().await;
    let expected = path_of(listing_key(&query.read()));
    assert_eq!(fetcher.count(&expected), 1);
    assert_eq!(view.listing.status, EntryStatus::Success);
    assert_eq!(view.listing.value.as_ref().unwrap().len(), 1);
    assert!(view.can_go_previous);

    // The staged input picked up the committed values
    assert_eq!(view.staged, view.query);
}

#[tokio::test]
async fn listing_failure_is_reported_on_the_view() {
    let fetcher = Arc::new(RecordingFetcher::new());
    let resources = Resources::new(fetcher, CacheOptions::default());
    let mut dashboard = Dashboard::new(resources, committed());

    let view = dashboard.settle().await;

    assert!(!view.is_loading());
    let error = view.listing.error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::RemoteApi { status: 404 });
    assert!(error.message.starts_with("Qiita API error! status: 404"));
}
