//! Committed query (URL state) and staged input

use qiita_sync::application::query::{decode, encode, CommittedQuery, Origin};
use qiita_sync::application::staged::StagedInput;
use qiita_sync::domain::model::{Query, QueryPatch, MAX_PER_PAGE};
use url::Url;

fn start() -> CommittedQuery {
    CommittedQuery::new(Url::parse("http://localhost:5173/").unwrap())
}

fn query(page: u32, per_page: u32, filter: &str) -> Query {
    Query {
        page,
        per_page,
        filter: filter.to_string(),
    }
}

#[test]
fn read_after_commit_reflects_merged_patch() {
    let state = start();
    state.commit(QueryPatch::default().per_page(50).filter("tag:Rust"));

    let patches = [
        QueryPatch::default(),
        QueryPatch::default().page(7),
        QueryPatch::default().filter(""),
        QueryPatch::default().page(2).per_page(100).filter("user:qiita"),
    ];
    for patch in patches {
        let before = state.read();
        state.commit(patch.clone());
        assert_eq!(state.read(), before.merge(&patch), "{patch:?}");
    }
}

#[test]
fn commit_is_visible_to_every_handle() {
    let state = start();
    let other_reader = state.clone();

    state.commit(QueryPatch::default().page(2).per_page(20).filter("tag:test"));

    assert_eq!(state.read(), query(2, 20, "tag:test"));
    assert_eq!(other_reader.read(), query(2, 20, "tag:test"));
    assert_eq!(
        other_reader.url().as_str(),
        "http://localhost:5173/?page=2&query=tag%3Atest"
    );
}

#[test]
fn url_round_trip_preserves_valid_queries() {
    let base = Url::parse("http://localhost:5173/?tab=public").unwrap();
    let samples = [
        Query::default(),
        query(1, 1, ""),
        query(3, 100, "title:async body:tokio"),
        query(u32::MAX, 20, "tag:C++ & friends"),
        query(42, 37, "  spaced  "),
    ];
    for q in samples {
        let url = encode(&base, &q);
        assert_eq!(decode(&url), q, "{url}");
        assert!(url.as_str().contains("tab=public"));
    }
}

#[test]
fn out_of_range_values_decode_clamped() {
    let url = Url::parse("http://localhost/?page=-4&perPage=1000").unwrap();
    let q = decode(&url);
    assert_eq!(q.page, 1);
    assert_eq!(q.per_page, MAX_PER_PAGE);

    let url = Url::parse("http://localhost/?page=x&perPage=0").unwrap();
    assert_eq!(decode(&url), query(1, 1, ""));
}

#[test]
fn revision_and_origin_track_changes() {
    let state = start();
    assert_eq!(state.revision(), 0);
    assert_eq!(state.location().origin, Origin::Initial);

    state.commit(QueryPatch::default().page(2));
    assert_eq!(state.revision(), 1);
    assert_eq!(state.location().origin, Origin::Commit(None));

    state.navigate(Url::parse("http://localhost:5173/?page=9").unwrap());
    assert_eq!(state.read().page, 9);
    assert_eq!(state.location().origin, Origin::Navigation);
    assert!(state.location().can_go_back());
}

#[test]
fn staged_edits_are_clamped_when_made() {
    let committed = start();
    let mut staged = StagedInput::new(&committed);

    staged.set_page(0);
    assert_eq!(staged.page(), 1);
    staged.set_per_page(1000);
    assert_eq!(staged.per_page(), 100);
    staged.set_per_page(-3);
    assert_eq!(staged.per_page(), 1);

    staged.set_page_text("abc");
    assert_eq!(staged.page(), 1);
    staged.set_per_page_text("");
    assert_eq!(staged.per_page(), 20);
    staged.set_page_text("12");
    assert_eq!(staged.page(), 12);

    // Nothing reaches the URL until submit
    assert_eq!(committed.read(), Query::default());
}

#[test]
fn submit_commits_trimmed_filter() {
    let committed = start();
    let mut staged = StagedInput::new(&committed);

    staged.set_filter("  tag:test ");
    staged.set_page(2);
    let result = staged.submit();

    assert_eq!(result, query(2, 20, "tag:test"));
    assert_eq!(committed.read(), query(2, 20, "tag:test"));
    assert_eq!(staged.filter(), "tag:test");
    // Our own commit does not count as an external change
    assert!(!staged.resync());
}

#[test]
fn external_navigation_discards_uncommitted_edits() {
    let committed = start();
    committed.commit(QueryPatch::default().page(3));
    let mut staged = StagedInput::new(&committed);

    staged.set_page(5);
    staged.set_filter("tag:unsaved");
    assert!(committed.back());

    assert!(staged.resync());
    assert_eq!(staged.page(), 1);
    assert_eq!(staged.filter(), "");
}

#[test]
fn edit_after_external_change_starts_from_new_url() {
    let committed = start();
    let mut staged = StagedInput::new(&committed);
    staged.set_filter("tag:draft");

    committed.navigate(Url::parse("http://localhost:5173/?perPage=50&query=user%3Aqiita").unwrap());
    staged.set_page(4);

    assert_eq!(staged.snapshot(), query(4, 50, "user:qiita"));
}

#[test]
fn pagination_uses_committed_values() {
    let committed = start();
    committed.commit(QueryPatch::default().per_page(30).filter("tag:go"));
    let mut staged = StagedInput::new(&committed);

    assert!(!staged.can_go_previous());
    assert_eq!(staged.previous_page(), None);
    assert_eq!(committed.read().page, 1);

    staged.set_per_page(99);
    let next = staged.next_page();
    assert_eq!(next, query(2, 30, "tag:go"));
    assert_eq!(staged.page(), 2);
    // Uncommitted per-page edit survives our own pagination commit
    assert!(!staged.resync());
    assert_eq!(staged.per_page(), 99);

    assert!(staged.can_go_previous());
    assert_eq!(staged.previous_page(), Some(query(1, 30, "tag:go")));
    assert_eq!(staged.page(), 1);
}

#[test]
fn pagination_after_external_navigation_starts_from_new_url() {
    let committed = start();
    let mut staged = StagedInput::new(&committed);

    committed.navigate(
        Url::parse("http://localhost:5173/?page=3&perPage=50&query=user%3Aqiita").unwrap(),
    );
    let next = staged.next_page();

    assert_eq!(next, query(4, 50, "user:qiita"));
    assert_eq!(committed.read(), next);
    assert_eq!(staged.snapshot(), next);
    assert!(!staged.resync());

    committed.navigate(Url::parse("http://localhost:5173/?page=7&query=tag%3Ago").unwrap());
    assert_eq!(staged.previous_page(), Some(query(6, 20, "tag:go")));
    assert_eq!(staged.snapshot(), committed.read());
}

#[test]
fn submit_does_not_overwrite_external_navigation() {
    let committed = start();
    let mut staged = StagedInput::new(&committed);
    staged.set_filter("tag:draft");

    committed.navigate(Url::parse("http://localhost:5173/?page=4&query=user%3Aqiita").unwrap());
    let result = staged.submit();

    assert_eq!(result, query(4, 20, "user:qiita"));
    assert_eq!(committed.read(), query(4, 20, "user:qiita"));
    assert_eq!(staged.snapshot(), committed.read());
}

#[tokio::test]
async fn staged_input_wakes_on_external_change() {
    let committed = start();
    let mut staged = StagedInput::new(&committed);
    staged.set_page(5);

    let navigator = committed.clone();
    tokio::spawn(async move {
        navigator.navigate(Url::parse("http://localhost:5173/?page=1").unwrap());
    });

    let replaced = tokio::time::timeout(std::time::Duration::from_secs(2), staged.changed())
        .await
        .expect("no change observed");
    assert!(replaced);
    assert_eq!(staged.page(), 1);
}
