//! The optional List operation, served by the in-memory store.

use crate::common::{TestData, get, init_logging, post_json};
use axum::http::StatusCode;
use lazy_rest::store::InMemoryStore;
use lazy_rest::{Operation, Router};
use std::sync::Arc;

async fn seeded() -> axum::Router {
    init_logging();
    let mut router = Router::new();
    router
        .add_service("people", Arc::new(InMemoryStore::<TestData>::new()))
        .expect("in-memory store conforms");
    assert_eq!(router.operations("people").map(<[Operation]>::len), Some(5));

    let app = router.into_axum();
    for name in ["ada", "grace", "ada", "linus"] {
        post_json(&app, "/people/new", &TestData::named(name)).await.data::<i64>();
    }
    app
}

#[tokio::test]
async fn test_list_without_query_returns_all_in_id_order() {
    let app = seeded().await;
    let all: Vec<TestData> = get(&app, "/people/query").await.data();
    let ids: Vec<i64> = all.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_list_filters_by_field() {
    let app = seeded().await;

    let found: Vec<TestData> = get(&app, "/people/query?Name=ada").await.data();
    assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 3]);

    let found: Vec<TestData> = get(&app, "/people/query?Name=ada&ID=3").await.data();
    assert_eq!(found, vec![TestData { id: 3, name: "ada".to_string() }]);

    let found: Vec<TestData> = get(&app, "/people/query?Name=grace&Name=linus").await.data();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_list_with_no_match_is_empty_array() {
    let app = seeded().await;
    let response = get(&app, "/people/query?Name=nobody").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, br#"{"data":[]}"#);
}

#[tokio::test]
async fn test_list_after_delete() {
    let app = seeded().await;
    get(&app, "/people/delete/1").await.data::<i64>();
    let found: Vec<TestData> = get(&app, "/people/query?Name=ada").await.data();
    assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3]);
}
