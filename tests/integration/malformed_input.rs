//! Bad ids and bodies are answered before the service is called.

use crate::common::{TestData, TestService, get, post_json, post_raw, router_with};
use axum::http::StatusCode;
use lazy_rest::{Router, RouterBuilder};
use proptest::prelude::*;
use std::sync::Arc;

fn app() -> (Arc<TestService>, axum::Router) {
    let service = Arc::new(TestService::new());
    let app = router_with(Arc::clone(&service)).into_axum();
    (service, app)
}

#[tokio::test]
async fn test_invalid_ids_on_all_id_routes() {
    let (service, app) = app();
    post_json(&app, "/test/new", &TestData::named("keep")).await.data::<i64>();

    for id in ["abc", "-1", "1a", "%201", "9223372036854775808", "1.5"] {
        let response = get(&app, &format!("/test/get/{}", id)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "get {}", id);
        assert_eq!(response.text(), "Invalid ID\n");

        let response = get(&app, &format!("/test/delete/{}", id)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "delete {}", id);

        let response = post_json(&app, &format!("/test/put/{}", id), &TestData::named("x")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "put {}", id);
    }

    assert_eq!(service.len().await, 1);
    let data: TestData = get(&app, "/test/get/1").await.data();
    assert_eq!(data.name, "keep");
}

#[tokio::test]
async fn test_missing_id_segment_is_not_routed() {
    let (_, app) = app();
    assert_eq!(get(&app, "/test/get/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/test/get").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_largest_id_reaches_service() {
    let (_, app) = app();
    let response = get(&app, &format!("/test/get/{}", i64::MAX)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.text().trim_end(),
        format!("ID {} does not exist.", i64::MAX)
    );
}

#[tokio::test]
async fn test_malformed_body_is_generic_server_error() {
    let (service, app) = app();

    for body in ["", "{", "not json", r#"{"ID": "one"}"#, "[1, 2]"] {
        let response = post_raw(&app, "/test/new", body).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "body {:?}", body);
        assert_eq!(response.text(), "Internal Server Error\n");
    }
    assert_eq!(service.len().await, 0);

    post_json(&app, "/test/new", &TestData::named("a")).await.data::<i64>();
    let response = post_raw(&app, "/test/put/1", "{\"Name\": 5}").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Internal Server Error\n");
    let data: TestData = get(&app, "/test/get/1").await.data();
    assert_eq!(data.name, "a");
}

#[tokio::test]
async fn test_unknown_fields_are_ignored() {
    let (_, app) = app();
    let id: i64 = post_raw(&app, "/test/new", r#"{"Name": "extra", "Colour": "red"}"#)
        .await
        .data();
    let data: TestData = get(&app, &format!("/test/get/{}", id)).await.data();
    assert_eq!(data.name, "extra");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let service = Arc::new(TestService::new());
    let mut router: Router = RouterBuilder::new()
        .with_max_body_bytes(32)
        .build()
        .expect("valid configuration");
    router
        .add_service("test", Arc::clone(&service))
        .expect("test service conforms");
    let app = router.into_axum();

    let long_name = "x".repeat(64);
    let response = post_json(&app, "/test/new", &TestData::named(&long_name)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().trim_end(), "Internal Server Error");
    assert_eq!(service.len().await, 0);

    let id: i64 = post_json(&app, "/test/new", &TestData::named("ok")).await.data();
    assert_eq!(id, 1);
}

proptest! {
    #[test]
    fn test_non_numeric_ids_rejected(id in "[0-9]{0,3}[a-zA-Z_~-][0-9a-zA-Z_-]{0,6}") {
        tokio_test::block_on(async {
            let (service, app) = app();
            let response = get(&app, &format!("/test/get/{}", id)).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            let response = get(&app, &format!("/test/delete/{}", id)).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(service.len().await, 0);
        });
    }

    #[test]
    fn test_numeric_ids_reach_service(id in 0i64..=i64::MAX) {
        tokio_test::block_on(async {
            let (_, app) = app();
            let response = get(&app, &format!("/test/get/{}", id)).await;
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(response.text().trim_end(), format!("ID {} does not exist.", id));
        });
    }
}
