//! Success values that cannot be encoded become a generic 500.

use crate::common::{get, init_logging};
use axum::http::StatusCode;
use lazy_rest::{BoxError, Context, MethodSet, Payload, Router, Service};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Encodes only while `cells` is empty; tuple keys are not JSON object keys.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Sheet {
    cells: HashMap<(i32, i32), String>,
}

impl Payload for Sheet {}

struct Sheets;

impl Sheets {
    async fn get(self: Arc<Self>, _ctx: Context, id: i64) -> Result<Box<Sheet>, BoxError> {
        let mut sheet = Sheet::default();
        if id > 0 {
            sheet.cells.insert((0, 0), "A1".to_string());
        }
        Ok(Box::new(sheet))
    }

    async fn put(self: Arc<Self>, _ctx: Context, _id: i64, _data: Box<Sheet>) -> Result<(), BoxError> {
        Ok(())
    }

    async fn create(self: Arc<Self>, _ctx: Context, _data: Box<Sheet>) -> Result<i64, BoxError> {
        Ok(1)
    }

    async fn delete(self: Arc<Self>, _ctx: Context, _id: i64) -> Result<(), BoxError> {
        Ok(())
    }
}

impl Service for Sheets {
    fn methods() -> MethodSet<Self> {
        MethodSet::new()
            .method("Get", Self::get)
            .method("Put", Self::put)
            .method("New", Self::create)
            .method("Delete", Self::delete)
    }
}

fn app() -> axum::Router {
    init_logging();
    let mut router = Router::new();
    router
        .add_service("sheets", Arc::new(Sheets))
        .expect("empty sheet encodes, so the payload passes the probe");
    router.into_axum()
}

#[tokio::test]
async fn test_encodable_value_succeeds() {
    let response = get(&app(), "/sheets/get/0").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, br#"{"data":{"cells":{}}}"#);
}

#[tokio::test]
async fn test_unencodable_value_is_generic_server_error() {
    let response = get(&app(), "/sheets/get/1").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Internal Server Error\n");
    assert!(!response.text().contains("key must be a string"));
    assert_ne!(response.content_type.as_deref(), Some("application/json"));
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Reading {
    value: f64,
}

impl Payload for Reading {}

/// Readings whose value depends on the id: 0 is finite, 1 is NaN, 2 is infinite.
struct Sensors;

impl Sensors {
    async fn get(self: Arc<Self>, _ctx: Context, id: i64) -> Result<Box<Reading>, BoxError> {
        let value = match id {
            0 => 21.5,
            1 => f64::NAN,
            _ => f64::INFINITY,
        };
        Ok(Box::new(Reading { value }))
    }

    async fn put(self: Arc<Self>, _ctx: Context, _id: i64, _data: Box<Reading>) -> Result<(), BoxError> {
        Ok(())
    }

    async fn create(self: Arc<Self>, _ctx: Context, _data: Box<Reading>) -> Result<i64, BoxError> {
        Ok(1)
    }

    async fn delete(self: Arc<Self>, _ctx: Context, _id: i64) -> Result<(), BoxError> {
        Ok(())
    }
}

impl Service for Sensors {
    fn methods() -> MethodSet<Self> {
        MethodSet::new()
            .method("Get", Self::get)
            .method("Put", Self::put)
            .method("New", Self::create)
            .method("Delete", Self::delete)
    }
}

#[tokio::test]
async fn test_non_finite_float_is_generic_server_error() {
    init_logging();
    let mut router = Router::new();
    router
        .add_service("sensors", Arc::new(Sensors))
        .expect("zero reading encodes");
    let app = router.into_axum();

    let response = get(&app, "/sensors/get/0").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, br#"{"data":{"value":21.5}}"#);

    for id in [1, 2] {
        let response = get(&app, &format!("/sensors/get/{}", id)).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "id {}", id);
        assert_eq!(response.text(), "Internal Server Error\n");
        assert!(!response.text().contains("null"));
    }
}
