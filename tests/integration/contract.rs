//! Services that do not satisfy the contract are rejected at registration.
//!
//! Each bad service embeds the conforming `TestService` and overrides or
//! drops one method, so exactly one check fails.

use crate::common::{TestData, TestService, init_logging};
use lazy_rest::contract::validate;
use lazy_rest::{
    BoxError, Context, ContractError, MethodSet, Operation, Payload, QueryArgs,
    RegistrationError, Router, Service,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Outer receiver for bad method sets.
struct Wrapper {
    inner: Arc<TestService>,
}

fn wrapper() -> Arc<Wrapper> {
    Arc::new(Wrapper {
        inner: Arc::new(TestService::new()),
    })
}

/// All of `TestService`'s methods, promoted onto `Wrapper`.
fn base() -> MethodSet<Wrapper> {
    MethodSet::embed(TestService::methods(), |w: &Wrapper| Arc::clone(&w.inner))
}

fn get_only() -> MethodSet<Wrapper> {
    MethodSet::new().method("Get", |w: Arc<Wrapper>, ctx: Context, id: i64| {
        Arc::clone(&w.inner).get(ctx, id)
    })
}

fn with_put(set: MethodSet<Wrapper>) -> MethodSet<Wrapper> {
    set.method(
        "Put",
        |w: Arc<Wrapper>, ctx: Context, id: i64, data: Box<TestData>| {
            Arc::clone(&w.inner).put(ctx, id, data)
        },
    )
}

fn with_new(set: MethodSet<Wrapper>) -> MethodSet<Wrapper> {
    set.method("New", |w: Arc<Wrapper>, ctx: Context, data: Box<TestData>| {
        Arc::clone(&w.inner).create(ctx, data)
    })
}

fn reject(methods: MethodSet<Wrapper>) -> ContractError {
    init_logging();
    validate(wrapper(), &methods).expect_err("bad service must be rejected")
}

/// Serializing the default value fails: JSON object keys must be strings.
#[derive(Debug, Serialize, Deserialize)]
struct Grid {
    cells: HashMap<(i32, i32), String>,
}

impl Default for Grid {
    fn default() -> Self {
        let mut cells = HashMap::new();
        cells.insert((0, 0), "origin".to_string());
        Self { cells }
    }
}

impl Payload for Grid {}

#[test]
fn test_conforming_service_validates() {
    let endpoint = validate(wrapper(), &base()).expect("embedded TestService conforms");
    assert!(endpoint.payload().is::<Box<TestData>>());
    assert_eq!(endpoint.operations(), Operation::MANDATORY.to_vec());
    assert!(!endpoint.supports(Operation::List));
}

#[test]
fn test_missing_operations() {
    let cases = [
        (MethodSet::new(), Operation::Get),
        (get_only(), Operation::Put),
        (with_put(get_only()), Operation::New),
        (with_new(with_put(get_only())), Operation::Delete),
    ];
    for (set, missing) in cases {
        let error = reject(set);
        assert_eq!(error, ContractError::MissingOperation { operation: missing });
        assert_eq!(
            error.to_string(),
            format!("Service does not have a {} method", missing)
        );
    }
}

#[test]
fn test_bad_get() {
    let error = reject(base().method("Get", |_: Arc<Wrapper>| async {}));
    assert!(matches!(
        error,
        ContractError::ArgumentCount {
            operation: Operation::Get,
            expected: 3,
            found: 1
        }
    ));

    let error = reject(base().method("Get", |_: Arc<Wrapper>, _: String, _: i64| async {
        Ok::<_, BoxError>(Box::<TestData>::default())
    }));
    assert!(matches!(
        error,
        ContractError::ArgumentType { operation: Operation::Get, position: 1, .. }
    ));

    let error = reject(base().method("Get", |_: Arc<Wrapper>, _: Context, _: String| async {
        Ok::<_, BoxError>(Box::<TestData>::default())
    }));
    assert!(matches!(
        error,
        ContractError::ArgumentType { operation: Operation::Get, position: 2, .. }
    ));

    let error = reject(base().method("Get", |_: Arc<Wrapper>, _: Context, _: i64| async {}));
    assert!(matches!(
        error,
        ContractError::ReturnCount { operation: Operation::Get, expected: 2, found: 0 }
    ));

    let error = reject(base().method("Get", |_: Arc<Wrapper>, _: Context, _: i64| async {
        Ok::<i64, BoxError>(0)
    }));
    assert!(matches!(error, ContractError::NotPointer { operation: Operation::Get, .. }));

    let error = reject(base().method("Get", |_: Arc<Wrapper>, _: Context, _: i64| async {
        Ok::<_, BoxError>(Box::<Grid>::default())
    }));
    match error {
        ContractError::NotSerializable { operation, type_name, .. } => {
            assert_eq!(operation, Operation::Get);
            assert!(type_name.ends_with("Grid"), "{}", type_name);
        }
        other => panic!("expected NotSerializable, got {:?}", other),
    }

    let error = reject(base().method("Get", |_: Arc<Wrapper>, _: Context, _: i64| async {
        (Box::<TestData>::default(), 0i64)
    }));
    assert!(matches!(
        error,
        ContractError::ReturnType { operation: Operation::Get, position: 1, .. }
    ));
}

#[test]
fn test_bad_put() {
    let error = reject(base().method("Put", |_: Arc<Wrapper>| async {}));
    assert!(matches!(
        error,
        ContractError::ArgumentCount { operation: Operation::Put, expected: 4, found: 1 }
    ));

    let error = reject(base().method(
        "Put",
        |_: Arc<Wrapper>, _: Context, _: String, _: Box<TestData>| async { Ok::<(), BoxError>(()) },
    ));
    assert!(matches!(
        error,
        ContractError::ArgumentType { operation: Operation::Put, position: 2, .. }
    ));

    let error = reject(base().method(
        "Put",
        |_: Arc<Wrapper>, _: Context, _: i64, _: i64| async { Ok::<(), BoxError>(()) },
    ));
    match error {
        ContractError::ArgumentType { operation, position, expected, .. } => {
            assert_eq!((operation, position), (Operation::Put, 3));
            assert!(expected.contains("TestData"), "{}", expected);
        }
        other => panic!("expected ArgumentType, got {:?}", other),
    }

    let error = reject(base().method(
        "Put",
        |_: Arc<Wrapper>, _: Context, _: i64, _: Box<TestData>| async {},
    ));
    assert!(matches!(
        error,
        ContractError::ReturnCount { operation: Operation::Put, expected: 1, found: 0 }
    ));

    let error = reject(base().method(
        "Put",
        |_: Arc<Wrapper>, _: Context, _: i64, _: Box<TestData>| async { 0i64 },
    ));
    assert!(matches!(
        error,
        ContractError::ReturnType { operation: Operation::Put, position: 0, .. }
    ));
}

#[test]
fn test_bad_new() {
    let error = reject(base().method("New", |_: Arc<Wrapper>| async {}));
    assert!(matches!(
        error,
        ContractError::ArgumentCount { operation: Operation::New, expected: 3, found: 1 }
    ));

    let error = reject(base().method("New", |_: Arc<Wrapper>, _: Context, _: i64| async {
        Ok::<i64, BoxError>(0)
    }));
    assert!(matches!(
        error,
        ContractError::ArgumentType { operation: Operation::New, position: 2, .. }
    ));

    let error = reject(base().method(
        "New",
        |_: Arc<Wrapper>, _: Context, _: Box<TestData>| async {},
    ));
    assert!(matches!(
        error,
        ContractError::ReturnCount { operation: Operation::New, expected: 2, found: 0 }
    ));

    let error = reject(base().method(
        "New",
        |_: Arc<Wrapper>, _: Context, _: Box<TestData>| async {
            Ok::<String, BoxError>(String::new())
        },
    ));
    assert!(matches!(
        error,
        ContractError::ReturnType { operation: Operation::New, position: 0, .. }
    ));

    let error = reject(base().method(
        "New",
        |_: Arc<Wrapper>, _: Context, _: Box<TestData>| async { (0i64, 0i64) },
    ));
    assert!(matches!(
        error,
        ContractError::ReturnType { operation: Operation::New, position: 1, .. }
    ));
}

#[test]
fn test_bad_delete() {
    let error = reject(base().method("Delete", |_: Arc<Wrapper>| async {}));
    assert!(matches!(
        error,
        ContractError::ArgumentCount { operation: Operation::Delete, expected: 3, found: 1 }
    ));

    let error = reject(base().method("Delete", |_: Arc<Wrapper>, _: Context, _: String| async {
        Ok::<(), BoxError>(())
    }));
    assert!(matches!(
        error,
        ContractError::ArgumentType { operation: Operation::Delete, position: 2, .. }
    ));

    let error = reject(base().method("Delete", |_: Arc<Wrapper>, _: Context, _: i64| async {}));
    assert!(matches!(
        error,
        ContractError::ReturnCount { operation: Operation::Delete, expected: 1, found: 0 }
    ));

    let error = reject(base().method("Delete", |_: Arc<Wrapper>, _: Context, _: i64| async {
        0i64
    }));
    assert!(matches!(
        error,
        ContractError::ReturnType { operation: Operation::Delete, position: 0, .. }
    ));
}

#[test]
fn test_bad_list_rejects_whole_service() {
    let error = reject(base().method("List", |_: Arc<Wrapper>, _: Context, _: String| async {
        Ok::<Vec<Box<TestData>>, BoxError>(Vec::new())
    }));
    assert!(matches!(
        error,
        ContractError::ArgumentType { operation: Operation::List, position: 2, .. }
    ));

    let error = reject(base().method(
        "List",
        |_: Arc<Wrapper>, _: Context, _: QueryArgs| async {
            Ok::<Vec<Box<String>>, BoxError>(Vec::new())
        },
    ));
    assert!(matches!(
        error,
        ContractError::ReturnType { operation: Operation::List, position: 0, .. }
    ));
}

#[test]
fn test_valid_list_is_registered() {
    let set = base().method(
        "List",
        |_: Arc<Wrapper>, _: Context, _: QueryArgs| async {
            Ok::<Vec<Box<TestData>>, BoxError>(Vec::new())
        },
    );
    let endpoint = validate(wrapper(), &set).expect("List conforms");
    assert!(endpoint.supports(Operation::List));
    assert_eq!(endpoint.operations().len(), 5);
}

/// A service type whose Delete takes a string id.
struct StringIds {
    inner: Arc<TestService>,
}

impl Service for StringIds {
    fn methods() -> MethodSet<Self> {
        MethodSet::embed(TestService::methods(), |s: &StringIds| Arc::clone(&s.inner)).method(
            "Delete",
            |_: Arc<StringIds>, _: Context, _: String| async { Ok::<(), BoxError>(()) },
        )
    }
}

#[tokio::test]
async fn test_router_mounts_nothing_for_bad_service() {
    init_logging();
    let mut router = Router::new();
    let error = router
        .add_service(
            "bad",
            Arc::new(StringIds {
                inner: Arc::new(TestService::new()),
            }),
        )
        .expect_err("Delete takes a string");
    assert!(matches!(
        error,
        RegistrationError::Contract(ContractError::ArgumentType {
            operation: Operation::Delete,
            ..
        })
    ));
    assert!(router.prefixes().is_empty());

    let app = router.into_axum();
    let response = crate::common::get(&app, "/bad/get/1").await;
    assert_eq!(response.status, axum::http::StatusCode::NOT_FOUND);
}
