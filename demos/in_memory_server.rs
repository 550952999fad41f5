//! # In-Memory Server Example
//!
//! Mounts two services and serves them until Ctrl-C:
//!
//! - `/tasks` - a plain `InMemoryStore<Task>`, List included
//! - `/books` - a service that reuses the store's methods but validates New
//!
//! ```bash
//! RUST_LOG=debug cargo run --example in_memory_server
//! curl -X POST localhost:8080/tasks/new -d '{"title": "write docs"}'
//! curl localhost:8080/tasks/get/1
//! curl 'localhost:8080/tasks/query?done=false'
//! curl localhost:8080/books/delete/1
//! ```

use lazy_rest::store::{InMemoryStore, Record};
use lazy_rest::{BoxError, Context, MethodSet, Payload, RouterBuilder, Service};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Task {
    id: i64,
    title: String,
    done: bool,
}

impl Payload for Task {}

impl Record for Task {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Book {
    id: i64,
    title: String,
    author: String,
}

impl Payload for Book {}

impl Record for Book {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// Book storage with a rule on creation.
struct Library {
    shelf: Arc<InMemoryStore<Book>>,
}

impl Library {
    async fn create(self: Arc<Self>, ctx: Context, book: Box<Book>) -> Result<i64, BoxError> {
        if book.title.trim().is_empty() {
            return Err("a book needs a title".into());
        }
        Arc::clone(&self.shelf).create(ctx, book).await
    }
}

impl Service for Library {
    fn methods() -> MethodSet<Self> {
        MethodSet::embed(InMemoryStore::<Book>::methods(), |l: &Library| {
            Arc::clone(&l.shelf)
        })
        .method("New", Self::create)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let mut router = RouterBuilder::new()
        .with_max_body_bytes(64 * 1024)
        .with_request_timeout(Duration::from_secs(10))
        .build()?;

    router.add_service("tasks", Arc::new(InMemoryStore::<Task>::new()))?;
    router.add_service(
        "books",
        Arc::new(Library {
            shelf: Arc::new(InMemoryStore::new()),
        }),
    )?;

    for prefix in router.prefixes() {
        log::info!("/{} serves {:?}", prefix, router.operations(prefix).unwrap_or_default());
    }

    let addr = std::env::var("LAZY_REST_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    router
        .serve_with_shutdown(listener, async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutting down");
        })
        .await?;
    Ok(())
}
