//! Contract-checked CRUD services mounted as JSON REST endpoints.
//!
//! A resource service lists its methods once, as ordinary async Rust
//! functions. When the service is registered the router checks those methods
//! against a fixed CRUD contract (names, parameter and return types, a
//! serializable payload type) and refuses anything that does not conform.
//! Conforming services get a set of HTTP handlers that decode requests, call
//! the methods and wrap results in a uniform `{"error"?, "data"?}` envelope.
//!
//! # Core Components
//!
//! - [`Service`] - the trait a resource service implements
//! - [`MethodSet`] - the named methods of a service, with captured signatures
//! - [`contract`] - the checker and validator behind registration
//! - [`Router`] - mounts validated services and serves them through axum
//! - [`store::InMemoryStore`] - a complete service for any [`store::Record`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lazy_rest::store::{InMemoryStore, Record};
//! use lazy_rest::{Payload, Router};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Default, Serialize, Deserialize)]
//! struct Note {
//!     id: i64,
//!     text: String,
//! }
//!
//! impl Payload for Note {}
//!
//! impl Record for Note {
//!     fn id(&self) -> i64 {
//!         self.id
//!     }
//!
//!     fn set_id(&mut self, id: i64) {
//!         self.id = id;
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.add_service("notes", Arc::new(InMemoryStore::<Note>::new()))?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! router.serve(listener).await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod contract;
pub mod dispatch;
pub mod endpoint;
pub mod error;
mod json;
pub mod query;
pub mod response;
pub mod router;
pub mod service;
pub mod signature;
pub mod store;

// Re-export commonly used types for convenience
pub use context::Context;
pub use contract::Operation;
pub use endpoint::Endpoint;
pub use error::{
    BoxError, BuildError, ContractError, DispatchError, EncodeError, InvokeError,
    RegistrationError,
};
pub use query::QueryArgs;
pub use response::Envelope;
pub use router::{Router, RouterBuilder, RouterConfig};
pub use service::Service;
pub use signature::{Describe, Method, MethodSet, Payload, Signature, TypeInfo};
