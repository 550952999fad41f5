//! Mounting validated services on an HTTP router.
//!
//! [`Router::add_service`] validates a service against the CRUD contract and,
//! only if it conforms, mounts its handlers under `/{prefix}`:
//!
//! | Route | Operation |
//! |---|---|
//! | `GET /{prefix}/get/{id}` | Get |
//! | `POST /{prefix}/put/{id}` | Put |
//! | `POST /{prefix}/new` | New |
//! | `GET /{prefix}/delete/{id}` | Delete |
//! | `GET /{prefix}/query` | List, when the service has one |

pub mod builder;

pub use builder::{DEFAULT_MAX_BODY_BYTES, RouterBuilder, RouterConfig};

use crate::contract::{Operation, validate};
use crate::dispatch::{
    EndpointState, handle_delete, handle_get, handle_list, handle_new, handle_put,
};
use crate::error::{RegistrationError, RegistrationResult};
use crate::service::Service;
use axum::routing::{get, post};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Routes requests to the REST endpoints of registered services.
pub struct Router {
    inner: axum::Router,
    config: RouterConfig,
    services: BTreeMap<String, Vec<Operation>>,
}

impl Router {
    /// Create a router with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Start building a router with custom configuration.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub(crate) fn with_config(config: RouterConfig) -> Self {
        Self {
            inner: axum::Router::new(),
            config,
            services: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Validate `service` and mount its endpoints under `/{prefix}`.
    ///
    /// Nothing is mounted when the prefix is invalid or taken, or when the
    /// service does not satisfy the contract; previously registered services
    /// are unaffected.
    pub fn add_service<S: Service>(
        &mut self,
        prefix: &str,
        service: Arc<S>,
    ) -> RegistrationResult<()> {
        let prefix = normalize_prefix(prefix)?;
        if self.services.contains_key(&prefix) {
            return Err(RegistrationError::DuplicatePrefix { prefix });
        }

        let methods = S::methods();
        debug!(
            "Validating {} methods of {}",
            methods.len(),
            std::any::type_name::<S>()
        );
        let endpoint = validate(service, &methods)?;
        let operations = endpoint.operations();
        info!(
            "Registered {} at /{} with payload {} ({} operations)",
            std::any::type_name::<S>(),
            prefix,
            endpoint.payload(),
            operations.len()
        );

        let has_list = endpoint.supports(Operation::List);
        let state = Arc::new(EndpointState::new(endpoint, self.config.clone()));
        let mut routes = axum::Router::new()
            .route("/get/{id}", get(handle_get::<S>))
            .route("/put/{id}", post(handle_put::<S>))
            .route("/new", post(handle_new::<S>))
            .route("/delete/{id}", get(handle_delete::<S>));
        if has_list {
            routes = routes.route("/query", get(handle_list::<S>));
        }

        let inner = std::mem::take(&mut self.inner);
        self.inner = inner.nest(&format!("/{prefix}"), routes.with_state(state));
        self.services.insert(prefix, operations);
        Ok(())
    }

    /// Prefixes of the registered services, sorted.
    pub fn prefixes(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    /// Operations served under `prefix`.
    pub fn operations(&self, prefix: &str) -> Option<&[Operation]> {
        self.services
            .get(prefix.trim_matches('/'))
            .map(Vec::as_slice)
    }

    /// The underlying axum router, for serving or further composition.
    pub fn into_axum(self) -> axum::Router {
        self.inner
    }

    /// Serve the registered services on `listener` until the process ends.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        info!("Serving {} services on {}", self.services.len(), listener.local_addr()?);
        axum::serve(listener, self.inner).await
    }

    /// Serve until `shutdown` resolves, then finish in-flight requests.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Serving {} services on {}", self.services.len(), listener.local_addr()?);
        axum::serve(listener, self.inner)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Router> for axum::Router {
    fn from(router: Router) -> Self {
        router.into_axum()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("services", &self.services)
            .finish()
    }
}

/// Strip surrounding slashes and check every segment is a plain path segment.
fn normalize_prefix(prefix: &str) -> RegistrationResult<String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        return Err(RegistrationError::invalid_prefix(prefix, "prefix is empty"));
    }

    for segment in trimmed.split('/') {
        if segment.is_empty() {
            return Err(RegistrationError::invalid_prefix(prefix, "empty path segment"));
        }
        if segment == "." || segment == ".." {
            return Err(RegistrationError::invalid_prefix(
                prefix,
                "relative path segment",
            ));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')))
        {
            return Err(RegistrationError::invalid_prefix(
                prefix,
                format!("unsupported character '{}'", c),
            ));
        }
    }

    Ok(trimmed.to_string())
}
