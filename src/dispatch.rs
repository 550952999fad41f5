//! Request handlers that turn HTTP requests into calls on a validated endpoint.
//!
//! Every handler follows the same steps: build a [`Context`] for the request,
//! extract the id, body or query, invoke the operation's method, check the
//! final error slot and encode the result in the response envelope. Failures
//! before the call (bad id, bad body) never reach the service.

use crate::context::Context;
use crate::contract::Operation;
use crate::endpoint::Endpoint;
use crate::error::{DispatchError, DispatchResult, InvokeError};
use crate::query::QueryArgs;
use crate::response::json_response;
use crate::router::RouterConfig;
use crate::signature::{Erased, Method, Outputs};
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use log::{debug, warn};
use std::sync::Arc;

/// Header a caller may use to supply its own request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared by the handlers of one mounted service.
pub struct EndpointState<S> {
    endpoint: Endpoint<S>,
    config: RouterConfig,
}

impl<S: Send + Sync + 'static> EndpointState<S> {
    pub fn new(endpoint: Endpoint<S>, config: RouterConfig) -> Self {
        Self { endpoint, config }
    }

    pub fn endpoint(&self) -> &Endpoint<S> {
        &self.endpoint
    }

    /// Build the context for one request.
    fn context(&self, headers: &HeaderMap) -> Context {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let context = Context::new(request_id);
        match self.config.request_timeout {
            Some(timeout) => context.with_timeout(timeout),
            None => context,
        }
    }

    fn method(&self, operation: Operation) -> DispatchResult<&Method<S>> {
        self.endpoint
            .method(operation)
            .ok_or(DispatchError::Invoke(InvokeError::Unsupported(operation)))
    }

    /// Call `operation` with the context prepended to `args`.
    ///
    /// The context is cancelled once the call completes or the request future
    /// is dropped. A returned error becomes [`DispatchError::Service`].
    async fn invoke(
        &self,
        operation: Operation,
        context: Context,
        args: Vec<Erased>,
    ) -> DispatchResult<Outputs> {
        let method = self.method(operation)?;
        let _guard = context.drop_guard();
        let request_id = context.request_id().to_string();
        debug!("[{}] dispatching {}", request_id, operation);

        let mut call_args: Vec<Erased> = Vec::with_capacity(args.len() + 1);
        call_args.push(Box::new(context));
        call_args.extend(args);

        let mut outputs = method
            .invoke(Arc::clone(self.endpoint.service()), call_args)
            .await?;

        if let Some(error) = outputs.take_error()? {
            warn!("[{}] {} failed: {}", request_id, operation, error);
            return Err(DispatchError::Service(error.to_string()));
        }
        Ok(outputs)
    }

    /// Encode output `position` of `operation` with its declared type.
    fn encode_output(
        &self,
        operation: Operation,
        outputs: &mut Outputs,
        position: usize,
    ) -> DispatchResult<serde_json::Value> {
        let info = self
            .method(operation)?
            .signature()
            .output(position)
            .copied()
            .ok_or(InvokeError::ReturnType {
                position,
                expected: "a declared output",
            })?;
        let value = outputs.take(position).ok_or(InvokeError::ReturnType {
            position,
            expected: info.name(),
        })?;
        Ok(info.encode(value.as_ref())?)
    }

    async fn read_payload(&self, body: Body) -> DispatchResult<Erased> {
        let bytes = axum::body::to_bytes(body, self.config.max_body_bytes)
            .await
            .map_err(DispatchError::ReadBody)?;
        self.endpoint
            .payload()
            .decode(&bytes)
            .map_err(DispatchError::InvalidBody)
    }

    async fn serve_get(&self, headers: &HeaderMap, id: &str) -> DispatchResult<Response> {
        let id = parse_id(id)?;
        let context = self.context(headers);
        let mut outputs = self
            .invoke(Operation::Get, context, vec![Box::new(id)])
            .await?;
        let data = self.encode_output(Operation::Get, &mut outputs, 0)?;
        Ok(json_response(&data))
    }

    async fn serve_put(&self, headers: &HeaderMap, id: &str, body: Body) -> DispatchResult<Response> {
        let id = parse_id(id)?;
        let context = self.context(headers);
        let data = self.read_payload(body).await?;
        self.invoke(Operation::Put, context, vec![Box::new(id), data])
            .await?;
        Ok(json_response(&id))
    }

    async fn serve_new(&self, headers: &HeaderMap, body: Body) -> DispatchResult<Response> {
        let context = self.context(headers);
        let data = self.read_payload(body).await?;
        let mut outputs = self.invoke(Operation::New, context, vec![data]).await?;
        let id = self.encode_output(Operation::New, &mut outputs, 0)?;
        Ok(json_response(&id))
    }

    async fn serve_delete(&self, headers: &HeaderMap, id: &str) -> DispatchResult<Response> {
        let id = parse_id(id)?;
        let context = self.context(headers);
        self.invoke(Operation::Delete, context, vec![Box::new(id)])
            .await?;
        Ok(json_response(&id))
    }

    async fn serve_list(&self, headers: &HeaderMap, query: QueryArgs) -> DispatchResult<Response> {
        let context = self.context(headers);
        let mut outputs = self
            .invoke(Operation::List, context, vec![Box::new(query)])
            .await?;
        let data = self.encode_output(Operation::List, &mut outputs, 0)?;
        Ok(json_response(&data))
    }
}

/// Parse a path id: ASCII digits only, within `i64`.
pub fn parse_id(raw: &str) -> DispatchResult<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DispatchError::InvalidId);
    }
    raw.parse::<i64>().map_err(|_| DispatchError::InvalidId)
}

fn respond(result: DispatchResult<Response>) -> Response {
    result.unwrap_or_else(IntoResponse::into_response)
}

pub(crate) async fn handle_get<S: Send + Sync + 'static>(
    State(state): State<Arc<EndpointState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    respond(state.serve_get(&headers, &id).await)
}

pub(crate) async fn handle_put<S: Send + Sync + 'static>(
    State(state): State<Arc<EndpointState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Body,
) -> Response {
    respond(state.serve_put(&headers, &id, body).await)
}

pub(crate) async fn handle_new<S: Send + Sync + 'static>(
    State(state): State<Arc<EndpointState<S>>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    respond(state.serve_new(&headers, body).await)
}

pub(crate) async fn handle_delete<S: Send + Sync + 'static>(
    State(state): State<Arc<EndpointState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    respond(state.serve_delete(&headers, &id).await)
}

pub(crate) async fn handle_list<S: Send + Sync + 'static>(
    State(state): State<Arc<EndpointState<S>>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    respond(state.serve_list(&headers, pairs.into_iter().collect()).await)
}
