//! Request-scoped context handed to every service method.
//!
//! A [`Context`] is created by the dispatcher for each inbound request and
//! passed as the first argument after the receiver. It carries the request id
//! and a cancellation signal: the token is cancelled when the request is
//! finished or abandoned by the client, and the context also reports itself
//! cancelled once the configured request timeout has elapsed. Services are
//! expected to honor it; nothing enforces that.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancellable, request-scoped handle.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: String,
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Create a context for the given request id with no deadline.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that is never cancelled, for calls made outside a request.
    pub fn background() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Set a deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Identifier used to correlate log lines for one request.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the context was cancelled or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Derive a context that is cancelled with this one but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            request_id: self.request_id.clone(),
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Guard that cancels the context when dropped.
    pub(crate) fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}
