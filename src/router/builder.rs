//! Configuration and builder for [`Router`] instances.

use super::Router;
use crate::error::{BuildError, BuildResult};
use std::time::Duration;

/// Default cap on request body size: 2 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Settings applied to every service mounted on a router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Largest request body accepted by Put and New. Must be non-zero.
    pub max_body_bytes: usize,

    /// Deadline attached to each request's [`Context`](crate::Context).
    /// `None` means requests only end when the client goes away.
    pub request_timeout: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout: None,
        }
    }
}

impl RouterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> BuildResult<()> {
        if self.max_body_bytes == 0 {
            return Err(BuildError::invalid_configuration(
                "max_body_bytes must be greater than zero",
            ));
        }

        if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(BuildError::invalid_configuration(
                "request_timeout must be greater than zero when set",
            ));
        }

        Ok(())
    }
}

/// Fluent construction of a [`Router`] with a validated [`RouterConfig`].
///
/// ```rust
/// use lazy_rest::RouterBuilder;
/// use std::time::Duration;
///
/// let router = RouterBuilder::new()
///     .with_max_body_bytes(64 * 1024)
///     .with_request_timeout(Duration::from_secs(5))
///     .build()
///     .expect("valid configuration");
/// assert!(router.prefixes().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouterBuilder {
    config: RouterConfig,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.config.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and create the router.
    pub fn build(self) -> BuildResult<Router> {
        self.config.validate()?;
        Ok(Router::with_config(self.config))
    }
}
