//! Error types for service registration and request dispatch.
//!
//! Registration problems (`ContractError`, `RegistrationError`, `BuildError`)
//! are returned synchronously to the caller of [`Router::add_service`] or the
//! router builder. Request-time problems are modelled by [`DispatchError`],
//! which knows its HTTP status and how to render itself.
//!
//! [`Router::add_service`]: crate::Router::add_service

use crate::contract::Operation;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// The error type every service method reports failures with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A service method set does not satisfy the CRUD contract.
///
/// Positions count the receiver as argument 0 and the context as argument 1,
/// so they line up with the method's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// The service has no method with the operation's name
    #[error("Service does not have a {operation} method")]
    MissingOperation { operation: Operation },

    /// Wrong number of parameters, receiver and context included
    #[error("{operation} method needs {expected} arguments, has {found}")]
    ArgumentCount {
        operation: Operation,
        expected: usize,
        found: usize,
    },

    /// A parameter has the wrong type
    #[error("{operation} argument {position} must be {expected}. Found {found} instead")]
    ArgumentType {
        operation: Operation,
        position: usize,
        expected: String,
        found: String,
    },

    /// Wrong number of return values
    #[error("{operation} method needs {expected} return values, has {found}")]
    ReturnCount {
        operation: Operation,
        expected: usize,
        found: usize,
    },

    /// A return value has the wrong type
    #[error("{operation} return value {position} must be {expected}. Found {found} instead")]
    ReturnType {
        operation: Operation,
        position: usize,
        expected: String,
        found: String,
    },

    /// The payload type is not a pointer-like (`Box`) type
    #[error("{operation} data type {found} must be a pointer")]
    NotPointer { operation: Operation, found: String },

    /// The payload type has no JSON representation
    #[error("{operation} data type {type_name} is not serializable: {reason}")]
    NotSerializable {
        operation: Operation,
        type_name: String,
        reason: String,
    },
}

impl ContractError {
    /// The operation whose method failed the contract.
    pub fn operation(&self) -> Operation {
        match self {
            Self::MissingOperation { operation }
            | Self::ArgumentCount { operation, .. }
            | Self::ArgumentType { operation, .. }
            | Self::ReturnCount { operation, .. }
            | Self::ReturnType { operation, .. }
            | Self::NotPointer { operation, .. }
            | Self::NotSerializable { operation, .. } => *operation,
        }
    }
}

/// Errors returned by [`Router::add_service`](crate::Router::add_service).
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// The service failed contract validation and was not mounted
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The prefix cannot be used as a path segment
    #[error("Invalid service prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    /// Another service is already mounted at this prefix
    #[error("A service is already registered under prefix '{prefix}'")]
    DuplicatePrefix { prefix: String },
}

impl RegistrationError {
    /// Create an invalid prefix error
    pub fn invalid_prefix(prefix: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPrefix {
            prefix: prefix.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while building a router from configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl BuildError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Failure to invoke an erased method with the supplied arguments.
///
/// Validation rules these out for registered endpoints; seeing one at request
/// time means the dispatcher and the contract disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    #[error("endpoint has no {0} method")]
    Unsupported(Operation),

    #[error("expected {expected} arguments, got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("argument {position} is not a {expected}")]
    ArgumentType {
        position: usize,
        expected: &'static str,
    },

    #[error("return value {position} is not a {expected}")]
    ReturnType {
        position: usize,
        expected: &'static str,
    },
}

/// Request-time failures, each mapped to one HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The id path segment is not a non-negative integer in range
    #[error("Invalid ID")]
    InvalidId,

    /// The request body is not a JSON document of the payload type.
    /// Reported like other server-side failures: logged, generic 500.
    #[error("Decode error: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// The request body could not be read
    #[error("Failed to read request body: {0}")]
    ReadBody(#[source] axum::Error),

    /// The service method returned an error
    #[error("{0}")]
    Service(String),

    /// The successful result could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The erased call did not line up with the validated signature
    #[error("Invocation error: {0}")]
    Invoke(#[from] InvokeError),
}

impl DispatchError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::InvalidBody(_)
            | Self::ReadBody(_)
            | Self::Service(_)
            | Self::Encode(_)
            | Self::Invoke(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message is safe to show to the caller.
    pub fn is_client_visible(&self) -> bool {
        matches!(self, Self::InvalidId | Self::Service(_))
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_client_visible() {
            crate::response::text_response(status, self.to_string())
        } else {
            log::error!("{}", self);
            crate::response::text_response(
                status,
                status.canonical_reason().unwrap_or("Internal Server Error"),
            )
        }
    }
}

/// A success value could not be turned into JSON.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct EncodeError(#[from] pub serde_json::Error);

// Result type aliases for convenience
pub type ContractResult<T> = Result<T, ContractError>;
pub type RegistrationResult<T> = Result<T, RegistrationError>;
pub type BuildResult<T> = Result<T, BuildError>;
pub type DispatchResult<T> = Result<T, DispatchError>;
