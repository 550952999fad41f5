//! The JSON response envelope and plain-text error responses.

use crate::error::EncodeError;
use crate::json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::error;
use serde::{Deserialize, Serialize};

/// Wire shape of every JSON response: `{"error"?: string, "data"?: any}`.
///
/// Success responses carry `data` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            error: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            error: None,
            data: None,
        }
    }
}

/// Serialize `data` inside a success envelope.
pub fn encode<T: Serialize + ?Sized>(data: &T) -> Result<Vec<u8>, EncodeError> {
    Ok(json::to_vec(&Envelope::data(data))?)
}

/// A 200 response with `data` wrapped in the envelope.
///
/// If `data` cannot be encoded nothing of it is written; the failure is logged
/// and a generic 500 is returned instead.
pub fn json_response<T: Serialize + ?Sized>(data: &T) -> Response {
    match encode(data) {
        Ok(body) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Encode error: {}", e);
            internal_error()
        }
    }
}

/// A plain-text response with a trailing newline.
pub fn text_response(status: StatusCode, message: impl Into<String>) -> Response {
    let mut body = message.into();
    body.push('\n');
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        body,
    )
        .into_response()
}

/// The generic 500 that hides internal details from the caller.
pub fn internal_error() -> Response {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
