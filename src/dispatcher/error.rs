use std::fmt;

use http::StatusCode;
use serde_json::{json, Value};

use crate::spec::ParamIn;

/// Request-time failure raised by the binder before or around invocation.
///
/// Client-caused variants map to 4xx, everything else to 500. None of them
/// reach the user error handler; they are answered with [`RequestError::to_body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Required value absent or empty.
    MissingParameter { name: String, location: ParamIn },
    /// Value present but not convertible to the parameter type.
    InvalidParameter {
        name: String,
        location: ParamIn,
        value: String,
        reason: String,
    },
    /// Body is not valid JSON for the expected schema.
    MalformedBody { schema: String, reason: String },
    PayloadTooLarge { limit: usize, actual: usize },
    /// Result or error payload could not be serialised.
    Serialization { reason: String },
    HandlerPanicked { endpoint: String },
    Internal { reason: String },
}

impl RequestError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::MissingParameter { .. }
            | RequestError::InvalidParameter { .. }
            | RequestError::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::Serialization { .. }
            | RequestError::HandlerPanicked { .. }
            | RequestError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable kind, used as the `error` field of the payload.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::MissingParameter { .. } => "missing_parameter",
            RequestError::InvalidParameter { .. } => "invalid_parameter",
            RequestError::MalformedBody { .. } => "malformed_body",
            RequestError::PayloadTooLarge { .. } => "payload_too_large",
            RequestError::Serialization { .. } => "serialization_failed",
            RequestError::HandlerPanicked { .. } => "handler_panicked",
            RequestError::Internal { .. } => "internal_error",
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// JSON payload: `{"error", "detail", "parameter"?, "in"?}`.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        if let RequestError::MissingParameter { name, location }
        | RequestError::InvalidParameter { name, location, .. } = self
        {
            body["parameter"] = Value::String(name.clone());
            body["in"] = Value::String(location.to_string());
        }
        body
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingParameter { name, location } => {
                write!(f, "missing required {} parameter '{}'", location, name)
            }
            RequestError::InvalidParameter {
                name,
                location,
                value,
                reason,
            } => write!(
                f,
                "invalid value '{}' for {} parameter '{}': {}",
                value, location, name, reason
            ),
            RequestError::MalformedBody { schema, reason } => {
                write!(f, "malformed request body for '{}': {}", schema, reason)
            }
            RequestError::PayloadTooLarge { limit, actual } => write!(
                f,
                "request body of {} bytes exceeds the {} byte limit",
                actual, limit
            ),
            RequestError::Serialization { reason } => {
                write!(f, "failed to serialize response: {}", reason)
            }
            RequestError::HandlerPanicked { endpoint } => {
                write!(f, "handler '{}' panicked", endpoint)
            }
            RequestError::Internal { reason } => write!(f, "internal error: {}", reason),
        }
    }
}

impl std::error::Error for RequestError {}
