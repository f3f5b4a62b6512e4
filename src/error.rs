//! Error types: the default endpoint error and registration failures.

use std::fmt;

use http::header::IntoHeaderName;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::dispatcher::Response;
use crate::router::HttpRequest;
use crate::typeinfo::{ClassifyError, TypeShape};
use crate::ApiType;

/// Default endpoint error: a status code, a message and extra headers.
///
/// ```rust
/// use brrtapi::ApiError;
/// use http::StatusCode;
///
/// let err = ApiError::new(StatusCode::BAD_REQUEST, "left and right must be positive");
/// assert_eq!(err.to_string(), "[400]: left and right must be positive");
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status_code: StatusCode,
    pub detail: String,
    pub headers: HeaderMap,
}

impl ApiError {
    pub fn new(status_code: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status_code,
            detail: detail.into(),
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.status_code.as_u16(), self.detail)
    }
}

impl std::error::Error for ApiError {}

/// Payload written for an [`ApiError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ApiType)]
pub struct DefaultErrorBody {
    pub detail: String,
}

/// Error handler used by [`crate::Api::with_default_errors`]: copies the
/// error's status and headers onto the response and returns its detail.
pub fn default_error_handler(
    response: &Response,
    _request: &HttpRequest,
    err: &ApiError,
) -> DefaultErrorBody {
    response.set_status(err.status_code);
    for (name, value) in err.headers.iter() {
        response.append_header(name, value.clone());
    }
    DefaultErrorBody {
        detail: err.detail.clone(),
    }
}

/// Registration-time failure. Returned synchronously by the registration API.
#[derive(Debug)]
pub enum RegistrationError {
    /// Return type is neither `Result<(), E>` nor `Result<Struct, E>`.
    InvalidReturnType {
        endpoint: String,
        type_name: String,
        shape: TypeShape,
    },
    /// A parameter or schema field has no scalar JSON representation.
    Classification {
        context: String,
        type_name: String,
        source: ClassifyError,
    },
    /// Schema registration of a non-struct type.
    NotAStruct { type_name: String },
    DuplicateMethod { path: String, method: Method },
    DuplicateScheme { group: String, scheme: String },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::InvalidReturnType {
                endpoint,
                type_name,
                shape,
            } => write!(
                f,
                "endpoint '{}' returns `{}` ({}); expected Result<(), E> or Result<Struct, E>",
                endpoint, type_name, shape
            ),
            RegistrationError::Classification {
                context,
                type_name,
                source,
            } => write!(f, "{} has unsupported type `{}`: {}", context, type_name, source),
            RegistrationError::NotAStruct { type_name } => {
                write!(f, "`{}` is not a struct and cannot be a schema", type_name)
            }
            RegistrationError::DuplicateMethod { path, method } => {
                write!(f, "method {} already registered for path '{}'", method, path)
            }
            RegistrationError::DuplicateScheme { group, scheme } => write!(
                f,
                "scheme '{}' already registered in group '{}'",
                scheme, group
            ),
        }
    }
}

impl std::error::Error for RegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistrationError::Classification { source, .. } => Some(source),
            _ => None,
        }
    }
}
