//! # Dispatcher Module
//!
//! Request-time half of an endpoint: turns an inbound HTTP request into
//! endpoint arguments, invokes the endpoint and writes the reply.
//!
//! ## Overview
//!
//! Each registered endpoint owns one binder. Binders are immutable after
//! registration and are shared by every concurrent request; all per-request
//! state (argument slots, the [`Response`] context) is allocated per call.
//!
//! ## Request Flow
//!
//! 1. Allocate one slot per endpoint argument
//! 2. Bind scalars: path variables first, then the query string, for path
//!    and query parameters; headers and cookies from their accessors.
//!    Empty counts as absent. Absent required values are rejected; absent
//!    optional values take the argument type's default.
//! 3. Bind bodies: a single body component is the whole JSON payload;
//!    several components are read from a top-level object keyed by the
//!    lower-camel schema name (`Calculation` → `calculation`)
//! 4. Invoke the endpoint
//! 5. On `Err(e)` hand a fresh 500 context and `e` to the error handler
//! 6. Write headers, cookies, status and JSON body
//!
//! ## Error Handling
//!
//! Client mistakes never reach the endpoint or the error handler. They are
//! answered directly with a [`RequestError`] payload:
//!
//! ```json
//! {"error": "missing_parameter", "detail": "missing required path parameter 'id'", "parameter": "id", "in": "path"}
//! ```
//!
//! Panics in the endpoint or the error handler are caught and produce a
//! 500 `handler_panicked` payload; other requests are unaffected.
//!
//! ## Request IDs
//!
//! An inbound `x-request-id` holding a valid ULID is reused, otherwise a new
//! ULID is generated. The id is recorded on the `endpoint` tracing span and
//! echoed on the response.

mod binder;
mod error;
mod request;
mod response;

pub(crate) use binder::{Binder, ErrorHandler, HandleParam, Invoker};
pub use error::RequestError;
pub use request::{
    find_param, parse_cookies, parse_query_params, parse_value, request_id, REQUEST_ID_HEADER,
};
pub use response::{Cookie, RecordedResponse, Response, ResponseError, ResponseWriter, SameSite};
