use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use http::header::{CONTENT_TYPE, SET_COOKIE};
use http::{HeaderValue, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, error, info_span, warn};

use crate::endpoint::{Outcome, Slot};
use crate::router::{HttpRequest, ParamVec, PathParams};
use crate::spec::{scheme_prefix, JsonType, ParamIn};

use super::error::RequestError;
use super::request::{find_param, parse_cookies, parse_query_params, parse_value, request_id};
use super::response::{header_name, Response, ResponseSnapshot, ResponseWriter};

/// Type-erased endpoint call.
pub(crate) type Invoker<E> =
    Arc<dyn Fn(Vec<Slot>) -> Result<Outcome<E>, RequestError> + Send + Sync>;

/// Serialises a typed error after letting the handler adjust the response.
pub(crate) type ErrorHandler<E> =
    Arc<dyn Fn(&Response, &HttpRequest, &E) -> Result<Vec<u8>, RequestError> + Send + Sync>;

/// Binding instruction for one endpoint argument.
#[derive(Debug, Clone)]
pub(crate) struct HandleParam {
    pub name: Arc<str>,
    pub location: ParamIn,
    pub json_type: JsonType,
    pub required: bool,
}

impl HandleParam {
    pub fn injected() -> Self {
        Self {
            name: Arc::from("response"),
            location: ParamIn::Injected,
            json_type: JsonType::Null,
            required: false,
        }
    }

    /// Body argument; `name` is its schema name.
    pub fn body(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            location: ParamIn::Body,
            json_type: JsonType::Object,
            required: true,
        }
    }
}

/// Per-endpoint request binder.
///
/// Built once at registration and shared read-only by every request. Each
/// request gets its own slots and its own [`Response`] context.
pub(crate) struct Binder<E> {
    pub name: String,
    pub params: Vec<HandleParam>,
    pub invoke: Invoker<E>,
    pub error_handler: ErrorHandler<E>,
    pub max_body_bytes: usize,
}

/// Per-request lookup tables, parsed on first use.
struct RequestInputs<'a> {
    request: &'a HttpRequest,
    path: &'a PathParams,
    query: Option<ParamVec>,
    cookies: Option<ParamVec>,
}

impl<'a> RequestInputs<'a> {
    fn new(request: &'a HttpRequest, path: &'a PathParams) -> Self {
        Self {
            request,
            path,
            query: None,
            cookies: None,
        }
    }

    fn lookup(&mut self, param: &HandleParam) -> Result<Option<String>, RequestError> {
        let name = param.name.as_ref();
        let value = match param.location {
            ParamIn::Path | ParamIn::Query => {
                if let Some(v) = find_param(self.path, name) {
                    Some(v.to_string())
                } else {
                    let request = self.request;
                    let query = self
                        .query
                        .get_or_insert_with(|| parse_query_params(request.uri().query()));
                    find_param(query, name).map(str::to_string)
                }
            }
            ParamIn::Header => match self.request.headers().get(name) {
                Some(raw) => Some(
                    raw.to_str()
                        .map_err(|e| RequestError::InvalidParameter {
                            name: name.to_string(),
                            location: ParamIn::Header,
                            value: String::from_utf8_lossy(raw.as_bytes()).into_owned(),
                            reason: e.to_string(),
                        })?
                        .to_string(),
                ),
                None => None,
            },
            ParamIn::Cookie => {
                let request = self.request;
                let cookies = self
                    .cookies
                    .get_or_insert_with(|| parse_cookies(request.headers()));
                find_param(cookies, name).map(str::to_string)
            }
            ParamIn::Injected | ParamIn::Body => None,
        };
        Ok(value.filter(|v| !v.is_empty()))
    }
}

impl<E: Display + Send + 'static> Binder<E> {
    pub fn handle(&self, writer: &mut dyn ResponseWriter, request: &HttpRequest, path: &PathParams) {
        let request_id = request_id(request.headers());
        let span = info_span!(
            "endpoint",
            name = %self.name,
            method = %request.method(),
            request_id = %request_id
        );
        let _entered = span.enter();

        let response = Response::bound();
        let request_id = request_id.to_string();

        let slots = match self.bind(request, path, &response) {
            Ok(slots) => slots,
            Err(err) => {
                warn!(error = %err, kind = err.kind(), "request rejected");
                write_request_error(writer, &err, &request_id);
                return;
            }
        };
        debug!(slots = slots.len(), "arguments bound");

        let invoke = &self.invoke;
        let outcome = match catch_unwind(AssertUnwindSafe(|| invoke(slots))) {
            Ok(outcome) => outcome,
            Err(panic) => {
                error!(panic = ?panic_message(&*panic), "endpoint panicked");
                let err = RequestError::HandlerPanicked {
                    endpoint: self.name.clone(),
                };
                write_request_error(writer, &err, &request_id);
                return;
            }
        };

        match outcome {
            Ok(Outcome::Success(body)) => {
                write_reply(writer, response.snapshot(), body.as_deref(), &request_id);
            }
            Ok(Outcome::Failure(err)) => {
                debug!(error = %err, "endpoint returned an error");
                let error_response = Response::for_error();
                let handled = catch_unwind(AssertUnwindSafe(|| {
                    (self.error_handler)(&error_response, request, &err)
                }));
                match handled {
                    Ok(Ok(body)) => {
                        // cookies set before the failure still reach the client
                        let mut snapshot = error_response.snapshot();
                        let mut cookies = response.snapshot().cookies;
                        cookies.append(&mut snapshot.cookies);
                        snapshot.cookies = cookies;
                        write_reply(writer, snapshot, Some(&body), &request_id);
                    }
                    Ok(Err(serialize_err)) => {
                        error!(error = %serialize_err, "error payload not serializable");
                        write_request_error(writer, &serialize_err, &request_id);
                    }
                    Err(panic) => {
                        error!(panic = ?panic_message(&*panic), "error handler panicked");
                        let err = RequestError::HandlerPanicked {
                            endpoint: self.name.clone(),
                        };
                        write_request_error(writer, &err, &request_id);
                    }
                }
            }
            Err(err) => {
                if err.is_client_error() {
                    warn!(error = %err, kind = err.kind(), "request rejected");
                } else {
                    error!(error = %err, kind = err.kind(), "endpoint failed");
                }
                write_request_error(writer, &err, &request_id);
            }
        }
    }

    /// Stages 1 to 3: allocate slots, bind scalars, bind bodies.
    fn bind(
        &self,
        request: &HttpRequest,
        path: &PathParams,
        response: &Response,
    ) -> Result<Vec<Slot>, RequestError> {
        let mut slots = Vec::with_capacity(self.params.len());
        let mut pending_bodies = Vec::new();
        let mut inputs = RequestInputs::new(request, path);

        for (index, param) in self.params.iter().enumerate() {
            let slot = match param.location {
                ParamIn::Injected => Slot::Response(response.clone()),
                ParamIn::Body => {
                    pending_bodies.push(index);
                    Slot::Zero
                }
                location => match inputs.lookup(param)? {
                    Some(raw) => {
                        let value = parse_value(&raw, param.json_type).map_err(|reason| {
                            RequestError::InvalidParameter {
                                name: param.name.to_string(),
                                location,
                                value: raw.clone(),
                                reason,
                            }
                        })?;
                        Slot::Value {
                            name: Arc::clone(&param.name),
                            location,
                            raw: Some(raw),
                            value,
                        }
                    }
                    None if param.required => {
                        return Err(RequestError::MissingParameter {
                            name: param.name.to_string(),
                            location,
                        })
                    }
                    None => Slot::Zero,
                },
            };
            slots.push(slot);
        }

        if !pending_bodies.is_empty() {
            self.bind_bodies(request.body(), &pending_bodies, &mut slots)?;
        }
        Ok(slots)
    }

    fn bind_bodies(
        &self,
        payload: &[u8],
        pending: &[usize],
        slots: &mut [Slot],
    ) -> Result<(), RequestError> {
        if payload.len() > self.max_body_bytes {
            return Err(RequestError::PayloadTooLarge {
                limit: self.max_body_bytes,
                actual: payload.len(),
            });
        }

        if let [index] = pending {
            let param = &self.params[*index];
            if payload.is_empty() {
                return Err(RequestError::MalformedBody {
                    schema: param.name.to_string(),
                    reason: "request body is empty".to_string(),
                });
            }
            let value: Value =
                serde_json::from_slice(payload).map_err(|e| RequestError::MalformedBody {
                    schema: param.name.to_string(),
                    reason: e.to_string(),
                })?;
            slots[*index] = body_slot(param, value);
            return Ok(());
        }

        let mut fragments: Map<String, Value> = if payload.is_empty() {
            Map::new()
        } else {
            serde_json::from_slice(payload).map_err(|e| RequestError::MalformedBody {
                schema: self.name.clone(),
                reason: e.to_string(),
            })?
        };

        for &index in pending {
            let param = &self.params[index];
            if let Some(fragment) = fragments.remove(&scheme_prefix(&param.name)) {
                slots[index] = body_slot(param, fragment);
            }
        }
        Ok(())
    }
}

fn body_slot(param: &HandleParam, value: Value) -> Slot {
    Slot::Value {
        name: Arc::clone(&param.name),
        location: ParamIn::Body,
        raw: None,
        value,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Stage 6: headers, cookies, status, body.
fn write_reply(
    writer: &mut dyn ResponseWriter,
    snapshot: ResponseSnapshot,
    body: Option<&[u8]>,
    request_id: &str,
) {
    let headers = writer.headers_mut();
    for (name, value) in snapshot.headers.iter() {
        headers.append(name.clone(), value.clone());
    }
    for cookie in snapshot.cookies {
        headers.append(SET_COOKIE, cookie);
    }
    if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(header_name(super::request::REQUEST_ID_HEADER), value);
    }

    writer.write_status(snapshot.status);
    if let Some(body) = body {
        if let Err(e) = writer.write_body(body) {
            warn!(error = %e, "failed to write response body");
        }
    }
}

fn write_request_error(writer: &mut dyn ResponseWriter, err: &RequestError, request_id: &str) {
    let snapshot = ResponseSnapshot::from(err.status());
    let body = err.to_body().to_string();
    write_reply(writer, snapshot, Some(body.as_bytes()), request_id);
}

impl From<StatusCode> for ResponseSnapshot {
    fn from(status: StatusCode) -> Self {
        Self {
            status,
            headers: http::HeaderMap::new(),
            cookies: Vec::new(),
        }
    }
}
