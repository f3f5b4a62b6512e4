use std::fmt;
use std::io;
use std::sync::Arc;

use http::header::{HeaderName, IntoHeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A cookie to be sent in a `Set-Cookie` header.
///
/// ```rust
/// use brrtapi::{Cookie, SameSite};
///
/// let cookie = Cookie::new("session", "abc")
///     .path("/")
///     .http_only(true)
///     .same_site(SameSite::Lax);
/// assert_eq!(cookie.to_string(), "session=abc; Path=/; HttpOnly; SameSite=Lax");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
    domain: Option<String>,
    max_age: Option<i64>,
    http_only: bool,
    secure: bool,
    same_site: Option<SameSite>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Lifetime in seconds; zero or negative expires the cookie immediately.
    #[must_use]
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    #[must_use]
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expiring cookie that removes `name` on the client.
    fn removal(name: &str) -> Self {
        Cookie::new(name, "").path("/").max_age(-1).http_only(true)
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age.max(0))?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site)?;
        }
        Ok(())
    }
}

/// Failure of a response-context operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The context was created with [`Response::new`] and has no writer.
    Detached { action: &'static str },
    /// The cookie does not render to a valid header value.
    InvalidCookie { name: String },
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseError::Detached { action } => write!(
                f,
                "cannot {}: response context is not bound to a live request",
                action
            ),
            ResponseError::InvalidCookie { name } => {
                write!(f, "cookie '{}' is not a valid header value", name)
            }
        }
    }
}

impl std::error::Error for ResponseError {}

#[derive(Debug)]
struct ResponseParts {
    status: StatusCode,
    headers: HeaderMap,
    cookies: Vec<HeaderValue>,
}

/// Everything accumulated on a [`Response`], ready to be written.
#[derive(Debug)]
pub(crate) struct ResponseSnapshot {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub cookies: Vec<HeaderValue>,
}

/// Request-scoped response context.
///
/// Endpoints receive it by declaring a `Response` argument. Clones share the
/// same state, so status and headers set by the endpoint are visible to the
/// binder when it writes the reply.
#[derive(Debug, Clone)]
pub struct Response {
    inner: Arc<Mutex<ResponseParts>>,
    live: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Detached context (status 200). Cookie helpers fail on it.
    #[must_use]
    pub fn new() -> Self {
        Self::with_status(StatusCode::OK, false)
    }

    /// Context bound to the request being served.
    pub(crate) fn bound() -> Self {
        Self::with_status(StatusCode::OK, true)
    }

    /// Fresh context handed to the error handler.
    pub(crate) fn for_error() -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, true)
    }

    fn with_status(status: StatusCode, live: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ResponseParts {
                status,
                headers: HeaderMap::new(),
                cookies: Vec::new(),
            })),
            live,
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.lock().status
    }

    pub fn set_status(&self, status: StatusCode) {
        self.inner.lock().status = status;
    }

    /// Replace all values of `name`.
    pub fn set_header<K: IntoHeaderName>(&self, name: K, value: HeaderValue) {
        self.inner.lock().headers.insert(name, value);
    }

    pub fn append_header<K: IntoHeaderName>(&self, name: K, value: HeaderValue) {
        self.inner.lock().headers.append(name, value);
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<HeaderValue> {
        self.inner.lock().headers.get(name).cloned()
    }

    #[must_use]
    pub fn headers(&self) -> HeaderMap {
        self.inner.lock().headers.clone()
    }

    pub fn set_cookie(&self, cookie: Cookie) -> Result<(), ResponseError> {
        if !self.live {
            return Err(ResponseError::Detached {
                action: "set cookie",
            });
        }
        let value = HeaderValue::from_str(&cookie.to_string()).map_err(|_| {
            ResponseError::InvalidCookie {
                name: cookie.name.clone(),
            }
        })?;
        self.inner.lock().cookies.push(value);
        Ok(())
    }

    /// Expire `name` on the client (`Max-Age=0`, `Path=/`, `HttpOnly`).
    pub fn delete_cookie(&self, name: &str) -> Result<(), ResponseError> {
        if !self.live {
            return Err(ResponseError::Detached {
                action: "delete cookie",
            });
        }
        self.set_cookie(Cookie::removal(name))
    }

    pub(crate) fn snapshot(&self) -> ResponseSnapshot {
        let parts = self.inner.lock();
        ResponseSnapshot {
            status: parts.status,
            headers: parts.headers.clone(),
            cookies: parts.cookies.clone(),
        }
    }
}

/// Output side of the external server.
pub trait ResponseWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap;
    fn write_status(&mut self, status: StatusCode);
    fn write_body(&mut self, body: &[u8]) -> io::Result<()>;
}

/// In-memory [`ResponseWriter`] that records what was written.
#[derive(Debug, Clone)]
pub struct RecordedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for RecordedResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

impl RecordedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

impl ResponseWriter for RecordedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }
}

pub(crate) fn header_name(name: &'static str) -> HeaderName {
    HeaderName::from_static(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let response = Response::bound();
        let handle = response.clone();
        handle.set_status(StatusCode::CREATED);
        handle.set_header("x-trace", HeaderValue::from_static("1"));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.header("x-trace").unwrap(), "1");
    }

    #[test]
    fn test_detached_cookie_helpers_fail() {
        let response = Response::new();
        let err = response.set_cookie(Cookie::new("a", "b")).unwrap_err();
        assert_eq!(err, ResponseError::Detached { action: "set cookie" });
        assert!(err.to_string().contains("not bound"));
        assert!(response.delete_cookie("a").is_err());
    }

    #[test]
    fn test_delete_cookie_expires() {
        let response = Response::bound();
        response.delete_cookie("session").unwrap();
        let snapshot = response.snapshot();
        assert_eq!(
            snapshot.cookies[0],
            "session=; Path=/; Max-Age=0; HttpOnly"
        );
    }

    #[test]
    fn test_invalid_cookie_value() {
        let response = Response::bound();
        let err = response
            .set_cookie(Cookie::new("bad", "line\nbreak"))
            .unwrap_err();
        assert!(matches!(err, ResponseError::InvalidCookie { .. }));
    }

    #[test]
    fn test_error_context_defaults_to_500() {
        assert_eq!(Response::for_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Response::new().status(), StatusCode::OK);
    }

    #[test]
    fn test_cookie_rendering() {
        let cookie = Cookie::new("id", "42")
            .domain("example.com")
            .max_age(3600)
            .secure(true)
            .same_site(SameSite::Strict);
        assert_eq!(
            cookie.to_string(),
            "id=42; Domain=example.com; Max-Age=3600; Secure; SameSite=Strict"
        );
    }
}
