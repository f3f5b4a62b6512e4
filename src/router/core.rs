use std::fmt::Display;

use http::Method;

use crate::api::Api;
use crate::endpoint::{compile_endpoint, Endpoint};
use crate::error::{ApiError, RegistrationError};

use super::registrar::RouteHandler;

/// Documentation attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSpec {
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    pub operation_id: Option<String>,
}

impl RouteSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }
}

/// Prefix-composing front end for endpoint registration.
///
/// Obtained from [`Api::router`]; [`Router::group`] derives a nested router
/// whose routes share a path prefix and, unless they declare their own tags,
/// a tag named after the prefix's last segment.
pub struct Router<'a, E = ApiError> {
    api: &'a mut Api<E>,
    prefix: String,
}

impl<'a, E: Display + Send + 'static> Router<'a, E> {
    pub(crate) fn new(api: &'a mut Api<E>, prefix: &str) -> Self {
        Self {
            api,
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Nested router under `prefix`.
    pub fn group(&mut self, prefix: &str) -> Router<'_, E> {
        let prefix = join_prefix(&self.prefix, prefix);
        Router {
            api: &mut *self.api,
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn route<F, Args>(
        &mut self,
        method: Method,
        path: &str,
        endpoint: F,
        mut spec: RouteSpec,
    ) -> Result<RouteHandler, RegistrationError>
    where
        F: Endpoint<Args, E>,
    {
        let full_path = join_prefix(&self.prefix, path);
        if spec.tags.is_empty() {
            if let Some(tag) = default_tag(&self.prefix) {
                spec.tags.push(tag);
            }
        }
        compile_endpoint(&mut *self.api, method, &full_path, endpoint, spec)
    }

    pub fn get<F, Args>(
        &mut self,
        path: &str,
        endpoint: F,
        spec: RouteSpec,
    ) -> Result<RouteHandler, RegistrationError>
    where
        F: Endpoint<Args, E>,
    {
        self.route(Method::GET, path, endpoint, spec)
    }

    pub fn post<F, Args>(
        &mut self,
        path: &str,
        endpoint: F,
        spec: RouteSpec,
    ) -> Result<RouteHandler, RegistrationError>
    where
        F: Endpoint<Args, E>,
    {
        self.route(Method::POST, path, endpoint, spec)
    }

    pub fn put<F, Args>(
        &mut self,
        path: &str,
        endpoint: F,
        spec: RouteSpec,
    ) -> Result<RouteHandler, RegistrationError>
    where
        F: Endpoint<Args, E>,
    {
        self.route(Method::PUT, path, endpoint, spec)
    }

    pub fn patch<F, Args>(
        &mut self,
        path: &str,
        endpoint: F,
        spec: RouteSpec,
    ) -> Result<RouteHandler, RegistrationError>
    where
        F: Endpoint<Args, E>,
    {
        self.route(Method::PATCH, path, endpoint, spec)
    }

    pub fn delete<F, Args>(
        &mut self,
        path: &str,
        endpoint: F,
        spec: RouteSpec,
    ) -> Result<RouteHandler, RegistrationError>
    where
        F: Endpoint<Args, E>,
    {
        self.route(Method::DELETE, path, endpoint, spec)
    }

    pub fn options<F, Args>(
        &mut self,
        path: &str,
        endpoint: F,
        spec: RouteSpec,
    ) -> Result<RouteHandler, RegistrationError>
    where
        F: Endpoint<Args, E>,
    {
        self.route(Method::OPTIONS, path, endpoint, spec)
    }
}

/// Join a prefix and a path with exactly one `/` between them.
#[must_use]
pub fn join_prefix(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => base.to_string(),
        _ => format!("{}/{}", base, path),
    }
}

/// Last literal segment of a group prefix, used as its routes' default tag.
#[must_use]
pub fn default_tag(prefix: &str) -> Option<String> {
    prefix
        .split('/')
        .rev()
        .find(|s| !s.is_empty() && !s.starts_with(':'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_prefix() {
        assert_eq!(join_prefix("", "/pets"), "/pets");
        assert_eq!(join_prefix("/api/", "pets"), "/api/pets");
        assert_eq!(join_prefix("/api", "/pets/:id"), "/api/pets/:id");
        assert_eq!(join_prefix("/api", "/"), "/api");
        assert_eq!(join_prefix("", ""), "/");
    }

    #[test]
    fn test_default_tag() {
        assert_eq!(default_tag("/api/v1/users").as_deref(), Some("users"));
        assert_eq!(default_tag("/users/:id").as_deref(), Some("users"));
        assert_eq!(default_tag(""), None);
    }

    #[test]
    fn test_route_spec_builder() {
        let spec = RouteSpec::new()
            .tag("pets")
            .summary("List pets")
            .operation_id("listPets");
        assert_eq!(spec.tags, vec!["pets"]);
        assert_eq!(spec.summary, "List pets");
        assert_eq!(spec.operation_id.as_deref(), Some("listPets"));
    }
}
