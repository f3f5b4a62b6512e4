//! # Router Module
//!
//! Thin registration front end plus the interface to the external HTTP
//! router.
//!
//! ## Overview
//!
//! This crate does not match paths. It hands each compiled endpoint to a
//! [`RouteRegistrar`] as `(method, path template, handler)`; the host's
//! router matches requests and calls the handler with the captured path
//! variables.
//!
//! [`RouteCollector`] is a registrar that simply records registrations,
//! suitable for mounting into any server later and for tests.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut router = api.router();
//! let mut users = router.group("/api/users");
//! users.get("/:id", get_user, RouteSpec::new().summary("Fetch a user"))?;
//! // registered as GET /api/users/:id, tagged "users"
//! ```

mod core;
mod registrar;

pub use core::{default_tag, join_prefix, RouteSpec, Router};
pub use registrar::{
    HttpRequest, ParamVec, PathParams, RegisteredRoute, RouteCollector, RouteHandler,
    RouteRegistrar, MAX_INLINE_PARAMS,
};
