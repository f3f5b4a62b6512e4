//! # brrtapi
//!
//! Declarative, strongly-typed HTTP endpoints whose parameter binding and
//! OpenAPI metadata are derived from ordinary Rust function signatures.
//!
//! ## Overview
//!
//! You write plain functions. Their argument types say where each input
//! comes from (body, path, query, header, cookie) and their return type says
//! what a successful response looks like. Registration inspects those types
//! once, records schemas and parameters, and hands a ready-made request
//! handler to the HTTP router you already have. At request time the handler
//! binds the inputs, calls your function, and writes the JSON reply.
//!
//! ## Architecture
//!
//! - **[`typeinfo`]** - Type descriptors, the JSON type classifier and the
//!   capability cache (parameter specs, format and location overrides)
//! - **[`spec`]** - Registries for schemas, scheme groups, parameters,
//!   endpoints, tags and servers
//! - **[`endpoint`]** - The `Endpoint` trait over functions and the endpoint
//!   compiler that validates a signature and builds its binder
//! - **[`dispatcher`]** - Per-request binding, the response context and the
//!   error-to-response path
//! - **[`router`]** - Prefix-composing registration facade and the
//!   [`RouteRegistrar`] seam to the external HTTP router
//! - **[`document`]** - OpenAPI document rendering (YAML or JSON)
//! - **[`api`]** - The [`Api`] object that owns all of the above
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`runtime_config`]** - Environment-driven limits and paths
//!
//! ### Registration Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant Router
//!     participant Compiler as Endpoint Compiler
//!     participant Registries as Schemas / Params / Endpoints
//!     participant Registrar as RouteRegistrar
//!
//!     User->>Router: post("/calc", calculate, spec)
//!     Router->>Compiler: join prefix, default tag
//!     Compiler->>Compiler: check return type is unit or struct
//!     Compiler->>Registries: struct args -> schemas (+ scheme group)
//!     Compiler->>Registries: scalar args -> parameters
//!     Compiler->>Registries: record endpoint method
//!     Compiler->>Registrar: register_route(POST, "/calc", handler)
//! ```
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Server as Host Router
//!     participant Binder
//!     participant Endpoint
//!     participant ErrorHandler
//!
//!     Server->>Binder: handler(writer, request, path params)
//!     Binder->>Binder: bind path/query/header/cookie scalars
//!     alt missing or invalid input
//!         Binder-->>Server: 4xx structured error
//!     end
//!     Binder->>Binder: decode body (single or grouped)
//!     Binder->>Endpoint: call with typed arguments
//!     alt Ok(value)
//!         Endpoint-->>Binder: serialise value
//!         Binder-->>Server: status, headers, cookies, JSON body
//!     else Err(error)
//!         Binder->>ErrorHandler: (response, request, error)
//!         ErrorHandler-->>Binder: error payload
//!         Binder-->>Server: handler-chosen status + payload
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtapi::{Api, ApiError, ApiType, AppMeta, RecordedResponse, RouteCollector, RouteSpec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize, ApiType)]
//! struct Calculation { left: i64, right: i64 }
//!
//! #[derive(Default, Serialize, Deserialize, ApiType)]
//! struct CalcResult { result: i64 }
//!
//! fn calculate(calc: Calculation) -> Result<CalcResult, ApiError> {
//!     if calc.left < 0 || calc.right < 0 {
//!         return Err(ApiError::bad_request("left and right must be positive"));
//!     }
//!     Ok(CalcResult { result: calc.left + calc.right })
//! }
//!
//! let routes = RouteCollector::new();
//! let mut api = Api::with_default_errors(routes.clone(), AppMeta::new("calc", "1.0")).unwrap();
//! let handler = api.router().post("/calc", calculate, RouteSpec::new()).unwrap();
//!
//! let request = http::Request::post("/calc")
//!     .body(br#"{"left":5,"right":16}"#.to_vec())
//!     .unwrap();
//! let mut reply = RecordedResponse::new();
//! handler(&mut reply, &request, &Default::default());
//! assert_eq!(reply.status(), 200);
//! assert_eq!(reply.body_str(), r#"{"result":21}"#);
//! ```
//!
//! ## Runtime Considerations
//!
//! Registration takes `&mut Api` and is single-threaded. Handlers are
//! `Send + Sync` and may run concurrently; each request gets its own slots
//! and response context. The capability cache is safe to share between
//! threads and between `Api` instances.
//!
//! Configuration comes from `BRRTAPI_*` environment variables, see
//! [`runtime_config`] and [`logging`].

extern crate self as brrtapi;

pub mod api;
pub mod dispatcher;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod spec;
pub mod typeinfo;

pub use brrtapi_macros::ApiType;

pub use api::Api;
pub use dispatcher::{
    Cookie, RecordedResponse, RequestError, Response, ResponseError, ResponseWriter, SameSite,
};
pub use document::{DocumentGenerator, JsonGenerator, OpenApiDocument, YamlGenerator};
pub use endpoint::{Endpoint, EndpointArg, EndpointReturn};
pub use error::{default_error_handler, ApiError, DefaultErrorBody, RegistrationError};
pub use router::{
    HttpRequest, ParamVec, PathParams, RouteCollector, RouteHandler, RouteRegistrar, RouteSpec,
    Router,
};
pub use runtime_config::RuntimeConfig;
pub use spec::{AppMeta, JsonType, ParamIn, ParamSpec, TypeMeta};
pub use typeinfo::{
    classify, ApiType, Capabilities, CapabilityRegistry, DateTime, Email, FieldDef,
    TypeDescriptor, TypeShape,
};
