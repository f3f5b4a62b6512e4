//! The `Api` object: registries, error handling and configuration shared by
//! every endpoint.

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::dispatcher::{ErrorHandler, RequestError, Response};
use crate::document::{build_document, DocumentGenerator, OpenApiDocument, YamlGenerator};
use crate::error::{default_error_handler, ApiError, RegistrationError};
use crate::router::{join_prefix, HttpRequest, RouteRegistrar, Router};
use crate::runtime_config::RuntimeConfig;
use crate::spec::{AppMeta, Endpoints, SchemeGroups, Schemas, Servers, Tags};
use crate::typeinfo::{ApiType, CapabilityRegistry, TypeDescriptor};

/// An API under construction.
///
/// `E` is the single error type every endpoint returns; the error handler
/// chosen at construction turns it into a response payload.
///
/// ```rust
/// use brrtapi::{Api, AppMeta, RouteCollector, RouteSpec};
/// use brrtapi::{ApiError, ApiType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize, ApiType)]
/// struct Calculation { left: i64, right: i64 }
///
/// #[derive(Default, Serialize, Deserialize, ApiType)]
/// struct CalcResult { result: i64 }
///
/// fn add(calc: Calculation) -> Result<CalcResult, ApiError> {
///     Ok(CalcResult { result: calc.left + calc.right })
/// }
///
/// let routes = RouteCollector::new();
/// let mut api = Api::with_default_errors(routes.clone(), AppMeta::new("calc", "1.0")).unwrap();
/// api.router().post("/add", add, RouteSpec::new().tag("math")).unwrap();
/// assert_eq!(routes.len(), 1);
/// ```
pub struct Api<E = ApiError> {
    pub(crate) error_handler: ErrorHandler<E>,
    pub(crate) error_scheme: String,
    pub(crate) registrar: Box<dyn RouteRegistrar + Send>,
    pub(crate) capabilities: Arc<CapabilityRegistry>,
    pub(crate) config: RuntimeConfig,
    pub(crate) schemas: Schemas,
    pub(crate) scheme_groups: SchemeGroups,
    pub(crate) endpoints: Endpoints,
    pub meta: AppMeta,
    pub servers: Servers,
    pub tags: Tags,
}

impl Api<ApiError> {
    /// `Api` using [`ApiError`] and [`default_error_handler`].
    pub fn with_default_errors(
        registrar: impl RouteRegistrar + Send + 'static,
        meta: AppMeta,
    ) -> Result<Self, RegistrationError> {
        Api::new(registrar, default_error_handler, meta)
    }
}

impl<E: Display + Send + 'static> Api<E> {
    /// Build an `Api` with configuration from the environment and the
    /// process-wide capability cache.
    pub fn new<H, R>(
        registrar: impl RouteRegistrar + Send + 'static,
        error_handler: H,
        meta: AppMeta,
    ) -> Result<Self, RegistrationError>
    where
        H: Fn(&Response, &HttpRequest, &E) -> R + Send + Sync + 'static,
        R: ApiType + Serialize,
    {
        Self::with_config(
            registrar,
            error_handler,
            meta,
            RuntimeConfig::from_env(),
            CapabilityRegistry::global(),
        )
    }

    /// Build an `Api` with explicit configuration and capability cache.
    ///
    /// The error handler's payload type is registered as the error scheme.
    pub fn with_config<H, R>(
        registrar: impl RouteRegistrar + Send + 'static,
        error_handler: H,
        meta: AppMeta,
        config: RuntimeConfig,
        capabilities: Arc<CapabilityRegistry>,
    ) -> Result<Self, RegistrationError>
    where
        H: Fn(&Response, &HttpRequest, &E) -> R + Send + Sync + 'static,
        R: ApiType + Serialize,
    {
        let mut schemas = Schemas::new();
        let error_scheme = schemas
            .register(&TypeDescriptor::of::<R>(), &capabilities)?
            .name
            .clone();

        let error_handler: ErrorHandler<E> = Arc::new(
            move |response: &Response, request: &HttpRequest, err: &E| {
                let payload = error_handler(response, request, err);
                serde_json::to_vec(&payload).map_err(|e| RequestError::Serialization {
                    reason: e.to_string(),
                })
            },
        );

        Ok(Self {
            error_handler,
            error_scheme,
            registrar: Box::new(registrar),
            capabilities,
            config,
            schemas,
            scheme_groups: SchemeGroups::new(),
            endpoints: Endpoints::new(),
            meta,
            servers: Servers::default(),
            tags: Tags::default(),
        })
    }

    /// Root router (no prefix).
    pub fn router(&mut self) -> Router<'_, E> {
        Router::new(self, "")
    }

    /// Router whose routes all live under `prefix`.
    pub fn group(&mut self, prefix: &str) -> Router<'_, E> {
        Router::new(self, &join_prefix("", prefix))
    }

    /// Render the API document and write it to the configured path.
    pub fn setup(&self) -> Result<PathBuf> {
        self.setup_with(&YamlGenerator)
    }

    /// Like [`Api::setup`] with a custom renderer.
    pub fn setup_with(&self, generator: &dyn DocumentGenerator) -> Result<PathBuf> {
        let path = self.config.document_path.clone();
        let rendered = generator
            .render(&self.document())
            .context("Failed to render API document")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, rendered)
            .with_context(|| format!("Failed to write API document to {}", path.display()))?;
        info!(
            path = %path.display(),
            endpoints = self.endpoints.len(),
            schemas = self.schemas.len(),
            "API document written"
        );
        Ok(path)
    }

    #[must_use]
    pub fn document(&self) -> OpenApiDocument {
        build_document(self)
    }

    /// Schema name of the error payload.
    #[must_use]
    pub fn error_scheme(&self) -> &str {
        &self.error_scheme
    }

    #[must_use]
    pub fn schemas(&self) -> &Schemas {
        &self.schemas
    }

    #[must_use]
    pub fn scheme_groups(&self) -> &SchemeGroups {
        &self.scheme_groups
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn capabilities(&self) -> &Arc<CapabilityRegistry> {
        &self.capabilities
    }
}
