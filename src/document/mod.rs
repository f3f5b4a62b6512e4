//! # Document Module
//!
//! Renders the metadata collected during registration as an OpenAPI 3.0
//! document.
//!
//! [`build_document`] walks servers, tags, schemas, scheme groups and
//! endpoints of an [`crate::Api`] and produces an [`OpenApiDocument`].
//! A [`DocumentGenerator`] turns that into text; [`YamlGenerator`] is the
//! default used by [`crate::Api::setup`].
//!
//! Mapping rules:
//!
//! - path templates `:name` become `{name}`
//! - each schema becomes `components/schemas/<name>` of type `object`
//! - a scheme group becomes an object whose properties are `$ref`s to its
//!   members, keyed by their lower-camel names
//! - every operation gets a `default` response referencing the error scheme

mod build;
mod model;

pub use build::{build_document, document_path, DocumentGenerator, JsonGenerator, YamlGenerator};
pub use model::{
    Components, Info, MediaType, OpenApiDocument, Operation, ParameterObject, PathItem,
    RequestBodyObject, ResponseObject, SchemaObject, ServerObject, TagObject,
};
