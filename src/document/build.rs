use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::api::Api;
use crate::spec::{scheme_prefix, JsonType, Parameter, Schema};

use super::model::{
    Components, Info, MediaType, OpenApiDocument, Operation, ParameterObject, RequestBodyObject,
    ResponseObject, SchemaObject, ServerObject, TagObject,
};

const OPENAPI_VERSION: &str = "3.0.3";
const JSON: &str = "application/json";

/// Renders a document to text.
pub trait DocumentGenerator {
    fn render(&self, document: &OpenApiDocument) -> Result<String>;
}

/// YAML renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlGenerator;

impl DocumentGenerator for YamlGenerator {
    fn render(&self, document: &OpenApiDocument) -> Result<String> {
        serde_yaml::to_string(document).context("Failed to serialize document as YAML")
    }
}

/// Pretty-printed JSON renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGenerator;

impl DocumentGenerator for JsonGenerator {
    fn render(&self, document: &OpenApiDocument) -> Result<String> {
        serde_json::to_string_pretty(document).context("Failed to serialize document as JSON")
    }
}

/// Build the document from everything registered on `api`.
pub fn build_document<E>(api: &Api<E>) -> OpenApiDocument {
    let mut schemas: BTreeMap<String, SchemaObject> =
        api.schemas.iter().map(|s| (s.name.clone(), schema_object(s))).collect();

    for (group, members) in api.scheme_groups.iter() {
        let properties = members
            .iter()
            .map(|m| (scheme_prefix(m), SchemaObject::reference(m)))
            .collect();
        schemas.insert(
            group.to_string(),
            SchemaObject {
                schema_type: Some(JsonType::Object),
                properties,
                ..SchemaObject::default()
            },
        );
    }

    let mut paths = BTreeMap::new();
    for entry in api.endpoints.iter() {
        let item: &mut BTreeMap<String, Operation> =
            paths.entry(document_path(&entry.path)).or_default();
        for method in &entry.methods {
            let mut responses = BTreeMap::new();
            responses.insert(
                "200".to_string(),
                ResponseObject {
                    description: "Successful response".to_string(),
                    content: method.response_type.as_deref().map(json_content),
                },
            );
            responses.insert(
                "default".to_string(),
                ResponseObject {
                    description: "Error response".to_string(),
                    content: Some(json_content(&api.error_scheme)),
                },
            );

            item.insert(
                method.method.as_str().to_lowercase(),
                Operation {
                    operation_id: method.operation_id.clone(),
                    tags: method.tags.clone(),
                    summary: non_empty(&method.summary),
                    description: non_empty(&method.description),
                    parameters: method.parameters.iter().map(parameter_object).collect(),
                    request_body: method.request_body.as_deref().map(|name| RequestBodyObject {
                        required: true,
                        content: json_content(name),
                    }),
                    responses,
                },
            );
        }
    }

    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: api.meta.title.clone(),
            version: api.meta.version.clone(),
            description: non_empty(&api.meta.description),
        },
        servers: api
            .servers
            .iter()
            .map(|s| ServerObject {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect(),
        tags: api
            .tags
            .iter()
            .map(|t| TagObject {
                name: t.name.clone(),
                description: t.description.clone(),
            })
            .collect(),
        paths,
        components: Components { schemas },
    }
}

/// `/users/:id` → `/users/{id}`.
#[must_use]
pub fn document_path(template: &str) -> String {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn schema_object(schema: &Schema) -> SchemaObject {
    let properties = schema
        .properties
        .iter()
        .map(|p| {
            let mut node = SchemaObject::typed(p.meta.json_type, p.meta.format.clone());
            node.example = p.meta.extensions.get("example").cloned();
            (p.name.clone(), node)
        })
        .collect();
    SchemaObject {
        schema_type: Some(JsonType::Object),
        properties,
        ..SchemaObject::default()
    }
}

fn parameter_object(parameter: &Parameter) -> ParameterObject {
    ParameterObject {
        name: parameter.name.clone(),
        location: parameter.location,
        // path parameters are always required in OpenAPI
        required: parameter.required || parameter.location == crate::spec::ParamIn::Path,
        description: non_empty(&parameter.description),
        schema: SchemaObject::typed(parameter.meta.json_type, parameter.meta.format.clone()),
    }
}

fn json_content(schema: &str) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(
        JSON.to_string(),
        MediaType {
            schema: SchemaObject::reference(schema),
        },
    );
    content
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path() {
        assert_eq!(document_path("/users/:id/posts/:post_id"), "/users/{id}/posts/{post_id}");
        assert_eq!(document_path("/health"), "/health");
        assert_eq!(document_path("/"), "/");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("x").as_deref(), Some("x"));
    }
}
