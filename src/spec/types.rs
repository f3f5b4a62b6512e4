use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a parameter value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamIn {
    /// Supplied by the framework (the response context), never by the client.
    Injected,
    Path,
    Query,
    Cookie,
    Header,
    Body,
}

impl ParamIn {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamIn::Injected => "injected",
            ParamIn::Path => "path",
            ParamIn::Query => "query",
            ParamIn::Cookie => "cookie",
            ParamIn::Header => "header",
            ParamIn::Body => "body",
        }
    }
}

impl std::fmt::Display for ParamIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    Integer,
    String,
    Array,
    Object,
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        };
        write!(f, "{}", s)
    }
}

/// Type metadata shared by parameters and schema properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMeta {
    pub json_type: JsonType,
    pub format: Option<String>,
    /// Free-form extras such as `example`.
    pub extensions: BTreeMap<String, String>,
}

impl TypeMeta {
    #[must_use]
    pub fn new(json_type: JsonType, format: Option<String>) -> Self {
        Self {
            json_type,
            format,
            extensions: BTreeMap::new(),
        }
    }
}

/// Name / required / description supplied by a parameter type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
    pub description: String,
}

/// Title, version and description of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppMeta {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl AppMeta {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_in_wire_names() {
        assert_eq!(ParamIn::Path.to_string(), "path");
        assert_eq!(ParamIn::Injected.to_string(), "injected");
        assert_eq!(serde_json::to_string(&ParamIn::Header).unwrap(), "\"header\"");
    }

    #[test]
    fn test_json_type_serde_matches_display() {
        for ty in [JsonType::Boolean, JsonType::Integer, JsonType::Number, JsonType::String] {
            assert_eq!(serde_json::to_string(&ty).unwrap(), format!("\"{}\"", ty));
        }
    }
}
