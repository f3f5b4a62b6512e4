use crate::error::RegistrationError;
use crate::typeinfo::{classify, Capabilities, TypeDescriptor};

use super::types::{ParamIn, TypeMeta};

/// A scalar endpoint parameter bound from path, query, header or cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamIn,
    pub required: bool,
    pub description: String,
    pub meta: TypeMeta,
}

/// Describe a scalar parameter of type `ty` on the route `path_template`.
///
/// Name, required flag and description come from the type's parameter spec
/// (defaults: declared name, optional, empty). Location resolves in order:
///
/// 1. the type's location override
/// 2. `path` when the template has a `:<name>` segment
/// 3. `query`
///
/// Format precedence is the type's format capability, then the classifier's.
pub fn register_parameter(
    ty: &TypeDescriptor,
    capabilities: &Capabilities,
    path_template: &str,
) -> Result<Parameter, RegistrationError> {
    let classified =
        classify(&ty.shape).map_err(|source| RegistrationError::Classification {
            context: format!("parameter `{}`", ty.name),
            type_name: ty.rust_name.to_string(),
            source,
        })?;

    let (name, required, description) = match &capabilities.spec {
        Some(spec) => (spec.name.clone(), spec.required, spec.description.clone()),
        None => (ty.name.to_string(), false, String::new()),
    };

    let location = match capabilities.location {
        Some(location) => location,
        None if has_placeholder(path_template, &name) => ParamIn::Path,
        None => ParamIn::Query,
    };

    let format = capabilities
        .format
        .clone()
        .or_else(|| classified.format.map(str::to_string));

    Ok(Parameter {
        name,
        location,
        required,
        description,
        meta: TypeMeta::new(classified.json_type, format),
    })
}

/// Whether `template` has a segment exactly equal to `:<name>`.
fn has_placeholder(template: &str, name: &str) -> bool {
    template
        .split('/')
        .any(|segment| segment.strip_prefix(':') == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::JsonType;
    use crate::typeinfo::CapabilityRegistry;

    #[derive(crate::ApiType)]
    #[api(name = "id", required)]
    #[allow(dead_code)]
    struct UserId(i64);

    #[derive(crate::ApiType)]
    #[api(name = "id", location = "header", format = "uuid")]
    #[allow(dead_code)]
    struct TraceId(String);

    fn register<T: crate::ApiType>(path: &str) -> Parameter {
        let ty = TypeDescriptor::of::<T>();
        let caps = CapabilityRegistry::new().resolve(&ty);
        register_parameter(&ty, &caps, path).unwrap()
    }

    #[test]
    fn test_placeholder_selects_path() {
        let param = register::<UserId>("/users/:id");
        assert_eq!(param.location, ParamIn::Path);
        assert_eq!(param.name, "id");
        assert!(param.required);
        assert_eq!(param.meta.json_type, JsonType::Integer);
        assert_eq!(param.meta.format.as_deref(), Some("int64"));
    }

    #[test]
    fn test_without_placeholder_selects_query() {
        assert_eq!(register::<UserId>("/users").location, ParamIn::Query);
        // prefix of another placeholder is not a match
        assert_eq!(register::<UserId>("/users/:identity").location, ParamIn::Query);
    }

    #[test]
    fn test_override_wins_over_placeholder() {
        let param = register::<TraceId>("/traces/:id");
        assert_eq!(param.location, ParamIn::Header);
        assert_eq!(param.meta.format.as_deref(), Some("uuid"));
        assert!(!param.required);
    }

    #[test]
    fn test_defaults_without_spec() {
        let param = register::<u32>("/items");
        assert_eq!(param.name, "u32");
        assert!(!param.required);
        assert_eq!(param.description, "");
    }

    #[test]
    fn test_unclassifiable_parameter() {
        let ty = TypeDescriptor::of::<Vec<i32>>();
        let caps = CapabilityRegistry::new().resolve(&ty);
        let err = register_parameter(&ty, &caps, "/").unwrap_err();
        assert!(matches!(err, RegistrationError::Classification { .. }));
    }
}
