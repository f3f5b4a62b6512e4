use std::fmt::Display;
use std::sync::Arc;

use http::Method;
use tracing::info;

use crate::api::Api;
use crate::dispatcher::{Binder, HandleParam, Invoker, ResponseWriter};
use crate::error::RegistrationError;
use crate::router::{HttpRequest, PathParams, RouteHandler, RouteSpec};
use crate::spec::{register_parameter, EndpointMethod};
use crate::typeinfo::TypeShape;

use super::handler::{ArgInfo, Endpoint, Slot};

/// Register `endpoint` under `method` and `path` on `api`.
///
/// Arguments are classified in order: the response context is injected,
/// struct types become body components, everything else is a scalar
/// parameter. A second body component turns the request body into a scheme
/// group named after the endpoint, suffixed when a schema already owns that
/// name. Every failure is reported before anything is handed to the route
/// registrar.
pub(crate) fn compile_endpoint<F, Args, E>(
    api: &mut Api<E>,
    method: Method,
    path: &str,
    endpoint: F,
    spec: RouteSpec,
) -> Result<RouteHandler, RegistrationError>
where
    F: Endpoint<Args, E>,
    E: Display + Send + 'static,
{
    let name = endpoint_name::<F>(&spec, &method, path);

    if api.endpoints.contains(path, &method) {
        return Err(RegistrationError::DuplicateMethod {
            path: path.to_string(),
            method,
        });
    }

    let returns = F::returns();
    let response_type = match returns.shape {
        TypeShape::Unit => None,
        TypeShape::Struct => Some(api.schemas.register(&returns, &api.capabilities)?.name.clone()),
        shape => {
            return Err(RegistrationError::InvalidReturnType {
                endpoint: name,
                type_name: returns.rust_name.to_string(),
                shape,
            })
        }
    };

    let mut params = Vec::new();
    let mut parameters = Vec::new();
    let mut bodies: Vec<String> = Vec::new();

    for arg in F::arguments() {
        match arg {
            ArgInfo::Injected => params.push(HandleParam::injected()),
            ArgInfo::Typed(ty) if ty.shape == TypeShape::Struct => {
                let schema = api.schemas.register(&ty, &api.capabilities)?;
                if bodies.contains(&schema.name) {
                    return Err(RegistrationError::DuplicateScheme {
                        group: name,
                        scheme: schema.name.clone(),
                    });
                }
                params.push(HandleParam::body(&schema.name));
                bodies.push(schema.name.clone());
            }
            ArgInfo::Typed(ty) => {
                let capabilities = api.capabilities.resolve(&ty);
                let parameter = register_parameter(&ty, &capabilities, path)?;
                params.push(HandleParam {
                    name: Arc::from(parameter.name.as_str()),
                    location: parameter.location,
                    json_type: parameter.meta.json_type,
                    required: parameter.required,
                });
                parameters.push(parameter);
            }
        }
    }

    // groups are recorded only once every argument has classified
    let request_body = match bodies.len() {
        0 => None,
        1 => bodies.pop(),
        _ => {
            let group = api.schemas.reserve_name(&name);
            for body in &bodies {
                api.scheme_groups.add_scheme(&group, body)?;
            }
            Some(group)
        }
    };

    for tag in &spec.tags {
        api.tags.set(tag);
    }

    let invoke: Invoker<E> = Arc::new(move |slots: Vec<Slot>| endpoint.invoke(slots));
    let binder = Arc::new(Binder {
        name: name.clone(),
        params,
        invoke,
        error_handler: Arc::clone(&api.error_handler),
        max_body_bytes: api.config.max_body_bytes,
    });
    let handler: RouteHandler = Arc::new(
        move |writer: &mut dyn ResponseWriter, request: &HttpRequest, path_params: &PathParams| {
            binder.handle(writer, request, path_params)
        },
    );

    let parameter_count = parameters.len();
    api.endpoints.set(
        path,
        EndpointMethod {
            method: method.clone(),
            tags: spec.tags,
            summary: spec.summary,
            description: spec.description,
            operation_id: name.clone(),
            parameters,
            request_body: request_body.clone(),
            response_type: response_type.clone(),
        },
    )?;
    api.registrar
        .register_route(method.clone(), path, Arc::clone(&handler));

    info!(
        endpoint = %name,
        method = %method,
        path = %path,
        parameters = parameter_count,
        request_body = ?request_body,
        response = ?response_type,
        "endpoint registered"
    );
    Ok(handler)
}

/// Operation id when given, else the function's own name in PascalCase.
/// Closures have no usable name and fall back to method plus path.
fn endpoint_name<F>(spec: &RouteSpec, method: &Method, path: &str) -> String {
    if let Some(id) = spec.operation_id.as_deref().filter(|id| !id.is_empty()) {
        return id.to_string();
    }

    let full = std::any::type_name::<F>();
    if !full.contains("{{closure}}") {
        let base = full.split('<').next().unwrap_or(full);
        let last = base.rsplit("::").next().unwrap_or(base);
        if !last.is_empty() {
            return pascal_case(last);
        }
    }

    let mut name = pascal_case(&method.as_str().to_lowercase());
    for segment in path.split('/') {
        name.push_str(&pascal_case(segment.trim_start_matches(':')));
    }
    name
}

fn pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == '.')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_user_posts() {}

    fn name_of<F>(_: &F, spec: &RouteSpec, method: Method, path: &str) -> String {
        endpoint_name::<F>(spec, &method, path)
    }

    #[test]
    fn test_function_name_is_pascal_cased() {
        let name = name_of(&list_user_posts, &RouteSpec::new(), Method::GET, "/users/:id/posts");
        assert_eq!(name, "ListUserPosts");
    }

    #[test]
    fn test_closure_falls_back_to_route() {
        let closure = || {};
        let name = name_of(&closure, &RouteSpec::new(), Method::POST, "/users/:id/posts");
        assert_eq!(name, "PostUsersIdPosts");
    }

    #[test]
    fn test_operation_id_wins() {
        let spec = RouteSpec::new().operation_id("fetchPosts");
        let name = name_of(&list_user_posts, &spec, Method::GET, "/");
        assert_eq!(name, "fetchPosts");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("calculate"), "Calculate");
        assert_eq!(pascal_case("get_user-by.id"), "GetUserById");
        assert_eq!(pascal_case(""), "");
    }
}
