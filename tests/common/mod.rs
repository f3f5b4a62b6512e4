#![allow(dead_code)]

pub mod test_server {
    use std::sync::Arc;

    use brrtapi::{PathParams, RecordedResponse, RouteCollector};
    use http::{Method, Request};

    /// Minimal stand-in for the host router: matches `:name` segments over
    /// whatever the collector recorded and calls the handler directly.
    pub struct TestServer {
        routes: RouteCollector,
    }

    impl TestServer {
        pub fn new(routes: RouteCollector) -> Self {
            Self { routes }
        }

        pub fn send(&self, request: Request<Vec<u8>>) -> RecordedResponse {
            let path = request.uri().path().to_string();
            let mut reply = RecordedResponse::new();
            for route in self.routes.routes() {
                if route.method != request.method() {
                    continue;
                }
                if let Some(params) = match_template(&route.path, &path) {
                    (route.handler)(&mut reply, &request, &params);
                    return reply;
                }
            }
            panic!("no route for {} {}", request.method(), path);
        }

        pub fn get(&self, uri: &str) -> RecordedResponse {
            self.send(request(Method::GET, uri, Vec::new()))
        }

        pub fn post_json(&self, uri: &str, body: &str) -> RecordedResponse {
            self.send(request(Method::POST, uri, body.as_bytes().to_vec()))
        }
    }

    pub fn request(method: Method, uri: &str, body: Vec<u8>) -> Request<Vec<u8>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap()
    }

    fn match_template(template: &str, path: &str) -> Option<PathParams> {
        let expected: Vec<&str> = template.split('/').collect();
        let actual: Vec<&str> = path.split('/').collect();
        if expected.len() != actual.len() {
            return None;
        }
        let mut params = PathParams::new();
        for (want, got) in expected.iter().zip(actual.iter()) {
            match want.strip_prefix(':') {
                Some(name) => params.push((Arc::from(name), (*got).to_string())),
                None if want == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

pub mod fixtures {
    use brrtapi::{ApiError, ApiType, Response};
    use http::{HeaderValue, StatusCode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize, ApiType)]
    pub struct Calculation {
        pub left: i64,
        pub right: i64,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize, ApiType)]
    pub struct CalcResult {
        pub result: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize, ApiType)]
    #[serde(rename_all = "camelCase")]
    pub struct Options {
        pub scale: i64,
        pub round_down: bool,
    }

    /// Path parameter `id`, required.
    #[derive(Debug, Default, Serialize, Deserialize, ApiType)]
    #[api(name = "id", required, description = "User identifier")]
    pub struct UserId(pub u64);

    /// Optional `limit` query parameter.
    #[derive(Debug, Default, Serialize, Deserialize, ApiType)]
    #[api(name = "limit")]
    pub struct Limit(pub Option<u32>);

    #[derive(Debug, Default, Serialize, Deserialize, ApiType)]
    #[api(name = "x-tenant", required, location = "header")]
    pub struct Tenant(pub String);

    #[derive(Debug, Default, Serialize, Deserialize, ApiType)]
    #[api(name = "session", location = "cookie")]
    pub struct Session(pub String);

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize, ApiType)]
    pub struct UserPosts {
        pub user: u64,
        pub limit: u32,
        pub tenant: String,
        pub session: String,
    }

    pub fn calculate(calc: Calculation) -> Result<CalcResult, ApiError> {
        if calc.left < 0 || calc.right < 0 {
            return Err(ApiError::bad_request("left and right must be positive"));
        }
        Ok(CalcResult {
            result: calc.left + calc.right,
        })
    }

    pub fn calculate_with_options(
        calc: Calculation,
        options: Options,
    ) -> Result<CalcResult, ApiError> {
        let scale = if options.scale == 0 { 1 } else { options.scale };
        Ok(CalcResult {
            result: (calc.left + calc.right) * scale,
        })
    }

    pub fn list_user_posts(
        id: UserId,
        limit: Limit,
        tenant: Tenant,
        session: Session,
    ) -> Result<UserPosts, ApiError> {
        Ok(UserPosts {
            user: id.0,
            limit: limit.0.unwrap_or(10),
            tenant: tenant.0,
            session: session.0,
        })
    }

    pub fn login(response: Response) -> Result<(), ApiError> {
        response.set_status(StatusCode::NO_CONTENT);
        response.set_header("x-login", HeaderValue::from_static("ok"));
        response
            .set_cookie(brrtapi::Cookie::new("session", "abc123").path("/"))
            .map_err(|e| ApiError::internal(e.to_string()))?;
        Ok(())
    }

    /// Clears the session cookie, then reports the session as expired.
    pub fn logout(response: Response) -> Result<(), ApiError> {
        response
            .delete_cookie("session")
            .map_err(|e| ApiError::internal(e.to_string()))?;
        response.set_header("x-logout", HeaderValue::from_static("pending"));
        Err(ApiError::new(StatusCode::UNAUTHORIZED, "session expired"))
    }

    pub fn always_panics() -> Result<(), ApiError> {
        panic!("boom");
    }
}
