use std::sync::Arc;

use http::header::COOKIE;
use http::HeaderMap;
use serde_json::{Number, Value};
use ulid::Ulid;

use crate::router::ParamVec;
use crate::spec::JsonType;

/// Header used to correlate a request across log lines.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Parse every `Cookie` header into name/value pairs.
pub fn parse_cookies(headers: &HeaderMap) -> ParamVec {
    let mut cookies = ParamVec::new();
    for value in headers.get_all(COOKIE) {
        let Ok(raw) = value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let Some(name) = parts.next().map(str::trim).filter(|n| !n.is_empty()) else {
                continue;
            };
            let value = parts.next().unwrap_or("").trim();
            cookies.push((Arc::from(name), value.to_string()));
        }
    }
    cookies
}

/// URL-decode a query string (without the leading `?`).
pub fn parse_query_params(query: Option<&str>) -> ParamVec {
    match query {
        Some(query) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Last value recorded under `name` (last write wins).
#[inline]
#[must_use]
pub fn find_param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Reuse an inbound `x-request-id` when it is a valid ULID, else mint one.
#[must_use]
pub fn request_id(headers: &HeaderMap) -> Ulid {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Ulid::from_string(s.trim()).ok())
        .unwrap_or_else(Ulid::new)
}

/// Convert a raw textual value to JSON according to the parameter's type.
///
/// Booleans accept exactly `true` / `false`. Integers are base 10 (signed,
/// with an unsigned fallback above `i64::MAX`). Numbers parse as `f64`.
pub fn parse_value(raw: &str, json_type: JsonType) -> Result<Value, String> {
    match json_type {
        JsonType::Boolean => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err("expected 'true' or 'false'".to_string()),
        },
        JsonType::Integer => match raw.parse::<i64>() {
            Ok(n) => Ok(Value::from(n)),
            Err(signed_err) => raw
                .parse::<u64>()
                .map(Value::from)
                .map_err(|_| signed_err.to_string()),
        },
        JsonType::Number => {
            let n = raw.parse::<f64>().map_err(|e| e.to_string())?;
            Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| "number is not finite".to_string())
        }
        _ => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_cookies_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("session=abc; theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("lang=en;=skipped"));
        let cookies = parse_cookies(&headers);
        assert_eq!(find_param(&cookies, "session"), Some("abc"));
        assert_eq!(find_param(&cookies, "theme"), Some("dark"));
        assert_eq!(find_param(&cookies, "lang"), Some("en"));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_query_is_decoded_and_last_wins() {
        let query = parse_query_params(Some("name=John%20Doe&limit=10&limit=20"));
        assert_eq!(find_param(&query, "name"), Some("John Doe"));
        assert_eq!(find_param(&query, "limit"), Some("20"));
        assert!(parse_query_params(None).is_empty());
    }

    #[test]
    fn test_request_id_reuse() {
        let id = Ulid::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );
        assert_eq!(request_id(&headers), id);

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("not-a-ulid"));
        assert_ne!(request_id(&headers), id);
    }

    #[test]
    fn test_parse_boolean_is_strict() {
        assert_eq!(parse_value("true", JsonType::Boolean), Ok(Value::Bool(true)));
        assert_eq!(parse_value("false", JsonType::Boolean), Ok(Value::Bool(false)));
        assert!(parse_value("True", JsonType::Boolean).is_err());
        assert!(parse_value("1", JsonType::Boolean).is_err());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_value("-42", JsonType::Integer), Ok(Value::from(-42)));
        assert_eq!(
            parse_value("18446744073709551615", JsonType::Integer),
            Ok(Value::from(u64::MAX))
        );
        assert!(parse_value("4.2", JsonType::Integer).is_err());
        assert_eq!(
            parse_value("0.1", JsonType::Number),
            Ok(Value::from(0.1_f64))
        );
        assert!(parse_value("NaN", JsonType::Number).is_err());
        assert_eq!(
            parse_value("hello", JsonType::String),
            Ok(Value::String("hello".into()))
        );
    }
}
