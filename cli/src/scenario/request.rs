use crate::collection::model::{Body, FormField, Header, RequestDef, Url};
use crate::collection::placeholder::strip_base_url;
use crate::collection::HttpMethod;
use crate::core::json::{compact_variables, parse_object, JsonMap};
use clap::ValueEnum;
use serde_json::Value;

const FILE_PLACEHOLDER: &str = "<file upload>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathMode {
    /// Join the url's path segments
    Segments,
    /// Strip scheme and host from the raw url
    RawUrl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: JsonMap,
}

pub fn normalize_request(request: &RequestDef, mode: PathMode) -> NormalizedRequest {
    NormalizedRequest {
        method: HttpMethod::parse(request.method.as_deref().unwrap_or_default()),
        path: request
            .url
            .as_ref()
            .map(|url| resolve_path(url, mode))
            .unwrap_or_default(),
        headers: enabled_headers(&request.header),
        body: request.body.as_ref().map(build_body).unwrap_or_default(),
    }
}

/// Placeholders are left in place; they are resolved when the scenario runs.
pub fn resolve_path(url: &Url, mode: PathMode) -> String {
    let raw_url = || strip_base_url(url.raw().unwrap_or_default());
    match mode {
        PathMode::Segments => url
            .joined_path()
            .filter(|path| !path.is_empty())
            .unwrap_or_else(raw_url),
        PathMode::RawUrl => raw_url(),
    }
}

fn enabled_headers(headers: &[Header]) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|h| !h.disabled)
        .map(|h| (h.key.clone(), h.value.clone()))
        .collect()
}

/// Flattens a body into the map rendered as `body:` rows. Never fails: text
/// that is not a JSON object is kept under `raw`.
pub fn build_body(body: &Body) -> JsonMap {
    match body.mode.as_deref() {
        Some("urlencoded") => form_fields(&body.urlencoded),
        Some("formdata") => form_fields(&body.formdata),
        Some("graphql") => {
            let graphql = body.graphql.clone().unwrap_or_default();
            let mut map = JsonMap::new();
            map.insert("query".into(), Value::String(graphql.query));
            map.insert(
                "variables".into(),
                Value::String(compact_variables(graphql.variables.as_ref())),
            );
            map
        }
        Some("file") => {
            let src = body
                .file
                .as_ref()
                .and_then(|f| f.src.clone())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| FILE_PLACEHOLDER.to_string());
            let mut map = JsonMap::new();
            map.insert("file".into(), Value::String(src));
            map
        }
        _ => raw_body(body.raw.as_deref().unwrap_or_default()),
    }
}

fn raw_body(raw: &str) -> JsonMap {
    if raw.trim().is_empty() {
        return JsonMap::new();
    }
    parse_object(raw).unwrap_or_else(|| {
        tracing::debug!("raw body is not a JSON object, keeping it as text");
        let mut map = JsonMap::new();
        map.insert("raw".into(), Value::String(raw.to_string()));
        map
    })
}

fn form_fields(fields: &[FormField]) -> JsonMap {
    let mut map = JsonMap::new();
    for field in fields.iter().filter(|f| !f.disabled) {
        let value = if field.field_type.as_deref() == Some("file") {
            match &field.src {
                Some(Value::String(src)) if !src.is_empty() => Value::String(src.clone()),
                Some(Value::Array(srcs)) if !srcs.is_empty() => Value::Array(srcs.clone()),
                _ => Value::String(FILE_PLACEHOLDER.to_string()),
            }
        } else {
            field.value.clone().unwrap_or(Value::String(String::new()))
        };
        map.insert(field.key.clone(), value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> RequestDef {
        serde_json::from_value(value).unwrap()
    }

    fn body(value: serde_json::Value) -> Body {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_segments_path_keeps_placeholders() {
        let req = request(json!({
            "method": "get",
            "url": {"raw": "{{baseUrl}}/users/{{id}}", "host": ["{{baseUrl}}"], "path": ["users", "{{id}}"]}
        }));
        let normalized = normalize_request(&req, PathMode::Segments);
        assert_eq!(normalized.method, HttpMethod::GET);
        assert_eq!(normalized.path, "users/{{id}}");
        assert!(normalized.body.is_empty());
    }

    #[test]
    fn test_raw_url_mode_strips_host() {
        let req = request(json!({
            "method": "GET",
            "url": {"raw": "https://api.example.com/users/{{id}}", "path": ["users", "{{id}}"]}
        }));
        assert_eq!(normalize_request(&req, PathMode::RawUrl).path, "/users/{{id}}");
    }

    #[test]
    fn test_segments_mode_falls_back_to_raw_string_url() {
        let req = request(json!({"method": "GET", "url": "https://api.example.com/health"}));
        assert_eq!(normalize_request(&req, PathMode::Segments).path, "/health");
    }

    #[test]
    fn test_segments_mode_falls_back_when_path_is_empty() {
        let req = request(json!({
            "method": "GET",
            "url": {"raw": "{{baseUrl}}/status", "path": []}
        }));
        assert_eq!(normalize_request(&req, PathMode::Segments).path, "/status");
    }

    #[test]
    fn test_disabled_headers_are_dropped() {
        let req = request(json!({
            "method": "POST",
            "header": [
                {"key": "Content-Type", "value": "application/json"},
                {"key": "X-Debug", "value": "1", "disabled": true},
                {"key": "X-Tenant", "value": "{{tenant}}"}
            ]
        }));
        assert_eq!(
            normalize_request(&req, PathMode::Segments).headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Tenant".to_string(), "{{tenant}}".to_string()),
            ]
        );
    }

    #[test]
    fn test_urlencoded_excludes_disabled_entries() {
        let map = build_body(&body(json!({
            "mode": "urlencoded",
            "urlencoded": [
                {"key": "grant_type", "value": "password"},
                {"key": "scope", "value": "all", "disabled": true},
                {"key": "username", "value": "{{user}}"}
            ]
        })));
        assert_eq!(
            Value::Object(map),
            json!({"grant_type": "password", "username": "{{user}}"})
        );
    }

    #[test]
    fn test_formdata_file_entry_uses_src() {
        let map = build_body(&body(json!({
            "mode": "formdata",
            "formdata": [
                {"key": "title", "value": "report", "type": "text"},
                {"key": "upload", "type": "file", "src": "/tmp/report.pdf"},
                {"key": "empty", "type": "file"}
            ]
        })));
        assert_eq!(
            Value::Object(map),
            json!({"title": "report", "upload": "/tmp/report.pdf", "empty": "<file upload>"})
        );
    }

    #[test]
    fn test_graphql_variables_serialized() {
        let map = build_body(&body(json!({
            "mode": "graphql",
            "graphql": {"query": "query { me { id } }", "variables": {"first": 10}}
        })));
        assert_eq!(
            Value::Object(map),
            json!({"query": "query { me { id } }", "variables": "{\"first\":10}"})
        );
    }

    #[test]
    fn test_file_mode() {
        let with_src = build_body(&body(json!({"mode": "file", "file": {"src": "data.bin"}})));
        assert_eq!(Value::Object(with_src), json!({"file": "data.bin"}));

        let without = build_body(&body(json!({"mode": "file"})));
        assert_eq!(Value::Object(without), json!({"file": "<file upload>"}));
    }

    #[test]
    fn test_raw_json_object_is_used_as_body() {
        let map = build_body(&body(json!({"mode": "raw", "raw": "{\"name\": \"a\", \"tags\": [1]}"})));
        assert_eq!(Value::Object(map), json!({"name": "a", "tags": [1]}));
    }

    #[test]
    fn test_malformed_raw_json_is_wrapped() {
        let text = "{\"name\":\"a\",}";
        let map = build_body(&body(json!({"mode": "raw", "raw": text})));
        assert_eq!(Value::Object(map), json!({"raw": text}));
    }

    #[test]
    fn test_non_object_raw_json_is_wrapped() {
        let map = build_body(&body(json!({"mode": "raw", "raw": "[1, 2]"})));
        assert_eq!(Value::Object(map), json!({"raw": "[1, 2]"}));
    }

    #[test]
    fn test_blank_raw_body_is_empty() {
        assert!(build_body(&body(json!({"mode": "raw", "raw": "  "}))).is_empty());
        assert!(build_body(&body(json!({}))).is_empty());
    }
}
