use serde_json::{Map, Value};

pub type JsonMap = Map<String, Value>;

pub fn is_json_content(content: &str) -> bool {
    let trimmed = content.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Parses `content` as a JSON object, keeping key order. Anything else is `None`.
pub fn parse_object(content: &str) -> Option<JsonMap> {
    if !is_json_content(content) {
        return None;
    }
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Text of a value as it appears in a table cell: strings verbatim,
/// everything else as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compact JSON text of GraphQL variables. A string holding JSON is parsed
/// first so the result is never double-encoded.
pub fn compact_variables(variables: Option<&Value>) -> String {
    match variables {
        None | Some(Value::Null) => "{}".to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => "{}".to_string(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => Value::String(s.clone()).to_string(),
        },
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_json_content_object() {
        assert!(is_json_content(r#"{"key": "value"}"#));
        assert!(is_json_content(r#"  {"key": "value"}  "#));
        assert!(is_json_content("{}"));
    }

    #[test]
    fn test_is_json_content_not_json() {
        assert!(!is_json_content("plain text"));
        assert!(!is_json_content("{not closed"));
        assert!(!is_json_content("closed]"));
    }

    #[test]
    fn test_parse_object_keeps_source_order() {
        let map = parse_object(r#"{"zeta": 1, "alpha": 2}"#).unwrap();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_object_rejects_malformed_and_non_objects() {
        assert!(parse_object(r#"{"name":"a",}"#).is_none());
        assert!(parse_object("[1, 2]").is_none());
        assert!(parse_object("42").is_none());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("plain")), "plain");
        assert_eq!(cell_text(&json!(5)), "5");
        assert_eq!(cell_text(&json!(null)), "null");
        assert_eq!(cell_text(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_compact_variables() {
        assert_eq!(compact_variables(None), "{}");
        assert_eq!(compact_variables(Some(&json!(""))), "{}");
        assert_eq!(compact_variables(Some(&json!({"id": 1}))), r#"{"id":1}"#);
        assert_eq!(
            compact_variables(Some(&json!("{\n  \"id\": 1\n}"))),
            r#"{"id":1}"#
        );
        assert_eq!(compact_variables(Some(&json!("not json"))), r#""not json""#);
    }
}
