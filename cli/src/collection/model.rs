use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treats an explicit `null` list like a missing one.
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub info: Option<CollectionInfo>,
    #[serde(default)]
    pub item: Option<Vec<Item>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub name: Option<String>,
}

/// One node of the collection tree. Folders carry `item`, requests carry
/// `request`; see [`Item::kind`].
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub item: Option<Vec<Item>>,
    #[serde(default)]
    pub request: Option<RequestDef>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub event: Vec<Event>,
}

pub enum ItemKind<'a> {
    Folder {
        name: &'a str,
        children: &'a [Item],
    },
    Request {
        name: &'a str,
        request: &'a RequestDef,
        events: &'a [Event],
    },
    Unknown,
}

impl Item {
    pub fn kind(&self) -> ItemKind<'_> {
        if let Some(children) = &self.item {
            ItemKind::Folder {
                name: &self.name,
                children,
            }
        } else if let Some(request) = &self.request {
            ItemKind::Request {
                name: &self.name,
                request,
                events: &self.event,
            }
        } else {
            ItemKind::Unknown
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestDef {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub header: Vec<Header>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub auth: Option<Auth>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Url {
    Raw(String),
    Parts(UrlParts),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlParts {
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub path: Option<PathSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    Segments(Vec<PathSegment>),
    Joined(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Text(String),
    Described { value: String },
}

impl PathSegment {
    pub fn as_str(&self) -> &str {
        match self {
            PathSegment::Text(s) => s,
            PathSegment::Described { value } => value,
        }
    }
}

impl Url {
    pub fn raw(&self) -> Option<&str> {
        match self {
            Url::Raw(raw) => Some(raw),
            Url::Parts(parts) => parts.raw.as_deref(),
        }
    }

    /// Slash-joined path segments, when the url carries them.
    pub fn joined_path(&self) -> Option<String> {
        match self {
            Url::Raw(_) => None,
            Url::Parts(parts) => match parts.path.as_ref()? {
                PathSpec::Segments(segments) => Some(
                    segments
                        .iter()
                        .map(PathSegment::as_str)
                        .collect::<Vec<_>>()
                        .join("/"),
                ),
                PathSpec::Joined(path) => Some(path.trim_start_matches('/').to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub urlencoded: Vec<FormField>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub formdata: Vec<FormField>,
    #[serde(default)]
    pub graphql: Option<GraphQl>,
    #[serde(default)]
    pub file: Option<FileRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormField {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub src: Option<Value>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQl {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub variables: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileRef {
    #[serde(default)]
    pub src: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    #[serde(default, rename = "type")]
    pub auth_type: String,
    #[serde(default)]
    pub bearer: Option<BearerSpec>,
}

/// Collection v2.1 stores bearer settings as a key/value list, v2.0 as a map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BearerSpec {
    Attributes(Vec<AuthAttribute>),
    Map(serde_json::Map<String, Value>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthAttribute {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub listen: String,
    #[serde(default)]
    pub script: Option<Script>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub exec: Option<ScriptSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptSource {
    Lines(Vec<String>),
    Text(String),
}

impl Event {
    /// Script text of a `test` event, lines joined with `\n`.
    pub fn test_script(&self) -> Option<String> {
        if self.listen != "test" {
            return None;
        }
        match self.script.as_ref()?.exec.as_ref()? {
            ScriptSource::Lines(lines) => Some(lines.join("\n")),
            ScriptSource::Text(text) => Some(text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: &str) -> Item {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_kind_prefers_folder() {
        let node = item(r#"{"name": "Users", "item": [], "request": {"method": "GET"}}"#);
        assert!(matches!(node.kind(), ItemKind::Folder { name: "Users", .. }));
    }

    #[test]
    fn test_kind_unknown_without_item_or_request() {
        let node = item(r#"{"name": "stray"}"#);
        assert!(matches!(node.kind(), ItemKind::Unknown));
    }

    #[test]
    fn test_url_segments_joined() {
        let node = item(
            r#"{"name": "get", "request": {"url": {"raw": "{{base}}/users/{{id}}", "path": ["users", "{{id}}"]}}}"#,
        );
        let url = node.request.unwrap().url.unwrap();
        assert_eq!(url.joined_path().as_deref(), Some("users/{{id}}"));
        assert_eq!(url.raw(), Some("{{base}}/users/{{id}}"));
    }

    #[test]
    fn test_url_described_segments() {
        let url: Url =
            serde_json::from_str(r#"{"path": ["v1", {"value": "items", "type": "string"}]}"#)
                .unwrap();
        assert_eq!(url.joined_path().as_deref(), Some("v1/items"));
    }

    #[test]
    fn test_url_plain_string() {
        let url: Url = serde_json::from_str(r#""https://api.example.com/ping""#).unwrap();
        assert!(url.joined_path().is_none());
        assert_eq!(url.raw(), Some("https://api.example.com/ping"));
    }

    #[test]
    fn test_test_script_joins_lines_and_ignores_prerequest() {
        let test: Event = serde_json::from_str(
            r#"{"listen": "test", "script": {"exec": ["a();", "b();"]}}"#,
        )
        .unwrap();
        assert_eq!(test.test_script().as_deref(), Some("a();\nb();"));

        let pre: Event = serde_json::from_str(
            r#"{"listen": "prerequest", "script": {"exec": ["a();"]}}"#,
        )
        .unwrap();
        assert!(pre.test_script().is_none());

        let text: Event =
            serde_json::from_str(r#"{"listen": "test", "script": {"exec": "one();"}}"#).unwrap();
        assert_eq!(text.test_script().as_deref(), Some("one();"));
    }

    #[test]
    fn test_null_lists_and_listenerless_events_are_tolerated() {
        let node = item(
            r#"{
                "name": "odd",
                "event": null,
                "request": {
                    "method": "POST",
                    "header": null,
                    "body": {"mode": "urlencoded", "urlencoded": null, "formdata": null}
                }
            }"#,
        );
        assert!(node.event.is_empty());
        let request = node.request.unwrap();
        assert!(request.header.is_empty());
        assert!(request.body.unwrap().urlencoded.is_empty());

        let node = item(
            r#"{"name": "quiet", "request": {"method": "GET"}, "event": [{"script": {"exec": ["pm.response.to.have.status(200);"]}}]}"#,
        );
        assert_eq!(node.event.len(), 1);
        assert!(node.event[0].test_script().is_none());
    }
}
