use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap();
    static ref SCHEME_HOST: Regex = Regex::new(r"^(?i)[a-z][a-z0-9+.-]*://[^/?#]+").unwrap();
    static ref LEADING_PLACEHOLDER: Regex = Regex::new(r"^\{\{[^{}]+\}\}").unwrap();
}

/// Names of every `{{name}}` placeholder in `text`, in order of appearance.
pub fn names(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Rebuilds `text` piece by piece: `literal` maps the text between
/// placeholders, `name` maps each placeholder name.
pub fn rewrite(
    text: &str,
    literal: impl Fn(&str) -> String,
    name: impl Fn(&str) -> String,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&literal(&text[last..whole.start()]));
        out.push_str(&name(inner.as_str()));
        last = whole.end();
    }
    out.push_str(&literal(&text[last..]));
    out
}

/// Drops every `{{` and `}}` so `{{admin_token}}` becomes `admin_token`.
pub fn strip_decoration(text: &str) -> String {
    text.replace("{{", "").replace("}}", "").trim().to_string()
}

/// Removes a leading `scheme://host` or a leading base-url placeholder that is
/// directly followed by `/`. Everything after it, placeholders included, is kept.
pub fn strip_base_url(raw: &str) -> String {
    if let Some(m) = SCHEME_HOST.find(raw) {
        return raw[m.end()..].to_string();
    }
    if let Some(m) = LEADING_PLACEHOLDER.find(raw) {
        let rest = &raw[m.end()..];
        if rest.is_empty() || rest.starts_with('/') {
            return rest.to_string();
        }
    }
    raw.to_string()
}
