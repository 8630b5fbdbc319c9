//! Plain Cypress specs: one `.cy.js` file per folder, one `it` per request.
//!
//! Unlike the feature documents these files are regenerated on every run.
//! Placeholders become `Cypress.env` lookups inside template literals.

use super::assertions::{AssertionKind, STATUS_KEY};
use super::feature::Scenario;
use super::handlers::js_string;
use crate::collection::model::{Body, RequestDef};
use crate::collection::placeholder;
use crate::core::error::ConvertError;
use crate::core::json::{parse_object, JsonMap};
use crate::core::paths::safe_name;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SPEC_EXTENSION: &str = "cy.js";
const ROOT_SPEC: &str = "root_requests";
const ROOT_TITLE: &str = "Root Requests";
const DEFAULT_STATUS: &str = "200";
const BASE_URL: &str = "{{baseUrl}}";

/// What goes into the `body` option of `cy.request`.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecBody {
    Empty,
    Fields(JsonMap),
    Text(String),
}

impl SpecBody {
    /// Raw text that is not a JSON object is sent as-is rather than under `raw`.
    pub fn from_request(body: Option<&Body>, fields: &JsonMap) -> Self {
        if let Some(body) = body {
            let raw_mode = matches!(body.mode.as_deref(), None | Some("raw"));
            if let Some(raw) = body.raw.as_deref().filter(|r| raw_mode && !r.trim().is_empty()) {
                if parse_object(raw).is_none() {
                    return SpecBody::Text(raw.to_string());
                }
            }
        }
        if fields.is_empty() {
            SpecBody::Empty
        } else {
            SpecBody::Fields(fields.clone())
        }
    }
}

/// The request url as written in the collection, or the base-url placeholder
/// joined with the normalized path when the collection has no raw url.
pub fn request_url(request: &RequestDef, path: &str) -> String {
    request
        .url
        .as_ref()
        .and_then(|url| url.raw())
        .filter(|raw| !raw.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{BASE_URL}/{}", path.trim_start_matches('/')))
}

/// JS template literal for `text` with every `{{name}}` read from `Cypress.env`.
pub fn template_literal(text: &str) -> String {
    let body = placeholder::rewrite(
        text,
        |literal| {
            literal
                .replace('\\', "\\\\")
                .replace('`', "\\`")
                .replace("${", "\\${")
        },
        |name| format!("${{Cypress.env('{}')}}", js_string(name)),
    );
    format!("`{body}`")
}

fn field_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => template_literal(s),
        other => other.to_string(),
    }
}

fn quoted_key(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}

fn status_literal(value: &str) -> String {
    let value = value.trim();
    match value.parse::<u16>() {
        Ok(code) => code.to_string(),
        Err(_) => format!("'{}'", js_string(value)),
    }
}

fn status_checks(scenario: &Scenario) -> Vec<String> {
    let checks: Vec<String> = scenario
        .assertions
        .iter()
        .filter(|a| a.key == STATUS_KEY)
        .map(|a| match a.kind {
            AssertionKind::Membership => {
                let codes: Vec<String> = a.value.split(',').map(status_literal).collect();
                format!("expect(response.status).to.be.oneOf([{}]);", codes.join(", "))
            }
            _ => format!("expect(response.status).to.eq({});", status_literal(&a.value)),
        })
        .collect();
    if checks.is_empty() {
        vec![format!("expect(response.status).to.eq({DEFAULT_STATUS});")]
    } else {
        checks
    }
}

/// One `it` block replaying the request and checking its status.
pub fn render_case(scenario: &Scenario, url: &str, body: &SpecBody) -> String {
    let mut out = format!("  it('{}', () => {{\n", js_string(&safe_name(&scenario.display_name)));
    out.push_str("    cy.request({\n");
    out.push_str(&format!("      method: '{}',\n", js_string(scenario.method.as_str())));
    out.push_str(&format!("      url: {},\n", template_literal(url)));

    let mut headers: Vec<(String, String)> = Vec::new();
    if let Some(auth) = &scenario.auth {
        headers.push((
            "Authorization".to_string(),
            format!("`Bearer ${{Cypress.env('{}')}}`", js_string(&auth.identity)),
        ));
    }
    for (key, value) in &scenario.headers {
        headers.push((key.clone(), template_literal(value)));
    }
    if !headers.is_empty() {
        out.push_str("      headers: {\n");
        for (key, value) in &headers {
            out.push_str(&format!("        {}: {value},\n", quoted_key(key)));
        }
        out.push_str("      },\n");
    }

    match body {
        SpecBody::Empty => {}
        SpecBody::Text(text) => out.push_str(&format!("      body: {},\n", template_literal(text))),
        SpecBody::Fields(fields) => {
            out.push_str("      body: {\n");
            for (key, value) in fields {
                out.push_str(&format!("        {}: {},\n", quoted_key(key), field_value(value)));
            }
            out.push_str("      },\n");
        }
    }

    out.push_str("      failOnStatusCode: false,\n");
    out.push_str("    }).then((response) => {\n");
    for check in status_checks(scenario) {
        out.push_str(&format!("      {check}\n"));
    }
    out.push_str("    });\n");
    out.push_str("  });\n");
    out
}

struct Suite {
    folder: Vec<String>,
    cases: Vec<String>,
}

/// Cypress spec files keyed by folder, in first-seen order.
pub struct CypressSpecs {
    root: PathBuf,
    suites: Vec<Suite>,
    index: HashMap<Vec<String>, usize>,
}

impl CypressSpecs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            suites: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// `<root>/<safe folders>/<safe last>.cy.js`, or `<root>/root_requests.cy.js`
    /// for top-level requests.
    pub fn suite_path(&self, folder: &[String]) -> PathBuf {
        let mut path = self.root.clone();
        let file_stem = match folder.last() {
            Some(last) => {
                for segment in folder {
                    path.push(safe_name(segment));
                }
                safe_name(last)
            }
            None => ROOT_SPEC.to_string(),
        };
        path.push(format!("{file_stem}.{SPEC_EXTENSION}"));
        path
    }

    pub fn add(&mut self, folder: &[String], case: String) {
        let position = match self.index.get(folder) {
            Some(position) => *position,
            None => {
                self.suites.push(Suite {
                    folder: folder.to_vec(),
                    cases: Vec::new(),
                });
                self.index.insert(folder.to_vec(), self.suites.len() - 1);
                self.suites.len() - 1
            }
        };
        self.suites[position].cases.push(case);
    }

    /// Writes every suite, overwriting earlier output, and returns the paths.
    pub fn write(&self) -> Result<Vec<PathBuf>, ConvertError> {
        let mut written = Vec::with_capacity(self.suites.len());
        for suite in &self.suites {
            let path = self.suite_path(&suite.folder);
            let title = suite.folder.last().map(String::as_str).unwrap_or(ROOT_TITLE);
            write_file(&path, &render_suite(title, &suite.cases))?;
            tracing::debug!(path = %path.display(), cases = suite.cases.len(), "cypress spec written");
            written.push(path);
        }
        Ok(written)
    }
}

fn render_suite(title: &str, cases: &[String]) -> String {
    let mut out = format!(
        "/// <reference types=\"cypress\" />\n\ndescribe('{}', () => {{\n",
        js_string(title)
    );
    for case in cases {
        out.push_str(case);
    }
    out.push_str("});\n");
    out
}

fn write_file(path: &Path, content: &str) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| ConvertError::io(path, e))
}
