//! Cypress step definitions matching the phrasing of the generated features.

use super::registry::{AuthRegistry, MethodRegistry};
use crate::core::error::ConvertError;
use crate::core::version::generated_banner;
use clap::ValueEnum;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HandlerStyle {
    /// One handler per method, identity passed as a step parameter
    #[default]
    Generic,
    /// One handler per method and identity, identity baked into the step text
    PerIdentity,
}

const PRELUDE: &str = r#"import { When, Then } from '@badeball/cypress-cucumber-preprocessor';

const PLACEHOLDER = /\{\{\s*([^{}]+?)\s*\}\}/g;

const resolvePlaceholders = (value) => {
  if (typeof value !== 'string') {
    return value;
  }
  return value.replace(PLACEHOLDER, (match, name) => {
    const resolved = Cypress.env(name);
    return resolved === undefined ? match : String(resolved);
  });
};

const parseValue = (value) => {
  const text = resolvePlaceholders(value);
  try {
    return JSON.parse(text);
  } catch (e) {
    return text;
  }
};

const buildRequest = (dataTable) => {
  const headers = {};
  const body = {};
  const rows = dataTable ? dataTable.raw() : [];
  rows.forEach(([key, value]) => {
    const lower = key.toLowerCase();
    if (lower.startsWith('header:')) {
      headers[key.slice('header:'.length)] = resolvePlaceholders(value);
    } else if (lower.startsWith('body:')) {
      body[key.slice('body:'.length)] = parseValue(value);
    }
  });
  return { headers, body };
};

const ABSOLUTE_URL = /^[a-z][a-z0-9+.-]*:\/\//i;

const resolveUrl = (endpoint) => {
  const path = resolvePlaceholders(endpoint);
  if (ABSOLUTE_URL.test(path)) {
    return path;
  }
  const baseUrl = String(Cypress.env('baseUrl') || '').replace(/\/+$/, '');
  return `${baseUrl}/${path.replace(/^\/+/, '')}`;
};

const sendRequest = (method, bearer, endpoint, dataTable) => {
  const { headers, body } = buildRequest(dataTable);
  if (bearer) {
    headers.Authorization = `Bearer ${bearer}`;
  }
  return cy
    .request({
      method,
      url: resolveUrl(endpoint),
      headers,
      body: Object.keys(body).length > 0 ? body : undefined,
      failOnStatusCode: false,
    })
    .then((response) => {
      Cypress.env('lastResponse', response);
    });
};
"#;

const MATCH_HANDLER: &str = r#"Then('the response should match', (dataTable) => {
  cy.wrap(null).then(() => {
    const response = Cypress.env('lastResponse');
    dataTable.raw().forEach(([key, expected]) => {
      if (key === 'status') {
        const codes = expected.split(',').map((code) => Number(code.trim()));
        expect(response.status).to.be.oneOf(codes);
        return;
      }
      const actual = key
        .split('.')
        .reduce((value, part) => (value === undefined || value === null ? undefined : value[part]), response.body);
      const wanted = expected.trim() !== '' && !isNaN(expected) ? Number(expected) : expected;
      expect(actual).to.eql(wanted);
    });
  });
});
"#;

/// Renders the whole step-definition module. Output depends only on the
/// registries and the style, so unchanged input regenerates identical text.
pub fn synthesize(methods: &MethodRegistry, auth: &AuthRegistry, style: HandlerStyle) -> String {
    let mut out = format!("{}\n{PRELUDE}", generated_banner());

    for method in methods.methods() {
        let method_text = escape_step_text(method.as_str());
        let method_literal = js_string(method.as_str());

        if auth.has_identities() {
            match style {
                HandlerStyle::Generic => out.push_str(&format!(
                    "\nWhen('User {{string}} send a {method_text} request to {{string}} with', (user, endpoint, dataTable) =>\n  sendRequest('{method_literal}', Cypress.env(user), endpoint, dataTable));\n"
                )),
                HandlerStyle::PerIdentity => {
                    for identity in auth.identities() {
                        out.push_str(&format!(
                            "\nWhen('User \"{}\" send a {method_text} request to {{string}} with', (endpoint, dataTable) =>\n  sendRequest('{method_literal}', Cypress.env('{}'), endpoint, dataTable));\n",
                            escape_step_text(identity),
                            js_string(identity),
                        ));
                    }
                }
            }
        }

        if auth.has_anonymous() {
            out.push_str(&format!(
                "\nWhen('I send a {method_text} request to {{string}} with', (endpoint, dataTable) =>\n  sendRequest('{method_literal}', null, endpoint, dataTable));\n"
            ));
        }
    }

    out.push('\n');
    out.push_str(MATCH_HANDLER);
    out
}

/// Step text is a cucumber expression inside a single-quoted JS string.
fn escape_step_text(text: &str) -> String {
    let mut expression = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '(' | ')' | '{' | '}' | '/') {
            expression.push('\\');
        }
        expression.push(ch);
    }
    js_string(&expression)
}

/// Body of a single-quoted JS string literal.
pub(crate) fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Overwrites the step-definition file, creating parent directories.
pub fn write_step_file(path: &Path, source: &str) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }
    fs::write(path, source).map_err(|e| ConvertError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::HttpMethod;

    fn registries(methods: &[HttpMethod], identities: &[Option<&str>]) -> (MethodRegistry, AuthRegistry) {
        let mut m = MethodRegistry::default();
        for method in methods {
            m.record(method);
        }
        let mut a = AuthRegistry::default();
        for identity in identities {
            a.record(*identity);
        }
        (m, a)
    }

    #[test]
    fn test_generic_style_one_handler_per_method() {
        let (m, a) = registries(
            &[HttpMethod::GET, HttpMethod::POST],
            &[Some("admin"), Some("guest")],
        );
        let js = synthesize(&m, &a, HandlerStyle::Generic);
        assert_eq!(js.matches("When('User {string} send a GET request to {string} with'").count(), 1);
        assert_eq!(js.matches("When('User {string} send a POST request to {string} with'").count(), 1);
        assert!(!js.contains("When('I send a"));
        assert_eq!(js.matches("Then('the response should match'").count(), 1);
        assert!(js.starts_with("// Generated by pmcuke"));
    }

    #[test]
    fn test_per_identity_style_bakes_identity() {
        let (m, a) = registries(&[HttpMethod::GET], &[Some("admin"), Some("svc(x)"), None]);
        let js = synthesize(&m, &a, HandlerStyle::PerIdentity);
        assert!(js.contains("When('User \"admin\" send a GET request to {string} with', (endpoint, dataTable) =>"));
        assert!(js.contains("Cypress.env('admin')"));
        assert!(js.contains(r#"When('User "svc\\(x\\)" send a GET request to {string} with'"#));
        assert!(js.contains("Cypress.env('svc(x)')"));
        assert!(js.contains("When('I send a GET request to {string} with'"));
        assert!(!js.contains("User {string}"));
    }

    #[test]
    fn test_anonymous_only_run() {
        let (m, a) = registries(&[HttpMethod::DELETE], &[None]);
        let js = synthesize(&m, &a, HandlerStyle::Generic);
        assert!(js.contains("When('I send a DELETE request to {string} with', (endpoint, dataTable) =>\n  sendRequest('DELETE', null, endpoint, dataTable));"));
        assert!(!js.contains("User {string}"));
    }

    #[test]
    fn test_relative_endpoints_are_prefixed_with_base_url() {
        let (m, a) = registries(&[HttpMethod::GET], &[None]);
        let js = synthesize(&m, &a, HandlerStyle::Generic);
        assert!(js.contains("url: resolveUrl(endpoint),"));
        assert!(!js.contains("url: resolvePlaceholders(endpoint)"));
        assert!(js.contains("Cypress.env('baseUrl')"));
        assert!(js.contains("return `${baseUrl}/${path.replace(/^\\/+/, '')}`;"));
        assert!(js.contains("if (ABSOLUTE_URL.test(path)) {\n    return path;\n  }"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let (m, a) = registries(&[HttpMethod::PUT], &[Some("o'brien")]);
        let first = synthesize(&m, &a, HandlerStyle::PerIdentity);
        assert_eq!(first, synthesize(&m, &a, HandlerStyle::PerIdentity));
        assert!(first.contains("Cypress.env('o\\'brien')"));
    }

    #[test]
    fn test_write_step_file_creates_parents() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cypress/e2e/steps.js");
        write_step_file(&path, "// steps\n")?;
        assert_eq!(fs::read_to_string(path)?, "// steps\n");
        Ok(())
    }
}
