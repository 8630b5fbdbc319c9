//! Per-folder `.feature` documents with scenario-level deduplication.
//!
//! Documents are append-only: a block is written once and never rewritten. The
//! set of seen keys is rebuilt from the file at open time, so a second run over
//! the same collection appends nothing.

use super::assertions::Assertion;
use super::auth::ResolvedAuth;
use super::feature_reader::existing_keys;
use super::request::NormalizedRequest;
use crate::collection::HttpMethod;
use crate::core::error::ConvertError;
use crate::core::json::{cell_text, JsonMap};
use crate::core::paths::ROOT_FOLDER;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER_PREFIX: &str = "header:";
pub const BODY_PREFIX: &str = "body:";
pub const MATCH_STEP: &str = "Then the response should match";
const FEATURE_EXTENSION: &str = "feature";

pub type Row = (String, String);

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub display_name: String,
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub auth: Option<ResolvedAuth>,
    pub body: JsonMap,
    pub assertions: Vec<Assertion>,
}

impl Scenario {
    pub fn new(
        display_name: impl Into<String>,
        request: NormalizedRequest,
        auth: Option<ResolvedAuth>,
        assertions: Vec<Assertion>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            method: request.method,
            path: request.path,
            headers: request.headers,
            auth,
            body: request.body,
            assertions,
        }
    }

    pub fn header_rows(&self) -> Vec<Row> {
        self.headers
            .iter()
            .map(|(k, v)| (format!("{HEADER_PREFIX}{k}"), v.clone()))
            .collect()
    }

    pub fn body_rows(&self) -> Vec<Row> {
        self.body
            .iter()
            .map(|(k, v)| (format!("{BODY_PREFIX}{k}"), cell_text(v)))
            .collect()
    }

    pub fn assertion_rows(&self) -> Vec<Row> {
        self.assertions
            .iter()
            .map(|a| (a.key.clone(), a.value.clone()))
            .collect()
    }

    pub fn key(&self) -> ScenarioKey {
        ScenarioKey::new(
            self.method.as_str(),
            &single_line(&self.path),
            &self.header_rows(),
            &self.body_rows(),
            &self.assertion_rows(),
        )
    }

    pub fn render(&self) -> String {
        let path = single_line(&self.path);
        let mut out = format!("  Scenario: {}\n", single_line(&self.display_name));
        match &self.auth {
            Some(auth) => out.push_str(&format!(
                "    When User \"{}\" send a {} request to \"{path}\" with\n",
                auth.identity, self.method
            )),
            None => out.push_str(&format!(
                "    When I send a {} request to \"{path}\" with\n",
                self.method
            )),
        }
        for (key, value) in self.header_rows().iter().chain(self.body_rows().iter()) {
            out.push_str(&table_row(key, value));
        }
        if !self.assertions.is_empty() {
            out.push_str(&format!("    {MATCH_STEP}\n"));
            for (key, value) in self.assertion_rows() {
                out.push_str(&table_row(&key, &value));
            }
        }
        out.push('\n');
        out
    }
}

/// Deduplication identity of a scenario within one document. Built from the
/// same cell text that is written to disk, serialized as a JSON document so
/// that differently shaped rows cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenarioKey(String);

#[derive(Serialize)]
struct KeyParts<'a> {
    method: &'a str,
    path: &'a str,
    headers: Vec<Row>,
    body: Vec<Row>,
    assertions: Vec<Row>,
}

impl ScenarioKey {
    pub fn new(
        method: &str,
        path: &str,
        headers: &[Row],
        body: &[Row],
        assertions: &[Row],
    ) -> Self {
        let canonical = |rows: &[Row]| -> Vec<Row> {
            rows.iter()
                .map(|(k, v)| (canonical_cell(k), canonical_cell(v)))
                .collect()
        };
        let parts = KeyParts {
            method,
            path,
            headers: canonical(headers),
            body: canonical(body),
            assertions: canonical(assertions),
        };
        // Serializing strings and tuples cannot fail.
        Self(serde_json::to_string(&parts).unwrap_or_default())
    }
}

pub fn escape_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

pub fn unescape_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('|') => out.push('|'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Value a cell reads back as: Gherkin trims the text between pipes.
pub fn canonical_cell(text: &str) -> String {
    unescape_cell(escape_cell(text).trim())
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn table_row(key: &str, value: &str) -> String {
    format!("      | {} | {} |\n", escape_cell(key), escape_cell(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    Duplicate,
}

#[derive(Debug)]
pub struct FeatureDocument {
    folder: String,
    path: PathBuf,
    content: String,
    seen: HashSet<ScenarioKey>,
    appended: usize,
    duplicates: usize,
}

impl FeatureDocument {
    /// Loads `path` if it exists (rebuilding the seen keys from its blocks),
    /// otherwise starts a document titled `title`. Nothing is written here.
    pub fn open(folder: &str, path: PathBuf, title: &str) -> Result<Self, ConvertError> {
        let (content, seen) = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| ConvertError::io(&path, e))?;
            let seen: HashSet<ScenarioKey> = existing_keys(&content).into_iter().collect();
            tracing::debug!(
                path = %path.display(),
                scenarios = seen.len(),
                "existing feature document loaded"
            );
            (content, seen)
        } else {
            (format!("Feature: {title}\n\n"), HashSet::new())
        };

        Ok(Self {
            folder: folder.to_string(),
            path,
            content,
            seen,
            appended: 0,
            duplicates: 0,
        })
    }

    pub fn contains(&self, key: &ScenarioKey) -> bool {
        self.seen.contains(key)
    }

    /// Appends the scenario block and persists the document, unless an
    /// identical scenario is already present.
    pub fn append(&mut self, scenario: &Scenario) -> Result<AppendOutcome, ConvertError> {
        let key = scenario.key();
        if self.contains(&key) {
            self.duplicates += 1;
            tracing::debug!(scenario = %scenario.display_name, folder = %self.folder, "duplicate scenario skipped");
            return Ok(AppendOutcome::Duplicate);
        }

        if !self.content.is_empty() && !self.content.ends_with('\n') {
            self.content.push('\n');
        }
        self.content.push_str(&scenario.render());
        self.persist()?;
        self.seen.insert(key);
        self.appended += 1;
        Ok(AppendOutcome::Appended)
    }

    fn persist(&self) -> Result<(), ConvertError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
        fs::write(&self.path, &self.content).map_err(|e| ConvertError::io(&self.path, e))
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn appended(&self) -> usize {
        self.appended
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// All feature documents of one run, keyed by folder path, in first-use order.
#[derive(Debug)]
pub struct FeatureBook {
    root: PathBuf,
    documents: Vec<FeatureDocument>,
    index: HashMap<String, usize>,
}

impl FeatureBook {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            documents: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// `<root>/<segments...>/<last segment>.feature`; an empty folder path maps
    /// to the root sentinel folder.
    pub fn document_path(&self, segments: &[String]) -> PathBuf {
        let mut path = self.root.clone();
        if segments.is_empty() {
            path.push(ROOT_FOLDER);
        } else {
            for segment in segments {
                path.push(segment);
            }
        }
        let name = segments
            .last()
            .map(String::as_str)
            .unwrap_or(ROOT_FOLDER);
        path.push(format!("{name}.{FEATURE_EXTENSION}"));
        path
    }

    pub fn add(
        &mut self,
        segments: &[String],
        scenario: &Scenario,
    ) -> Result<AppendOutcome, ConvertError> {
        let folder = crate::core::paths::folder_key(segments);
        let position = match self.index.get(&folder) {
            Some(position) => *position,
            None => {
                let title = segments
                    .last()
                    .map(String::as_str)
                    .unwrap_or(ROOT_FOLDER);
                let document =
                    FeatureDocument::open(&folder, self.document_path(segments), title)?;
                self.documents.push(document);
                self.index.insert(folder, self.documents.len() - 1);
                self.documents.len() - 1
            }
        };
        self.documents[position].append(scenario)
    }

    pub fn documents(&self) -> &[FeatureDocument] {
        &self.documents
    }
}
