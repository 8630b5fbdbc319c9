use super::converter_models::{AssertionTally, ConversionSummary, ConvertConfig, FeatureSummary};
use crate::collection::model::{Event, RequestDef};
use crate::collection::{load_environment_document, placeholder, Collection, EnvStore, Item, ItemKind};
use crate::core::error::ConvertError;
use crate::core::json::cell_text;
use crate::core::paths::{clean_path, path_safe_segment};
use crate::scenario::{
    extract_assertions, normalize_request, render_case, request_url, synthesize, write_step_file,
    AppendOutcome, AuthRegistry, AuthResolver, CypressSpecs, FeatureBook, MethodRegistry,
    PathMode, Scenario, SpecBody,
};
use std::fs;
use std::path::Path;

pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<ConversionSummary, ConvertError> {
        self.check_outputs()?;
        let collection = load_collection(&self.config.collection_path)?;
        let items = collection
            .item
            .as_deref()
            .filter(|items| !items.is_empty())
            .ok_or_else(|| {
                ConvertError::InvalidCollection(format!(
                    "{} has no items",
                    clean_path(&self.config.collection_path)
                ))
            })?;
        let collection_name = collection
            .info
            .as_ref()
            .and_then(|info| info.name.clone())
            .unwrap_or_default();
        tracing::info!(collection = %collection_name, items = items.len(), "converting collection");

        let (resolver, env_store) = match &self.config.environment_path {
            Some(document) => {
                let values = load_environment_document(document)?;
                let store = EnvStore::materialize(&self.config.env_store, values)?;
                tracing::info!(path = %store.path().display(), entries = store.entry_count(), "environment store written");
                (AuthResolver::with_store(store), Some(clean_path(&self.config.env_store)))
            }
            None => (AuthResolver::new(&self.config.env_store), None),
        };

        let mut walk = Walk {
            mode: self.config.path_mode,
            book: FeatureBook::new(&self.config.features_dir),
            specs: self.config.cypress_dir.as_ref().map(CypressSpecs::new),
            methods: MethodRegistry::default(),
            auth: AuthRegistry::default(),
            resolver,
            placeholders: Vec::new(),
            requests: 0,
            tally: AssertionTally::default(),
        };
        walk.visit(items, Vec::new())?;

        let source = synthesize(&walk.methods, &walk.auth, self.config.handler_style);
        write_step_file(&self.config.steps_file, &source)?;
        tracing::info!(path = %self.config.steps_file.display(), methods = walk.methods.methods().len(), "step definitions written");

        let cypress_specs = match &walk.specs {
            Some(specs) => {
                let written = specs.write()?;
                tracing::info!(files = written.len(), "cypress specs written");
                written.iter().map(|path| clean_path(path)).collect()
            }
            None => Vec::new(),
        };

        let unresolved = walk.unresolved_placeholders();
        let features = walk
            .book
            .documents()
            .iter()
            .map(|doc| FeatureSummary {
                folder: doc.folder().to_string(),
                file: clean_path(doc.path()),
                appended: doc.appended(),
                skipped: doc.duplicates(),
            })
            .collect();

        Ok(ConversionSummary {
            collection: collection_name,
            requests: walk.requests,
            assertions: walk.tally.clone(),
            features,
            methods: walk.methods.methods().iter().map(|m| m.to_string()).collect(),
            identities: walk.auth.identities().to_vec(),
            steps_file: clean_path(&self.config.steps_file),
            env_store,
            cypress_specs,
            unresolved_placeholders: unresolved,
        })
    }

    fn check_outputs(&self) -> Result<(), ConvertError> {
        for dir in std::iter::once(&self.config.features_dir).chain(self.config.cypress_dir.as_ref()) {
            if dir.exists() && !dir.is_dir() {
                return Err(ConvertError::Validation(format!(
                    "output directory {} is not a directory",
                    clean_path(dir)
                )));
            }
        }
        for file in [&self.config.steps_file, &self.config.env_store] {
            if file.is_dir() {
                return Err(ConvertError::Validation(format!(
                    "{} is a directory, expected a file path",
                    clean_path(file)
                )));
            }
        }
        Ok(())
    }
}

fn load_collection(path: &Path) -> Result<Collection, ConvertError> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| ConvertError::json(path, e))
}

/// State threaded through one depth-first pass over the collection tree.
struct Walk {
    mode: PathMode,
    book: FeatureBook,
    specs: Option<CypressSpecs>,
    methods: MethodRegistry,
    auth: AuthRegistry,
    resolver: AuthResolver,
    placeholders: Vec<String>,
    requests: usize,
    tally: AssertionTally,
}

impl Walk {
    fn visit(&mut self, items: &[Item], folder: Vec<String>) -> Result<(), ConvertError> {
        for item in items {
            match item.kind() {
                ItemKind::Folder { name, children } => {
                    let mut nested = folder.clone();
                    nested.push(path_safe_segment(name));
                    self.visit(children, nested)?;
                }
                ItemKind::Request {
                    name,
                    request,
                    events,
                } => self.convert_request(&folder, name, request, events)?,
                ItemKind::Unknown => {
                    tracing::debug!(name = %item.name, "item is neither folder nor request, skipped");
                }
            }
        }
        Ok(())
    }

    fn convert_request(
        &mut self,
        folder: &[String],
        name: &str,
        request: &RequestDef,
        events: &[Event],
    ) -> Result<(), ConvertError> {
        let normalized = normalize_request(request, self.mode);
        let auth = self.resolver.resolve(request.auth.as_ref())?;
        if let Some(auth) = auth.as_ref().filter(|a| a.credential_value.trim().is_empty()) {
            tracing::warn!(identity = %auth.identity, request = %name, "credential is empty in the environment store");
        }
        let assertions = extract_assertions(events);
        for assertion in &assertions {
            self.tally.record(assertion.kind);
        }

        self.note_placeholders(&normalized.path);
        for (_, value) in &normalized.headers {
            self.note_placeholders(value);
        }
        for value in normalized.body.values() {
            self.note_placeholders(&cell_text(value));
        }

        self.methods.record(&normalized.method);
        self.auth.record(auth.as_ref().map(|a| a.identity.as_str()));
        self.requests += 1;

        let scenario = Scenario::new(name, normalized, auth, assertions);
        if let Some(specs) = self.specs.as_mut() {
            let body = SpecBody::from_request(request.body.as_ref(), &scenario.body);
            let url = request_url(request, &scenario.path);
            specs.add(folder, render_case(&scenario, &url, &body));
        }
        let outcome = self.book.add(folder, &scenario)?;
        tracing::debug!(
            request = %name,
            method = %scenario.method,
            path = %scenario.path,
            appended = outcome == AppendOutcome::Appended,
            "request converted"
        );
        Ok(())
    }

    fn note_placeholders(&mut self, text: &str) {
        for name in placeholder::names(text) {
            if !self.placeholders.contains(&name) {
                self.placeholders.push(name);
            }
        }
    }

    fn unresolved_placeholders(&mut self) -> Vec<String> {
        let placeholders = std::mem::take(&mut self.placeholders);
        match self.resolver.loaded_store() {
            Some(store) => placeholders
                .into_iter()
                .filter(|name| !store.contains(name))
                .collect(),
            None => placeholders,
        }
    }
}
