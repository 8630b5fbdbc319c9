use crate::collection::model::{Auth, BearerSpec};
use crate::collection::placeholder::strip_decoration;
use crate::collection::EnvStore;
use crate::core::error::ConvertError;
use serde_json::Value;
use std::path::PathBuf;

const BEARER: &str = "bearer";
const TOKEN_FIELD: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuth {
    pub identity: String,
    pub credential_value: String,
}

/// Token reference of a bearer auth block: the `token` attribute, else the
/// first attribute. Non-bearer auth types yield `None`.
pub fn bearer_reference(auth: &Auth) -> Option<String> {
    if !auth.auth_type.eq_ignore_ascii_case(BEARER) {
        return None;
    }
    match auth.bearer.as_ref()? {
        BearerSpec::Attributes(attributes) => attributes
            .iter()
            .find(|a| a.key == TOKEN_FIELD)
            .or_else(|| attributes.first())
            .map(|a| value_text(&a.value)),
        BearerSpec::Map(map) => map
            .get(TOKEN_FIELD)
            .or_else(|| map.values().next())
            .map(value_text),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves bearer placeholders against the environment store, reading the
/// store from disk on first use.
pub struct AuthResolver {
    store_path: PathBuf,
    store: Option<EnvStore>,
}

impl AuthResolver {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            store: None,
        }
    }

    pub fn with_store(store: EnvStore) -> Self {
        Self {
            store_path: store.path().to_path_buf(),
            store: Some(store),
        }
    }

    /// The store, if it has been loaded or exists on disk.
    pub fn loaded_store(&mut self) -> Option<&EnvStore> {
        if self.store.is_none() && self.store_path.exists() {
            match EnvStore::load(&self.store_path) {
                Ok(store) => self.store = Some(store),
                Err(e) => tracing::warn!(
                    path = %self.store_path.display(),
                    error = %e,
                    "environment store unreadable, placeholders reported as unresolved"
                ),
            }
        }
        self.store.as_ref()
    }

    fn store(&mut self) -> Result<&EnvStore, ConvertError> {
        if self.store.is_none() {
            let store = EnvStore::load(&self.store_path)?;
            tracing::debug!(
                path = %self.store_path.display(),
                entries = store.entry_count(),
                "environment store loaded"
            );
            self.store = Some(store);
        }
        self.store
            .as_ref()
            .ok_or_else(|| ConvertError::EnvStoreMissing(self.store_path.clone()))
    }

    /// `Ok(None)` for requests without bearer auth; fails when the store is
    /// missing or does not define the referenced identity.
    pub fn resolve(&mut self, auth: Option<&Auth>) -> Result<Option<ResolvedAuth>, ConvertError> {
        let Some(reference) = auth.and_then(bearer_reference) else {
            if let Some(auth) = auth {
                tracing::debug!(auth_type = %auth.auth_type, "auth type not resolved");
            }
            return Ok(None);
        };

        let identity = strip_decoration(&reference);
        let store_path = self.store_path.clone();
        let credential_value =
            self.store()?
                .get(&identity)
                .ok_or_else(|| ConvertError::AuthLookup {
                    identity: identity.clone(),
                    store: store_path,
                })?;

        Ok(Some(ResolvedAuth {
            identity,
            credential_value,
        }))
    }
}
