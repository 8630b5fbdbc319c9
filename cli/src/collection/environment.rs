use crate::core::error::ConvertError;
use crate::core::json::{cell_text, JsonMap};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct EnvironmentDocument {
    #[serde(default)]
    values: Vec<EnvironmentEntry>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentEntry {
    key: String,
    #[serde(default)]
    value: Value,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Flattens an environment document into `key -> value`, skipping disabled
/// entries. Later duplicates win.
pub fn load_environment_document(path: &Path) -> Result<JsonMap, ConvertError> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    let document: EnvironmentDocument =
        serde_json::from_str(&content).map_err(|e| ConvertError::json(path, e))?;

    let mut values = JsonMap::new();
    for entry in document.values.into_iter().filter(|e| e.enabled) {
        values.insert(entry.key, entry.value);
    }
    Ok(values)
}

/// The flat key/value store the runner reads at execution time and the auth
/// resolver reads at conversion time.
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
    values: JsonMap,
}

impl EnvStore {
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        if !path.exists() {
            return Err(ConvertError::EnvStoreMissing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        let values: JsonMap =
            serde_json::from_str(&content).map_err(|e| ConvertError::json(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Writes `values` to `path` as pretty JSON, creating parent directories.
    pub fn materialize(path: &Path, values: JsonMap) -> Result<Self, ConvertError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
        let text = serde_json::to_string_pretty(&values).map_err(|e| ConvertError::json(path, e))?;
        fs::write(path, text).map_err(|e| ConvertError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(cell_text)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn entry_count(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_environment_document_skips_disabled() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let doc = dir.path().join("env.json");
        fs::write(
            &doc,
            r#"{"name": "dev", "values": [
                {"key": "baseUrl", "value": "http://localhost", "enabled": true},
                {"key": "admin_token", "value": "abc"},
                {"key": "old", "value": "x", "enabled": false},
                {"key": "retries", "value": 3}
            ]}"#,
        )?;

        let values = load_environment_document(&doc)?;
        let keys: Vec<&String> = values.keys().collect();
        assert_eq!(keys, vec!["baseUrl", "admin_token", "retries"]);
        Ok(())
    }

    #[test]
    fn test_materialize_then_load_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store_path = dir.path().join("nested").join("cypress.env.json");
        let mut values = JsonMap::new();
        values.insert("admin_token".into(), Value::String("abc".into()));
        values.insert("retries".into(), Value::from(3));

        EnvStore::materialize(&store_path, values)?;
        let written = fs::read_to_string(&store_path)?;
        assert!(written.contains("\n  \"admin_token\": \"abc\""));

        let store = EnvStore::load(&store_path)?;
        assert_eq!(store.get("admin_token").as_deref(), Some("abc"));
        assert_eq!(store.get("retries").as_deref(), Some("3"));
        assert!(!store.contains("missing"));
        assert_eq!(store.entry_count(), 2);
        Ok(())
    }

    #[test]
    fn test_load_missing_store_is_lookup_error() {
        let err = EnvStore::load(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConvertError::EnvStoreMissing(_)));
    }
}
