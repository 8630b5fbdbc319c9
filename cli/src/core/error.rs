use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error on {}: {source}", crate::core::paths::clean_path(.path))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON in {}: {source}", crate::core::paths::clean_path(.path))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid collection: {0}")]
    InvalidCollection(String),

    #[error(
        "Environment store not found: {} (pass an environment document or create it first)",
        crate::core::paths::clean_path(.0)
    )]
    EnvStoreMissing(PathBuf),

    #[error("Auth lookup failed: '{identity}' is not defined in {}", crate::core::paths::clean_path(.store))]
    AuthLookup { identity: String, store: PathBuf },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ConvertError::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_lookup_message_names_identity() {
        let err = ConvertError::AuthLookup {
            identity: "admin_token".to_string(),
            store: PathBuf::from("cypress.env.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("admin_token"));
        assert!(msg.contains("cypress.env.json"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = ConvertError::io(
            "missing.json",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("IO error on missing.json"));
    }
}
