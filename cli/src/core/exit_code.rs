use crate::core::error::ConvertError;

/// Exit codes for the pmcuke CLI
/// Following standard Unix/POSIX conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Configuration error (collection shape, validation)
    ConfigError = 3,
    /// File not found, IO or malformed JSON
    FileError = 4,
    /// Environment store or auth identity lookup failed
    LookupError = 5,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<&ConvertError> for ExitCode {
    fn from(error: &ConvertError) -> Self {
        match error {
            ConvertError::Io { .. } => ExitCode::FileError,
            ConvertError::Json { .. } => ExitCode::FileError,
            ConvertError::InvalidCollection(_) => ExitCode::ConfigError,
            ConvertError::Validation(_) => ExitCode::ConfigError,
            ConvertError::EnvStoreMissing(_) => ExitCode::LookupError,
            ConvertError::AuthLookup { .. } => ExitCode::LookupError,
        }
    }
}
