//! Configuration errors and shape validation.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration result type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Ignore-config loading errors.
///
/// A missing file and a file that is not JSON are deliberately separate
/// variants with separate codes.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ignore config not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("parse error in {source_name}: {message}")]
    Malformed {
        source_name: String,
        message: String,
    },

    #[error("invalid value for {field}: {message}")]
    InvalidShape { field: String, message: String },

    #[error("I/O error reading {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl ConfigError {
    /// Error code for structured error reporting. Matches `pd_common::Error::code`.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::Missing { .. } => 10,
            ConfigError::Malformed { .. } => 11,
            ConfigError::InvalidShape { .. } => 12,
            ConfigError::Io { .. } => 60,
        }
    }

    pub(crate) fn shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidShape {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for pd_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { path } => pd_common::Error::IgnoreConfigMissing { path },
            ConfigError::Malformed {
                source_name,
                message,
            } => pd_common::Error::IgnoreConfigMalformed {
                path: source_name,
                message,
            },
            ConfigError::InvalidShape { field, message } => {
                pd_common::Error::IgnoreConfigInvalid(format!("{}: {}", field, message))
            }
            ConfigError::Io { path, message } => pd_common::Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{}: {}", path.display(), message),
            )),
        }
    }
}

/// Validate one ignore name. Names are attribute names or dot-paths.
pub fn validate_rule_name(field: &str, name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::shape(field, "ignore names must be non-empty"));
    }
    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return Err(ConfigError::shape(
            field,
            format!("'{}' is not a valid dot-path", name),
        ));
    }
    Ok(())
}
