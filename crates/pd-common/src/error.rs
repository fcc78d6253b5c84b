//! Error types for plandiff.
//!
//! Every fatal condition the comparison engine can hit is a variant of
//! [`Error`], with:
//! - a stable numeric code for machine parsing
//! - a category for grouping
//! - a recoverability hint
//! - a human headline and remediation
//!
//! Partial failures (a resource with an unexpected shape, a sensitive value
//! that cannot be obfuscated) are not errors; the comparator records them as
//! warnings and keeps going.
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Ignore Config Missing
//!   Reason: ignore config not found: /etc/plandiff/ignore.json
//!   Fix: Check the path passed for the ignore config, or omit it to compare without ignore rules.
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plandiff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Ignore-rule configuration errors.
    Config,
    /// Caller-supplied snapshot errors.
    Input,
    /// Salt store and obfuscation errors.
    Obfuscation,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Obfuscation => write!(f, "obfuscation"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for plandiff.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("ignore config not found: {}", path.display())]
    IgnoreConfigMissing { path: PathBuf },

    #[error("ignore config is not valid JSON ({path}): {message}")]
    IgnoreConfigMalformed { path: String, message: String },

    #[error("ignore config has an invalid shape: {0}")]
    IgnoreConfigInvalid(String),

    // Input errors (20-29)
    #[error("at least 2 environments are required for comparison, got {supplied}")]
    InsufficientEnvironments { supplied: usize },

    #[error("environment label '{label}' was supplied more than once")]
    DuplicateEnvironment { label: String },

    // Obfuscation errors (30-39)
    #[error("salt store not found: {}", path.display())]
    SaltStoreMissing { path: PathBuf },

    #[error("salt store is corrupt: {0}")]
    SaltStoreCorrupt(String),

    #[error("salt key error: {0}")]
    SaltKey(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Obfuscation errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::IgnoreConfigMissing { .. } => 10,
            Error::IgnoreConfigMalformed { .. } => 11,
            Error::IgnoreConfigInvalid(_) => 12,
            Error::InsufficientEnvironments { .. } => 20,
            Error::DuplicateEnvironment { .. } => 21,
            Error::SaltStoreMissing { .. } => 30,
            Error::SaltStoreCorrupt(_) => 31,
            Error::SaltKey(_) => 32,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::IgnoreConfigMissing { .. }
            | Error::IgnoreConfigMalformed { .. }
            | Error::IgnoreConfigInvalid(_) => ErrorCategory::Config,

            Error::InsufficientEnvironments { .. } | Error::DuplicateEnvironment { .. } => {
                ErrorCategory::Input
            }

            Error::SaltStoreMissing { .. } | Error::SaltStoreCorrupt(_) | Error::SaltKey(_) => {
                ErrorCategory::Obfuscation
            }

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Obfuscation errors only block the sensitive-value path; a caller can
    /// retry the comparison with sensitive values masked by placeholder.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::IgnoreConfigMissing { .. } => true,
            Error::IgnoreConfigMalformed { .. } => true,
            Error::IgnoreConfigInvalid(_) => true,

            Error::InsufficientEnvironments { .. } => false,
            Error::DuplicateEnvironment { .. } => false,

            Error::SaltStoreMissing { .. } => true,
            Error::SaltStoreCorrupt(_) => true,
            Error::SaltKey(_) => false,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::IgnoreConfigMissing { .. } => {
                "Check the path passed for the ignore config, or omit it to compare without ignore rules."
            }
            Error::IgnoreConfigMalformed { .. } => {
                "Fix the JSON syntax in the ignore config. Validate with 'jq . <file>'."
            }
            Error::IgnoreConfigInvalid(_) => {
                "global_ignores must be an array or object of names; resource_ignores must map resource types to the same."
            }

            Error::InsufficientEnvironments { .. } => {
                "Supply at least two environment plans. The first one is used as the baseline."
            }
            Error::DuplicateEnvironment { .. } => {
                "Give every environment a distinct label."
            }

            Error::SaltStoreMissing { .. } => {
                "Create a salt store first, or run without obfuscation so sensitive values stay masked."
            }
            Error::SaltStoreCorrupt(_) => {
                "The salt store cannot be decrypted with this key. Restore it from backup or regenerate it (digests will change)."
            }
            Error::SaltKey(_) => {
                "The salt key file must contain 32 base64-encoded bytes."
            }

            Error::Io(_) => "Check file permissions and that the directories exist. Retry the operation.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::IgnoreConfigMissing { .. } => "Ignore Config Missing",
            Error::IgnoreConfigMalformed { .. } => "Ignore Config Malformed",
            Error::IgnoreConfigInvalid(_) => "Ignore Config Invalid",
            Error::InsufficientEnvironments { .. } => "Not Enough Environments",
            Error::DuplicateEnvironment { .. } => "Duplicate Environment",
            Error::SaltStoreMissing { .. } => "Salt Store Missing",
            Error::SaltStoreCorrupt(_) => "Salt Store Corrupt",
            Error::SaltKey(_) => "Salt Key Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., file path, label).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::IgnoreConfigMissing { path } | Error::SaltStoreMissing { path } => {
                context.insert(
                    "path".to_string(),
                    serde_json::json!(path.display().to_string()),
                );
            }
            Error::IgnoreConfigMalformed { path, .. } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::InsufficientEnvironments { supplied } => {
                context.insert("supplied".to_string(), serde_json::json!(supplied));
            }
            Error::DuplicateEnvironment { label } => {
                context.insert("label".to_string(), serde_json::json!(label));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_malformed_have_distinct_codes() {
        let missing = Error::IgnoreConfigMissing {
            path: PathBuf::from("/nope/ignore.json"),
        };
        let malformed = Error::IgnoreConfigMalformed {
            path: "ignore.json".into(),
            message: "EOF while parsing".into(),
        };
        assert_eq!(missing.code(), 10);
        assert_eq!(malformed.code(), 11);
        assert_eq!(missing.category(), ErrorCategory::Config);
        assert_eq!(malformed.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::InsufficientEnvironments { supplied: 1 }.category(),
            ErrorCategory::Input
        );
        assert_eq!(
            Error::SaltStoreCorrupt("bad tag".into()).category(),
            ErrorCategory::Obfuscation
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(!Error::InsufficientEnvironments { supplied: 0 }.is_recoverable());
        assert!(Error::SaltStoreMissing {
            path: PathBuf::from("salt.json")
        }
        .is_recoverable());
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::DuplicateEnvironment {
            label: "prod".into(),
        };
        let structured = StructuredError::from(&err);
        let json = structured.to_json();

        assert!(json.contains(r#""code":21"#));
        assert!(json.contains(r#""category":"input""#));
        assert!(json.contains(r#""recoverable":false"#));
        assert_eq!(structured.context.get("label"), Some(&serde_json::json!("prod")));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::InsufficientEnvironments { supplied: 1 };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Not Enough Environments"));
        assert!(formatted.contains("got 1"));
        assert!(formatted.contains("baseline"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Config.to_string(), "config");
        assert_eq!(ErrorCategory::Obfuscation.to_string(), "obfuscation");
    }
}
