//! Ignore-config path discovery.
//!
//! Resolution order: explicit path → environment variables → XDG config → none.

use crate::ignore::IgnoreRuleSet;
use crate::validate::ConfigResult;
use std::path::{Path, PathBuf};

/// Where the ignore config was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided by the caller.
    Explicit,

    /// Set via environment variable.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// No config file; the empty rule set applies.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit path"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_IGNORE_CONFIG: &str = "PLANDIFF_IGNORE_CONFIG";
pub const ENV_CONFIG_DIR: &str = "PLANDIFF_CONFIG_DIR";

/// Standard config file name.
pub const IGNORE_FILENAME: &str = "ignore.json";

/// Application name for XDG directories.
const APP_NAME: &str = "plandiff";

/// Resolved ignore-config location.
#[derive(Debug, Clone, Default)]
pub struct IgnoreConfigPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve the ignore-config path.
///
/// 1. Explicit path (returned even if it does not exist, so loading reports it missing)
/// 2. `PLANDIFF_IGNORE_CONFIG`
/// 3. `PLANDIFF_CONFIG_DIR` + `ignore.json`
/// 4. XDG config directory (`~/.config/plandiff/ignore.json`)
/// 5. None
pub fn resolve_ignore_config(explicit: Option<&Path>) -> IgnoreConfigPath {
    if let Some(path) = explicit {
        return IgnoreConfigPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::Explicit,
        };
    }

    if let Ok(env_path) = std::env::var(ENV_IGNORE_CONFIG) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return IgnoreConfigPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(IGNORE_FILENAME);
        if path.exists() {
            return IgnoreConfigPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(IGNORE_FILENAME);
        if path.exists() {
            return IgnoreConfigPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    IgnoreConfigPath::default()
}

/// Resolve and load the ignore rules.
pub fn load_ignore_rules(explicit: Option<&Path>) -> ConfigResult<(IgnoreRuleSet, ConfigSource)> {
    let resolved = resolve_ignore_config(explicit);
    match resolved.path {
        Some(path) => {
            let rules = IgnoreRuleSet::from_file(&path)?;
            tracing::info!(
                path = %path.display(),
                source = %resolved.source,
                rules = rules.len(),
                "ignore config loaded"
            );
            Ok((rules, resolved.source))
        }
        None => Ok((IgnoreRuleSet::empty(), ConfigSource::BuiltinDefault)),
    }
}

/// The XDG config directory for plandiff.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Explicit), "explicit path");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::BuiltinDefault), "builtin default");
    }

    #[test]
    fn test_explicit_path_wins_even_if_missing() {
        let resolved = resolve_ignore_config(Some(Path::new("/definitely/not/here.json")));
        assert_eq!(resolved.source, ConfigSource::Explicit);
        assert_eq!(
            resolved.path.as_deref(),
            Some(Path::new("/definitely/not/here.json"))
        );
    }

    #[test]
    fn test_explicit_missing_path_fails_to_load() {
        let err = load_ignore_rules(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert_eq!(err.code(), 10);
    }
}
