//! Ignore rules: attribute names excluded from comparison and display.
//!
//! File shape:
//!
//! ```json
//! {
//!   "global_ignores": {"tags": "varies per environment", "tags_all": null},
//!   "resource_ignores": {
//!     "azurerm_app_service": ["app_settings.WEBSITE_RUN_FROM_PACKAGE"]
//!   }
//! }
//! ```
//!
//! Either list form (array of names) or map form (name to reason) is accepted
//! wherever a set of names is expected.

use crate::validate::{validate_rule_name, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;

/// Names mapped to an optional human reason.
type NamedRules = BTreeMap<String, Option<String>>;

/// The ignore file as written on disk.
#[derive(Debug, Default, Deserialize)]
struct IgnoreFile {
    #[serde(default)]
    global_ignores: Option<RuleNames>,
    #[serde(default)]
    resource_ignores: Option<BTreeMap<String, Option<RuleNames>>>,
}

/// List form or map form of a set of names.
#[derive(Debug, Deserialize)]
#[serde(untagged, expecting = "a list of names or a map of name to reason")]
enum RuleNames {
    List(Vec<String>),
    Map(BTreeMap<String, Option<String>>),
}

impl RuleNames {
    fn into_named(self, field: &str) -> ConfigResult<NamedRules> {
        let rules: NamedRules = match self {
            RuleNames::List(names) => names.into_iter().map(|name| (name, None)).collect(),
            RuleNames::Map(map) => map,
        };
        for name in rules.keys() {
            validate_rule_name(field, name)?;
        }
        Ok(rules)
    }
}

/// Immutable set of ignore rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IgnoreRuleSet {
    global: NamedRules,
    per_type: BTreeMap<String, NamedRules>,
}

impl IgnoreRuleSet {
    /// A rule set that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> IgnoreRuleSetBuilder {
        IgnoreRuleSetBuilder::default()
    }

    /// Parse from JSON text. `source_name` is only used in error messages.
    ///
    /// Text that is not JSON is `Malformed`; JSON of the wrong shape is
    /// `InvalidShape`.
    pub fn from_json_str(text: &str, source_name: &str) -> ConfigResult<Self> {
        let file: IgnoreFile = serde_json::from_str(text).map_err(|e| match e.classify() {
            Category::Data => ConfigError::shape(source_name, e.to_string()),
            Category::Syntax | Category::Eof | Category::Io => ConfigError::Malformed {
                source_name: source_name.to_string(),
                message: e.to_string(),
            },
        })?;
        Self::from_file_model(file)
    }

    /// Build from an already-parsed JSON document.
    pub fn from_json_value(root: &Value) -> ConfigResult<Self> {
        let file = IgnoreFile::deserialize(root)
            .map_err(|e| ConfigError::shape("<root>", e.to_string()))?;
        Self::from_file_model(file)
    }

    fn from_file_model(file: IgnoreFile) -> ConfigResult<Self> {
        let global = match file.global_ignores {
            Some(names) => names.into_named("global_ignores")?,
            None => NamedRules::new(),
        };

        let mut per_type = BTreeMap::new();
        for (resource_type, names) in file.resource_ignores.unwrap_or_default() {
            let Some(names) = names else { continue };
            let field = format!("resource_ignores.{}", resource_type);
            let parsed = names.into_named(&field)?;
            if !parsed.is_empty() {
                per_type.insert(resource_type, parsed);
            }
        }

        Ok(Self { global, per_type })
    }

    /// Load from a file. A missing file and unparseable JSON are distinct errors.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::Missing {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;
        let rules = Self::from_json_str(&text, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            global = rules.global.len(),
            resource_types = rules.per_type.len(),
            "loaded ignore rules"
        );
        Ok(rules)
    }

    /// New rule set holding both `base` and `overlay`; overlay reasons win.
    pub fn layered(base: &IgnoreRuleSet, overlay: &IgnoreRuleSet) -> IgnoreRuleSet {
        let mut merged = base.clone();
        for (name, reason) in &overlay.global {
            merged.global.insert(name.clone(), reason.clone());
        }
        for (resource_type, rules) in &overlay.per_type {
            let entry = merged.per_type.entry(resource_type.clone()).or_default();
            for (name, reason) in rules {
                entry.insert(name.clone(), reason.clone());
            }
        }
        merged
    }

    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.global.keys().map(String::as_str)
    }

    /// Names declared for one resource type only.
    pub fn type_names(&self, resource_type: &str) -> impl Iterator<Item = &str> {
        self.per_type
            .get(resource_type)
            .into_iter()
            .flat_map(|rules| rules.keys().map(String::as_str))
    }

    /// Global names plus the names declared for `resource_type`.
    pub fn names_for(&self, resource_type: &str) -> BTreeSet<&str> {
        self.global_names()
            .chain(self.type_names(resource_type))
            .collect()
    }

    /// The declared reason for ignoring `name`; type-specific reasons win.
    pub fn reason_for(&self, resource_type: &str, name: &str) -> Option<&str> {
        self.per_type
            .get(resource_type)
            .and_then(|rules| rules.get(name))
            .or_else(|| self.global.get(name))
            .and_then(|reason| reason.as_deref())
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.per_type.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.per_type.is_empty()
    }

    /// Total number of declared rules.
    pub fn len(&self) -> usize {
        self.global.len() + self.per_type.values().map(BTreeMap::len).sum::<usize>()
    }
}

/// Builder for rule sets assembled in code.
#[derive(Debug, Default)]
pub struct IgnoreRuleSetBuilder {
    rules: IgnoreRuleSet,
}

impl IgnoreRuleSetBuilder {
    pub fn global(mut self, name: impl Into<String>) -> Self {
        self.rules.global.insert(name.into(), None);
        self
    }

    pub fn global_with_reason(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.rules.global.insert(name.into(), Some(reason.into()));
        self
    }

    pub fn for_type(mut self, resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        self.rules
            .per_type
            .entry(resource_type.into())
            .or_default()
            .insert(name.into(), None);
        self
    }

    pub fn build(self) -> IgnoreRuleSet {
        self.rules
    }
}
