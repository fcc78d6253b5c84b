//! Attribute-level diff extraction.
//!
//! Reduces one resource's per-environment attribute maps to the top-level
//! attributes that differ. Attributes are reported in lexicographic order.

use pd_common::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Value of one attribute in one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Present(ConfigValue),
    /// The attribute (or the whole resource) does not exist there.
    Absent,
}

impl AttributeValue {
    pub fn as_present(&self) -> Option<&ConfigValue> {
        match self {
            AttributeValue::Present(v) => Some(v),
            AttributeValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, AttributeValue::Absent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentValue {
    pub environment: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Scalar everywhere it is present; eligible for inline highlighting.
    Scalar,
    /// An object or array in at least one environment.
    Composite,
}

/// One top-level attribute that differs across environments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDiff {
    pub name: String,
    /// One entry per environment, in environment order.
    pub values_by_environment: Vec<EnvironmentValue>,
    pub differs: bool,
    pub kind: AttributeKind,
    /// The attribute is or contains a sensitive value.
    #[serde(default)]
    pub sensitive: bool,
    /// Sensitive and its underlying value differs from the baseline.
    #[serde(default)]
    pub sensitive_changed: bool,
}

impl AttributeDiff {
    pub fn value_for(&self, environment: &str) -> Option<&AttributeValue> {
        self.values_by_environment
            .iter()
            .find(|v| v.environment == environment)
            .map(|v| &v.value)
    }
}

/// One environment's post-filter attributes for a resource.
///
/// `attributes` is `None` when the resource is absent from that environment.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentView<'a> {
    pub label: &'a str,
    pub attributes: Option<&'a ConfigValue>,
}

/// Differing top-level attributes across `views` (in environment order).
///
/// Absent never equals present, whatever the present value is.
pub fn extract(views: &[EnvironmentView<'_>]) -> Vec<AttributeDiff> {
    if views.is_empty() {
        return Vec::new();
    }
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for view in views {
        if let Some(map) = view.attributes.and_then(ConfigValue::as_object) {
            names.extend(map.keys().map(String::as_str));
        }
    }

    let mut diffs = Vec::new();
    for name in names {
        let values: Vec<Option<&ConfigValue>> = views
            .iter()
            .map(|view| {
                view.attributes
                    .and_then(ConfigValue::as_object)
                    .and_then(|map| map.get(name))
            })
            .collect();

        let first = values[0];
        let differs = values.iter().skip(1).any(|v| *v != first);
        if !differs {
            continue;
        }

        let kind = if values.iter().flatten().all(|v| v.is_scalar()) {
            AttributeKind::Scalar
        } else {
            AttributeKind::Composite
        };

        diffs.push(AttributeDiff {
            name: name.to_string(),
            values_by_environment: views
                .iter()
                .zip(values)
                .map(|(view, value)| EnvironmentValue {
                    environment: view.label.to_string(),
                    value: match value {
                        Some(v) => AttributeValue::Present(v.clone()),
                        None => AttributeValue::Absent,
                    },
                })
                .collect(),
            differs: true,
            kind,
            sensitive: false,
            sensitive_changed: false,
        });
    }
    diffs
}
