//! Resource records and per-environment snapshots.

use crate::value::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One infrastructure resource as seen in one environment's plan.
///
/// `attributes` is the display view (sensitive leaves already masked by
/// placeholder); `attributes_raw` is the plaintext view and is the only
/// one used to decide equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: ConfigValue,
    pub attributes_raw: ConfigValue,
    /// Dot-paths of sensitive values inside `attributes_raw`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub sensitive_paths: BTreeSet<String>,
}

impl ResourceRecord {
    /// Record with no sensitive values: both views are the same tree.
    pub fn new(
        address: impl Into<String>,
        resource_type: impl Into<String>,
        attributes: ConfigValue,
    ) -> Self {
        Self {
            address: address.into(),
            resource_type: resource_type.into(),
            attributes_raw: attributes.clone(),
            attributes,
            sensitive_paths: BTreeSet::new(),
        }
    }

    /// Record with separate masked and raw views.
    pub fn with_views(
        address: impl Into<String>,
        resource_type: impl Into<String>,
        attributes: ConfigValue,
        attributes_raw: ConfigValue,
        sensitive_paths: BTreeSet<String>,
    ) -> Self {
        Self {
            address: address.into(),
            resource_type: resource_type.into(),
            attributes,
            attributes_raw,
            sensitive_paths,
        }
    }

    /// Whether the top-level attribute `name` is, or contains, a sensitive value.
    pub fn is_sensitive_attribute(&self, name: &str) -> bool {
        self.sensitive_paths
            .iter()
            .any(|p| path_is_within(p, name))
    }

    /// Sensitive paths inside the top-level attribute `name`.
    pub fn sensitive_paths_within<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.sensitive_paths
            .iter()
            .filter(move |p| path_is_within(p, name))
            .map(String::as_str)
    }
}

/// `path` equals `prefix` or lies below it.
pub fn path_is_within(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.len() > prefix.len()
            && path.starts_with(prefix)
            && path.as_bytes()[prefix.len()] == b'.')
}

/// One input environment. Ordinal 0 is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub label: String,
    pub ordinal: usize,
    pub resources_by_address: BTreeMap<String, ResourceRecord>,
}

impl EnvironmentSnapshot {
    pub fn new(label: impl Into<String>, ordinal: usize) -> Self {
        Self {
            label: label.into(),
            ordinal,
            resources_by_address: BTreeMap::new(),
        }
    }

    /// Build a snapshot from records. Later duplicates of an address are dropped.
    pub fn from_records(
        label: impl Into<String>,
        ordinal: usize,
        records: impl IntoIterator<Item = ResourceRecord>,
    ) -> Self {
        let mut snapshot = Self::new(label, ordinal);
        for record in records {
            snapshot
                .resources_by_address
                .entry(record.address.clone())
                .or_insert(record);
        }
        snapshot
    }

    pub fn is_baseline(&self) -> bool {
        self.ordinal == 0
    }

    pub fn get(&self, address: &str) -> Option<&ResourceRecord> {
        self.resources_by_address.get(address)
    }

    pub fn len(&self) -> usize {
        self.resources_by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources_by_address.is_empty()
    }
}
