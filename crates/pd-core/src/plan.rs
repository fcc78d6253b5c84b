//! Environment snapshots from Terraform plan JSON.
//!
//! Reads the `resource_changes` array of an already-parsed plan document
//! (`terraform show -json plan.out`). Each change contributes one
//! [`ResourceRecord`] built from either its `before` or its `after` side.
//! Sensitive leaves come from the matching `*_sensitive` mask and are
//! replaced by a placeholder in the display view only.

use pd_common::{ConfigValue, EnvironmentSnapshot, ResourceRecord};
use pd_redact::{mask_paths, paths_from_mask, SENSITIVE_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::logging::event_names;

/// Placeholder for values only known once the plan is applied.
pub const UNKNOWN_PLACEHOLDER: &str = "(known after apply)";

/// Which side of each resource change to snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanView {
    /// Current configuration state.
    #[default]
    Before,
    /// Planned state.
    After,
}

/// The part of a plan document this module reads.
#[derive(Debug, Deserialize)]
struct PlanDocument {
    #[serde(default)]
    resource_changes: Option<Vec<Value>>,
}

/// One `resource_changes[]` entry.
#[derive(Debug, Deserialize)]
struct ResourceChange {
    address: String,
    #[serde(rename = "type")]
    resource_type: String,
    change: Change,
}

#[derive(Debug, Deserialize)]
struct Change {
    #[serde(default)]
    before: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    after: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    before_sensitive: Option<Value>,
    #[serde(default)]
    after_sensitive: Option<Value>,
    #[serde(default)]
    after_unknown: Option<Value>,
}

impl Change {
    /// The attribute map and sensitivity mask for `view`.
    fn side(self, view: PlanView) -> (Option<serde_json::Map<String, Value>>, Option<Value>) {
        match view {
            PlanView::Before => (self.before, self.before_sensitive),
            PlanView::After => (self.after, self.after_sensitive),
        }
    }
}

/// Supplies values a plan leaves as known-after-apply.
pub trait KnownAfterApplyResolver {
    /// The resolved value at `path` of `address`, if known.
    fn resolve(&self, address: &str, path: &str) -> Option<ConfigValue>;
}

/// A plan entry that was skipped or only partly understood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWarning {
    /// Position in `resource_changes`.
    pub index: usize,
    pub address: Option<String>,
    pub message: String,
}

/// Accumulates records for one environment.
pub struct SnapshotBuilder<'a> {
    label: String,
    ordinal: usize,
    view: PlanView,
    resolver: Option<&'a dyn KnownAfterApplyResolver>,
    records: BTreeMap<String, ResourceRecord>,
    warnings: Vec<PlanWarning>,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(label: impl Into<String>, ordinal: usize) -> Self {
        Self {
            label: label.into(),
            ordinal,
            view: PlanView::default(),
            resolver: None,
            records: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_view(mut self, view: PlanView) -> Self {
        self.view = view;
        self
    }

    pub fn with_resolver(mut self, resolver: &'a dyn KnownAfterApplyResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Add a hand-built record. An address already present is kept.
    pub fn with_record(mut self, record: ResourceRecord) -> Self {
        self.insert(record, None);
        self
    }

    pub fn with_plan(mut self, plan: &Value) -> Self {
        self.add_plan(plan);
        self
    }

    /// Add every usable entry of `plan.resource_changes`; returns how many
    /// records were added.
    pub fn add_plan(&mut self, plan: &Value) -> usize {
        let changes = match PlanDocument::deserialize(plan) {
            Ok(PlanDocument {
                resource_changes: Some(changes),
            }) => changes,
            Ok(_) => {
                self.warn(0, None, "plan has no resource_changes array".to_string());
                return 0;
            }
            Err(e) => {
                self.warn(0, None, format!("plan is not readable: {}", e));
                return 0;
            }
        };

        let mut added = 0;
        for (index, entry) in changes.iter().enumerate() {
            match self.record_from_entry(entry) {
                Ok(Some(record)) => {
                    if self.insert(record, Some(index)) {
                        added += 1;
                    }
                }
                // No value on this side: the resource is being created or
                // destroyed, so it does not exist here.
                Ok(None) => {}
                Err(message) => {
                    let address = entry.get("address").and_then(Value::as_str).map(str::to_string);
                    self.warn(index, address, message);
                }
            }
        }
        added
    }

    pub fn warnings(&self) -> &[PlanWarning] {
        &self.warnings
    }

    pub fn build(self) -> (EnvironmentSnapshot, Vec<PlanWarning>) {
        tracing::info!(
            event = event_names::SNAPSHOT_BUILT,
            environment = %self.label,
            resources = self.records.len(),
            skipped = self.warnings.len(),
            "snapshot built"
        );
        let snapshot = EnvironmentSnapshot {
            label: self.label,
            ordinal: self.ordinal,
            resources_by_address: self.records,
        };
        (snapshot, self.warnings)
    }

    fn insert(&mut self, record: ResourceRecord, index: Option<usize>) -> bool {
        if self.records.contains_key(&record.address) {
            let message = "duplicate address; first occurrence kept".to_string();
            self.warn(index.unwrap_or(0), Some(record.address), message);
            return false;
        }
        self.records.insert(record.address.clone(), record);
        true
    }

    fn warn(&mut self, index: usize, address: Option<String>, message: String) {
        tracing::warn!(
            event = event_names::PLAN_ENTRY_SKIPPED,
            environment = %self.label,
            index,
            address = address.as_deref().unwrap_or(""),
            "{}",
            message
        );
        self.warnings.push(PlanWarning {
            index,
            address,
            message,
        });
    }

    fn record_from_entry(&self, entry: &Value) -> Result<Option<ResourceRecord>, String> {
        let ResourceChange {
            address,
            resource_type,
            change,
        } = ResourceChange::deserialize(entry).map_err(|e| e.to_string())?;

        let unknown = change.after_unknown.clone();
        let (value, mask) = change.side(self.view);
        let Some(value) = value else {
            return Ok(None);
        };

        let mut raw = ConfigValue::from(Value::Object(value));
        if self.view == PlanView::After {
            if let Some(unknown) = &unknown {
                raw = self.resolve_unknown(&address, raw, unknown);
            }
        }

        let sensitive_paths = mask
            .map(|mask| paths_from_mask(&mask, &raw))
            .unwrap_or_default();
        let masked = mask_paths(&raw, &sensitive_paths, SENSITIVE_PLACEHOLDER);

        Ok(Some(ResourceRecord::with_views(
            address,
            resource_type,
            masked,
            raw,
            sensitive_paths,
        )))
    }

    fn resolve_unknown(&self, address: &str, mut value: ConfigValue, unknown: &Value) -> ConfigValue {
        for path in paths_from_mask(unknown, &value) {
            let resolved = self
                .resolver
                .and_then(|r| r.resolve(address, &path))
                .unwrap_or_else(|| ConfigValue::from(UNKNOWN_PLACEHOLDER));
            set_path(&mut value, &path, resolved);
        }
        value
    }
}

/// Set `path` in `value`, creating missing object keys along the way.
/// Paths through missing array elements or scalars are left alone.
fn set_path(value: &mut ConfigValue, path: &str, replacement: ConfigValue) {
    let mut current = value;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        current = match current {
            ConfigValue::Object(map) => {
                if last {
                    map.insert(segment.to_string(), replacement);
                    return;
                }
                map.entry(segment.to_string())
                    .or_insert_with(ConfigValue::empty_object)
            }
            ConfigValue::Array(items) => {
                let Some(item) = segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)) else {
                    return;
                };
                if last {
                    *item = replacement;
                    return;
                }
                item
            }
            _ => return,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> Value {
        json!({
            "format_version": "1.2",
            "resource_changes": [
                {
                    "address": "aws_db_instance.main",
                    "type": "aws_db_instance",
                    "change": {
                        "actions": ["update"],
                        "before": {"engine": "postgres", "password": "hunter2", "port": 5432},
                        "before_sensitive": {"password": true},
                        "after": {"engine": "postgres", "password": "hunter3", "port": 5432},
                        "after_sensitive": {"password": true},
                        "after_unknown": {"endpoint": true}
                    }
                },
                {
                    "address": "aws_s3_bucket.new",
                    "type": "aws_s3_bucket",
                    "change": {"actions": ["create"], "before": null, "after": {"bucket": "b"}}
                },
                {"type": "broken"},
                {
                    "address": "aws_db_instance.main",
                    "type": "aws_db_instance",
                    "change": {"before": {"engine": "mysql"}}
                }
            ]
        })
    }

    struct Endpoints;

    impl KnownAfterApplyResolver for Endpoints {
        fn resolve(&self, address: &str, path: &str) -> Option<ConfigValue> {
            (address == "aws_db_instance.main" && path == "endpoint")
                .then(|| ConfigValue::from("db.internal:5432"))
        }
    }

    #[test]
    fn test_before_view_masks_sensitive_values() {
        let (snapshot, warnings) = SnapshotBuilder::new("dev", 0).with_plan(&plan()).build();
        assert_eq!(snapshot.len(), 1);
        let db = snapshot.get("aws_db_instance.main").unwrap();
        assert_eq!(db.attributes_raw.get_path("password"), Some(&ConfigValue::from("hunter2")));
        assert_eq!(
            db.attributes.get_path("password"),
            Some(&ConfigValue::from(SENSITIVE_PLACEHOLDER))
        );
        assert_eq!(db.attributes.get_path("engine"), Some(&ConfigValue::from("postgres")));
        assert!(db.is_sensitive_attribute("password"));

        // missing address + duplicate address
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].index, 2);
        assert_eq!(warnings[1].address.as_deref(), Some("aws_db_instance.main"));
    }

    #[test]
    fn test_after_view_marks_unknown_values() {
        let (snapshot, _) = SnapshotBuilder::new("dev", 0)
            .with_view(PlanView::After)
            .with_plan(&plan())
            .build();
        assert_eq!(snapshot.len(), 2);
        let db = snapshot.get("aws_db_instance.main").unwrap();
        assert_eq!(
            db.attributes_raw.get_path("endpoint"),
            Some(&ConfigValue::from(UNKNOWN_PLACEHOLDER))
        );
        assert_eq!(
            db.attributes.get_path("endpoint"),
            Some(&ConfigValue::from(UNKNOWN_PLACEHOLDER))
        );
    }

    #[test]
    fn test_resolver_fills_unknown_values() {
        let resolver = Endpoints;
        let (snapshot, _) = SnapshotBuilder::new("dev", 0)
            .with_view(PlanView::After)
            .with_resolver(&resolver)
            .with_plan(&plan())
            .build();
        let db = snapshot.get("aws_db_instance.main").unwrap();
        assert_eq!(
            db.attributes_raw.get_path("endpoint"),
            Some(&ConfigValue::from("db.internal:5432"))
        );
    }

    #[test]
    fn test_missing_resource_changes_is_warning() {
        let (snapshot, warnings) = SnapshotBuilder::new("dev", 0)
            .with_plan(&json!({"format_version": "1.2"}))
            .build();
        assert!(snapshot.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_non_object_value_is_warning() {
        let plan = json!({"resource_changes": [
            {"address": "a.b", "type": "a", "change": {"before": [1, 2]}}
        ]});
        let (snapshot, warnings) = SnapshotBuilder::new("dev", 0).with_plan(&plan).build();
        assert!(snapshot.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].address.as_deref(), Some("a.b"));
    }

    #[test]
    fn test_unreadable_entries_warn_and_others_survive() {
        let plan = json!({"resource_changes": [
            {"address": "a.one", "type": "a", "change": "update"},
            {"address": "a.two", "type": 7, "change": {}},
            {"address": "a.three", "type": "a", "change": {"before": {"x": 1}}}
        ]});
        let (snapshot, warnings) = SnapshotBuilder::new("dev", 0).with_plan(&plan).build();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("a.three").is_some());
        let skipped: Vec<_> = warnings.iter().map(|w| (w.index, w.address.as_deref())).collect();
        assert_eq!(skipped, vec![(0, Some("a.one")), (1, Some("a.two"))]);
    }

    #[test]
    fn test_non_object_plan_is_warning() {
        let (snapshot, warnings) = SnapshotBuilder::new("dev", 0)
            .with_plan(&json!(["not", "a", "plan"]))
            .build();
        assert!(snapshot.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_hand_built_records() {
        let record = ResourceRecord::new("x.y", "x", ConfigValue::empty_object());
        let (snapshot, warnings) = SnapshotBuilder::new("prod", 2)
            .with_record(record.clone())
            .with_record(record)
            .build();
        assert_eq!(snapshot.ordinal, 2);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_set_path_creates_object_keys() {
        let mut value = ConfigValue::from(json!({"a": {}, "list": [{}]}));
        set_path(&mut value, "a.b.c", ConfigValue::from(1i64));
        set_path(&mut value, "list.0.x", ConfigValue::from(2i64));
        set_path(&mut value, "list.5.x", ConfigValue::from(3i64));
        assert_eq!(
            value,
            ConfigValue::from(json!({"a": {"b": {"c": 1}}, "list": [{"x": 2}]}))
        );
    }
}
