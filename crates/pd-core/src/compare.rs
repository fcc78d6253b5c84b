//! N-way environment comparison.
//!
//! Every address seen in any snapshot is compared across all environments.
//! Presence mismatches always count as differences. Resources present in
//! more than one place are filtered by the ignore rules and compared on their
//! raw attributes; the masked view is only ever used for display.
//!
//! The first snapshot is the baseline: every other environment is rendered
//! against it, never against a neighbour.

use crate::extract::{extract, AttributeDiff, AttributeKind, AttributeValue, EnvironmentView};
use crate::filter;
use crate::logging::{event_names, generate_run_id};
use crate::render::{render_with, Markup, MarkupSide, RenderOptions};
use pd_common::{ConfigValue, EnvironmentSnapshot, Error, ResourceRecord, Result};
use pd_config::IgnoreRuleSet;
use pd_redact::{Obfuscator, SENSITIVE_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Which sensitive attributes are shown in plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPolicy {
    /// Every sensitive value is obfuscated (default).
    #[default]
    Masked,
    /// Every sensitive value is shown and diffed in plaintext.
    All,
    /// Only the named top-level attributes are shown in plaintext.
    Attributes(BTreeSet<String>),
}

impl RevealPolicy {
    pub fn reveals(&self, attribute: &str) -> bool {
        match self {
            RevealPolicy::Masked => false,
            RevealPolicy::All => true,
            RevealPolicy::Attributes(names) => names.contains(attribute),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareOptions {
    pub reveal: RevealPolicy,
    /// Mark sensitive attributes whose hidden value differs from the baseline.
    pub flag_sensitive_changes: bool,
    pub render: RenderOptions,
    /// Fixed run id; generated when `None`.
    pub run_id: Option<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            reveal: RevealPolicy::Masked,
            flag_sensitive_changes: true,
            render: RenderOptions::default(),
            run_id: None,
        }
    }
}

/// Whether a resource exists in one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentPresence {
    pub environment: String,
    pub present: bool,
}

/// State of one rendered cell relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    Baseline,
    Identical,
    Changed,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentMarkup {
    pub label: String,
    pub state: CellState,
    pub markup: Markup,
}

/// Rendered cells for one differing attribute, in environment order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRendering {
    pub name: String,
    pub cells: Vec<EnvironmentMarkup>,
}

/// Comparison result for one resource address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceComparison {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Labels of the environments holding this address, in environment order.
    pub present_in: Vec<String>,
    pub presence: Vec<EnvironmentPresence>,
    pub has_differences: bool,
    pub ignored_attribute_count: usize,
    pub attribute_diffs: Vec<AttributeDiff>,
    pub renderings: Vec<AttributeRendering>,
}

impl ResourceComparison {
    pub fn is_present_everywhere(&self) -> bool {
        self.presence.iter().all(|p| p.present)
    }

    pub fn rendering(&self, attribute: &str) -> Option<&AttributeRendering> {
        self.renderings.iter().find(|r| r.name == attribute)
    }
}

/// A non-fatal problem with one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonWarning {
    pub address: String,
    pub environment: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub environment_count: usize,
    pub unique_resource_count: usize,
    pub resources_with_differences: usize,
    pub identical_resources: usize,
    pub total_ignored_attributes: usize,
    pub sensitive_differences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub run_id: String,
    pub environments: Vec<String>,
    /// Ordered by address.
    pub resources: Vec<ResourceComparison>,
    pub summary: ComparisonSummary,
    pub warnings: Vec<ComparisonWarning>,
}

impl ComparisonReport {
    pub fn resource(&self, address: &str) -> Option<&ResourceComparison> {
        self.resources.iter().find(|r| r.address == address)
    }
}

/// Compare snapshots with optional ignore rules and default options.
///
/// Sensitive values are shown as their masked placeholder (no obfuscator).
pub fn compare(
    snapshots: &[EnvironmentSnapshot],
    rules: Option<&IgnoreRuleSet>,
) -> Result<ComparisonReport> {
    let mut comparator = Comparator::new();
    if let Some(rules) = rules {
        comparator = comparator.with_rules(rules);
    }
    comparator.compare(snapshots)
}

/// Comparison engine with its optional collaborators.
#[derive(Debug, Clone, Default)]
pub struct Comparator<'a> {
    rules: Option<&'a IgnoreRuleSet>,
    obfuscator: Option<&'a Obfuscator>,
    options: CompareOptions,
}

impl<'a> Comparator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: &'a IgnoreRuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_obfuscator(mut self, obfuscator: &'a Obfuscator) -> Self {
        self.obfuscator = Some(obfuscator);
        self
    }

    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the comparison. Fails only on invalid input (fewer than two
    /// snapshots, duplicate labels); per-resource problems become warnings.
    pub fn compare(&self, snapshots: &[EnvironmentSnapshot]) -> Result<ComparisonReport> {
        validate_snapshots(snapshots)?;

        let run_id = self
            .options
            .run_id
            .clone()
            .unwrap_or_else(generate_run_id);
        let environments: Vec<String> = snapshots.iter().map(|s| s.label.clone()).collect();

        tracing::info!(
            event = event_names::RUN_STARTED,
            run_id = %run_id,
            environments = environments.len(),
            rules = self.rules.map(IgnoreRuleSet::len).unwrap_or(0),
            obfuscation = self.obfuscator.is_some(),
            "comparison started"
        );

        let addresses: BTreeSet<&str> = snapshots
            .iter()
            .flat_map(|s| s.resources_by_address.keys().map(String::as_str))
            .collect();

        let mut warnings = Vec::new();
        let mut resources = Vec::with_capacity(addresses.len());
        for address in addresses {
            resources.push(self.compare_resource(address, snapshots, &mut warnings));
        }

        let summary = summarize(snapshots.len(), &resources);
        tracing::info!(
            event = event_names::RUN_FINISHED,
            run_id = %run_id,
            resources = summary.unique_resource_count,
            differing = summary.resources_with_differences,
            ignored = summary.total_ignored_attributes,
            warnings = warnings.len(),
            "comparison finished"
        );

        Ok(ComparisonReport {
            run_id,
            environments,
            resources,
            summary,
            warnings,
        })
    }

    fn compare_resource(
        &self,
        address: &str,
        snapshots: &[EnvironmentSnapshot],
        warnings: &mut Vec<ComparisonWarning>,
    ) -> ResourceComparison {
        let records: Vec<Option<&ResourceRecord>> =
            snapshots.iter().map(|s| s.get(address)).collect();

        let resource_type = resolve_type(address, snapshots, &records, warnings);
        let type_mismatch = records
            .iter()
            .flatten()
            .any(|r| r.resource_type != resource_type);

        let mut ignored: BTreeSet<String> = BTreeSet::new();
        let mut raw_views: Vec<Option<ConfigValue>> = Vec::with_capacity(records.len());
        let mut masked_views: Vec<Option<ConfigValue>> = Vec::with_capacity(records.len());
        for (snapshot, record) in snapshots.iter().zip(&records) {
            let Some(record) = record else {
                raw_views.push(None);
                masked_views.push(None);
                continue;
            };
            let raw = checked_attributes(&record.attributes_raw, address, &snapshot.label, warnings);
            let masked = checked_attributes(&record.attributes, address, &snapshot.label, warnings);
            match self.rules {
                Some(rules) => {
                    let raw_out = filter::apply(&record.resource_type, &raw, rules);
                    let masked_out = filter::apply(&record.resource_type, &masked, rules);
                    ignored.extend(raw_out.removed);
                    raw_views.push(Some(raw_out.filtered));
                    masked_views.push(Some(masked_out.filtered));
                }
                None => {
                    raw_views.push(Some(raw));
                    masked_views.push(Some(masked));
                }
            }
        }

        let presence: Vec<EnvironmentPresence> = snapshots
            .iter()
            .zip(&records)
            .map(|(s, r)| EnvironmentPresence {
                environment: s.label.clone(),
                present: r.is_some(),
            })
            .collect();
        let present_in: Vec<String> = presence
            .iter()
            .filter(|p| p.present)
            .map(|p| p.environment.clone())
            .collect();
        let present_everywhere = present_in.len() == snapshots.len();

        let raw_equal = {
            let present: Vec<&ConfigValue> = raw_views.iter().flatten().collect();
            present.windows(2).all(|w| w[0] == w[1])
        };
        let has_differences = !present_everywhere || !raw_equal || type_mismatch;

        let mut attribute_diffs = Vec::new();
        let mut renderings = Vec::new();
        if has_differences {
            let views: Vec<EnvironmentView<'_>> = snapshots
                .iter()
                .zip(&raw_views)
                .map(|(s, raw)| EnvironmentView {
                    label: &s.label,
                    attributes: raw.as_ref(),
                })
                .collect();
            for mut diff in extract(&views) {
                let rendering =
                    self.display_attribute(address, &mut diff, &records, &masked_views, warnings);
                attribute_diffs.push(diff);
                renderings.push(rendering);
            }
        }

        tracing::debug!(
            event = event_names::RESOURCE_COMPARED,
            address = %address,
            present = present_in.len(),
            differing = has_differences,
            attributes = attribute_diffs.len(),
            ignored = ignored.len(),
            "resource compared"
        );

        ResourceComparison {
            address: address.to_string(),
            resource_type,
            present_in,
            presence,
            has_differences,
            ignored_attribute_count: ignored.len(),
            attribute_diffs,
            renderings,
        }
    }

    /// Replace the raw values of `diff` with display values and render each
    /// environment against the baseline.
    fn display_attribute(
        &self,
        address: &str,
        diff: &mut AttributeDiff,
        records: &[Option<&ResourceRecord>],
        masked_views: &[Option<ConfigValue>],
        warnings: &mut Vec<ComparisonWarning>,
    ) -> AttributeRendering {
        let name = diff.name.clone();
        diff.sensitive = records
            .iter()
            .flatten()
            .any(|r| r.is_sensitive_attribute(&name));
        let reveal = diff.sensitive && self.options.reveal.reveals(&name);

        if reveal {
            tracing::info!(
                event = event_names::SENSITIVE_UNMASKED,
                address = %address,
                attribute = %name,
                "sensitive attribute revealed on request"
            );
        }

        if diff.sensitive && self.options.flag_sensitive_changes {
            let baseline = diff.values_by_environment[0].value.as_present();
            diff.sensitive_changed = diff
                .values_by_environment
                .iter()
                .skip(1)
                .any(|v| v.value.as_present() != baseline);
        }

        // Raw values drive the cell states; display values drive the markup.
        let raw_values: Vec<Option<ConfigValue>> = diff
            .values_by_environment
            .iter()
            .map(|v| v.value.as_present().cloned())
            .collect();

        let sensitive = diff.sensitive;
        let mut missing_obfuscator_warned = false;
        for (idx, entry) in diff.values_by_environment.iter_mut().enumerate() {
            let AttributeValue::Present(raw) = &entry.value else {
                continue;
            };
            if reveal {
                continue;
            }
            let masked = masked_views[idx]
                .as_ref()
                .and_then(ConfigValue::as_object)
                .and_then(|m| m.get(&name));
            if !sensitive {
                if let Some(masked) = masked {
                    entry.value = AttributeValue::Present(masked.clone());
                }
                continue;
            }
            let Some(record) = records[idx] else {
                continue;
            };
            // An environment that does not mark this attribute still hides it
            // whole: another environment says it is sensitive.
            let paths: Vec<&str> = record.sensitive_paths_within(&name).collect();
            let display = match self.obfuscator {
                Some(obfuscator) if paths.is_empty() => {
                    obfuscator.obfuscate(raw, &name).to_config_value()
                }
                Some(obfuscator) => obfuscator.obfuscate_tree(raw, &name, paths),
                None => {
                    if !missing_obfuscator_warned {
                        missing_obfuscator_warned = true;
                        let message = format!(
                            "sensitive attribute '{}' shown as masked placeholder: no obfuscator configured",
                            name
                        );
                        tracing::warn!(
                            event = event_names::RESOURCE_DEGRADED,
                            address = %address,
                            attribute = %name,
                            "{}",
                            message
                        );
                        warnings.push(ComparisonWarning {
                            address: address.to_string(),
                            environment: None,
                            message,
                        });
                    }
                    match masked {
                        Some(masked) if !paths.is_empty() => masked.clone(),
                        _ => ConfigValue::from(SENSITIVE_PLACEHOLDER),
                    }
                }
            };
            entry.value = AttributeValue::Present(display);
        }

        let render_options = match diff.kind {
            AttributeKind::Scalar => RenderOptions {
                char_level: true,
                ..self.options.render
            },
            AttributeKind::Composite => self.options.render,
        };

        let baseline_display = diff.values_by_environment[0].value.as_present();
        let mut cells = Vec::with_capacity(diff.values_by_environment.len());
        for (idx, entry) in diff.values_by_environment.iter().enumerate() {
            let display = entry.value.as_present();
            let (state, markup) = if idx == 0 {
                match display {
                    Some(_) => {
                        let (plain, _) = render_with(&render_options, display, display);
                        (CellState::Baseline, plain)
                    }
                    None => (CellState::Absent, Markup::empty(MarkupSide::Baseline)),
                }
            } else {
                let (_, markup) = render_with(&render_options, baseline_display, display);
                let state = match &raw_values[idx] {
                    None => CellState::Absent,
                    Some(v) if Some(v) == raw_values[0].as_ref() => CellState::Identical,
                    Some(_) => CellState::Changed,
                };
                (state, markup)
            };
            cells.push(EnvironmentMarkup {
                label: entry.environment.clone(),
                state,
                markup,
            });
        }

        AttributeRendering { name, cells }
    }
}

fn validate_snapshots(snapshots: &[EnvironmentSnapshot]) -> Result<()> {
    if snapshots.len() < 2 {
        return Err(Error::InsufficientEnvironments {
            supplied: snapshots.len(),
        });
    }
    let mut seen = HashSet::new();
    for snapshot in snapshots {
        if !seen.insert(snapshot.label.as_str()) {
            return Err(Error::DuplicateEnvironment {
                label: snapshot.label.clone(),
            });
        }
    }
    Ok(())
}

/// Type of the first environment holding the resource; disagreements are
/// warned about.
fn resolve_type(
    address: &str,
    snapshots: &[EnvironmentSnapshot],
    records: &[Option<&ResourceRecord>],
    warnings: &mut Vec<ComparisonWarning>,
) -> String {
    let mut present = snapshots.iter().zip(records).filter_map(|(s, r)| r.map(|r| (s, r)));
    let Some((_, first)) = present.next() else {
        return String::new();
    };
    for (snapshot, record) in present {
        if record.resource_type != first.resource_type {
            let message = format!(
                "resource type '{}' differs from '{}'",
                record.resource_type, first.resource_type
            );
            tracing::warn!(
                event = event_names::RESOURCE_DEGRADED,
                address = %address,
                environment = %snapshot.label,
                "{}",
                message
            );
            warnings.push(ComparisonWarning {
                address: address.to_string(),
                environment: Some(snapshot.label.clone()),
                message,
            });
        }
    }
    first.resource_type.clone()
}

/// Attributes as an object; anything else is compared as empty.
fn checked_attributes(
    attributes: &ConfigValue,
    address: &str,
    environment: &str,
    warnings: &mut Vec<ComparisonWarning>,
) -> ConfigValue {
    if attributes.as_object().is_some() {
        return attributes.clone();
    }
    let message = format!(
        "attributes are {} instead of an object; compared as empty",
        attributes.kind_name()
    );
    tracing::warn!(
        event = event_names::RESOURCE_DEGRADED,
        address = %address,
        environment = %environment,
        "{}",
        message
    );
    let warning = ComparisonWarning {
        address: address.to_string(),
        environment: Some(environment.to_string()),
        message,
    };
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
    ConfigValue::empty_object()
}

fn summarize(environment_count: usize, resources: &[ResourceComparison]) -> ComparisonSummary {
    let differing = resources.iter().filter(|r| r.has_differences).count();
    ComparisonSummary {
        environment_count,
        unique_resource_count: resources.len(),
        resources_with_differences: differing,
        identical_resources: resources.len() - differing,
        total_ignored_attributes: resources.iter().map(|r| r.ignored_attribute_count).sum(),
        sensitive_differences: resources
            .iter()
            .flat_map(|r| &r.attribute_diffs)
            .filter(|d| d.sensitive_changed)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_redact::SaltRecord;
    use serde_json::json;

    fn cv(v: serde_json::Value) -> ConfigValue {
        ConfigValue::from(v)
    }

    fn snapshot(label: &str, ordinal: usize, records: Vec<ResourceRecord>) -> EnvironmentSnapshot {
        EnvironmentSnapshot::from_records(label, ordinal, records)
    }

    fn vm(x: &str) -> ResourceRecord {
        ResourceRecord::new("azurerm_vm.web", "azurerm_vm", cv(json!({"x": x, "name": "web"})))
    }

    fn secret_record(password: &str) -> ResourceRecord {
        let raw = cv(json!({"password": password, "user": "admin"}));
        let masked = cv(json!({"password": SENSITIVE_PLACEHOLDER, "user": "admin"}));
        let paths: BTreeSet<String> = ["password".to_string()].into_iter().collect();
        ResourceRecord::with_views("db.main", "db", masked, raw, paths)
    }

    #[test]
    fn test_rejects_fewer_than_two_snapshots() {
        let err = compare(&[snapshot("dev", 0, vec![])], None).unwrap_err();
        assert!(matches!(err, Error::InsufficientEnvironments { supplied: 1 }));
        assert_eq!(err.code(), 20);
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let err = compare(&[snapshot("dev", 0, vec![]), snapshot("dev", 1, vec![])], None)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEnvironment { .. }));
    }

    #[test]
    fn test_three_way_baseline() {
        let snaps = vec![
            snapshot("dev", 0, vec![vm("1")]),
            snapshot("staging", 1, vec![vm("2")]),
            snapshot("prod", 2, vec![vm("1")]),
        ];
        let report = compare(&snaps, None).unwrap();
        let res = report.resource("azurerm_vm.web").unwrap();
        assert!(res.has_differences);
        assert_eq!(res.attribute_diffs.len(), 1);

        let cells = &res.rendering("x").unwrap().cells;
        assert_eq!(cells[0].state, CellState::Baseline);
        assert!(!cells[0].markup.has_highlights());
        assert_eq!(cells[1].state, CellState::Changed);
        assert_eq!(cells[1].markup.to_marked_text(), "\"[+2+]\"");
        assert_eq!(cells[2].state, CellState::Identical);
        assert!(!cells[2].markup.has_highlights());
    }

    #[test]
    fn test_resource_only_in_baseline() {
        let snaps = vec![
            snapshot("dev", 0, vec![vm("1")]),
            snapshot("staging", 1, vec![]),
            snapshot("prod", 2, vec![]),
        ];
        let report = compare(&snaps, None).unwrap();
        let res = report.resource("azurerm_vm.web").unwrap();
        assert!(res.has_differences);
        assert_eq!(res.present_in, vec!["dev".to_string()]);
        for rendering in &res.renderings {
            assert_eq!(rendering.cells[1].state, CellState::Absent);
            assert_eq!(rendering.cells[2].state, CellState::Absent);
        }
        assert_eq!(report.summary.resources_with_differences, 1);
    }

    #[test]
    fn test_masked_sensitive_changes_flagged_without_plaintext() {
        let snaps = vec![
            snapshot("dev", 0, vec![secret_record("alpha-secret")]),
            snapshot("prod", 1, vec![secret_record("beta-secret")]),
        ];
        let report = compare(&snaps, None).unwrap();
        let res = report.resource("db.main").unwrap();
        assert!(res.has_differences);
        let diff = &res.attribute_diffs[0];
        assert!(diff.sensitive);
        assert!(diff.sensitive_changed);
        assert_eq!(report.summary.sensitive_differences, 1);
        assert_eq!(report.warnings.len(), 1);

        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("alpha-secret"));
        assert!(!json.contains("beta-secret"));
    }

    #[test]
    fn test_obfuscated_sensitive_values_render_whole_lines() {
        let ob = Obfuscator::new(SaltRecord::from_bytes([1; 32], [2; 32]));
        let snaps = vec![
            snapshot("dev", 0, vec![secret_record("alpha-secret")]),
            snapshot("prod", 1, vec![secret_record("alpha-secreT")]),
        ];
        let report = Comparator::new()
            .with_obfuscator(&ob)
            .compare(&snaps)
            .unwrap();
        assert!(report.warnings.is_empty());
        let cells = &report.resource("db.main").unwrap().rendering("password").unwrap().cells;
        assert_eq!(cells[1].state, CellState::Changed);
        let line = &cells[1].markup.lines[0];
        assert_eq!(line.segments.len(), 1);
        assert!(line.segments[0].highlighted);
        assert!(!serde_json::to_string(&report).unwrap().contains("alpha-secre"));
    }

    #[test]
    fn test_reveal_uses_plaintext_char_diff() {
        let options = CompareOptions {
            reveal: RevealPolicy::Attributes(["password".to_string()].into_iter().collect()),
            ..CompareOptions::default()
        };
        let snaps = vec![
            snapshot("dev", 0, vec![secret_record("alpha-secret")]),
            snapshot("prod", 1, vec![secret_record("alpha-secreT")]),
        ];
        let report = Comparator::new().with_options(options).compare(&snaps).unwrap();
        let cells = &report.resource("db.main").unwrap().rendering("password").unwrap().cells;
        assert_eq!(cells[1].markup.to_marked_text(), "\"alpha-secre[+T+]\"");
    }

    #[test]
    fn test_ignored_attribute_makes_resource_identical() {
        let a = ResourceRecord::new("s.a", "s", cv(json!({"tags": {"v": 1}, "k": 1})));
        let b = ResourceRecord::new("s.a", "s", cv(json!({"tags": {"v": 2}, "k": 1})));
        let rules = IgnoreRuleSet::builder().global_with_reason("tags", "varies").build();
        let report = compare(&[snapshot("a", 0, vec![a]), snapshot("b", 1, vec![b])], Some(&rules))
            .unwrap();
        let res = &report.resources[0];
        assert!(!res.has_differences);
        assert_eq!(res.ignored_attribute_count, 1);
        assert_eq!(report.summary.identical_resources, 1);
        assert_eq!(report.summary.total_ignored_attributes, 1);
    }

    #[test]
    fn test_bad_shape_is_warning_not_error() {
        let bad = ResourceRecord::new("s.a", "s", cv(json!("oops")));
        let good = ResourceRecord::new("s.a", "s", cv(json!({"k": 1})));
        let ok = ResourceRecord::new("s.b", "s", cv(json!({"k": 1})));
        let report = compare(
            &[
                snapshot("a", 0, vec![bad, ok.clone()]),
                snapshot("b", 1, vec![good, ok]),
            ],
            None,
        )
        .unwrap();
        assert_eq!(report.resources.len(), 2);
        assert!(report.resource("s.a").unwrap().has_differences);
        assert!(!report.resource("s.b").unwrap().has_differences);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].environment.as_deref(), Some("a"));
    }

    #[test]
    fn test_resources_sorted_by_address() {
        let r = |a: &str| ResourceRecord::new(a, "t", ConfigValue::empty_object());
        let report = compare(
            &[
                snapshot("a", 0, vec![r("z.one"), r("a.two")]),
                snapshot("b", 1, vec![r("m.three")]),
            ],
            None,
        )
        .unwrap();
        let addresses: Vec<_> = report.resources.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["a.two", "m.three", "z.one"]);
        assert_eq!(report.summary.unique_resource_count, 3);
    }
}
