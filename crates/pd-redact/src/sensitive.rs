//! Sensitive-path bookkeeping on value trees.
//!
//! Plans describe sensitivity with a mask tree shaped like the value
//! (`{"login": {"password": true}}`). These helpers turn such masks into
//! dot-paths and replace the leaves those paths name.

use pd_common::ConfigValue;
use serde_json::Value;
use std::collections::BTreeSet;

/// Placeholder shown for sensitive values in the masked view.
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive value)";

/// Dot-paths of every `true` leaf in a mask tree.
///
/// A bare `true` at the root marks every top-level key of `value`.
pub fn paths_from_mask(mask: &Value, value: &ConfigValue) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    match mask {
        Value::Bool(true) => {
            if let Some(map) = value.as_object() {
                paths.extend(map.keys().cloned());
            }
        }
        _ => collect_mask_paths(mask, String::new(), &mut paths),
    }
    paths
}

fn collect_mask_paths(mask: &Value, prefix: String, out: &mut BTreeSet<String>) {
    match mask {
        Value::Bool(true) => {
            if !prefix.is_empty() {
                out.insert(prefix);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                collect_mask_paths(child, join_path(&prefix, key), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_mask_paths(child, join_path(&prefix, &i.to_string()), out);
            }
        }
        _ => {}
    }
}

pub fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

/// Copy of `value` with the node at `path` replaced by `replacement`.
///
/// Returns `None` when the path does not exist.
pub fn replace_path(value: &ConfigValue, path: &str, replacement: ConfigValue) -> Option<ConfigValue> {
    if path.is_empty() {
        return Some(replacement);
    }
    let segments: Vec<&str> = path.split('.').collect();
    replace_segments(value, &segments, replacement)
}

fn replace_segments(
    value: &ConfigValue,
    segments: &[&str],
    replacement: ConfigValue,
) -> Option<ConfigValue> {
    let (head, rest) = segments.split_first()?;
    match value {
        ConfigValue::Object(map) => {
            let child = map.get(*head)?;
            let new_child = if rest.is_empty() {
                replacement
            } else {
                replace_segments(child, rest, replacement)?
            };
            let mut map = map.clone();
            map.insert((*head).to_string(), new_child);
            Some(ConfigValue::Object(map))
        }
        ConfigValue::Array(items) => {
            let idx: usize = head.parse().ok()?;
            let child = items.get(idx)?;
            let new_child = if rest.is_empty() {
                replacement
            } else {
                replace_segments(child, rest, replacement)?
            };
            let mut items = items.clone();
            items[idx] = new_child;
            Some(ConfigValue::Array(items))
        }
        _ => None,
    }
}

/// Masked view: every sensitive path replaced by `placeholder`.
///
/// Null values are left alone (an unset secret is not a leak).
pub fn mask_paths<'a>(
    value: &ConfigValue,
    paths: impl IntoIterator<Item = &'a String>,
    placeholder: &str,
) -> ConfigValue {
    let mut masked = value.clone();
    for path in paths {
        let present = masked.get_path(path).map(|v| !v.is_null()).unwrap_or(false);
        if !present {
            continue;
        }
        if let Some(next) = replace_path(&masked, path, ConfigValue::from(placeholder)) {
            masked = next;
        }
    }
    masked
}
