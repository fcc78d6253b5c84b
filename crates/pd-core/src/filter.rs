//! Ignore-rule filtering of attribute maps.
//!
//! The global names and the names for the resource's type form one removal
//! set. A plain name removes a top-level key. A dot-path
//! (`tags.last_modified`) removes one nested key, and also a top-level key
//! literally spelled `tags.last_modified` if there is one.

use pd_common::ConfigValue;
use pd_config::IgnoreRuleSet;
use std::collections::{BTreeMap, BTreeSet};

/// Filtered attributes plus the rule names that actually removed something.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub filtered: ConfigValue,
    pub removed: BTreeSet<String>,
}

/// Apply the rules for `resource_type` to one attribute map.
///
/// Names that match nothing are ignored. A non-object `attrs` is returned
/// unchanged. Applying the same rules to the result removes nothing more.
pub fn apply(resource_type: &str, attrs: &ConfigValue, rules: &IgnoreRuleSet) -> FilterOutcome {
    let Some(map) = attrs.as_object() else {
        return FilterOutcome {
            filtered: attrs.clone(),
            removed: BTreeSet::new(),
        };
    };

    let mut filtered = map.clone();
    let mut removed = BTreeSet::new();
    for name in rules.names_for(resource_type) {
        if remove_name(&mut filtered, name) {
            removed.insert(name.to_string());
        }
    }

    FilterOutcome {
        filtered: ConfigValue::Object(filtered),
        removed,
    }
}

/// Removes both the top-level key spelled exactly `name` and the node the
/// dot-path `name` points at, so nothing this name matches survives the pass.
fn remove_name(map: &mut BTreeMap<String, ConfigValue>, name: &str) -> bool {
    let literal = map.remove(name).is_some();
    if !name.contains('.') {
        return literal;
    }
    let segments: Vec<&str> = name.split('.').collect();
    let nested = remove_segments_in_object(map, &segments);
    literal || nested
}

fn remove_segments_in_object(map: &mut BTreeMap<String, ConfigValue>, segments: &[&str]) -> bool {
    match segments {
        [] => false,
        [last] => map.remove(*last).is_some(),
        [head, rest @ ..] => match map.get_mut(*head) {
            Some(child) => remove_segments(child, rest),
            None => false,
        },
    }
}

fn remove_segments(value: &mut ConfigValue, segments: &[&str]) -> bool {
    match value {
        ConfigValue::Object(map) => remove_segments_in_object(map, segments),
        // Array elements are addressed by index but never removed, only
        // descended into.
        ConfigValue::Array(items) if segments.len() > 1 => {
            let Ok(idx) = segments[0].parse::<usize>() else {
                return false;
            };
            match items.get_mut(idx) {
                Some(child) => remove_segments(child, &segments[1..]),
                None => false,
            }
        }
        _ => false,
    }
}
