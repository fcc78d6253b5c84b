//! The configuration value tree.
//!
//! A [`ConfigValue`] is one JSON-like value from a plan snapshot. Objects are
//! kept in a `BTreeMap`, so every traversal, serialization and comparison
//! sees keys in the same (lexicographic) order.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;

/// Indentation used by [`ConfigValue::canonical_text`].
pub const CANONICAL_INDENT: &str = "  ";

/// One configuration value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ConfigValue>),
    Object(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// An empty object.
    pub fn empty_object() -> Self {
        ConfigValue::Object(BTreeMap::new())
    }

    /// Whether this value is a leaf (not an array or object).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ConfigValue::Array(_) | ConfigValue::Object(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Short type name used in warnings.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Number(_) => "number",
            ConfigValue::String(_) => "string",
            ConfigValue::Array(_) => "array",
            ConfigValue::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a dot-separated path (`network.subnets.0.cidr`).
    ///
    /// Numeric segments index into arrays; every other segment is an object key.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return Some(self);
        }
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                ConfigValue::Object(map) => map.get(segment)?,
                ConfigValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Stably ordered, indented multi-line text for line diffing.
    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self, Some(0));
        out
    }

    /// Compact canonical serialization (sorted keys, no whitespace).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        write_value(&mut out, self, None);
        out.into_bytes()
    }

    /// Canonical equality: structural, with numbers compared by value.
    pub fn canonical_eq(&self, other: &ConfigValue) -> bool {
        self == other
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::Null, ConfigValue::Null) => true,
            (ConfigValue::Bool(a), ConfigValue::Bool(b)) => a == b,
            (ConfigValue::Number(a), ConfigValue::Number(b)) => numbers_equal(a, b),
            (ConfigValue::String(a), ConfigValue::String(b)) => a == b,
            (ConfigValue::Array(a), ConfigValue::Array(b)) => a == b,
            (ConfigValue::Object(a), ConfigValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (NumberKey::of(a), NumberKey::of(b)) {
        (NumberKey::Integer(x), NumberKey::Integer(y)) => x == y,
        (NumberKey::Float(x), NumberKey::Float(y)) => x == y,
        _ => false,
    }
}

/// One normalized form per numeric value.
///
/// Every integer, and every float that is integral and fits in `i128`
/// exactly, becomes `Integer`. Equality and canonical text both go through
/// this form, so `1` and `1.0` compare equal and print the same, and equality
/// stays transitive past 2^53.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberKey {
    Integer(i128),
    Float(f64),
}

impl NumberKey {
    fn of(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            return NumberKey::Integer(i128::from(i));
        }
        if let Some(u) = n.as_u64() {
            return NumberKey::Integer(i128::from(u));
        }
        let f = n.as_f64().unwrap_or(f64::NAN);
        // 2^127; integral floats below it convert to i128 without loss.
        const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
        if f.is_finite() && f.fract() == 0.0 && f.abs() < LIMIT {
            NumberKey::Integer(f as i128)
        } else {
            NumberKey::Float(f)
        }
    }
}

fn write_number(out: &mut String, n: &Number) {
    match NumberKey::of(n) {
        NumberKey::Integer(i) => out.push_str(&i.to_string()),
        NumberKey::Float(_) => out.push_str(&n.to_string()),
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(CANONICAL_INDENT);
    }
}

/// `depth` is `None` for compact output.
fn write_value(out: &mut String, value: &ConfigValue, depth: Option<usize>) {
    match value {
        ConfigValue::Null => out.push_str("null"),
        ConfigValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        ConfigValue::Number(n) => write_number(out, n),
        ConfigValue::String(s) => write_string(out, s),
        ConfigValue::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Some(d) = depth {
                    out.push('\n');
                    push_indent(out, d + 1);
                }
                write_value(out, item, depth.map(|d| d + 1));
            }
            if let Some(d) = depth {
                out.push('\n');
                push_indent(out, d);
            }
            out.push(']');
        }
        ConfigValue::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Some(d) = depth {
                    out.push('\n');
                    push_indent(out, d + 1);
                }
                write_string(out, key);
                out.push(':');
                if depth.is_some() {
                    out.push(' ');
                }
                write_value(out, item, depth.map(|d| d + 1));
            }
            if let Some(d) = depth {
                out.push('\n');
                push_indent(out, d);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    // serde_json's Display for a string value is its escaped JSON literal.
    out.push_str(&serde_json::Value::String(s.to_string()).to_string());
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => ConfigValue::Number(n),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Array(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<ConfigValue> for serde_json::Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(b),
            ConfigValue::Number(n) => serde_json::Value::Number(n),
            ConfigValue::String(s) => serde_json::Value::String(s),
            ConfigValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            ConfigValue::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(Number::from(n))
    }
}
