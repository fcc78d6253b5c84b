//! plandiff configuration loading and validation.
//!
//! This crate provides:
//! - The immutable [`IgnoreRuleSet`] and its JSON file format
//! - Config path resolution (explicit → env → XDG → none)
//! - Shape validation with distinct missing/malformed/invalid errors

pub mod ignore;
pub mod resolve;
pub mod validate;

pub use ignore::{IgnoreRuleSet, IgnoreRuleSetBuilder};
pub use resolve::{load_ignore_rules, resolve_ignore_config, ConfigSource, IgnoreConfigPath};
pub use validate::{ConfigError, ConfigResult};
