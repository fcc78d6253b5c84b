//! plandiff core library.
//!
//! Compares infrastructure plan snapshots across named environments:
//! - [`plan`]: builds [`EnvironmentSnapshot`]s from plan JSON
//! - [`filter`]: strips ignored attributes before comparison
//! - [`compare`]: N-way, baseline-relative comparison
//! - [`extract`]: reduces a resource to its differing attributes
//! - [`render`]: line- and character-level highlighting
//!
//! The engine performs no file I/O; callers load plans, ignore rules and
//! the salt store and pass them in.
//!
//! ```
//! use pd_common::{ConfigValue, EnvironmentSnapshot, ResourceRecord};
//! use pd_core::compare::compare;
//! use serde_json::json;
//!
//! let record = |sku: &str| {
//!     ResourceRecord::new("azurerm_app.web", "azurerm_app", ConfigValue::from(json!({"sku": sku})))
//! };
//! let snapshots = vec![
//!     EnvironmentSnapshot::from_records("dev", 0, vec![record("S1")]),
//!     EnvironmentSnapshot::from_records("prod", 1, vec![record("P1")]),
//! ];
//! let report = compare(&snapshots, None).unwrap();
//! assert_eq!(report.summary.resources_with_differences, 1);
//! ```

pub mod compare;
pub mod extract;
pub mod filter;
pub mod logging;
pub mod plan;
pub mod render;

pub use compare::{
    compare, CellState, Comparator, CompareOptions, ComparisonReport, ComparisonSummary,
    ComparisonWarning, ResourceComparison, RevealPolicy,
};
pub use extract::{AttributeDiff, AttributeKind, AttributeValue};
pub use plan::{KnownAfterApplyResolver, PlanView, SnapshotBuilder};
pub use render::{render, render_with, LineChange, Markup, RenderOptions};

pub use pd_common::{ConfigValue, EnvironmentSnapshot, Error, ResourceRecord, Result};
pub use pd_config::IgnoreRuleSet;
pub use pd_redact::Obfuscator;
