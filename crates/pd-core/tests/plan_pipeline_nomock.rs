//! Full pipeline over real files: plan JSON and ignore config on disk, a
//! real salt store, snapshots built from plans, then compared.

use pd_config::load_ignore_rules;
use pd_core::compare::{CellState, Comparator, CompareOptions, RevealPolicy};
use pd_core::plan::{PlanView, SnapshotBuilder};
use pd_redact::{is_obfuscated_placeholder, Obfuscator, SaltStore};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

fn write_plan(dir: &Path, name: &str, password: &str, sku: &str, tag: &str) -> std::path::PathBuf {
    let plan = json!({
        "format_version": "1.2",
        "resource_changes": [
            {
                "address": "azurerm_postgresql_server.db",
                "type": "azurerm_postgresql_server",
                "change": {
                    "actions": ["no-op"],
                    "before": {
                        "name": "db",
                        "sku_name": sku,
                        "administrator_login_password": password,
                        "tags": {"deployed": tag}
                    },
                    "before_sensitive": {"administrator_login_password": true}
                }
            }
        ]
    });
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(&plan).unwrap()).unwrap();
    path
}

fn load(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn plans_on_disk_compare_with_obfuscation() {
    let dir = TempDir::new().unwrap();
    let dev_plan = write_plan(dir.path(), "dev.json", "dev-password-1", "GP_Gen5_2", "monday");
    let prod_plan = write_plan(dir.path(), "prod.json", "prod-password-9", "GP_Gen5_4", "friday");

    let ignore_path = dir.path().join("ignore.json");
    std::fs::write(
        &ignore_path,
        r#"{"global_ignores": ["tags"], "resource_ignores": {"azurerm_postgresql_server": {"name": "naming differs"}}}"#,
    )
    .unwrap();
    let (rules, _) = load_ignore_rules(Some(ignore_path.as_path())).unwrap();

    let store = SaltStore::new(dir.path().join("salt.json"), dir.path().join("salt.key"));
    let obfuscator = Obfuscator::new(store.load_or_create().unwrap());

    let (dev, dev_warnings) = SnapshotBuilder::new("dev", 0)
        .with_view(PlanView::Before)
        .with_plan(&load(&dev_plan))
        .build();
    let (prod, _) = SnapshotBuilder::new("prod", 1).with_plan(&load(&prod_plan)).build();
    assert!(dev_warnings.is_empty());

    let report = Comparator::new()
        .with_rules(&rules)
        .with_obfuscator(&obfuscator)
        .compare(&[dev, prod])
        .unwrap();

    let res = report.resource("azurerm_postgresql_server.db").unwrap();
    assert!(res.has_differences);
    assert_eq!(res.ignored_attribute_count, 2);
    let names: Vec<_> = res.attribute_diffs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["administrator_login_password", "sku_name"]);

    let password = &res.attribute_diffs[0];
    assert!(password.sensitive && password.sensitive_changed);
    let cells = &res.rendering("administrator_login_password").unwrap().cells;
    assert_eq!(cells[1].state, CellState::Changed);
    assert!(is_obfuscated_placeholder(&cells[1].markup.plain_text()));

    let serialized = serde_json::to_string(&report).unwrap();
    assert!(!serialized.contains("dev-password-1"));
    assert!(!serialized.contains("prod-password-9"));

    // Same salt store, same digests.
    let again = Obfuscator::new(store.load().unwrap());
    let (dev, _) = SnapshotBuilder::new("dev", 0).with_plan(&load(&dev_plan)).build();
    let (prod, _) = SnapshotBuilder::new("prod", 1).with_plan(&load(&prod_plan)).build();
    let options = CompareOptions {
        run_id: Some(report.run_id.clone()),
        ..CompareOptions::default()
    };
    let second = Comparator::new()
        .with_rules(&rules)
        .with_obfuscator(&again)
        .with_options(options)
        .compare(&[dev, prod])
        .unwrap();
    assert_eq!(second.resources, report.resources);
}

#[test]
fn reveal_all_shows_plaintext_diff() {
    let dir = TempDir::new().unwrap();
    let dev_plan = write_plan(dir.path(), "dev.json", "password-1", "B1", "x");
    let prod_plan = write_plan(dir.path(), "prod.json", "password-2", "B1", "x");

    let (dev, _) = SnapshotBuilder::new("dev", 0).with_plan(&load(&dev_plan)).build();
    let (prod, _) = SnapshotBuilder::new("prod", 1).with_plan(&load(&prod_plan)).build();
    let options = CompareOptions {
        reveal: RevealPolicy::All,
        ..CompareOptions::default()
    };
    let report = Comparator::new().with_options(options).compare(&[dev, prod]).unwrap();

    let res = report.resource("azurerm_postgresql_server.db").unwrap();
    let cells = &res.rendering("administrator_login_password").unwrap().cells;
    assert_eq!(cells[1].markup.to_marked_text(), "\"password-[+2+]\"");
    assert!(report.warnings.is_empty());
}

#[test]
fn missing_ignore_config_is_fatal_before_comparison() {
    let dir = TempDir::new().unwrap();
    let err = load_ignore_rules(Some(dir.path().join("nope.json").as_path())).unwrap_err();
    let unified: pd_common::Error = err.into();
    assert_eq!(unified.code(), 10);
}
