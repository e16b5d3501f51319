//! End-to-end runs of the rentroll binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use lease_engine::Ledger;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CLEAN: &str = r#"{
    "amendments": [
        { "amendment_id": 1, "property_id": "P1", "tenant_id": "ACME", "sequence": 0,
          "status": "Activated", "type": "Original Lease", "suite": "100",
          "start_date": "2024-01-01", "end_date": "2028-12-31", "leased_area": 1200 }
    ],
    "charges": [
        { "charge_id": 10, "amendment_id": 1, "charge_code": "rent",
          "monthly_amount": "1500", "from_date": "2024-01-01", "to_date": null }
    ],
    "properties": [
        { "property_id": "P1", "code": "ALPHA", "name": "Alpha Plaza",
          "acquire_date": "2020-01-01", "dispose_date": null }
    ]
}"#;

/// Two activated rows for one lease plus an orphaned charge
const DIRTY: &str = r#"{
    "amendments": [
        { "amendment_id": 1, "property_id": "P1", "tenant_id": "ACME", "sequence": 0,
          "status": "Activated", "type": "Original Lease",
          "start_date": "2024-01-01", "end_date": "2028-12-31", "leased_area": 1200 },
        { "amendment_id": 2, "property_id": "P1", "tenant_id": "ACME", "sequence": 1,
          "status": "Activated", "type": "Expansion",
          "start_date": "2025-01-01", "end_date": "2028-12-31", "leased_area": 1800 }
    ],
    "charges": [
        { "charge_id": 10, "amendment_id": 1, "charge_code": "rent",
          "monthly_amount": "1500", "from_date": "2024-01-01", "to_date": null },
        { "charge_id": 20, "amendment_id": 2, "charge_code": "rent",
          "monthly_amount": "2250", "from_date": "2025-01-01", "to_date": null },
        { "charge_id": 30, "amendment_id": 77, "charge_code": "cam",
          "monthly_amount": "90", "from_date": "2024-01-01", "to_date": null }
    ],
    "properties": [
        { "property_id": "P1", "code": "ALPHA", "name": "Alpha Plaza",
          "acquire_date": "2020-01-01", "dispose_date": null }
    ]
}"#;

fn write_ledger(dir: &TempDir, name: &str, json: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, json).unwrap();
    path
}

fn rentroll(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rentroll"))
        .args(args)
        .output()
        .expect("failed to run rentroll")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_rent_roll_json_on_clean_ledger() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", CLEAN);

    let output = rentroll(&[
        "rent-roll",
        "--ledger",
        path_arg(&ledger),
        "--as-of",
        "2025-06-01",
        "--format",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["roll"]["leases"][0]["tenant_id"], "ACME");
    assert_eq!(value["roll"]["totals"]["lease_count"], 1);
    assert_eq!(value["integrity"]["as_of"], "2025-06-01");
}

#[test]
fn test_rent_roll_exits_one_when_integrity_fails() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", DIRTY);

    let output = rentroll(&["rent-roll", "--ledger", path_arg(&ledger), "--as-of", "2025-06-01"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RENT ROLL"));
    assert!(stdout.contains("duplicate_current"));
}

#[test]
fn test_validate_exits_one_on_critical_findings() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", DIRTY);

    let output = rentroll(&["validate", "--ledger", path_arg(&ledger), "--as-of", "2025-06-01"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("duplicate_current"));
    assert!(stdout.contains("FAILED"));
}

#[test]
fn test_missing_ledger_exits_two() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");

    let output = rentroll(&["validate", "--ledger", path_arg(&missing)]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read ledger"));
}

#[test]
fn test_reversed_absorption_interval_exits_two() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", CLEAN);

    let output = rentroll(&[
        "absorption",
        "--ledger",
        path_arg(&ledger),
        "--from",
        "2025-06-30",
        "--to",
        "2025-01-01",
    ]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_report_written_to_output_file() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", CLEAN);
    let report = dir.path().join("roll.md");

    let output = rentroll(&[
        "rent-roll",
        "--ledger",
        path_arg(&ledger),
        "--as-of",
        "2025-06-01",
        "--format",
        "markdown",
        "--output",
        path_arg(&report),
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    let written = fs::read_to_string(&report).unwrap();
    assert!(written.starts_with("# Rent Roll"));
}

#[test]
fn test_remediate_then_revert() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", DIRTY);
    let out_dir = dir.path().join("fixed");

    let output = rentroll(&[
        "remediate",
        "--ledger",
        path_arg(&ledger),
        "--as-of",
        "2025-06-01",
        "--out-dir",
        path_arg(&out_dir),
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["superseded"], 1);
    assert_eq!(value["summary"]["archived_charges"], 1);

    let remediated = out_dir.join("ledger-v2.json");
    let audit = out_dir.join("audit-v2.json");
    assert!(out_dir.join("archived-charges-v2.json").exists());

    let restored = dir.path().join("restored.json");
    let output = rentroll(&[
        "revert",
        "--ledger",
        path_arg(&remediated),
        "--audit",
        path_arg(&audit),
        "--out",
        path_arg(&restored),
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let original = Ledger::from_json(DIRTY).unwrap();
    let reverted = Ledger::from_json(&fs::read_to_string(&restored).unwrap()).unwrap();
    assert_eq!(reverted.version(), 1);
    assert_eq!(reverted.fingerprint().unwrap(), original.fingerprint().unwrap());
}

#[test]
fn test_revert_rejects_tampered_audit() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", DIRTY);
    let out_dir = dir.path().join("fixed");

    let output = rentroll(&[
        "remediate",
        "--ledger",
        path_arg(&ledger),
        "--as-of",
        "2025-06-01",
        "--out-dir",
        path_arg(&out_dir),
    ]);
    assert_eq!(output.status.code(), Some(0));

    let audit = out_dir.join("audit-v2.json");
    let mut chain: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&audit).unwrap()).unwrap();
    chain["events"][0]["actor"] = serde_json::Value::from("someone-else");
    fs::write(&audit, chain.to_string()).unwrap();

    let output = rentroll(&[
        "revert",
        "--ledger",
        path_arg(&out_dir.join("ledger-v2.json")),
        "--audit",
        path_arg(&audit),
        "--out",
        path_arg(&dir.path().join("restored.json")),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_trend_series_json() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", CLEAN);

    let output = rentroll(&[
        "trend",
        "--ledger",
        path_arg(&ledger),
        "--from",
        "2025-01-01",
        "--to",
        "2025-03-31",
        "--format",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let points = value.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[2]["as_of"], "2025-03-31");
}

#[test]
fn test_trend_exits_one_when_integrity_fails() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "ledger.json", DIRTY);

    let output = rentroll(&[
        "trend",
        "--ledger",
        path_arg(&ledger),
        "--from",
        "2025-01-01",
        "--to",
        "2025-03-31",
        "--format",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 3);
}
