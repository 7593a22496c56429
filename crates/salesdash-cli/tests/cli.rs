//! Command-line behavior of the salesdash binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LEDGER: &str = "\
Date,Particulars,Vch No.,Quantity,Rate,Value,Gross Total
01-01-2024,Acme,INV1,,,,\"1,000 Dr\"
,Widget,,5 pcs,100,500,
,Gadget,,3,166.67,500,
02-01-2024,Beta Stores,INV2,,,,N/A
,Gizmo,,2 nos,50,100,
";

const POS: &str = "\
Date,Store,Product,Quantity,Amount
01-03-2024,Mall,Shirt,2,100
02-03-2024,Mall,Pants,1,50
";

/// Binary with HOME pointed at a scratch dir so no user config is read.
fn salesdash(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("salesdash").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn invoices_text_table() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "ledger.csv", LEDGER);

    salesdash(tmp.path())
        .arg("invoices")
        .arg(tmp.path().join("ledger.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("INV1"))
        .stdout(predicate::str::contains("Acme"))
        .stdout(predicate::str::contains("1000.00"))
        .stdout(predicate::str::contains("Unparseable amounts: 1"));
}

#[test]
fn invoices_json_from_directory() {
    let tmp = TempDir::new().unwrap();
    let b2b = tmp.path().join("b2b");
    write(&b2b, "ledger.csv", LEDGER);
    write(&b2b, "notes.txt", "ignored");

    let output = salesdash(tmp.path())
        .args(["invoices", "--format", "json"])
        .arg(&b2b)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["invoices"].as_array().unwrap().len(), 2);
    assert_eq!(json["line_items"].as_array().unwrap().len(), 3);
    assert_eq!(json["invoices"][1]["gross_total"], serde_json::Value::Null);
}

#[test]
fn invoices_vendor_filter() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "ledger.csv", LEDGER);

    salesdash(tmp.path())
        .args(["invoices", "--vendor", "beta"])
        .arg(tmp.path().join("ledger.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("INV2"))
        .stdout(predicate::str::contains("Acme").not());
}

#[test]
fn invoices_without_data() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "empty.csv", "");

    salesdash(tmp.path())
        .arg("invoices")
        .arg(tmp.path().join("empty.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No data"));
}

#[test]
fn sales_summary_totals() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "pos.csv", POS);

    salesdash(tmp.path())
        .args(["sales", "--channel", "pos"])
        .arg(tmp.path().join("pos.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:        2"))
        .stdout(predicate::str::contains("150.00"))
        .stdout(predicate::str::contains("Shirt"));
}

#[test]
fn sales_date_filter() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "pos.csv", POS);

    salesdash(tmp.path())
        .args(["sales", "--from", "2024-03-02"])
        .arg(tmp.path().join("pos.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:        1"))
        .stdout(predicate::str::contains("Shirt").not());
}

#[test]
fn report_over_folders() {
    let tmp = TempDir::new().unwrap();
    let pos = tmp.path().join("pos");
    let b2b = tmp.path().join("b2b");
    write(&pos, "march.csv", POS);
    write(&b2b, "ledger.csv", LEDGER);

    salesdash(tmp.path())
        .arg("report")
        .arg("--pos-dir")
        .arg(&pos)
        .arg("--online-dir")
        .arg(tmp.path().join("missing"))
        .arg("--b2b-dir")
        .arg(&b2b)
        .assert()
        .success()
        .stdout(predicate::str::contains("pos: 2 records, 150.00"))
        .stdout(predicate::str::contains("online: no data"))
        .stdout(predicate::str::contains("1150.00"));
}

#[test]
fn report_counts_headerless_b2b_items() {
    let tmp = TempDir::new().unwrap();
    let b2b = tmp.path().join("b2b");
    write(
        &b2b,
        "items.csv",
        "Particulars,Vch No.,Quantity,Value\n,INV9,,\nWidget,,2,40\n",
    );

    salesdash(tmp.path())
        .arg("report")
        .arg("--pos-dir")
        .arg(tmp.path().join("none"))
        .arg("--online-dir")
        .arg(tmp.path().join("none"))
        .arg("--b2b-dir")
        .arg(&b2b)
        .assert()
        .success()
        .stdout(predicate::str::contains("b2b: 1 records, 40.00"));
}

#[test]
fn config_init_get_set() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("salesdash.json");

    salesdash(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    salesdash(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "b2b.failed_parse"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exclude\""));

    salesdash(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "b2b.failed_parse", "zero"])
        .assert()
        .success();

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("\"zero\""));

    salesdash(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "b2b.no_such_key", "1"])
        .assert()
        .failure();
}
