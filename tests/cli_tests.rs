use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use splitledger::config::ROSTER_ENV;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use uuid::Uuid;

const LEDGER: &str = r#"{
    "roster": ["A", "B"],
    "expenses": [
        { "payer": "A", "amount": "100", "beneficiaries": ["A", "B"], "memo": "Dinner" }
    ]
}"#;

/// Ledger file in the system temp dir, removed on drop.
struct TempLedger(PathBuf);

impl TempLedger {
    fn new(content: &str) -> Self {
        let path = std::env::temp_dir().join(format!("splitledger-{}.json", Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        Self(path)
    }

    fn path(&self) -> &str {
        self.0.to_str().unwrap()
    }
}

impl Drop for TempLedger {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn run(args: &[&str], env_roster: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_splitledger"));
    cmd.args(args).env_remove(ROSTER_ENV);
    if let Some(roster) = env_roster {
        cmd.env(ROSTER_ENV, roster);
    }
    cmd.output().unwrap()
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn as_decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn participants(balances: &Value) -> Vec<String> {
    balances
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["participant"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn balances_json_uses_file_roster() {
    let ledger = TempLedger::new(LEDGER);
    let out = run(&["balances", "--input", ledger.path(), "--format", "json"], None);
    let balances = json(&out);

    assert_eq!(participants(&balances), vec!["A", "B"]);
    assert_eq!(as_decimal(&balances[0]["net_amount"]), dec!(50));
    assert_eq!(as_decimal(&balances[1]["net_amount"]), dec!(-50));
}

#[test]
fn env_roster_overrides_file_roster() {
    let ledger = TempLedger::new(LEDGER);
    let out = run(
        &["balances", "--input", ledger.path(), "--format", "json"],
        Some("A, B, C"),
    );
    assert_eq!(participants(&json(&out)), vec!["A", "B", "C"]);
}

#[test]
fn roster_flag_overrides_env_roster() {
    let ledger = TempLedger::new(LEDGER);
    let out = run(
        &[
            "balances",
            "--input",
            ledger.path(),
            "--format",
            "json",
            "--roster",
            "A,B,C,D",
        ],
        Some("A,B,C"),
    );
    assert_eq!(participants(&json(&out)), vec!["A", "B", "C", "D"]);
}

#[test]
fn settle_json_lists_payments() {
    let ledger = TempLedger::new(LEDGER);
    let out = run(&["settle", "--input", ledger.path(), "--format", "json"], None);
    let result = json(&out);

    assert_eq!(result["settlements"][0]["from"], "B");
    assert_eq!(result["settlements"][0]["to"], "A");
    assert_eq!(as_decimal(&result["settlements"][0]["amount"]), dec!(50));
    assert_eq!(result["residual"].as_array().unwrap().len(), 0);
}

#[test]
fn breakdown_json_for_debtor() {
    let ledger = TempLedger::new(LEDGER);
    let out = run(
        &[
            "breakdown",
            "--input",
            ledger.path(),
            "--participant",
            "B",
            "--format",
            "json",
        ],
        None,
    );
    let breakdown = json(&out);

    assert_eq!(breakdown["participant"], "B");
    assert_eq!(breakdown["entries"][0]["direction"], "owes");
    assert_eq!(breakdown["entries"][0]["counterparty"], "A");
}

#[test]
fn missing_roster_fails() {
    let ledger = TempLedger::new(r#"{ "expenses": [] }"#);
    let out = run(&["balances", "--input", ledger.path()], None);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no roster configured"));
}

#[test]
fn text_output_shows_plan() {
    let ledger = TempLedger::new(LEDGER);
    let out = run(&["settle", "--input", ledger.path()], None);

    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("=== Settlement Plan ==="));
    assert!(text.contains("pays"));
}
