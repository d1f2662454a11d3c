// SPDX-FileCopyrightText: 2026 PC-Agent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests that run the compiled `pcagent` binary.

use std::io::Write;
use std::process::Command;

fn pcagent(config: &str, args: &[&str]) -> std::process::Output {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config.as_bytes()).unwrap();
    Command::new(env!("CARGO_BIN_EXE_pcagent"))
        .arg("--config")
        .arg(file.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn route_json_reports_tiers() {
    let output = pcagent("", &["route", "open chrome", "--json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["tier"], "rule");
    assert_eq!(value[0]["description"], "open chrome");
}

#[test]
fn status_json_uses_configured_limit() {
    let output = pcagent("[budget]\ndaily_limit = 3.0\n", &["status", "--json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["daily_limit"], 3.0);
    assert_eq!(value["status"]["daily_remaining"], 3.0);
}

#[test]
fn invalid_config_exits_nonzero() {
    let output = pcagent("[budget]\ndaily_limt = 3.0\n", &["status"]);
    assert!(!output.status.success());
}

#[test]
fn simulate_reads_task_file() {
    let mut tasks = tempfile::NamedTempFile::new().unwrap();
    writeln!(tasks, "# comment\nopen chrome\nclick save").unwrap();
    let path = tasks.path().to_string_lossy().into_owned();

    let output = pcagent(
        "",
        &["simulate", "--file", &path, "--seed", "3", "--mode", "performance", "--json"],
    );
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["mode"], "performance");
    assert_eq!(value["runs"].as_array().unwrap().len(), 2);
    assert_eq!(value["stats"]["total_decisions"], 2);
    // Both subtasks stay on the free rule tier.
    assert_eq!(value["summary"]["success_rate"], 1.0);
    assert_eq!(value["summary"]["cost_savings_vs_baseline"], 1.0);
}
