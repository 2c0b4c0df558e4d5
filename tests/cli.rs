use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("inventory-guardian");
    cmd.current_dir(dir).env_remove("RUST_LOG").arg("--no-color");
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn web_port_inventory() -> TempDir {
    let tmp = TempDir::new().expect("create temp dir");
    write(tmp.path(), "group_vars/all.yml", "web_port: \"80\"\n");
    write(tmp.path(), "host_vars/web1.yml", "web_port: \"{{ web_port }}\"\n");
    tmp
}

fn clean_inventory() -> TempDir {
    let tmp = TempDir::new().expect("create temp dir");
    write(
        tmp.path(),
        "group_vars/all.yml",
        "app_host: example.org\napp_url: \"https://{{ app_host }}/\"\n",
    );
    write(tmp.path(), "host_vars/web1.yml", "app_host: web1.example.org\n");
    tmp
}

#[test]
fn check_passes_on_clean_inventory() {
    let tmp = clean_inventory();

    cmd(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("all variables (2) are defined"));
}

#[test]
fn check_lists_only_offending_names() {
    let tmp = web_port_inventory();

    cmd(tmp.path())
        .args(["check", "--host", "web1"])
        .assert()
        .code(1)
        .stdout(contains("FAILED definitions"))
        .stdout(contains("    web_port\n"));
}

#[test]
fn check_error_budget_and_filter() {
    let tmp = web_port_inventory();

    cmd(tmp.path())
        .args(["check", "--host", "web1", "--error-assume", "1"])
        .assert()
        .success();

    cmd(tmp.path())
        .args(["check", "--host", "web1", "--error-filter", "^web_"])
        .assert()
        .success()
        .stdout(contains("filtered by this regex: `^web_`"));
}

#[test]
fn check_json_output_is_clean() {
    let tmp = web_port_inventory();

    let out = cmd(tmp.path())
        .args(["--verbose", "check", "--host", "web1", "--format", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&out).expect("valid json output");
    assert_eq!(report["variables"], serde_json::json!(["web_port"]));
    assert_eq!(report["override_audit"]["duplicates"]["web_port"], 2);
    assert_eq!(report["definition_audit"]["residual"], serde_json::json!(["web_port"]));
}

#[test]
fn check_audits_one_host_at_a_time() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "group_vars/all.yml", "app_port: \"80\"\n");
    write(tmp.path(), "group_vars/web.yml", "app_user: www\n");
    write(tmp.path(), "host_vars/web1.yml", "app_port: \"8081\"\n");
    write(tmp.path(), "host_vars/web2.yml", "app_port: \"8082\"\n");

    for host in ["web1", "web2"] {
        let out = cmd(tmp.path())
            .args(["check", "--host", host, "--group", "web", "--format", "json"])
            .args(["--fatal-overrides"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let report: Value = serde_json::from_slice(&out).expect("valid json output");
        assert_eq!(report["override_audit"]["duplicates"]["app_port"], 2);
        assert_eq!(report["override_audit"]["multicates"], serde_json::json!({}));
        assert_eq!(report["summary"]["total_sources"], 3);
    }
}

#[test]
fn check_rejects_invalid_host_name() {
    let tmp = clean_inventory();

    cmd(tmp.path())
        .args(["check", "--host", "../etc"])
        .assert()
        .code(1)
        .stderr(contains("Invalid host or group name"));
}

#[test]
fn check_rejects_invalid_regex() {
    let tmp = clean_inventory();

    cmd(tmp.path())
        .args(["check", "--from-pattern", "("])
        .assert()
        .code(1)
        .stderr(contains("Configuration error"));
}

#[test]
fn discovered_config_is_applied() {
    let tmp = web_port_inventory();
    write(
        tmp.path(),
        "inventory_guardian.yaml",
        "version: \"1.0\"\ntarget:\n  host: web1\nescalation:\n  definitions: false\n",
    );

    cmd(tmp.path()).arg("check").assert().success();
}

#[test]
fn variables_lists_counts_and_prefixes() {
    let tmp = web_port_inventory();

    cmd(tmp.path())
        .args(["variables", "--host", "web1"])
        .assert()
        .success()
        .stdout(contains("web_port").and(contains("2")).and(contains("web_")));
}

#[test]
fn explain_known_and_unknown_concerns() {
    let tmp = TempDir::new().unwrap();

    cmd(tmp.path())
        .args(["explain", "namespace-onewords"])
        .assert()
        .success()
        .stdout(contains("consider simplifying variable names"));

    cmd(tmp.path())
        .args(["explain", "bogus"])
        .assert()
        .code(1)
        .stdout(contains("namespace-avguse"));
}

#[test]
fn validate_config_reports_errors() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "good.yaml", "version: \"1.0\"\n");
    write(tmp.path(), "bad.yaml", "version: \"2.0\"\n");

    cmd(tmp.path())
        .args(["validate-config", "good.yaml"])
        .assert()
        .success()
        .stdout(contains("Configuration is valid"));

    cmd(tmp.path())
        .args(["validate-config", "bad.yaml"])
        .assert()
        .code(1)
        .stderr(contains("Unsupported configuration version"));
}
