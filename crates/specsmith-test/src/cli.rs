//! CLI regression tests for the `specsmith` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes and output formats.
//!
//! Run with: `cargo test -p specsmith-test`
//! Requires the `specsmith` binary to be built first (`cargo build -p specsmith`).

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;
use specsmith_model::Document;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `specsmith` binary.
fn specsmith() -> Command {
    // cargo_bin is deprecated for custom build-dir setups; fine for standard workspace use.
    #[allow(deprecated)]
    Command::cargo_bin("specsmith")
        .expect("specsmith binary not found, run `cargo build -p specsmith` first")
}

/// Absolute path to the shared test fixtures directory.
fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/specsmith-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("tests/fixtures")
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout should be valid UTF-8")
}

// ---------------------------------------------------------------------------
// specsmith validate
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_spec_exits_zero() {
    specsmith()
        .args(["validate", "--spec"])
        .arg(fixtures().join("minimal.yaml"))
        .assert()
        .success()
        .stderr(contains("is valid"));
}

#[test]
fn validate_invalid_spec_exits_one() {
    specsmith()
        .args(["validate", "--spec"])
        .arg(fixtures().join("invalid-parse-error.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("YAML parse error"));
}

#[test]
fn validate_missing_file_exits_one() {
    specsmith()
        .args(["validate", "--spec", "this-file-does-not-exist.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("cannot read this-file-does-not-exist.yaml"));
}

#[test]
fn validate_reports_missing_path_parameter_with_line() {
    specsmith()
        .args(["validate", "--spec"])
        .arg(fixtures().join("missing-path-param.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("[paths./items/{id}.get, line 7]"))
        .stderr(contains("missing path parameter 'id'"));
}

#[test]
fn validate_warnings_keep_exit_zero() {
    specsmith()
        .args(["validate", "--spec"])
        .arg(fixtures().join("warnings-only.yaml"))
        .assert()
        .success()
        .stderr(contains("valid (with 1 warning(s))"));
}

#[test]
fn validate_multiple_specs_summarizes() {
    specsmith()
        .args(["validate", "--spec"])
        .arg(fixtures().join("minimal.yaml"))
        .arg(fixtures().join("missing-path-param.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("validated 2 spec(s): 1 valid, 1 invalid"));
}

#[test]
fn validate_json_format_outputs_valid_json() {
    let s = stdout_of(
        specsmith()
            .args(["validate", "--spec"])
            .arg(fixtures().join("minimal.yaml"))
            .args(["--format", "json"]),
    );
    let v: serde_json::Value =
        serde_json::from_str(&s).expect("--format json output should be valid JSON");
    assert_eq!(v["summary"]["total"], 1);
    assert_eq!(v["summary"]["valid"], 1);
    assert_eq!(v["results"][0]["isValid"], true);
}

#[test]
fn validate_json_format_invalid_spec_exits_one_with_json() {
    let output = specsmith()
        .args(["validate", "--spec"])
        .arg(fixtures().join("missing-path-param.yaml"))
        .args(["--format", "json"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON on failure");
    assert_eq!(v["summary"]["invalid"], 1);
    assert_eq!(v["results"][0]["errors"][0]["line"], 7);
}

#[test]
fn validate_rejects_unknown_format() {
    specsmith()
        .args(["validate", "--spec"])
        .arg(fixtures().join("minimal.yaml"))
        .args(["--format", "xml"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn validate_requires_spec() {
    specsmith().arg("validate").assert().failure().code(2);
}

// ---------------------------------------------------------------------------
// specsmith import / export / normalize
// ---------------------------------------------------------------------------

#[test]
fn import_writes_snapshot() {
    let tmp = TempDir::new().expect("temp dir");
    let out = tmp.path().join("doc.json");

    specsmith()
        .args(["import", "--spec"])
        .arg(fixtures().join("petstore.yaml"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let json = std::fs::read_to_string(&out).expect("snapshot written");
    let doc = Document::from_json(&json).expect("snapshot decodes");
    assert_eq!(doc.info.title, "Petstore");
    assert_eq!(doc.paths.len(), 2);
    assert!(doc.schema("Pet").is_some());
}

#[test]
fn import_prints_warnings_to_stderr() {
    specsmith()
        .args(["import", "--spec"])
        .arg(fixtures().join("petstore.yaml"))
        .assert()
        .success()
        .stderr(contains("warning:"))
        .stderr(contains("HEAD /pets: method is not supported"));
}

#[test]
fn import_unparseable_spec_exits_one() {
    let tmp = TempDir::new().expect("temp dir");
    let out = tmp.path().join("doc.json");

    specsmith()
        .args(["import", "--spec"])
        .arg(fixtures().join("invalid-parse-error.yaml"))
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("error:"));
    assert!(!out.exists(), "no snapshot on failed import");
}

#[test]
fn export_legacy_snapshot_to_stdout() {
    let yaml = stdout_of(
        specsmith()
            .args(["export", "--document"])
            .arg(fixtures().join("legacy-document.json")),
    );
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).expect("export is YAML");
    assert_eq!(value["openapi"], "3.0.0");
    assert_eq!(value["info"]["title"], "Legacy API");
    assert_eq!(value["paths"]["/users"]["get"]["operationId"], "listUsers");
}

#[test]
fn export_invalid_snapshot_exits_one() {
    specsmith()
        .args(["export", "--document"])
        .arg(fixtures().join("minimal.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("invalid document snapshot"));
}

#[test]
fn import_then_export_matches_normalize() {
    let tmp = TempDir::new().expect("temp dir");
    let snapshot = tmp.path().join("doc.json");
    let spec = fixtures().join("petstore.yaml");

    specsmith()
        .args(["import", "--spec"])
        .arg(&spec)
        .arg("--output")
        .arg(&snapshot)
        .assert()
        .success();

    let exported = stdout_of(specsmith().args(["export", "--document"]).arg(&snapshot));
    let normalized = stdout_of(specsmith().args(["normalize", "--spec"]).arg(&spec));
    assert_eq!(exported, normalized);
}

#[test]
fn normalize_is_a_fixed_point() {
    let tmp = TempDir::new().expect("temp dir");
    let once = tmp.path().join("once.yaml");
    let twice = tmp.path().join("twice.yaml");

    specsmith()
        .args(["normalize", "--spec"])
        .arg(fixtures().join("petstore.yaml"))
        .arg("--output")
        .arg(&once)
        .assert()
        .success();
    specsmith()
        .args(["normalize", "--spec"])
        .arg(&once)
        .arg("--output")
        .arg(&twice)
        .assert()
        .success();

    let first = std::fs::read_to_string(&once).expect("first pass");
    let second = std::fs::read_to_string(&twice).expect("second pass");
    assert_eq!(first, second);
}

#[test]
fn normalized_output_validates() {
    let tmp = TempDir::new().expect("temp dir");
    let out = tmp.path().join("normalized.yaml");

    specsmith()
        .args(["normalize", "--spec"])
        .arg(fixtures().join("petstore.yaml"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    specsmith()
        .args(["validate", "--spec"])
        .arg(&out)
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// specsmith templates
// ---------------------------------------------------------------------------

#[test]
fn templates_lists_keys() {
    let out = stdout_of(specsmith().arg("templates"));
    assert_eq!(out, "jsonApiVersion\nerrorDetail\nerror\npagination\n");
}

#[test]
fn templates_prints_schema() {
    specsmith()
        .args(["templates", "--key", "error"])
        .assert()
        .success()
        .stdout(contains("Error:\n  type: object\n"))
        .stdout(contains("$ref: '#/components/schemas/ErrorDetail'"));
}

#[test]
fn templates_unknown_key_exits_one() {
    specsmith()
        .args(["templates", "--key", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("unknown template 'nope'"));
}

// ---------------------------------------------------------------------------
// global flags
// ---------------------------------------------------------------------------

#[test]
fn json_logs_go_to_stderr() {
    specsmith()
        .env_remove("RUST_LOG")
        .args(["--log-level", "info", "--log-format", "json", "validate", "--spec"])
        .arg(fixtures().join("minimal.yaml"))
        .assert()
        .success()
        .stderr(contains("\"event\":\"validation_completed\""));
}

#[test]
fn invalid_log_format_exits_two() {
    specsmith()
        .args(["--log-format", "xml", "templates"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn version_flag() {
    specsmith()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("specsmith"));
}
