//! Subcommand implementations.
//!
//! Each `run_*` function maps its outcome to a process exit code: 0 on
//! success, 1 when the input is invalid or an I/O step failed. Reports for
//! humans go to stderr; document output goes to stdout or `--output`.

use std::process::ExitCode;

use clap::ValueEnum;
use serde::Serialize;
use specsmith_model::{template, Document, TEMPLATE_KEYS};
use specsmith_spec_parser::{import, ImportResult};
use specsmith_telemetry::{
    log_export_completed, log_import_completed, log_io_error, log_normalize_completed,
    log_validation_completed, log_validation_failure,
};
use specsmith_validator::{validate, Diagnostic, ValidationReport};
use specsmith_writer::{serialize, serialize_schema};

use crate::io::{read_input, write_output, CliError};

/// Report format for `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Validation outcome for one input file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

#[derive(Debug, Serialize)]
struct Summary {
    total: usize,
    valid: usize,
    invalid: usize,
}

#[derive(Debug, Serialize)]
struct ValidateOutput<'a> {
    results: &'a [FileReport],
    summary: Summary,
}

/// Validate each file in turn.
pub async fn run_validate(specs: &[String], format: OutputFormat) -> ExitCode {
    let mut results = Vec::with_capacity(specs.len());
    for spec in specs {
        results.push(validate_file(spec).await);
    }

    match format {
        OutputFormat::Json => match render_json(&results) {
            Ok(json) => println!("{json}"),
            Err(err) => return fail(err),
        },
        OutputFormat::Text => eprint!("{}", render_text(&results)),
    }

    if results.iter().all(|r| r.report.is_valid) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Validate one file. A file that cannot be read counts as invalid.
pub async fn validate_file(spec: &str) -> FileReport {
    let report = match read_input(spec) {
        Ok(text) => validate(&text).await,
        Err(err) => {
            log_io_error!(file = %spec, error = %err, "cannot read spec");
            ValidationReport {
                is_valid: false,
                errors: vec![Diagnostic::document_error(err.to_string())],
                warnings: Vec::new(),
            }
        }
    };

    if report.is_valid {
        log_validation_completed!(
            file = %spec,
            warnings = report.warnings.len(),
            "spec is valid"
        );
    } else {
        log_validation_failure!(file = %spec, errors = report.errors.len(), "spec is invalid");
    }
    FileReport {
        file: spec.to_string(),
        report,
    }
}

pub fn render_text(results: &[FileReport]) -> String {
    let mut out = String::new();
    for result in results {
        let report = &result.report;
        if report.is_valid && report.warnings.is_empty() {
            out.push_str(&format!("✓ {} is valid\n", result.file));
        } else if report.is_valid {
            out.push_str(&format!(
                "✓ {} is valid (with {} warning(s))\n",
                result.file,
                report.warnings.len()
            ));
        } else {
            out.push_str(&format!("✗ {} has {} error(s)\n", result.file, report.errors.len()));
        }

        for err in &report.errors {
            out.push_str(&format!("  {}{}\n", location(err), err.message));
        }
        for warn in &report.warnings {
            out.push_str(&format!("  {}{} (warning)\n", location(warn), warn.message));
        }
    }

    let valid = results.iter().filter(|r| r.report.is_valid).count();
    out.push_str(&format!(
        "\nvalidated {} spec(s): {} valid, {} invalid\n",
        results.len(),
        valid,
        results.len() - valid
    ));
    out
}

/// `[path, line N]: ` prefix, or nothing for an unplaced document finding.
fn location(diagnostic: &Diagnostic) -> String {
    match (diagnostic.path.is_empty(), diagnostic.line) {
        (true, None) => String::new(),
        (true, Some(line)) => format!("[line {line}]: "),
        (false, None) => format!("[{}]: ", diagnostic.path),
        (false, Some(line)) => format!("[{}, line {line}]: ", diagnostic.path),
    }
}

pub fn render_json(results: &[FileReport]) -> Result<String, CliError> {
    let valid = results.iter().filter(|r| r.report.is_valid).count();
    let output = ValidateOutput {
        results,
        summary: Summary {
            total: results.len(),
            valid,
            invalid: results.len() - valid,
        },
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Import a YAML/JSON spec and write the model snapshot as JSON.
///
/// Nothing is written when the import reports errors.
pub fn run_import(spec: &str, output: Option<&str>) -> ExitCode {
    let result = match read_input(spec) {
        Ok(text) => import(&text),
        Err(err) => return fail(err),
    };
    report_import(spec, &result);

    let Some(document) = result.document.filter(|_| result.success) else {
        return ExitCode::from(1);
    };
    match document.to_json() {
        Ok(json) => finish(write_output(output, &format!("{json}\n")), || {
            log_import_completed!(file = %spec, paths = document.paths.len(), "spec imported");
        }),
        Err(err) => fail(err.into()),
    }
}

/// Render a persisted model snapshot as OpenAPI YAML.
pub fn run_export(snapshot: &str, output: Option<&str>) -> ExitCode {
    match export_snapshot(snapshot) {
        Ok(yaml) => finish(write_output(output, &yaml), || {
            log_export_completed!(file = %snapshot, bytes = yaml.len(), "snapshot exported");
        }),
        Err(err) => fail(err),
    }
}

pub fn export_snapshot(snapshot: &str) -> Result<String, CliError> {
    let text = read_input(snapshot)?;
    let document = Document::from_json(&text).map_err(|source| CliError::Snapshot {
        path: snapshot.to_string(),
        source,
    })?;
    Ok(serialize(&document))
}

/// Import a spec and serialize it straight back, producing the canonical
/// form of the document.
pub fn run_normalize(spec: &str, output: Option<&str>) -> ExitCode {
    let result = match read_input(spec) {
        Ok(text) => import(&text),
        Err(err) => return fail(err),
    };
    report_import(spec, &result);

    let Some(document) = result.document.filter(|_| result.success) else {
        return ExitCode::from(1);
    };
    let yaml = serialize(&document);
    finish(write_output(output, &yaml), || {
        log_normalize_completed!(file = %spec, warnings = result.warnings.len(), "spec normalized");
    })
}

/// List template keys, or print one template as a component schema.
pub fn run_templates(key: Option<&str>) -> ExitCode {
    let Some(key) = key else {
        for key in TEMPLATE_KEYS {
            println!("{key}");
        }
        return ExitCode::SUCCESS;
    };

    match template(key) {
        Some(schema) => {
            print!("{}", serialize_schema(&schema));
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("error: unknown template '{key}' (expected one of: {})", TEMPLATE_KEYS.join(", "));
            ExitCode::from(1)
        }
    }
}

fn report_import(spec: &str, result: &ImportResult) {
    for warning in &result.warnings {
        eprintln!("warning: {spec}: {warning}");
    }
    for error in &result.errors {
        eprintln!("error: {spec}: {error}");
    }
}

fn finish(written: Result<(), CliError>, on_success: impl FnOnce()) -> ExitCode {
    match written {
        Ok(()) => {
            on_success();
            ExitCode::SUCCESS
        }
        Err(err) => fail(err),
    }
}

fn fail(err: CliError) -> ExitCode {
    log_io_error!(error = %err, "command failed");
    eprintln!("error: {err}");
    ExitCode::from(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "openapi: 3.0.0\ninfo:\n  title: T\n  version: '1'\npaths: {}\n";

    fn report(file: &str, errors: Vec<Diagnostic>, warnings: Vec<Diagnostic>) -> FileReport {
        FileReport {
            file: file.to_string(),
            report: ValidationReport {
                is_valid: errors.is_empty(),
                errors,
                warnings,
            },
        }
    }

    #[test]
    fn text_report_lists_findings_and_summary() {
        let results = vec![
            report("a.yaml", Vec::new(), Vec::new()),
            report(
                "b.yaml",
                Vec::new(),
                vec![Diagnostic::warning(vec!["paths", "/a", "get"], "no operationId").at_line(Some(7))],
            ),
            report(
                "c.yaml",
                vec![Diagnostic::document_error("YAML parse error: bad").at_line(Some(2))],
                Vec::new(),
            ),
        ];
        let text = render_text(&results);
        assert!(text.contains("✓ a.yaml is valid\n"));
        assert!(text.contains("✓ b.yaml is valid (with 1 warning(s))\n"));
        assert!(text.contains("  [paths./a.get, line 7]: no operationId (warning)\n"));
        assert!(text.contains("✗ c.yaml has 1 error(s)\n  [line 2]: YAML parse error: bad\n"));
        assert!(text.ends_with("validated 3 spec(s): 2 valid, 1 invalid\n"));
    }

    #[test]
    fn json_report_has_summary() {
        let results = vec![report(
            "a.yaml",
            vec![Diagnostic::error(vec!["openapi"], "missing")],
            Vec::new(),
        )];
        let json: serde_json::Value = serde_json::from_str(&render_json(&results).unwrap()).unwrap();
        assert_eq!(json["results"][0]["file"], "a.yaml");
        assert_eq!(json["results"][0]["isValid"], false);
        assert_eq!(json["results"][0]["errors"][0]["path"], "openapi");
        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["summary"]["invalid"], 1);
    }

    #[tokio::test]
    async fn unreadable_file_is_invalid() {
        let result = validate_file("/nonexistent/spec.yaml").await;
        assert!(!result.report.is_valid);
        assert!(result.report.errors[0].message.starts_with("cannot read"));
    }

    #[tokio::test]
    async fn readable_file_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        let result = validate_file(path.to_str().unwrap()).await;
        assert!(result.report.is_valid, "{:?}", result.report.errors);
    }

    #[test]
    fn export_reads_legacy_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(
            &path,
            r#"{
  "info": {"title": "Legacy", "version": "2.0.0"},
  "paths": [{"id": "p1", "path": "/users", "method": "get", "summary": "List users"}]
}"#,
        )
        .unwrap();
        let yaml = export_snapshot(path.to_str().unwrap()).unwrap();
        assert!(yaml.contains("  title: 'Legacy'\n"));
        assert!(yaml.contains("  '/users':\n    get:\n      summary: 'List users'\n"));
    }

    #[test]
    fn export_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "not json").unwrap();
        let err = export_snapshot(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CliError::Snapshot { .. }));
    }
}
