//! Output rendering for the check and fix commands.
//!
//! Supports `text` (default) and `json` formats. The JSON form is a plain
//! array of violation objects so it can be piped straight into other tools.

use crate::diagnostics::Severity;
use crate::runner::RunReport;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(format: &str) -> bool {
    format != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Colored prefix for fatal messages on stderr.
pub fn error_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

/// Print a run report in the requested format. Violations and the summary
/// go to stdout; per-file failures go to stderr.
pub fn print_report(report: &RunReport, format: &str) {
    match format {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_report_json(report)).unwrap()
        ),
        _ => {
            let color = use_colors(format);
            for file in &report.files {
                for v in &file.violations {
                    let rule = if color {
                        match v.severity {
                            Severity::Error => v.rule.red().bold().to_string(),
                            Severity::Warning => v.rule.yellow().bold().to_string(),
                            Severity::Info => v.rule.blue().bold().to_string(),
                        }
                    } else {
                        v.rule.clone()
                    };
                    println!(
                        "{}:{}:{}: {}: {}",
                        file.file, v.line, v.column, rule, v.message
                    );
                }
            }
            let s = &report.summary;
            let summary = format!(
                "— Summary — errors={} warnings={} infos={} files={} failed={}",
                s.errors, s.warnings, s.infos, s.files, s.failed_files
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
    for file in &report.files {
        if let Some(err) = &file.error {
            eprintln!("{} {}: {}", error_prefix(), file.file, err);
        }
    }
}

/// Compose the JSON report (pure) for testing purposes: one object per
/// violation, flattened across files.
pub fn compose_report_json(report: &RunReport) -> JsonVal {
    let items: Vec<JsonVal> = report
        .files
        .iter()
        .flat_map(|f| {
            f.violations.iter().map(|v| {
                json!({
                    "file": f.file,
                    "line": v.line,
                    "column": v.column,
                    "ruleId": v.rule,
                    "message": v.message,
                    "fixable": v.fixable,
                })
            })
        })
        .collect();
    JsonVal::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Summary, Violation};
    use crate::runner::FileReport;

    fn sample() -> RunReport {
        let violations = vec![
            Violation::new("operator-spacing", 1, 6, "missing whitespace around '='")
                .fixable_at(5, 6),
            Violation::new("line-length", 3, 101, "line has 120 characters, limit is 100"),
        ];
        let mut summary = Summary::default();
        summary.files = 1;
        summary.count(&violations);
        RunReport {
            files: vec![FileReport {
                file: "src/app.js".into(),
                violations,
                error: None,
                wrote: false,
            }],
            summary,
        }
    }

    #[test]
    fn test_json_report_is_a_flat_array() {
        let out = compose_report_json(&sample());
        let arr = out.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["file"], "src/app.js");
        assert_eq!(arr[0]["ruleId"], "operator-spacing");
        assert_eq!(arr[0]["line"], 1);
        assert_eq!(arr[0]["column"], 6);
        assert_eq!(arr[0]["fixable"], true);
        assert_eq!(arr[1]["fixable"], false);
    }

    #[test]
    fn test_json_report_empty_run_is_empty_array() {
        let report = RunReport {
            files: Vec::new(),
            summary: Summary::default(),
        };
        assert_eq!(compose_report_json(&report), json!([]));
    }
}
