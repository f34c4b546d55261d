//! Multi-file check/fix runner.
//!
//! Files are independent: each one is read, tokenized, checked, and
//! optionally fixed with no shared mutable state, so the default mode runs
//! them in parallel with rayon. `--fail-fast` switches to a sequential walk
//! that stops at the first per-file failure. Per-file lex and I/O failures
//! never abort a report-all run.

use crate::config::Config;
use crate::diagnostics::{Summary, Violation};
use crate::engine::{run_rules, CheckContext, Rule};
use crate::error::{Error, Result};
use crate::fixer::fix_text;
use crate::lexer::tokenize;
use glob::glob;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
/// Run behavior selected on the command line.
pub struct RunOptions {
    /// Apply fixes in place instead of only reporting.
    pub fix: bool,
    /// Restrict checking to these rule ids (empty means all).
    pub only: Vec<String>,
    /// Stop at the first per-file failure.
    pub fail_fast: bool,
}

#[derive(Debug)]
/// Outcome for one file.
pub struct FileReport {
    /// Path as shown to the user, relative to the working directory when
    /// possible.
    pub file: String,
    pub violations: Vec<Violation>,
    /// Formatted per-file failure (lex error, I/O error, fix conflict,
    /// non-convergence warning), if any.
    pub error: Option<String>,
    /// True when fixed content was written back.
    pub wrote: bool,
}

#[derive(Debug)]
/// Aggregate of a whole run.
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

impl RunReport {
    pub fn has_violations(&self) -> bool {
        self.files.iter().any(|f| !f.violations.is_empty())
    }

    pub fn has_errors(&self) -> bool {
        self.files.iter().any(|f| f.error.is_some())
    }

    /// 0 clean, 1 violations found, 2 internal/per-file errors.
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            2
        } else if self.has_violations() {
            1
        } else {
            0
        }
    }
}

/// Expand CLI path arguments: literal files, directories (recursed for
/// `*.js`), and glob patterns.
pub fn expand_paths(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = Vec::new();
    for arg in paths {
        let path = Path::new(arg);
        if path.is_dir() {
            let pattern = path.join("**/*.js");
            collect_glob(&pattern.to_string_lossy(), &mut out)?;
        } else if arg.contains(['*', '?', '[']) {
            collect_glob(arg, &mut out)?;
        } else {
            out.push(path.to_path_buf());
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn collect_glob(pattern: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        glob(pattern).map_err(|e| Error::ConfigParse(format!("invalid path pattern '{pattern}': {e}")))?;
    for entry in entries.flatten() {
        if entry.is_file() {
            out.push(entry);
        }
    }
    Ok(())
}

/// Check (and optionally fix) every file, honoring `--fail-fast`.
pub fn run(
    files: &[PathBuf],
    config: &Config,
    rules: &[Box<dyn Rule>],
    options: &RunOptions,
) -> RunReport {
    let reports: Vec<FileReport> = if options.fail_fast {
        let mut acc = Vec::new();
        for path in files {
            let report = process_file(path, config, rules, options);
            let fatal = report.error.is_some();
            acc.push(report);
            if fatal {
                break;
            }
        }
        acc
    } else {
        files
            .par_iter()
            .map(|path| process_file(path, config, rules, options))
            .collect()
    };

    let mut summary = Summary::default();
    summary.files = reports.len();
    for r in &reports {
        summary.count(&r.violations);
        if r.error.is_some() {
            summary.failed_files += 1;
        }
    }
    RunReport {
        files: reports,
        summary,
    }
}

fn display_path(path: &Path) -> String {
    let shown = std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .unwrap_or_else(|| path.to_path_buf());
    // Prefer the original spelling when relativization climbs out of the
    // working directory.
    if shown.starts_with("..") {
        path.to_string_lossy().into_owned()
    } else {
        shown.to_string_lossy().into_owned()
    }
}

fn process_file(
    path: &Path,
    config: &Config,
    rules: &[Box<dyn Rule>],
    options: &RunOptions,
) -> FileReport {
    let file = display_path(path);
    let src = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            return FileReport {
                file,
                violations: Vec::new(),
                error: Some(format!("io error: {e}")),
                wrote: false,
            };
        }
    };

    let tokens = match tokenize(&src) {
        Ok(t) => t,
        Err(e) => {
            return FileReport {
                file,
                violations: Vec::new(),
                error: Some(e.to_string()),
                wrote: false,
            };
        }
    };
    let ctx = CheckContext::new(&src, &tokens, config);
    let violations = run_rules(&ctx, rules, &options.only);

    if !options.fix {
        return FileReport {
            file,
            violations,
            error: None,
            wrote: false,
        };
    }

    match fix_text(&src, config, rules, &options.only) {
        // A conflict aborts the fix but the check results still stand.
        Err(err @ Error::FixConflict { .. }) => FileReport {
            file,
            violations,
            error: Some(err.to_string()),
            wrote: false,
        },
        Err(err) => FileReport {
            file,
            violations,
            error: Some(err.to_string()),
            wrote: false,
        },
        Ok(outcome) => {
            let mut error = None;
            let mut wrote = false;
            if outcome.applied > 0 {
                if !outcome.converged {
                    // Keep a pre-fix copy next to the partially fixed file.
                    let mut backup = path.as_os_str().to_owned();
                    backup.push(".orig");
                    if let Err(e) = fs::write(&backup, &src) {
                        error = Some(format!("io error writing backup: {e}"));
                    } else {
                        let remaining =
                            outcome.remaining.iter().filter(|v| v.fixable).count();
                        error = Some(
                            Error::FixerNonConvergence { remaining }.to_string(),
                        );
                    }
                }
                if let Err(e) = fs::write(path, &outcome.fixed) {
                    error = Some(format!("io error: {e}"));
                } else {
                    wrote = true;
                }
            }
            FileReport {
                file,
                violations: outcome.remaining,
                error,
                wrote,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;
    use tempfile::tempdir;

    fn opts() -> RunOptions {
        RunOptions::default()
    }

    #[test]
    fn test_report_all_keeps_clean_file_results() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("broken.js");
        let tight = dir.path().join("tight.js");
        fs::write(&broken, "var a = 'unterminated\n").unwrap();
        fs::write(&tight, "var x=1;\n").unwrap();

        let files = vec![broken.clone(), tight.clone()];
        let report = run(&files, &Config::default(), &rules::all(), &opts());
        assert_eq!(report.files.len(), 2);
        let broken_report = report
            .files
            .iter()
            .find(|f| f.file.ends_with("broken.js"))
            .unwrap();
        assert!(broken_report.error.as_deref().unwrap().contains("lex error"));
        let tight_report = report
            .files
            .iter()
            .find(|f| f.file.ends_with("tight.js"))
            .unwrap();
        assert_eq!(tight_report.violations.len(), 1);
        assert_eq!(tight_report.violations[0].rule, "operator-spacing");
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_fail_fast_stops_after_first_failure() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("a.js");
        let clean = dir.path().join("b.js");
        fs::write(&broken, "var a = 'oops\n").unwrap();
        fs::write(&clean, "var b = 1;\n").unwrap();

        let options = RunOptions {
            fail_fast: true,
            ..RunOptions::default()
        };
        let files = vec![broken, clean];
        let report = run(&files, &Config::default(), &rules::all(), &options);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_fix_rewrites_in_place() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("q.js");
        fs::write(&file, "var a = \"hi\";\n").unwrap();

        let options = RunOptions {
            fix: true,
            ..RunOptions::default()
        };
        let files = vec![file.clone()];
        let report = run(&files, &Config::default(), &rules::all(), &options);
        assert!(report.files[0].wrote);
        assert!(report.files[0].violations.is_empty());
        assert_eq!(fs::read_to_string(&file).unwrap(), "var a = 'hi';\n");
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_fix_on_clean_file_is_byte_noop() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("clean.js");
        let content = "var a = 'hi';\n";
        fs::write(&file, content).unwrap();

        let options = RunOptions {
            fix: true,
            ..RunOptions::default()
        };
        let report = run(&[file.clone()], &Config::default(), &rules::all(), &options);
        assert!(!report.files[0].wrote);
        assert_eq!(fs::read_to_string(&file).unwrap(), content);
    }

    #[test]
    fn test_rule_restriction_filters_output() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("mixed.js");
        // Tight assignment plus bad indentation on line 2.
        fs::write(&file, "var x=1;\n   f();\n").unwrap();

        let options = RunOptions {
            only: vec!["indentation".to_string()],
            ..RunOptions::default()
        };
        let report = run(&[file], &Config::default(), &rules::all(), &options);
        assert!(!report.files[0].violations.is_empty());
        assert!(report.files[0]
            .violations
            .iter()
            .all(|v| v.rule == "indentation"));
    }

    #[test]
    fn test_expand_paths_directory_recursion() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("a.js"), "var a = 1;\n").unwrap();
        fs::write(nested.join("b.js"), "var b = 2;\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let files = expand_paths(&[dir.path().to_string_lossy().into_owned()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "js"));
    }
}
