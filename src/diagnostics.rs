//! Violation records and the per-file diagnostics collector.
//!
//! The collector aggregates every rule's output for one file, drops exact
//! duplicates (same rule id, line, column, and message), and produces a
//! stable list sorted by (line, column, rule id). Query helpers filter by
//! severity, rule id, and fixability without consuming the collection.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Severity attached to a rule's violations.
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// A single reported deviation from a rule, tied to a source position.
pub struct Violation {
    #[serde(rename = "ruleId")]
    pub rule: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub fixable: bool,
    #[serde(skip)]
    pub severity: Severity,
    /// Byte range the fix for this violation targets, when one exists.
    #[serde(skip)]
    pub span: Option<(usize, usize)>,
}

impl Violation {
    pub fn new(rule: &str, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            line,
            column,
            message: message.into(),
            fixable: false,
            severity: Severity::Error,
            span: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Mark the violation fixable and remember the byte range its fix edits.
    pub fn fixable_at(mut self, start: usize, end: usize) -> Self {
        self.fixable = true;
        self.span = Some((start, end));
        self
    }
}

#[derive(Debug, Default)]
/// Aggregates violations for one file.
pub struct Diagnostics {
    violations: Vec<Violation>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, found: Vec<Violation>) {
        self.violations.extend(found);
    }

    /// Deduplicate and sort, then hand back the final list.
    pub fn into_sorted(mut self) -> Vec<Violation> {
        self.violations.sort_by(|a, b| {
            (a.line, a.column, a.rule.as_str(), a.message.as_str()).cmp(&(
                b.line,
                b.column,
                b.rule.as_str(),
                b.message.as_str(),
            ))
        });
        self.violations.dedup_by(|a, b| {
            a.rule == b.rule && a.line == b.line && a.column == b.column && a.message == b.message
        });
        self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity == severity)
    }

    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    pub fn fixable(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.fixable)
    }
}

#[derive(Debug, Default, Serialize)]
/// Aggregated counts used by printers and exit-code logic.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub files: usize,
    pub failed_files: usize,
}

impl Summary {
    pub fn count(&mut self, violations: &[Violation]) {
        for v in violations {
            match v.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Info => self.infos += 1,
            }
        }
    }
}
