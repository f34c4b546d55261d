//! Minimal text edits and the single-pass fix pipeline.
//!
//! Edits collected for one file are sorted by offset and checked for
//! intersecting ranges; any overlap aborts the file's fix with a conflict
//! error instead of guessing. Surviving edits apply right-to-left so earlier
//! offsets stay valid. One verification pass re-tokenizes and re-checks the
//! result; it never applies further fixes. Remaining fixable violations of a
//! rule that was just applied mean the pass did not converge.

use crate::config::Config;
use crate::diagnostics::Violation;
use crate::engine::{rule_by_id, run_rules, CheckContext, Rule};
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Replace the byte range `start..end` with `replacement`.
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    /// Insertion at a single offset.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// Deletion of a byte range.
    pub fn delete(start: usize, end: usize) -> Self {
        Self::new(start, end, "")
    }
}

/// Apply a batch of edits to `src` in one pass.
///
/// Edits whose ranges intersect are a contract violation and produce
/// `Error::FixConflict`; touching ranges (one ends where the next starts)
/// are fine.
pub fn apply_edits(src: &str, mut edits: Vec<TextEdit>) -> Result<String> {
    edits.sort_by_key(|e| (e.start, e.end));
    for pair in edits.windows(2) {
        if pair[0].end > pair[1].start {
            return Err(Error::FixConflict {
                a_start: pair[0].start,
                a_end: pair[0].end,
                b_start: pair[1].start,
                b_end: pair[1].end,
            });
        }
    }
    let mut out = src.to_string();
    for e in edits.iter().rev() {
        out.replace_range(e.start..e.end, &e.replacement);
    }
    Ok(out)
}

#[derive(Debug)]
/// Result of one fix pass over a file's text.
pub struct FixOutcome {
    pub fixed: String,
    /// Number of edits applied.
    pub applied: usize,
    /// Violations found on the fixed text by the verification pass.
    pub remaining: Vec<Violation>,
    /// False when a just-applied rule still reports fixable violations.
    pub converged: bool,
}

/// Fix `src` in a single pass and verify convergence.
pub fn fix_text(
    src: &str,
    config: &Config,
    rules: &[Box<dyn Rule>],
    only: &[String],
) -> Result<FixOutcome> {
    let tokens = tokenize(src)?;
    let ctx = CheckContext::new(src, &tokens, config);
    let violations = run_rules(&ctx, rules, only);

    let mut edits: Vec<TextEdit> = Vec::new();
    let mut applied_rules: BTreeSet<String> = BTreeSet::new();
    for v in violations.iter().filter(|v| v.fixable) {
        let Some(rule) = rule_by_id(rules, &v.rule) else {
            continue;
        };
        if let Some(edit) = rule.fix(&ctx, v) {
            edits.push(edit);
            applied_rules.insert(v.rule.clone());
        }
    }

    if edits.is_empty() {
        return Ok(FixOutcome {
            fixed: src.to_string(),
            applied: 0,
            remaining: violations,
            converged: true,
        });
    }

    let applied = edits.len();
    let fixed = apply_edits(src, edits)?;

    // Verification pass only: re-tokenize, re-check, never re-fix.
    let tokens = tokenize(&fixed)?;
    let ctx = CheckContext::new(&fixed, &tokens, config);
    let remaining = run_rules(&ctx, rules, only);
    let converged = !remaining
        .iter()
        .any(|v| v.fixable && applied_rules.contains(&v.rule));

    Ok(FixOutcome {
        fixed,
        applied,
        remaining,
        converged,
    })
}
