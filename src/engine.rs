//! Rule trait and the per-file check runner.
//!
//! Rules are stateless, independent checks over an immutable token stream
//! plus raw lines and configuration. No rule sees another rule's output,
//! so checks for one file run in parallel across rules.

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Severity, Violation};
use crate::fixer::TextEdit;
use crate::lexer::Token;
use rayon::prelude::*;

/// Immutable inputs shared by every rule check for one file.
pub struct CheckContext<'a> {
    pub src: &'a str,
    pub lines: Vec<&'a str>,
    pub tokens: &'a [Token],
    pub config: &'a Config,
}

impl<'a> CheckContext<'a> {
    pub fn new(src: &'a str, tokens: &'a [Token], config: &'a Config) -> Self {
        Self {
            src,
            lines: src.lines().collect(),
            tokens,
            config,
        }
    }

    /// Byte immediately before `offset`, if any.
    pub fn byte_before(&self, offset: usize) -> Option<u8> {
        offset.checked_sub(1).map(|i| self.src.as_bytes()[i])
    }

    /// Byte at `offset`, if any.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(offset).copied()
    }
}

/// An independent style check.
///
/// `check` must be a pure function of the context; `fix`, when implemented,
/// returns a minimal text edit resolving one of the rule's own violations.
pub trait Rule: Send + Sync {
    /// Stable rule id used in reports and configuration (e.g. "indentation").
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Option keys this rule accepts under `[rules.<id>.options]`.
    fn options(&self) -> &'static [&'static str] {
        &[]
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Violation>;

    /// Compute the edit for one fixable violation this rule produced.
    fn fix(&self, _ctx: &CheckContext<'_>, _violation: &Violation) -> Option<TextEdit> {
        None
    }
}

/// Run every enabled rule (optionally restricted to `only` ids) and return
/// the deduplicated, position-sorted violations.
pub fn run_rules(
    ctx: &CheckContext<'_>,
    rules: &[Box<dyn Rule>],
    only: &[String],
) -> Vec<Violation> {
    let selected: Vec<&dyn Rule> = rules
        .iter()
        .map(AsRef::as_ref)
        .filter(|r| ctx.config.rule_enabled(r.id()))
        .filter(|r| only.is_empty() || only.iter().any(|o| o == r.id()))
        .collect();

    let per_rule: Vec<Vec<Violation>> = selected
        .par_iter()
        .map(|rule| {
            let mut found = rule.check(ctx);
            for v in &mut found {
                v.severity = rule.severity();
            }
            found
        })
        .collect();

    let mut diags = Diagnostics::new();
    for found in per_rule {
        diags.extend(found);
    }
    diags.into_sorted()
}

/// Rule/option metadata for configuration validation.
pub fn known_rules(rules: &[Box<dyn Rule>]) -> Vec<(&'static str, &'static [&'static str])> {
    rules.iter().map(|r| (r.id(), r.options())).collect()
}

/// Look up the rule that produced a violation.
pub fn rule_by_id<'r>(rules: &'r [Box<dyn Rule>], id: &str) -> Option<&'r dyn Rule> {
    rules.iter().map(AsRef::as_ref).find(|r| r.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::lexer::tokenize;

    struct AlwaysFires(&'static str);

    impl Rule for AlwaysFires {
        fn id(&self) -> &'static str {
            self.0
        }
        fn description(&self) -> &'static str {
            "fires once per check"
        }
        fn check(&self, _ctx: &CheckContext<'_>) -> Vec<Violation> {
            vec![Violation::new(self.0, 1, 1, "fired")]
        }
    }

    fn fixture_rules() -> Vec<Box<dyn Rule>> {
        vec![Box::new(AlwaysFires("aaa")), Box::new(AlwaysFires("bbb"))]
    }

    #[test]
    fn test_rule_restriction() {
        let cfg = Config::default();
        let tokens = tokenize("x;").unwrap();
        let ctx = CheckContext::new("x;", &tokens, &cfg);
        let rules = fixture_rules();

        let all = run_rules(&ctx, &rules, &[]);
        assert_eq!(all.len(), 2);

        let only = run_rules(&ctx, &rules, &["bbb".to_string()]);
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].rule, "bbb");
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let mut cfg = Config::default();
        cfg.rules.insert(
            "aaa".to_string(),
            crate::config::RuleCfg {
                enabled: false,
                options: Default::default(),
            },
        );
        let tokens = tokenize("x;").unwrap();
        let ctx = CheckContext::new("x;", &tokens, &cfg);
        let out = run_rules(&ctx, &fixture_rules(), &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rule, "bbb");
    }
}
